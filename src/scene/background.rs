//! Starfield layers, nebula shell and scene lighting.

use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use rand::rngs::StdRng;

use super::SceneAssets;
use super::meshes::{inverted_sphere, point_cloud};
use crate::catalog::Hex;
use crate::config::OrreryConfig;
use crate::effects::build::EffectLayer;
use crate::effects::{CompositionError, EffectKind, EffectMaterial};
use crate::particles::{Emitter, ParticleField};

/// One depth layer of the starfield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarLayer {
    pub count: usize,
    pub size: f32,
    pub distance: f32,
    pub twinkle: bool,
}

/// Near layers are sparse and bright, far layers dense and faint.
pub const STAR_LAYERS: [StarLayer; 5] = [
    StarLayer { count: 15_000, size: 0.3, distance: 1000.0, twinkle: true },
    StarLayer { count: 8_000, size: 0.6, distance: 2000.0, twinkle: false },
    StarLayer { count: 4_000, size: 1.0, distance: 3000.0, twinkle: true },
    StarLayer { count: 1_000, size: 2.0, distance: 4000.0, twinkle: false },
    StarLayer { count: 200, size: 3.0, distance: 5000.0, twinkle: true },
];

pub const NEBULA_RADIUS: f32 = 8000.0;
const NEBULA_COLORS: [Hex; 3] = [Hex(0x110033), Hex(0x330022), Hex(0x002233)];

const AMBIENT_COLOR: Hex = Hex(0x222244);
const AMBIENT_BRIGHTNESS: f32 = 60.0;

/// Blue and red rim lights from opposite sides of the ecliptic.
const RIM_LIGHTS: [(Hex, Vec3); 2] = [
    (Hex(0x4444FF), Vec3::new(-500.0, 300.0, -500.0)),
    (Hex(0xFF4444), Vec3::new(500.0, -300.0, 500.0)),
];
const RIM_ILLUMINANCE: f32 = 800.0;

/// Starfield layer whose opacity oscillates.
#[derive(Component, Debug, Clone, Copy)]
pub struct Twinkle {
    pub phase: f32,
    pub base_alpha: f32,
}

/// Entities and lights created for the backdrop.
#[derive(Debug, Default)]
pub struct Backdrop {
    pub roots: Vec<Entity>,
    pub lights: Vec<Entity>,
    pub star_count: usize,
}

/// Alpha of a twinkling layer at effect time `t`.
pub fn twinkle_alpha(base: f32, phase: f32, t: f32) -> f32 {
    (base * (0.75 + 0.25 * (t * 0.5 + phase).sin())).clamp(0.0, 1.0)
}

/// Build the star layers as static point clouds.
pub fn star_fields(config: &OrreryConfig, rng: &mut StdRng) -> Vec<(StarLayer, ParticleField)> {
    STAR_LAYERS
        .iter()
        .map(|layer| {
            let field = ParticleField::new(
                Emitter::Shell {
                    distance: layer.distance,
                    size: layer.size,
                },
                config.scaled_star_count(layer.count),
                rng,
            );
            (*layer, field)
        })
        .collect()
}

pub fn spawn_backdrop(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    config: &OrreryConfig,
    rng: &mut StdRng,
) -> Result<Backdrop, CompositionError> {
    let mut backdrop = Backdrop::default();

    for (i, (layer, field)) in star_fields(config, rng).into_iter().enumerate() {
        if field.is_empty() {
            continue;
        }
        let base_alpha = (0.4 + layer.size * 0.2).min(1.0);
        let mesh = assets.mesh(point_cloud(field.positions(), field.colors()));
        let material = assets.material(StandardMaterial {
            base_color: Color::WHITE.with_alpha(base_alpha),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            fog_enabled: false,
            ..default()
        });
        let mut entity = commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::default(),
            Name::new(format!("Stars {i}")),
        ));
        if layer.twinkle {
            entity.insert(Twinkle {
                phase: i as f32 * 1.7,
                base_alpha,
            });
        }
        backdrop.star_count += field.len();
        backdrop.roots.push(entity.id());
    }

    let nebula_mesh = inverted_sphere(NEBULA_RADIUS, 64, 32).map_err(|reason| CompositionError::Mesh {
        body: "Nebula",
        reason,
    })?;
    let nebula_mesh = assets.mesh(nebula_mesh);
    let nebula = assets.effect(
        EffectMaterial::new(EffectKind::Nebula, 1.0)
            .with_colors(NEBULA_COLORS[0], NEBULA_COLORS[1])
            .with_tertiary(NEBULA_COLORS[2])
            .with_speed(0.1),
    );
    backdrop.roots.push(
        commands
            .spawn((
                Mesh3d(nebula_mesh),
                MeshMaterial3d(nebula),
                Transform::default(),
                EffectLayer {
                    body: None,
                    kind: EffectKind::Nebula,
                },
                Name::new("Nebula"),
            ))
            .id(),
    );

    commands.insert_resource(GlobalAmbientLight {
        color: AMBIENT_COLOR.to_color(),
        brightness: AMBIENT_BRIGHTNESS,
        affects_lightmapped_meshes: true,
    });

    for (color, position) in RIM_LIGHTS {
        let light = commands
            .spawn((
                DirectionalLight {
                    color: color.to_color(),
                    illuminance: RIM_ILLUMINANCE,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
                Name::new("Rim light"),
            ))
            .id();
        backdrop.roots.push(light);
        backdrop.lights.push(light);
    }

    info!("Backdrop composed: {} stars", backdrop.star_count);
    Ok(backdrop)
}

/// Oscillate the opacity of twinkling star layers.
pub fn twinkle_stars(
    state: Res<crate::kinematics::SimulationState>,
    layers: Query<(&Twinkle, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let t = state.clock.effect_time();
    for (twinkle, handle) in &layers {
        if let Some(mut material) = materials.get_mut(&handle.0) {
            material.base_color.set_alpha(twinkle_alpha(twinkle.base_alpha, twinkle.phase, t));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn star_layers_respect_density() {
        let config = OrreryConfig {
            star_density: 0.1,
            ..default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let fields = star_fields(&config, &mut rng);
        let counts: Vec<_> = fields.iter().map(|(_, f)| f.len()).collect();
        assert_eq!(counts, [1500, 800, 400, 100, 20]);
    }

    #[test]
    fn stars_stay_near_their_layer_shell() {
        let config = OrreryConfig {
            star_density: 0.01,
            ..default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        for (layer, field) in star_fields(&config, &mut rng) {
            for p in field.particles() {
                let r = p.position.length();
                assert!(r >= layer.distance * 0.8 - 1e-2 && r <= layer.distance * 1.2 + 1e-2);
            }
        }
    }

    #[test]
    fn twinkle_stays_in_range() {
        for i in 0..200 {
            let a = twinkle_alpha(0.8, 1.0, i as f32 * 0.1);
            assert!((0.4 - 1e-4..=0.8 + 1e-4).contains(&a));
        }
    }
}
