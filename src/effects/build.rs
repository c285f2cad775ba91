//! Spawning planned layers and animating their shader parameters.

use std::f32::consts::PI;

use bevy::prelude::*;

use super::{CompositionError, EffectKind, EffectMaterial, LayerSpec};
use crate::catalog::{CelestialBodyDescriptor, Hex};
use crate::kinematics::{FieldOwner, SimulationState};
use crate::particles::ParticleField;
use crate::scene::SceneAssets;
use crate::scene::meshes::{inverted_sphere, open_band, point_cloud, ring_disc};
use crate::texture::{TextureRequest, TextureTarget};

/// An entity rendered with an [`EffectMaterial`].
#[derive(Component, Debug, Clone, Copy)]
pub struct EffectLayer {
    /// Catalog index of the owning body; `None` for scene-wide effects.
    pub body: Option<usize>,
    pub kind: EffectKind,
}

/// Cloud shell, rotated by the kinematics cloud spin.
#[derive(Component, Debug, Clone, Copy)]
pub struct CloudShell {
    pub body: usize,
}

/// A moon entity, indexing `SimulationState::moons`.
#[derive(Component, Debug, Clone, Copy)]
pub struct MoonBody {
    pub moon: usize,
}

/// Entities a body's layers hang from.
#[derive(Clone, Copy, Debug)]
pub struct LayerAnchors {
    /// Follows the orbit, never rotates.
    pub root: Entity,
    /// Carries the axial tilt.
    pub axis: Entity,
    /// Spins with the surface.
    pub surface: Entity,
}

/// What building a body's layers produced.
#[derive(Debug, Default)]
pub struct BodyLayers {
    pub entities: Vec<Entity>,
    pub moons: Vec<Entity>,
    /// Point clouds that must be rewritten from their particle field each
    /// frame.
    pub fields: Vec<(FieldOwner, Handle<Mesh>)>,
    pub skipped: usize,
}

const SHELL_SECTORS: u32 = 64;
const SHELL_STACKS: u32 = 32;
const STORM_COLORS: (Hex, Hex) = (Hex(0xB5533C), Hex(0xE8A27C));
const MOON_COLOR: Hex = Hex(0xAAAAAA);

/// Spawn every layer in `layers` under `anchors`.
///
/// A (body, layer kind) pair already present in the ledger is skipped, so
/// building twice never duplicates a layer. On error, whatever was built
/// before the failing layer stays in the ledger; callers roll it back with
/// [`SceneAssets::rollback`].
pub fn build_layers(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    index: usize,
    body: &'static CelestialBodyDescriptor,
    layers: &[LayerSpec],
    anchors: LayerAnchors,
    state: &SimulationState,
) -> Result<BodyLayers, CompositionError> {
    let mut built = BodyLayers::default();

    for layer in layers {
        if !assets.ledger.claim_layer(body.name, layer.kind()) {
            debug!("{} {:?} layer already built", body.name, layer.kind());
            built.skipped += 1;
            continue;
        }

        match layer {
            LayerSpec::Atmosphere { radius, color, opacity } => {
                let mesh = inverted_sphere(shell_radius(body, *radius)?, SHELL_SECTORS, SHELL_STACKS).map_err(|reason| CompositionError::Mesh {
                    body: body.name,
                    reason,
                })?;
                let mesh = assets.mesh(mesh);
                let material = assets.effect(EffectMaterial::new(EffectKind::Atmosphere, *opacity).with_colors(*color, *color));
                built.entities.push(
                    commands
                        .spawn((
                            Mesh3d(mesh),
                            MeshMaterial3d(material),
                            Transform::default(),
                            EffectLayer {
                                body: Some(index),
                                kind: EffectKind::Atmosphere,
                            },
                            ChildOf(anchors.root),
                        ))
                        .id(),
                );
            }
            LayerSpec::Clouds {
                radius,
                opacity,
                texture_key,
                location,
                ..
            } => {
                let mesh = assets.mesh(Sphere::new(shell_radius(body, *radius)?).mesh().uv(SHELL_SECTORS, SHELL_STACKS));
                let material = assets.material(StandardMaterial {
                    base_color: Color::WHITE.with_alpha(*opacity),
                    alpha_mode: AlphaMode::Blend,
                    perceptual_roughness: 1.0,
                    ..default()
                });
                built.entities.push(
                    commands
                        .spawn((
                            Mesh3d(mesh),
                            MeshMaterial3d(material),
                            Transform::default(),
                            CloudShell { body: index },
                            TextureTarget::new(TextureRequest::new(texture_key.clone(), *location)),
                            ChildOf(anchors.axis),
                        ))
                        .id(),
                );
            }
            LayerSpec::Aurora {
                top_radius,
                bottom_radius,
                height,
                offset,
                primary,
                secondary,
            } => {
                let mesh = assets.mesh(open_band(*bottom_radius, *top_radius, *height, 64));
                let material = assets.effect(EffectMaterial::new(EffectKind::Aurora, 1.0).with_colors(*primary, *secondary));
                // North band narrows toward the pole; the south band is the
                // same mesh flipped.
                for (y, flip) in [(*offset, 0.0), (-*offset, PI)] {
                    built.entities.push(
                        commands
                            .spawn((
                                Mesh3d(mesh.clone()),
                                MeshMaterial3d(material.clone()),
                                Transform::from_xyz(0.0, y, 0.0).with_rotation(Quat::from_rotation_x(flip)),
                                EffectLayer {
                                    body: Some(index),
                                    kind: EffectKind::Aurora,
                                },
                                ChildOf(anchors.axis),
                            ))
                            .id(),
                    );
                }
            }
            LayerSpec::NightLights { radius, color, intensity } => {
                let mesh = assets.mesh(Sphere::new(shell_radius(body, *radius)?).mesh().uv(SHELL_SECTORS, SHELL_STACKS));
                let mut material = EffectMaterial::new(EffectKind::NightLights, *intensity).with_colors(*color, *color);
                material.set_sun_direction(state.sun_direction(index));
                let material = assets.effect(material);
                built.entities.push(
                    commands
                        .spawn((
                            Mesh3d(mesh),
                            MeshMaterial3d(material),
                            Transform::default(),
                            EffectLayer {
                                body: Some(index),
                                kind: EffectKind::NightLights,
                            },
                            ChildOf(anchors.surface),
                        ))
                        .id(),
                );
            }
            LayerSpec::Storm {
                radius,
                center_uv,
                inner,
                outer,
            } => {
                let mesh = assets.mesh(Sphere::new(shell_radius(body, *radius)?).mesh().uv(SHELL_SECTORS, SHELL_STACKS));
                let material = assets.effect(
                    EffectMaterial::new(EffectKind::Storm, 1.0)
                        .with_colors(STORM_COLORS.0, STORM_COLORS.1)
                        .with_region(*center_uv, *inner, *outer),
                );
                built.entities.push(
                    commands
                        .spawn((
                            Mesh3d(mesh),
                            MeshMaterial3d(material),
                            Transform::default(),
                            EffectLayer {
                                body: Some(index),
                                kind: EffectKind::Storm,
                            },
                            ChildOf(anchors.surface),
                        ))
                        .id(),
                );
            }
            LayerSpec::Rings {
                inner,
                outer,
                texture_key,
                location,
                ..
            } => {
                let mesh = assets.mesh(ring_disc(*inner, *outer, 128));
                let material = assets.material(StandardMaterial {
                    base_color: body.color.to_color_alpha(0.8),
                    alpha_mode: AlphaMode::Blend,
                    double_sided: true,
                    cull_mode: None,
                    ..default()
                });
                built.entities.push(
                    commands
                        .spawn((
                            Mesh3d(mesh),
                            MeshMaterial3d(material),
                            Transform::default(),
                            TextureTarget::new(TextureRequest::new(texture_key.clone(), *location)),
                            ChildOf(anchors.axis),
                        ))
                        .id(),
                );
                let owner = FieldOwner::Rings(index);
                if let Some(field) = state.field(owner) {
                    let (entity, handle) = spawn_point_field(commands, assets, field, anchors.axis, AlphaMode::Blend);
                    built.entities.push(entity);
                    built.fields.push((owner, handle));
                }
            }
            LayerSpec::Moons(moons) => {
                let material = assets.material(StandardMaterial {
                    base_color: MOON_COLOR.to_color(),
                    perceptual_roughness: 0.9,
                    ..default()
                });
                for moon in moons.iter() {
                    let Some(slot) = state
                        .moons
                        .iter()
                        .position(|m| m.parent == index && m.descriptor.name == moon.name)
                    else {
                        continue;
                    };
                    let mesh = assets.mesh(Sphere::new(moon.radius).mesh().uv(32, 16));
                    let entity = commands
                        .spawn((
                            Mesh3d(mesh),
                            MeshMaterial3d(material.clone()),
                            Transform::from_translation(state.moons[slot].position),
                            MoonBody { moon: slot },
                            Name::new(moon.name),
                        ))
                        .id();
                    assets.ledger.track_root(entity);
                    built.moons.push(entity);
                }
            }
            LayerSpec::Tail { .. } => {
                let owner = FieldOwner::Tail(index);
                if let Some(field) = state.field(owner) {
                    let (entity, handle) = spawn_point_field(commands, assets, field, anchors.root, AlphaMode::Add);
                    built.entities.push(entity);
                    built.fields.push((owner, handle));
                }
            }
        }
    }

    Ok(built)
}

fn shell_radius(body: &CelestialBodyDescriptor, radius: f32) -> Result<f32, CompositionError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(CompositionError::Mesh {
            body: body.name,
            reason: format!("shell radius {radius}"),
        })
    }
}

/// Spawn a point cloud mirroring `field` under `parent`.
pub fn spawn_point_field(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    field: &ParticleField,
    parent: Entity,
    alpha_mode: AlphaMode,
) -> (Entity, Handle<Mesh>) {
    let mesh = assets.mesh(point_cloud(field.positions(), field.colors()));
    let material = assets.material(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        alpha_mode,
        ..default()
    });
    let entity = commands
        .spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material),
            Transform::default(),
            ChildOf(parent),
        ))
        .id();
    (entity, mesh)
}

/// Push the clock and sun direction into every effect material.
pub fn update_effect_time(
    state: Res<SimulationState>,
    layers: Query<(&EffectLayer, &MeshMaterial3d<EffectMaterial>)>,
    mut materials: ResMut<Assets<EffectMaterial>>,
) {
    let time = state.clock.effect_time();
    for (layer, handle) in &layers {
        let Some(mut material) = materials.get_mut(&handle.0) else {
            continue;
        };
        material.set_time(time);
        if let (true, Some(body)) = (layer.kind.is_sun_relative(), layer.body) {
            material.set_sun_direction(state.sun_direction(body));
        }
    }
}
