//! One positioned entity per catalog body, plus its effect layers.

use bevy::prelude::*;

use super::SceneAssets;
use crate::catalog::CelestialBodyDescriptor;
use crate::effects::build::{BodyLayers, LayerAnchors, build_layers};
use crate::effects::LayerSpec;
use crate::kinematics::SimulationState;
use crate::texture::{TextureRequest, TextureTarget};

/// Orbit-following root of a body. Never rotates.
#[derive(Component, Debug, Clone, Copy)]
pub struct BodyRoot {
    pub index: usize,
}

/// The body's spinning surface mesh.
#[derive(Component, Debug, Clone, Copy)]
pub struct BodyMesh {
    pub index: usize,
}

#[derive(Debug)]
pub struct SpawnedBody {
    pub root: Entity,
    pub layers: BodyLayers,
    /// Composition failed and the body was rebuilt in its minimal form.
    pub degraded: bool,
}

/// Spawn `body` with every layer in `plan`.
///
/// `plan == None` or any layer failing yields the minimal form: a plain
/// sphere in the body's base color, without texture or effects.
pub fn spawn_body(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    index: usize,
    body: &'static CelestialBodyDescriptor,
    plan: Option<&[LayerSpec]>,
    state: &SimulationState,
) -> SpawnedBody {
    let Some(plan) = plan else {
        return SpawnedBody {
            root: spawn_minimal(commands, assets, index, body, state),
            layers: BodyLayers::default(),
            degraded: true,
        };
    };

    let mark = assets.ledger.mark();
    let anchors = spawn_anchors(commands, assets, index, body, state, true);
    match build_layers(commands, assets, index, body, plan, anchors, state) {
        Ok(layers) => SpawnedBody {
            root: anchors.root,
            layers,
            degraded: false,
        },
        Err(err) => {
            let released = assets.rollback(mark, body.name, commands);
            warn!("{err}; {} falls back to its minimal form ({released} resources rolled back)", body.name);
            SpawnedBody {
                root: spawn_minimal(commands, assets, index, body, state),
                layers: BodyLayers::default(),
                degraded: true,
            }
        }
    }
}

fn spawn_minimal(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    index: usize,
    body: &'static CelestialBodyDescriptor,
    state: &SimulationState,
) -> Entity {
    spawn_anchors(commands, assets, index, body, state, false).root
}

fn spawn_anchors(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    index: usize,
    body: &'static CelestialBodyDescriptor,
    state: &SimulationState,
    textured: bool,
) -> LayerAnchors {
    let position = state.body(index).map(|b| b.position).unwrap_or_default();
    let root = commands
        .spawn((
            Transform::from_translation(position),
            Visibility::default(),
            BodyRoot { index },
            Name::new(body.name),
        ))
        .id();
    assets.ledger.track_root(root);

    let axis = commands
        .spawn((
            Transform::from_rotation(Quat::from_rotation_z(body.tilt_radians())),
            Visibility::default(),
            ChildOf(root),
        ))
        .id();

    let mesh = assets.mesh(Sphere::new(body.radius.max(0.1)).mesh().uv(64, 32));
    let material = assets.material(StandardMaterial {
        base_color: body.color.to_color(),
        emissive: body.emissive.to_linear(),
        perceptual_roughness: body.roughness,
        metallic: body.metalness,
        ..default()
    });
    let mut surface = commands.spawn((
        Mesh3d(mesh),
        MeshMaterial3d(material),
        Transform::default(),
        BodyMesh { index },
        ChildOf(axis),
    ));
    if textured {
        surface.insert(TextureTarget::new(TextureRequest::new(body.name, body.texture)));
    }
    let surface = surface.id();

    LayerAnchors { root, axis, surface }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use crate::catalog::{FeatureKind, describe_bodies, find_body};
    use crate::effects::build::MoonBody;
    use crate::effects::{EffectMaterial, plan_layers};
    use crate::scene::{ResourceLedger, plan_catalog};
    use crate::types::FRAME_STEP;

    fn world_with_state() -> World {
        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<Assets<EffectMaterial>>();
        world.init_resource::<Assets<Image>>();
        world.init_resource::<ResourceLedger>();
        let catalog = describe_bodies();
        world.insert_resource(SimulationState::new(catalog, &plan_catalog(catalog), FRAME_STEP, 3));
        world
    }

    fn jupiter_index() -> usize {
        describe_bodies().iter().position(|b| b.name == "Jupiter").expect("jupiter")
    }

    #[test]
    fn building_layers_twice_adds_nothing() {
        let mut world = world_with_state();
        let index = jupiter_index();
        let jupiter = find_body("Jupiter").expect("jupiter");
        let plan = plan_layers(jupiter).expect("valid plan");

        let counts = world
            .run_system_once(
                move |mut commands: Commands, mut assets: SceneAssets, state: Res<SimulationState>| {
                    let spawned = spawn_body(&mut commands, &mut assets, index, jupiter, Some(&plan), &state);
                    let first = (assets.meshes.len(), assets.effects.len(), assets.ledger.len());
                    let anchors = LayerAnchors {
                        root: spawned.root,
                        axis: spawned.root,
                        surface: spawned.root,
                    };
                    let again = build_layers(&mut commands, &mut assets, index, jupiter, &plan, anchors, &state)
                        .expect("second build");
                    let second = (assets.meshes.len(), assets.effects.len(), assets.ledger.len());
                    (spawned.layers.moons.len(), again, first, second, plan.len())
                },
            )
            .expect("system runs");

        let (moons, again, first, second, layers) = counts;
        assert_eq!(moons, 4);
        assert_eq!(again.skipped, layers);
        assert!(again.entities.is_empty() && again.moons.is_empty() && again.fields.is_empty());
        assert_eq!(first, second);
        assert_eq!(world.query::<&MoonBody>().iter(&world).count(), 4);
    }

    #[test]
    fn failed_layer_rolls_back_the_whole_body() {
        let mut world = world_with_state();
        let index = jupiter_index();
        let jupiter = find_body("Jupiter").expect("jupiter");
        let mut plan = plan_layers(jupiter).expect("valid plan");
        // Moons build first, then the broken shell fails.
        plan.push(LayerSpec::NightLights {
            radius: -1.0,
            color: jupiter.color,
            intensity: 0.5,
        });

        let spawned = world
            .run_system_once(
                move |mut commands: Commands, mut assets: SceneAssets, state: Res<SimulationState>| {
                    spawn_body(&mut commands, &mut assets, index, jupiter, Some(&plan), &state)
                },
            )
            .expect("system runs");

        assert!(spawned.degraded);
        assert!(spawned.layers.moons.is_empty());
        assert_eq!(world.query::<&MoonBody>().iter(&world).count(), 0);
        assert_eq!(world.query::<&BodyRoot>().iter(&world).count(), 1);
        assert_eq!(world.query::<&TextureTarget>().iter(&world).count(), 0);

        let ledger = world.resource::<ResourceLedger>();
        assert!(!ledger.has_layer("Jupiter", FeatureKind::Moons));
        assert_eq!(ledger.roots(), &[spawned.root]);
        assert_eq!(ledger.mesh_count(), 1);
        assert_eq!(ledger.material_count(), 1);
        assert_eq!(world.resource::<Assets<Mesh>>().len(), 1);
        assert_eq!(world.resource::<Assets<EffectMaterial>>().len(), 0);
    }
}
