//! Scene composer: builds the whole render graph once per mount.
//!
//! Composition order is backdrop, sun, bodies with their layers, orbit
//! guides, then the asteroid belt. A body whose layers fail to build is
//! isolated and shown in its minimal form; only failures of scene-wide
//! pieces abort the mount.

pub mod background;
pub mod belt;
pub mod bodies;
pub mod ledger;
pub mod meshes;
pub mod orbits;
pub mod sun;
pub mod sync;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::{ASTEROID_BELT, CelestialBodyDescriptor, SUN};
use crate::config::OrreryConfig;
use crate::effects::{CompositionError, LayerSpec, plan_layers};
use crate::kinematics::{FieldOwner, SimulationState};

pub use ledger::{ResourceLedger, SceneAssets};

/// References the frame pipeline needs into the composed scene.
#[derive(Resource, Debug, Default)]
pub struct SceneHandles {
    pub camera: Option<Entity>,
    pub sun: Option<Entity>,
    /// Root entity of each catalog body, by catalog index.
    pub bodies: Vec<Entity>,
    pub moons: Vec<Entity>,
    pub lights: Vec<Entity>,
    pub orbit_guides: Vec<Entity>,
    pub belt: Option<Entity>,
    /// Point clouds rewritten every frame from their particle field.
    pub fields: Vec<(FieldOwner, Handle<Mesh>)>,
    pub star_count: usize,
    pub asteroid_count: usize,
}

/// Composition steps, in the order [`compose`] runs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositionStage {
    Backdrop,
    Sun,
    Bodies,
    Orbits,
    Belt,
}

impl CompositionStage {
    pub const ALL: [CompositionStage; 5] = [
        CompositionStage::Backdrop,
        CompositionStage::Sun,
        CompositionStage::Bodies,
        CompositionStage::Orbits,
        CompositionStage::Belt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompositionStage::Backdrop => "Starfield and nebula",
            CompositionStage::Sun => "Sun",
            CompositionStage::Bodies => "Planets and layers",
            CompositionStage::Orbits => "Orbit guides",
            CompositionStage::Belt => "Asteroid belt",
        }
    }
}

/// A finished composition step and how many items it produced.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositionProgress {
    pub stage: CompositionStage,
    pub items: usize,
}

/// Output of [`compose`].
pub struct ComposedScene {
    pub state: SimulationState,
    pub handles: SceneHandles,
    /// Bodies shown in their minimal form.
    pub degraded: usize,
}

/// Plan every body's layers, isolating failures.
pub fn plan_catalog(catalog: &[CelestialBodyDescriptor]) -> Vec<Option<Vec<LayerSpec>>> {
    catalog
        .iter()
        .map(|body| match plan_layers(body) {
            Ok(plan) => Some(plan),
            Err(err) => {
                warn!("{err}; {} falls back to its minimal form", body.name);
                None
            }
        })
        .collect()
}

/// Build the full scene for `catalog`.
pub fn compose(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    config: &OrreryConfig,
    catalog: &'static [CelestialBodyDescriptor],
) -> Result<ComposedScene, CompositionError> {
    let plans = plan_catalog(catalog);
    let mut state = SimulationState::new(catalog, &plans, config.frame_step, config.seed);
    let mut rng = StdRng::seed_from_u64(config.seed.rotate_left(17));
    let mut handles = SceneHandles::default();

    let backdrop = background::spawn_backdrop(commands, assets, config, &mut rng)?;
    for root in &backdrop.roots {
        assets.ledger.track_root(*root);
    }
    handles.lights.extend(backdrop.lights);
    handles.star_count = backdrop.star_count;
    report(commands, CompositionStage::Backdrop, backdrop.star_count);

    let sun = sun::spawn_sun(commands, assets, &SUN, &state);
    handles.sun = Some(sun.root);
    handles.lights.push(sun.light);
    if let Some(flares) = sun.flares {
        handles.fields.push((FieldOwner::Flares, flares));
    }
    report(commands, CompositionStage::Sun, 1);

    let mut degraded = 0;
    for (index, body) in catalog.iter().enumerate() {
        let plan = plans.get(index).and_then(|p| p.as_deref());
        let spawned = bodies::spawn_body(commands, assets, index, body, plan, &state);
        if spawned.degraded {
            degraded += 1;
            // Moon slots after this body shift; later bodies are spawned
            // against the updated state.
            state.degrade(index);
        }
        handles.bodies.push(spawned.root);
        handles.moons.extend(spawned.layers.moons);
        handles.fields.extend(spawned.layers.fields);
    }
    report(commands, CompositionStage::Bodies, handles.bodies.len());

    handles.orbit_guides = orbits::spawn_orbit_guides(commands, assets, catalog);
    report(commands, CompositionStage::Orbits, handles.orbit_guides.len());

    let belt = belt::spawn_belt(commands, assets, &ASTEROID_BELT, &state)?;
    handles.belt = Some(belt.root);
    handles.asteroid_count = belt.count;
    report(commands, CompositionStage::Belt, belt.count);

    info!(
        "Scene composed: {} bodies ({} minimal), {} moons, {} asteroids, {} particle fields",
        handles.bodies.len(),
        degraded,
        handles.moons.len(),
        handles.asteroid_count,
        handles.fields.len()
    );

    Ok(ComposedScene {
        state,
        handles,
        degraded,
    })
}

fn report(commands: &mut Commands, stage: CompositionStage, items: usize) {
    debug!("Composed {}: {items}", stage.label());
    commands.write_message(CompositionProgress { stage, items });
}

/// Composition steps finished for the current mount.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct CompositionReport {
    pub finished: Vec<CompositionProgress>,
}

impl CompositionReport {
    pub fn is_done(&self, stage: CompositionStage) -> bool {
        self.finished.iter().any(|p| p.stage == stage)
    }

    pub fn is_complete(&self) -> bool {
        CompositionStage::ALL.iter().all(|stage| self.is_done(*stage))
    }

    pub fn clear(&mut self) {
        self.finished.clear();
    }
}

pub fn record_composition(mut progress: MessageReader<CompositionProgress>, mut report: ResMut<CompositionReport>) {
    report.finished.extend(progress.read().copied());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Feature, describe_bodies};

    static BROKEN: [CelestialBodyDescriptor; 1] = [CelestialBodyDescriptor {
        name: "Broken",
        radius: 3.0,
        distance: 70.0,
        speed: 1.0,
        rotation: 0.01,
        tilt: 0.0,
        color: crate::catalog::Hex(0x808080),
        emissive: crate::catalog::Hex::BLACK,
        roughness: 0.5,
        metalness: 0.0,
        route: None,
        description: None,
        texture: None,
        eccentricity: 0.0,
        wobble: 0.0,
        features: &[Feature::Atmosphere {
            color: crate::catalog::Hex(0xFFFFFF),
            opacity: 4.0,
        }],
    }];

    #[test]
    fn full_catalog_plans_cleanly() {
        let plans = plan_catalog(describe_bodies());
        assert!(plans.iter().all(Option::is_some));
    }

    #[test]
    fn report_completes_after_every_stage() {
        let mut report = CompositionReport::default();
        for stage in &CompositionStage::ALL[..4] {
            report.finished.push(CompositionProgress { stage: *stage, items: 1 });
        }
        assert!(report.is_done(CompositionStage::Sun));
        assert!(!report.is_complete());
        report.finished.push(CompositionProgress {
            stage: CompositionStage::Belt,
            items: 2000,
        });
        assert!(report.is_complete());
        report.clear();
        assert!(!report.is_done(CompositionStage::Backdrop));
    }

    #[test]
    fn invalid_layer_isolated_to_its_body() {
        let plans = plan_catalog(&BROKEN);
        assert_eq!(plans, vec![None]);
    }
}
