//! Orrery - real-time 3D solar system navigation view
//!
//! A Bevy library crate that composes a stylized solar system (sun, planets
//! with effect layers, moons, rings, a comet, an asteroid belt and a starry
//! backdrop), animates it with a fixed-step clock and turns clicks on
//! bodies into navigation requests for the host application's router.

pub mod camera;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod input;
pub mod kinematics;
pub mod particles;
pub mod picking;
pub mod scene;
pub mod scheduler;
pub mod texture;
pub mod types;
pub mod ui;

use bevy::prelude::*;

pub use catalog::{CelestialBodyDescriptor, describe_bodies};
pub use config::OrreryConfig;
pub use effects::EffectMaterial;
pub use scheduler::{MountError, OrreryCorePlugin};
pub use types::{NavigationRequest, OrreryStatus, ResetScene, ViewState};
pub use ui::OrreryUiPlugin;

/// Everything the orrery view needs on top of `DefaultPlugins` and
/// `EguiPlugin`.
pub struct OrreryPlugin;

impl Plugin for OrreryPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            MaterialPlugin::<EffectMaterial>::default(),
            OrreryCorePlugin,
            OrreryUiPlugin,
        ));
    }
}
