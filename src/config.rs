//! Runtime configuration for the orrery view.
//!
//! Insert a customized [`OrreryConfig`] before adding the plugin to override
//! the defaults.

use std::path::PathBuf;

use bevy::prelude::*;

use crate::camera::CameraSettings;
use crate::catalog::{CelestialBodyDescriptor, describe_bodies};
use crate::types::FRAME_STEP;

/// Top-level settings resource.
#[derive(Resource, Clone, Debug)]
pub struct OrreryConfig {
    /// Clock increment per frame.
    pub frame_step: f64,
    /// Seed for every procedural generator and particle recycler.
    pub seed: u64,
    /// Directory that texture locations in the catalog are relative to.
    pub texture_root: PathBuf,
    /// Whether to fetch external textures at all. When disabled every body
    /// renders its procedural fallback.
    pub load_textures: bool,
    /// Multiplier on starfield layer counts (1.0 = full density).
    pub star_density: f32,
    /// Camera rig settings.
    pub camera: CameraSettings,
    /// Bodies to compose, in presentation order.
    pub catalog: &'static [CelestialBodyDescriptor],
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            frame_step: FRAME_STEP,
            seed: 0x5EED_0F_7E57A,
            texture_root: PathBuf::from("assets/textures"),
            load_textures: true,
            star_density: 1.0,
            camera: CameraSettings::default(),
            catalog: describe_bodies(),
        }
    }
}

impl OrreryConfig {
    /// Number of stars to generate for a layer of nominal size `count`.
    pub fn scaled_star_count(&self, count: usize) -> usize {
        ((count as f32) * self.star_density.max(0.0)).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_density_scales_counts() {
        let config = OrreryConfig {
            star_density: 0.5,
            ..default()
        };
        assert_eq!(config.scaled_star_count(15_000), 7_500);
        assert_eq!(config.scaled_star_count(0), 0);
    }

    #[test]
    fn negative_density_yields_no_stars() {
        let config = OrreryConfig {
            star_density: -1.0,
            ..default()
        };
        assert_eq!(config.scaled_star_count(1000), 0);
    }
}
