//! Entity catalog: static description of every celestial body in the scene.
//!
//! The catalog is the single source of truth for both the scene composer and
//! the navigation list in the UI, so routes shown as buttons always match the
//! routes emitted by picking.

pub mod data;

use bevy::prelude::*;

pub use data::{ASTEROID_BELT, COMET_NAME, SUN, describe_bodies, find_body};

/// Packed `0xRRGGBB` color as used throughout the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hex(pub u32);

impl Hex {
    pub const BLACK: Hex = Hex(0x000000);

    /// Split into 8-bit channels.
    pub const fn channels(self) -> [u8; 3] {
        [
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        ]
    }

    /// Channels normalized to `0.0..=1.0`.
    pub fn to_rgb(self) -> [f32; 3] {
        let [r, g, b] = self.channels();
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }

    pub fn to_color(self) -> Color {
        let [r, g, b] = self.channels();
        Color::srgb_u8(r, g, b)
    }

    pub fn to_color_alpha(self, alpha: f32) -> Color {
        self.to_color().with_alpha(alpha)
    }

    pub fn to_linear(self) -> LinearRgba {
        self.to_color().to_linear()
    }
}

/// A moon orbiting a catalog body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoonDescriptor {
    pub name: &'static str,
    pub radius: f32,
    /// Orbit radius around the parent's current position.
    pub distance: f32,
    /// Angular speed in radians per clock unit.
    pub speed: f32,
}

/// Optional visual capability of a body.
///
/// Each variant carries only the parameters its layer needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Feature {
    /// Translucent shell with silhouette-weighted glow.
    Atmosphere { color: Hex, opacity: f32 },
    /// Independently textured shell spinning faster than the surface.
    Clouds {
        opacity: f32,
        spin_ratio: f32,
        texture: Option<&'static str>,
    },
    /// Emissive bands near both poles.
    Aurora { primary: Hex, secondary: Hex },
    /// Shell visible only on the hemisphere facing away from the sun.
    NightLights { color: Hex, intensity: f32 },
    /// Swirling emissive patch at a fixed surface location (UV space).
    Storm { center_uv: [f32; 2], inner: f32, outer: f32 },
    /// Flat annulus plus a loose ice particle field.
    Rings {
        inner: f32,
        outer: f32,
        particles: usize,
        texture: Option<&'static str>,
    },
    /// Satellites orbiting the body's current position.
    Moons(&'static [MoonDescriptor]),
    /// Particle tail streaming away from the sun.
    Tail { length: f32, particles: usize },
}

/// Discriminant of [`Feature`], used to key built layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKind {
    Atmosphere,
    Clouds,
    Aurora,
    NightLights,
    Storm,
    Rings,
    Moons,
    Tail,
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::Atmosphere { .. } => FeatureKind::Atmosphere,
            Feature::Clouds { .. } => FeatureKind::Clouds,
            Feature::Aurora { .. } => FeatureKind::Aurora,
            Feature::NightLights { .. } => FeatureKind::NightLights,
            Feature::Storm { .. } => FeatureKind::Storm,
            Feature::Rings { .. } => FeatureKind::Rings,
            Feature::Moons(_) => FeatureKind::Moons,
            Feature::Tail { .. } => FeatureKind::Tail,
        }
    }
}

/// Immutable description of one celestial body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CelestialBodyDescriptor {
    pub name: &'static str,
    /// Mean radius in scene units.
    pub radius: f32,
    /// Orbital distance (semi-major axis) from the origin.
    pub distance: f32,
    /// Angular speed in radians per clock unit.
    pub speed: f32,
    /// Self-rotation increment per frame, in radians.
    pub rotation: f32,
    /// Axial tilt in degrees.
    pub tilt: f32,
    pub color: Hex,
    pub emissive: Hex,
    pub roughness: f32,
    pub metalness: f32,
    /// Dashboard route opened when the body is picked.
    pub route: Option<&'static str>,
    /// Short subtitle for the navigation list.
    pub description: Option<&'static str>,
    /// External image location, relative to the texture root.
    pub texture: Option<&'static str>,
    /// 0 for circular orbits; the minor axis is `distance * (1 - e)`.
    pub eccentricity: f32,
    /// Amplitude of the decorative vertical oscillation.
    pub wobble: f32,
    pub features: &'static [Feature],
}

impl CelestialBodyDescriptor {
    pub fn has(&self, kind: FeatureKind) -> bool {
        self.features.iter().any(|f| f.kind() == kind)
    }

    pub fn feature(&self, kind: FeatureKind) -> Option<&Feature> {
        self.features.iter().find(|f| f.kind() == kind)
    }

    pub fn moons(&self) -> &'static [MoonDescriptor] {
        self.features
            .iter()
            .find_map(|f| match f {
                Feature::Moons(moons) => Some(*moons),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Orbital period in clock units.
    pub fn period(&self) -> f64 {
        std::f64::consts::TAU / self.speed as f64
    }

    pub fn tilt_radians(&self) -> f32 {
        self.tilt * crate::types::DEG_TO_RAD
    }
}

/// One nested glow shell around the sun.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoronaLayer {
    pub radius: f32,
    pub opacity: f32,
    /// Signed animation speed; alternating signs make shells counter-rotate.
    pub speed: f32,
}

/// The light source body at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunDescriptor {
    pub radius: f32,
    pub rotation: f32,
    pub light_color: Hex,
    /// Point light intensity in lumens.
    pub light_intensity: f32,
    pub light_range: f32,
    pub corona: &'static [CoronaLayer],
    pub flare_particles: usize,
    /// Flares beyond this distance from the center are recycled.
    pub flare_bound: f32,
    pub flare_color: Hex,
}

/// Band of small rocky solids orbiting the sun.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeltDescriptor {
    pub inner: f32,
    pub outer: f32,
    /// Total vertical spread around the ecliptic.
    pub thickness: f32,
    pub count: usize,
    /// Range of solid radii.
    pub size: (f32, f32),
    /// Range of orbit phase increments per frame.
    pub angular_speed: (f32, f32),
    /// Maximum absolute tumble per frame on each axis.
    pub tumble: f32,
    pub tint: Hex,
    pub roughness: f32,
    pub metalness: f32,
}
