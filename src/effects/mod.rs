//! Effect layers: the optional visual shells, bands and particle fields that
//! decorate a body.
//!
//! Planning ([`plan_layers`]) is pure and validates the descriptor's feature
//! parameters. Building ([`build`]) turns a plan into entities and registers
//! every created resource in the scene ledger.

pub mod build;
pub mod material;
pub mod shading;

use crate::catalog::{CelestialBodyDescriptor, Feature, FeatureKind, Hex, MoonDescriptor};

pub use build::{BodyLayers, build_layers, update_effect_time};
pub use material::{EffectKind, EffectMaterial, EffectParams};

/// Atmosphere shell radius relative to the body.
pub const ATMOSPHERE_SCALE: f32 = 1.15;
/// Cloud shell radius relative to the body.
pub const CLOUD_SCALE: f32 = 1.02;
/// Night lights shell radius relative to the body.
pub const NIGHT_LIGHTS_SCALE: f32 = 1.01;
/// Storm shell radius relative to the body.
pub const STORM_SCALE: f32 = 1.001;
/// Height of each aurora band's center above the equator, relative to radius.
pub const AURORA_LATITUDE: f32 = 0.8;

/// Errors found while planning or building a body's layers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    #[error("{body}: invalid body geometry ({reason})")]
    InvalidBody { body: &'static str, reason: String },

    #[error("{body}: invalid {kind:?} layer ({reason})")]
    InvalidLayer {
        body: &'static str,
        kind: FeatureKind,
        reason: String,
    },

    #[error("{body}: {kind:?} layer listed more than once")]
    DuplicateLayer { body: &'static str, kind: FeatureKind },

    #[error("{body}: mesh construction failed ({reason})")]
    Mesh { body: &'static str, reason: String },
}

/// A validated, fully resolved layer ready to be built.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerSpec {
    Atmosphere {
        radius: f32,
        color: Hex,
        opacity: f32,
    },
    Clouds {
        radius: f32,
        opacity: f32,
        spin_ratio: f32,
        texture_key: String,
        location: Option<&'static str>,
    },
    Aurora {
        /// Band radius at the pole-facing edge.
        top_radius: f32,
        /// Band radius at the equator-facing edge.
        bottom_radius: f32,
        height: f32,
        /// Distance of each band's center from the equator plane.
        offset: f32,
        primary: Hex,
        secondary: Hex,
    },
    NightLights {
        radius: f32,
        color: Hex,
        intensity: f32,
    },
    Storm {
        radius: f32,
        center_uv: [f32; 2],
        inner: f32,
        outer: f32,
    },
    Rings {
        inner: f32,
        outer: f32,
        particles: usize,
        texture_key: String,
        location: Option<&'static str>,
    },
    Moons(&'static [MoonDescriptor]),
    Tail {
        length: f32,
        particles: usize,
    },
}

impl LayerSpec {
    pub fn kind(&self) -> FeatureKind {
        match self {
            LayerSpec::Atmosphere { .. } => FeatureKind::Atmosphere,
            LayerSpec::Clouds { .. } => FeatureKind::Clouds,
            LayerSpec::Aurora { .. } => FeatureKind::Aurora,
            LayerSpec::NightLights { .. } => FeatureKind::NightLights,
            LayerSpec::Storm { .. } => FeatureKind::Storm,
            LayerSpec::Rings { .. } => FeatureKind::Rings,
            LayerSpec::Moons(_) => FeatureKind::Moons,
            LayerSpec::Tail { .. } => FeatureKind::Tail,
        }
    }
}

/// Check a body's core geometry.
pub fn validate_body(body: &CelestialBodyDescriptor) -> Result<(), CompositionError> {
    let invalid = |reason: &str| CompositionError::InvalidBody {
        body: body.name,
        reason: reason.to_owned(),
    };
    if !(body.radius.is_finite() && body.radius > 0.0) {
        return Err(invalid("radius must be positive"));
    }
    if !(body.distance.is_finite() && body.distance > 0.0) {
        return Err(invalid("orbital distance must be positive"));
    }
    if !(0.0..1.0).contains(&body.eccentricity) {
        return Err(invalid("eccentricity must lie in [0, 1)"));
    }
    if !(body.wobble.is_finite() && body.wobble >= 0.0) {
        return Err(invalid("wobble must be non-negative"));
    }
    Ok(())
}

/// Validate every feature of `body` and resolve it into a [`LayerSpec`].
///
/// Layers come back in catalog order. Any invalid feature fails the whole
/// body so the composer can fall back to its minimal form.
pub fn plan_layers(body: &CelestialBodyDescriptor) -> Result<Vec<LayerSpec>, CompositionError> {
    validate_body(body)?;

    let mut seen = Vec::with_capacity(body.features.len());
    let mut layers = Vec::with_capacity(body.features.len());
    for feature in body.features {
        let kind = feature.kind();
        if seen.contains(&kind) {
            return Err(CompositionError::DuplicateLayer { body: body.name, kind });
        }
        seen.push(kind);
        layers.push(plan_feature(body, feature)?);
    }
    Ok(layers)
}

fn plan_feature(body: &CelestialBodyDescriptor, feature: &Feature) -> Result<LayerSpec, CompositionError> {
    let kind = feature.kind();
    let invalid = |reason: &str| CompositionError::InvalidLayer {
        body: body.name,
        kind,
        reason: reason.to_owned(),
    };
    let r = body.radius;

    let spec = match *feature {
        Feature::Atmosphere { color, opacity } => {
            unit_interval(opacity).ok_or_else(|| invalid("opacity outside [0, 1]"))?;
            LayerSpec::Atmosphere {
                radius: r * ATMOSPHERE_SCALE,
                color,
                opacity,
            }
        }
        Feature::Clouds {
            opacity,
            spin_ratio,
            texture,
        } => {
            unit_interval(opacity).ok_or_else(|| invalid("opacity outside [0, 1]"))?;
            if !spin_ratio.is_finite() {
                return Err(invalid("spin ratio must be finite"));
            }
            LayerSpec::Clouds {
                radius: r * CLOUD_SCALE,
                opacity,
                spin_ratio,
                texture_key: crate::catalog::data::layer_texture_key(body.name, "clouds"),
                location: texture,
            }
        }
        Feature::Aurora { primary, secondary } => LayerSpec::Aurora {
            top_radius: r * 0.8,
            bottom_radius: r * 1.1,
            height: r * 0.4,
            offset: r * AURORA_LATITUDE,
            primary,
            secondary,
        },
        Feature::NightLights { color, intensity } => {
            if !(intensity.is_finite() && intensity >= 0.0) {
                return Err(invalid("intensity must be non-negative"));
            }
            LayerSpec::NightLights {
                radius: r * NIGHT_LIGHTS_SCALE,
                color,
                intensity,
            }
        }
        Feature::Storm {
            center_uv,
            inner,
            outer,
        } => {
            if !center_uv.iter().all(|c| (0.0..=1.0).contains(c)) {
                return Err(invalid("center outside UV space"));
            }
            if !(0.0 <= inner && inner < outer && outer <= 0.5) {
                return Err(invalid("storm band must satisfy 0 <= inner < outer <= 0.5"));
            }
            LayerSpec::Storm {
                radius: r * STORM_SCALE,
                center_uv,
                inner,
                outer,
            }
        }
        Feature::Rings {
            inner,
            outer,
            particles,
            texture,
        } => {
            if !(inner > r && outer > inner) {
                return Err(invalid("rings must satisfy radius < inner < outer"));
            }
            LayerSpec::Rings {
                inner,
                outer,
                particles,
                texture_key: crate::catalog::data::layer_texture_key(body.name, "rings"),
                location: texture,
            }
        }
        Feature::Moons(moons) => {
            for moon in moons {
                if !(moon.radius > 0.0 && moon.distance > r + moon.radius) {
                    return Err(invalid(&format!("moon {} intersects its parent", moon.name)));
                }
            }
            LayerSpec::Moons(moons)
        }
        Feature::Tail { length, particles } => {
            if !(length.is_finite() && length > 0.0) {
                return Err(invalid("tail length must be positive"));
            }
            LayerSpec::Tail { length, particles }
        }
    };
    Ok(spec)
}

fn unit_interval(v: f32) -> Option<f32> {
    (0.0..=1.0).contains(&v).then_some(v)
}
