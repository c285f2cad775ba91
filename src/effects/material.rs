//! Shader material shared by all procedural effect layers.

use bevy::pbr::Material;
use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderType};
use bevy::shader::ShaderRef;

use crate::catalog::Hex;

pub const EFFECT_SHADER_PATH: &str = "shaders/effect_layer.wgsl";

/// Which shading branch the fragment shader takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Atmosphere,
    Aurora,
    NightLights,
    Storm,
    SunCore,
    Corona,
    Nebula,
}

impl EffectKind {
    /// Branch selector as read by the shader.
    pub fn code(self) -> f32 {
        match self {
            EffectKind::Atmosphere => 0.0,
            EffectKind::Aurora => 1.0,
            EffectKind::NightLights => 2.0,
            EffectKind::Storm => 3.0,
            EffectKind::SunCore => 4.0,
            EffectKind::Corona => 5.0,
            EffectKind::Nebula => 6.0,
        }
    }

    /// Whether the effect depends on the direction toward the sun.
    pub fn is_sun_relative(self) -> bool {
        matches!(self, EffectKind::NightLights)
    }
}

/// Uniform block; every field is a `vec4` so the layout needs no padding.
#[derive(ShaderType, Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectParams {
    pub primary: Vec4,
    pub secondary: Vec4,
    pub tertiary: Vec4,
    /// xyz: unit direction toward the sun in world space.
    pub sun_direction: Vec4,
    /// x: time, y: opacity or intensity, z: animation speed, w: kind code.
    pub settings: Vec4,
    /// xy: storm center in UV space, z: inner radius, w: outer radius.
    pub region: Vec4,
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct EffectMaterial {
    #[uniform(0)]
    pub params: EffectParams,
    pub kind: EffectKind,
    pub alpha_mode: AlphaMode,
}

impl EffectMaterial {
    pub fn new(kind: EffectKind, opacity: f32) -> Self {
        Self {
            params: EffectParams {
                settings: Vec4::new(0.0, opacity, 1.0, kind.code()),
                ..default()
            },
            kind,
            alpha_mode: match kind {
                EffectKind::SunCore | EffectKind::Nebula => AlphaMode::Opaque,
                _ => AlphaMode::Add,
            },
        }
    }

    pub fn with_colors(mut self, primary: Hex, secondary: Hex) -> Self {
        self.params.primary = primary.to_linear().to_vec4();
        self.params.secondary = secondary.to_linear().to_vec4();
        self
    }

    pub fn with_tertiary(mut self, color: Hex) -> Self {
        self.params.tertiary = color.to_linear().to_vec4();
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.params.settings.z = speed;
        self
    }

    pub fn with_region(mut self, center_uv: [f32; 2], inner: f32, outer: f32) -> Self {
        self.params.region = Vec4::new(center_uv[0], center_uv[1], inner, outer);
        self
    }

    pub fn time(&self) -> f32 {
        self.params.settings.x
    }

    pub fn set_time(&mut self, time: f32) {
        self.params.settings.x = time;
    }

    pub fn opacity(&self) -> f32 {
        self.params.settings.y
    }

    pub fn set_sun_direction(&mut self, direction: Vec3) {
        self.params.sun_direction = direction.normalize_or_zero().extend(0.0);
    }
}

impl Material for EffectMaterial {
    fn fragment_shader() -> ShaderRef {
        EFFECT_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }
}
