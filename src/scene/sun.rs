//! The sun: shader core, corona shells, flare particles, the lens flare
//! billboard and the shadow casting point light.

use bevy::asset::RenderAssetUsages;
use bevy::light::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use super::SceneAssets;
use crate::catalog::{Hex, SunDescriptor};
use crate::effects::build::{EffectLayer, spawn_point_field};
use crate::effects::{EffectKind, EffectMaterial};
use crate::kinematics::{FieldOwner, SimulationState};

const CORE_COLORS: (Hex, Hex) = (Hex(0xFFFF66), Hex(0xFF6600));
const CORONA_COLOR: Hex = Hex(0xFFAA33);
const FLARE_COLOR: Hex = Hex(0xFFDD99);
const FLARE_TEXELS: u32 = 64;
/// Billboard edge relative to the sun radius.
const FLARE_SCALE: f32 = 7.0;

/// Rotating sun surface.
#[derive(Component, Debug, Clone, Copy)]
pub struct SunSurface;

/// Additive glow quad kept between the sun and the camera.
#[derive(Component, Debug, Clone, Copy)]
pub struct LensFlare {
    /// Distance from the sun center, just outside the outermost corona.
    pub offset: f32,
}

#[derive(Debug)]
pub struct SunParts {
    pub root: Entity,
    pub light: Entity,
    pub lens_flare: Entity,
    pub flares: Option<Handle<Mesh>>,
}

pub fn spawn_sun(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    sun: &SunDescriptor,
    state: &SimulationState,
) -> SunParts {
    let root = commands
        .spawn((Transform::default(), Visibility::default(), Name::new("Sun")))
        .id();

    let core_mesh = assets.mesh(Sphere::new(sun.radius).mesh().uv(64, 32));
    let core = assets.effect(EffectMaterial::new(EffectKind::SunCore, 1.0).with_colors(CORE_COLORS.0, CORE_COLORS.1));
    commands.spawn((
        Mesh3d(core_mesh),
        MeshMaterial3d(core),
        Transform::default(),
        SunSurface,
        NotShadowCaster,
        EffectLayer {
            body: None,
            kind: EffectKind::SunCore,
        },
        ChildOf(root),
    ));

    for layer in sun.corona {
        let mesh = assets.mesh(Sphere::new(layer.radius).mesh().uv(48, 24));
        let material = assets.effect(
            EffectMaterial::new(EffectKind::Corona, layer.opacity)
                .with_colors(CORONA_COLOR, CORONA_COLOR)
                .with_speed(layer.speed),
        );
        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::default(),
            NotShadowCaster,
            EffectLayer {
                body: None,
                kind: EffectKind::Corona,
            },
            ChildOf(root),
        ));
    }

    let flares = state
        .field(FieldOwner::Flares)
        .map(|field| spawn_point_field(commands, assets, field, root, AlphaMode::Add).1);

    let light = commands
        .spawn((
            PointLight {
                color: sun.light_color.to_color(),
                intensity: sun.light_intensity,
                range: sun.light_range,
                shadows_enabled: true,
                ..default()
            },
            Transform::default(),
            ChildOf(root),
        ))
        .id();

    let lens_flare = spawn_lens_flare(commands, assets, sun, root);

    assets.ledger.track_root(root);
    SunParts {
        root,
        light,
        lens_flare,
        flares,
    }
}

fn spawn_lens_flare(commands: &mut Commands, assets: &mut SceneAssets, sun: &SunDescriptor, root: Entity) -> Entity {
    let edge = sun.radius * FLARE_SCALE;
    let offset = sun.corona.iter().map(|layer| layer.radius).fold(sun.radius, f32::max) + 1.0;
    let mesh = assets.mesh(Rectangle::new(edge, edge));
    let glow = assets.image(glow_image(FLARE_TEXELS));
    let material = assets.material(StandardMaterial {
        base_color: FLARE_COLOR.to_color(),
        base_color_texture: Some(glow),
        unlit: true,
        alpha_mode: AlphaMode::Add,
        ..default()
    });
    commands
        .spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_xyz(0.0, 0.0, offset),
            LensFlare { offset },
            NotShadowCaster,
            Name::new("Lens flare"),
            ChildOf(root),
        ))
        .id()
}

/// Radial falloff, bright at the center and clear at the edge.
pub fn glow_image(size: u32) -> Image {
    let half = size as f32 / 2.0;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 + 0.5 - half) / half;
            let dy = (y as f32 + 0.5 - half) / half;
            let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0).powi(2);
            let value = (falloff * 255.0).round() as u8;
            rgba.extend_from_slice(&[value, value, value, value]);
        }
    }
    Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        rgba,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Place the flare on the sun-to-camera line, facing the camera.
pub fn lens_flare_transform(camera: Vec3, offset: f32) -> Transform {
    let toward = camera.normalize_or(Vec3::Z);
    Transform::from_translation(toward * offset).with_rotation(Quat::from_rotation_arc(Vec3::Z, toward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flare_faces_the_camera_from_in_front_of_the_corona() {
        let camera = Vec3::new(300.0, 120.0, -400.0);
        let flare = lens_flare_transform(camera, 56.0);
        assert_relative_eq!(flare.translation.length(), 56.0, epsilon = 1e-3);
        assert!(flare.translation.dot(camera) > 0.0);
        let normal = flare.rotation * Vec3::Z;
        assert_relative_eq!(normal.dot(camera.normalize()), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn flare_at_the_sun_center_stays_defined() {
        let flare = lens_flare_transform(Vec3::ZERO, 10.0);
        assert!(flare.translation.is_finite());
        assert!(flare.rotation.is_finite());
    }

    #[test]
    fn glow_fades_to_the_edge() {
        let image = glow_image(16);
        let data = image.data.as_deref().unwrap_or_default();
        let texel = |x: usize, y: usize| data[(y * 16 + x) * 4 + 3];
        assert!(texel(8, 8) > 200);
        assert_eq!(texel(0, 0), 0);
        assert!(texel(8, 8) > texel(12, 8));
    }
}
