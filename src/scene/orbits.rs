//! Faint static orbit guides.

use bevy::prelude::*;

use super::SceneAssets;
use super::meshes::{ORBIT_SEGMENTS, ellipse_points, line_loop};
use crate::catalog::CelestialBodyDescriptor;

const GUIDE_ALPHA: f32 = 0.1;

#[derive(Component, Debug, Clone, Copy)]
pub struct OrbitGuide {
    pub index: usize,
}

/// Semi-axes of the ellipse a body traces in the ecliptic.
pub fn guide_axes(body: &CelestialBodyDescriptor) -> (f32, f32) {
    (body.distance, body.distance * (1.0 - body.eccentricity))
}

/// One closed guide per body, tinted with the body's color.
pub fn spawn_orbit_guides(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    catalog: &'static [CelestialBodyDescriptor],
) -> Vec<Entity> {
    catalog
        .iter()
        .enumerate()
        .map(|(index, body)| {
            let (a, b) = guide_axes(body);
            let mesh = assets.mesh(line_loop(ellipse_points(a, b, ORBIT_SEGMENTS)));
            let material = assets.material(StandardMaterial {
                base_color: body.color.to_color_alpha(GUIDE_ALPHA),
                unlit: true,
                alpha_mode: AlphaMode::Blend,
                ..default()
            });
            let entity = commands
                .spawn((
                    Mesh3d(mesh),
                    MeshMaterial3d(material),
                    Transform::default(),
                    OrbitGuide { index },
                    Name::new(format!("{} orbit", body.name)),
                ))
                .id();
            assets.ledger.track_root(entity);
            entity
        })
        .collect()
}
