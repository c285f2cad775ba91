//! Copy simulation state into transforms and particle meshes.

use bevy::prelude::*;

use super::SceneHandles;
use super::belt::AsteroidSlot;
use super::bodies::{BodyMesh, BodyRoot};
use super::meshes::write_point_cloud;
use super::sun::{LensFlare, SunSurface, lens_flare_transform};
use crate::camera::CameraController;
use crate::effects::build::{CloudShell, MoonBody};
use crate::kinematics::{FieldOwner, SimulationState};

pub fn sync_body_positions(state: Res<SimulationState>, mut roots: Query<(&BodyRoot, &mut Transform)>) {
    for (root, mut transform) in roots.iter_mut() {
        if let Some(body) = state.body(root.index) {
            transform.translation = body.position;
        }
    }
}

pub fn sync_surface_spin(state: Res<SimulationState>, mut surfaces: Query<(&BodyMesh, &mut Transform)>) {
    for (surface, mut transform) in surfaces.iter_mut() {
        if let Some(body) = state.body(surface.index) {
            transform.rotation = Quat::from_rotation_y(body.spin);
        }
    }
}

pub fn sync_cloud_spin(state: Res<SimulationState>, mut clouds: Query<(&CloudShell, &mut Transform)>) {
    for (cloud, mut transform) in clouds.iter_mut() {
        if let Some(body) = state.body(cloud.body) {
            transform.rotation = Quat::from_rotation_y(body.cloud_spin);
        }
    }
}

pub fn sync_moons(state: Res<SimulationState>, mut moons: Query<(&MoonBody, &mut Transform)>) {
    for (moon, mut transform) in moons.iter_mut() {
        if let Some(m) = state.moons.get(moon.moon) {
            transform.translation = m.position;
            transform.rotation = Quat::from_rotation_y(m.spin);
        }
    }
}

pub fn sync_sun(state: Res<SimulationState>, mut surfaces: Query<&mut Transform, With<SunSurface>>) {
    for mut transform in surfaces.iter_mut() {
        transform.rotation = Quat::from_rotation_y(state.sun_spin);
    }
}

/// Keep the lens flare on the sun-to-camera line, facing the camera.
pub fn sync_lens_flare(controller: Res<CameraController>, mut flares: Query<(&LensFlare, &mut Transform)>) {
    let camera = controller.transform().translation;
    for (flare, mut transform) in flares.iter_mut() {
        *transform = lens_flare_transform(camera, flare.offset);
    }
}

pub fn sync_asteroids(state: Res<SimulationState>, mut solids: Query<(&AsteroidSlot, &mut Transform)>) {
    let Some(field) = state.field(FieldOwner::Belt) else {
        return;
    };
    let particles = field.particles();
    for (slot, mut transform) in solids.iter_mut() {
        if let Some(p) = particles.get(slot.0) {
            transform.translation = p.position;
            transform.rotation = p.rotation();
        }
    }
}

/// Rewrite every animated point cloud from its particle field.
pub fn sync_particle_meshes(state: Res<SimulationState>, handles: Res<SceneHandles>, mut meshes: ResMut<Assets<Mesh>>) {
    for (owner, handle) in &handles.fields {
        let Some(field) = state.field(*owner) else {
            continue;
        };
        if let Some(mut mesh) = meshes.get_mut(handle) {
            write_point_cloud(&mut mesh, field.positions(), field.colors());
        }
    }
}
