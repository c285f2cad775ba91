//! Click picking against primary bodies and the navigation bridge.
//!
//! Only catalog bodies are hit-tested, as spheres of their descriptor
//! radius at their current position. Moons, particles and effect shells
//! never intercept a click.

use bevy::prelude::*;

use crate::camera::{CameraController, Viewport};
use crate::kinematics::SimulationState;
use crate::types::NavigationRequest;

/// A click at a window position, in logical pixels from the top-left.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct PickRequest {
    pub screen: Vec2,
}

/// Nearest body under a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Catalog index of the body.
    pub index: usize,
    /// Distance along the ray to the entry point.
    pub distance: f32,
}

/// Smallest positive ray parameter at which the ray meets the sphere.
pub fn ray_sphere_intersect(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let a = dir.dot(dir);
    let b = 2.0 * oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || a <= f32::EPSILON {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);
    if t1 > 0.0 {
        Some(t1)
    } else if t2 > 0.0 {
        Some(t2)
    } else {
        None
    }
}

/// Nearest primary body along `ray`. Ties keep the earlier catalog entry.
pub fn pick_body(ray: Ray3d, state: &SimulationState) -> Option<PickHit> {
    state
        .bodies
        .iter()
        .filter_map(|body| {
            let radius = state.descriptor(body.index)?.radius;
            let distance = ray_sphere_intersect(ray.origin, *ray.direction, body.position, radius)?;
            Some(PickHit {
                index: body.index,
                distance,
            })
        })
        .fold(None, |best: Option<PickHit>, hit| match best {
            Some(b) if b.distance <= hit.distance => Some(b),
            _ => Some(hit),
        })
}

/// Turn clicks into camera focus and navigation requests.
pub fn resolve_picks(
    mut requests: MessageReader<PickRequest>,
    state: Res<SimulationState>,
    viewport: Res<Viewport>,
    mut controller: ResMut<CameraController>,
    mut navigation: MessageWriter<NavigationRequest>,
) {
    for request in requests.read() {
        let ray = controller.ray_from_screen(request.screen, &viewport);
        let Some(hit) = pick_body(ray, &state) else {
            continue;
        };
        let Some(body) = state.descriptor(hit.index) else {
            continue;
        };
        debug!("Picked {} at distance {:.1}", body.name, hit.distance);
        controller.focus(hit.index, body.radius);
        if let Some(route) = body.route {
            navigation.write(NavigationRequest { route });
        }
    }
}
