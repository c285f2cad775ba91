//! Camera controller for the orrery.
//!
//! The rig is a small state machine (free drift, focused on a body, resetting
//! to the overview) advanced once per frame with fixed smoothing factors.
//! The same rig provides the screen-space math used by picking, so a click
//! is always interpreted against exactly what is on screen.

use bevy::camera::CameraProjection;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;

use crate::types::SimulationClock;

/// Camera rig tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Closest allowed viewing distance.
    pub min_distance: f32,
    /// Farthest allowed viewing distance.
    pub max_distance: f32,
    /// Overview distance used at start and after reset.
    pub default_distance: f32,
    /// Fraction of the remaining offset covered per frame.
    pub smoothing: f32,
    /// Fraction of the remaining zoom covered per frame.
    pub zoom_smoothing: f32,
    /// Distance change per wheel notch or zoom button press.
    pub zoom_step: f32,
    /// Overview height above the ecliptic.
    pub height: f32,
    /// Horizontal and vertical travel for a pointer at the window edge.
    pub pointer_travel: f32,
    /// Amplitude of the slow depth sway in free mode.
    pub sway: f32,
    /// Focus distance as a multiple of the body radius.
    pub focus_radius_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.1,
            far: 20_000.0,
            min_distance: 15.0,
            max_distance: 800.0,
            default_distance: 300.0,
            smoothing: 0.02,
            zoom_smoothing: 0.1,
            zoom_step: 20.0,
            height: 100.0,
            pointer_travel: 100.0,
            sway: 50.0,
            focus_radius_factor: 6.0,
        }
    }
}

impl CameraSettings {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }

    /// Overview camera position for a given viewing distance.
    pub fn overview_position(&self, distance: f32) -> Vec3 {
        Vec3::new(0.0, self.height, distance)
    }
}

/// Marker for the orrery's 3D camera.
#[derive(Component)]
pub struct OrreryCamera;

/// Window size in logical pixels.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Pixel position to normalized device coordinates (y up).
    pub fn to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * screen.x / self.width.max(1.0) - 1.0,
            1.0 - 2.0 * screen.y / self.height.max(1.0),
        )
    }

    pub fn from_ndc(&self, ndc: Vec2) -> Vec2 {
        Vec2::new((ndc.x + 1.0) * 0.5 * self.width, (1.0 - ndc.y) * 0.5 * self.height)
    }
}

/// What the camera is currently doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Drift with the pointer around the overview, looking at the sun.
    #[default]
    Free,
    /// Follow the body with this catalog index.
    Focused(usize),
    /// Ease back to the overview, then switch to `Free`.
    Reset,
}

/// Body the camera should follow this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusTarget {
    pub position: Vec3,
    pub radius: f32,
}

/// Distance under which a reset counts as arrived.
const RESET_ARRIVAL: f32 = 1.0;

/// Camera rig state. Inserted on mount, removed on teardown.
#[derive(Resource, Clone, Debug)]
pub struct CameraController {
    pub position: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// Current viewing distance.
    pub distance: f32,
    /// Viewing distance the rig is easing toward.
    pub target_distance: f32,
    pub mode: CameraMode,
    /// Last pointer position in normalized device coordinates.
    pub pointer: Vec2,
    pub settings: CameraSettings,
}

impl CameraController {
    pub fn new(settings: CameraSettings) -> Self {
        let distance = settings.clamp_distance(settings.default_distance);
        Self {
            position: settings.overview_position(distance),
            look_at: Vec3::ZERO,
            distance,
            target_distance: distance,
            mode: CameraMode::Free,
            pointer: Vec2::ZERO,
            settings,
        }
    }

    /// Change the target viewing distance, clamped to the allowed range.
    pub fn zoom_by(&mut self, delta: f32) {
        self.target_distance = self.settings.clamp_distance(self.target_distance + delta);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(-self.settings.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(self.settings.zoom_step);
    }

    /// Start following a body.
    pub fn focus(&mut self, index: usize, radius: f32) {
        self.mode = CameraMode::Focused(index);
        self.target_distance = self.settings.clamp_distance(radius * self.settings.focus_radius_factor);
    }

    /// Ease back to the overview framing.
    pub fn reset(&mut self) {
        self.mode = CameraMode::Reset;
        self.target_distance = self.settings.clamp_distance(self.settings.default_distance);
    }

    pub fn focused(&self) -> Option<usize> {
        match self.mode {
            CameraMode::Focused(index) => Some(index),
            _ => None,
        }
    }

    /// Advance the rig by one frame.
    ///
    /// `focus` carries the focused body's current position and radius; when
    /// focused but the body is gone, the rig resets instead.
    pub fn update(&mut self, clock: &SimulationClock, focus: Option<FocusTarget>) {
        let s = self.settings.smoothing;
        self.distance += (self.target_distance - self.distance) * self.settings.zoom_smoothing;

        match self.mode {
            CameraMode::Free => {
                let target_x = self.pointer.x * self.settings.pointer_travel;
                let target_y = self.pointer.y * self.settings.pointer_travel + self.settings.height;
                self.position.x += (target_x - self.position.x) * s;
                self.position.y += (target_y - self.position.y) * s;
                let target_z = self.distance + (clock.seconds() * 0.5).sin() * self.settings.sway;
                self.position.z += (target_z - self.position.z) * s;
                self.look_at += (Vec3::ZERO - self.look_at) * s;
            }
            CameraMode::Focused(_) => {
                let Some(target) = focus else {
                    self.reset();
                    return;
                };
                let offset = Vec3::new(0.0, 0.35, 1.0).normalize() * self.distance.max(target.radius * 1.5);
                let desired = target.position + offset;
                // Follow faster than free drift so orbiting bodies don't outrun the camera.
                let follow = (s * 4.0).min(1.0);
                self.position += (desired - self.position) * follow;
                self.look_at += (target.position - self.look_at) * follow;
            }
            CameraMode::Reset => {
                let desired = self.settings.overview_position(self.distance);
                self.position += (desired - self.position) * (s * 4.0).min(1.0);
                self.look_at += (Vec3::ZERO - self.look_at) * (s * 4.0).min(1.0);
                if self.position.distance(desired) < RESET_ARRIVAL && self.look_at.length() < RESET_ARRIVAL {
                    self.mode = CameraMode::Free;
                }
            }
        }
    }

    /// Camera transform matching the current rig state.
    pub fn transform(&self) -> Transform {
        let look_at = if self.look_at.distance_squared(self.position) > f32::EPSILON {
            self.look_at
        } else {
            self.position + Vec3::NEG_Z
        };
        Transform::from_translation(self.position).looking_at(look_at, Vec3::Y)
    }

    /// Clip-space transform of the rendered camera.
    pub fn clip_from_world(&self, viewport: &Viewport) -> Mat4 {
        let transform = self.transform();
        let world_from_view = Mat4::from_rotation_translation(transform.rotation, transform.translation);
        self.perspective(viewport).get_clip_from_view() * world_from_view.inverse()
    }

    /// World-space ray through a pixel, starting on the near plane.
    pub fn ray_from_screen(&self, screen: Vec2, viewport: &Viewport) -> Ray3d {
        let ndc = viewport.to_ndc(screen);
        let world_from_clip = self.clip_from_world(viewport).inverse();
        // Reverse-z: 1 is the near plane, 0 is infinitely far.
        let near = world_from_clip.project_point3(ndc.extend(1.0));
        let far = world_from_clip.project_point3(ndc.extend(f32::EPSILON));
        Ray3d {
            origin: near,
            direction: Dir3::new(far - near).unwrap_or(Dir3::NEG_Z),
        }
    }

    /// Pixel position of a world point, or `None` if it is behind the camera.
    pub fn project_to_screen(&self, world: Vec3, viewport: &Viewport) -> Option<Vec2> {
        let clip = self.clip_from_world(viewport) * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(viewport.from_ndc(clip.truncate().truncate() / clip.w))
    }

    pub fn perspective(&self, viewport: &Viewport) -> PerspectiveProjection {
        PerspectiveProjection {
            fov: self.settings.fov_radians(),
            near: self.settings.near,
            far: self.settings.far,
            aspect_ratio: viewport.aspect(),
            ..default()
        }
    }

    pub fn projection(&self, viewport: &Viewport) -> Projection {
        Projection::Perspective(self.perspective(viewport))
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

/// Components for the orrery camera entity.
pub fn camera_bundle(controller: &CameraController, viewport: &Viewport) -> impl Bundle {
    (
        Camera3d::default(),
        controller.projection(viewport),
        controller.transform(),
        Tonemapping::AcesFitted,
        DistanceFog {
            color: Color::srgb_u8(0x00, 0x00, 0x11),
            falloff: FogFalloff::ExponentialSquared { density: 0.0002 },
            ..default()
        },
        OrreryCamera,
        Name::new("Orrery Camera"),
    )
}

/// Advance the rig, following the focused body's current position.
pub fn update_camera(
    mut controller: ResMut<CameraController>,
    state: Res<crate::kinematics::SimulationState>,
) {
    let focus = controller.focused().and_then(|index| {
        let body = state.body(index)?;
        let descriptor = state.descriptor(index)?;
        Some(FocusTarget {
            position: body.position,
            radius: descriptor.radius,
        })
    });
    controller.update(&state.clock, focus);
}

/// Copy the rig into the camera entity.
pub fn sync_camera(
    controller: Res<CameraController>,
    viewport: Res<Viewport>,
    mut camera: Query<(&mut Transform, &mut Projection), With<OrreryCamera>>,
) {
    let Ok((mut transform, mut projection)) = camera.single_mut() else {
        return;
    };
    *transform = controller.transform();
    if let Projection::Perspective(ref mut perspective) = *projection {
        perspective.aspect_ratio = viewport.aspect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clock_at(frames: u64) -> SimulationClock {
        let mut clock = SimulationClock::new(crate::types::FRAME_STEP);
        clock.advance_frames(frames);
        clock
    }

    #[test]
    fn zoom_is_clamped() {
        let mut rig = CameraController::default();
        for _ in 0..100 {
            rig.zoom_in();
        }
        assert_eq!(rig.target_distance, 15.0);
        for _ in 0..100 {
            rig.zoom_out();
        }
        assert_eq!(rig.target_distance, 800.0);
    }

    #[test]
    fn free_mode_eases_toward_pointer() {
        let mut rig = CameraController::default();
        rig.pointer = Vec2::new(1.0, 0.0);
        rig.update(&clock_at(0), None);
        assert_relative_eq!(rig.position.x, 100.0 * 0.02, epsilon = 1e-5);
        for _ in 0..2000 {
            rig.update(&clock_at(0), None);
        }
        assert_relative_eq!(rig.position.x, 100.0, epsilon = 0.01);
        assert_relative_eq!(rig.position.y, 100.0, epsilon = 0.01);
    }

    #[test]
    fn free_mode_sways_in_depth() {
        let mut rig = CameraController::default();
        let t = std::f64::consts::PI; // sin(t * 0.5) == 1
        let mut clock = SimulationClock::new(t);
        clock.tick();
        rig.update(&clock, None);
        assert_relative_eq!(rig.position.z, 300.0 + 50.0 * 0.02, epsilon = 1e-3);
        for _ in 0..2000 {
            rig.update(&clock, None);
        }
        assert_relative_eq!(rig.position.z, 350.0, epsilon = 1e-2);
    }

    #[test]
    fn reset_hands_over_to_free_without_a_jump() {
        let mut rig = CameraController::default();
        rig.position = Vec3::new(150.0, 20.0, 60.0);
        rig.look_at = Vec3::new(150.0, 0.0, 0.0);
        rig.reset();

        // Sway at its peak when the rig arrives.
        let mut clock = SimulationClock::new(std::f64::consts::PI);
        clock.tick();
        let bound = rig.settings.sway * rig.settings.smoothing + 0.5;
        let mut free_frames = 0;
        for _ in 0..2000 {
            let before = rig.position;
            rig.update(&clock, None);
            let step = rig.position.distance(before);
            if rig.mode == CameraMode::Free {
                assert!(step < bound, "free frame {free_frames} moved {step}");
                free_frames += 1;
                if free_frames > 50 {
                    break;
                }
            }
        }
        assert!(free_frames > 50);
    }

    #[test]
    fn focus_follows_body_and_sets_distance() {
        let mut rig = CameraController::default();
        rig.focus(2, 6.3);
        assert_relative_eq!(rig.target_distance, 37.8, epsilon = 1e-4);
        let target = FocusTarget {
            position: Vec3::new(85.0, 0.0, 0.0),
            radius: 6.3,
        };
        for _ in 0..1000 {
            rig.update(&clock_at(0), Some(target));
        }
        assert!(rig.look_at.distance(target.position) < 0.01);
        assert_relative_eq!(rig.position.distance(target.position), 37.8, epsilon = 0.05);
    }

    #[test]
    fn focus_on_missing_body_resets() {
        let mut rig = CameraController::default();
        rig.focus(5, 29.0);
        rig.update(&clock_at(0), None);
        assert_eq!(rig.mode, CameraMode::Reset);
    }

    #[test]
    fn reset_returns_to_free_at_overview() {
        let mut rig = CameraController::default();
        rig.position = Vec3::new(200.0, -50.0, 40.0);
        rig.look_at = Vec3::new(200.0, 0.0, 0.0);
        rig.reset();
        for _ in 0..2000 {
            rig.update(&clock_at(0), None);
            if rig.mode == CameraMode::Free {
                break;
            }
        }
        assert_eq!(rig.mode, CameraMode::Free);
    }

    #[test]
    fn projection_and_ray_agree() {
        let rig = CameraController::default();
        let viewport = Viewport::new(1600.0, 900.0);
        let world = Vec3::new(85.0, 0.0, 0.0);
        let screen = rig.project_to_screen(world, &viewport).expect("in front");
        let ray = rig.ray_from_screen(screen, &viewport);
        let t = (world - ray.origin).dot(*ray.direction);
        let closest = ray.origin + *ray.direction * t;
        assert!(closest.distance(world) < 1e-2, "{closest} vs {world}");
    }

    #[test]
    fn center_pixel_looks_at_target() {
        let rig = CameraController::default();
        let viewport = Viewport::default();
        let ray = rig.ray_from_screen(Vec2::new(640.0, 360.0), &viewport);
        let expected = (Vec3::ZERO - rig.position).normalize();
        assert!(ray.direction.dot(expected) > 0.9999);
    }

    #[test]
    fn projection_matches_the_render_projection() {
        let rig = CameraController::default();
        let viewport = Viewport::new(1280.0, 720.0);
        let world = Vec3::new(-40.0, 10.0, 25.0);
        let transform = rig.transform();
        let view = Mat4::from_rotation_translation(transform.rotation, transform.translation).inverse();
        let clip = rig.perspective(&viewport).get_clip_from_view() * view * world.extend(1.0);
        let expected = viewport.from_ndc(clip.truncate().truncate() / clip.w);
        let screen = rig.project_to_screen(world, &viewport).expect("in front");
        assert!(screen.distance(expected) < 1e-3);
        // Off-center points land on the matching side of the screen.
        assert!(screen.x < viewport.width * 0.5);
    }

    #[test]
    fn points_behind_camera_do_not_project() {
        let rig = CameraController::default();
        assert!(rig.project_to_screen(Vec3::new(0.0, 100.0, 1000.0), &Viewport::default()).is_none());
    }
}
