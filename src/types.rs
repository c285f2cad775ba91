//! Core shared types: simulation clock, view state and frame ordering sets.

use bevy::prelude::*;

/// Clock increment applied once per frame.
///
/// Fixed rather than wall-clock so orbits are reproducible regardless of
/// frame-rate fluctuations.
pub const FRAME_STEP: f64 = 0.001;

/// Multiplier from simulation clock to the time value fed to effect layers.
pub const TIME_UNIFORM_SCALE: f32 = 5.0;

/// Degrees to radians conversion factor.
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Monotonically increasing simulation time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationClock {
    /// Elapsed simulation time in clock units.
    pub elapsed: f64,
    /// Number of frames advanced since the clock was created.
    pub frames: u64,
    /// Increment applied per frame.
    pub step: f64,
}

impl SimulationClock {
    /// Create a clock at zero with the given per-frame increment.
    pub fn new(step: f64) -> Self {
        Self {
            elapsed: 0.0,
            frames: 0,
            step,
        }
    }

    /// Advance by exactly one frame.
    ///
    /// Elapsed time is recomputed from the frame counter instead of summed,
    /// so long sessions don't accumulate rounding drift.
    pub fn tick(&mut self) {
        self.frames += 1;
        self.elapsed = self.frames as f64 * self.step;
    }

    /// Advance by `frames` frames.
    pub fn advance_frames(&mut self, frames: u64) {
        self.frames += frames;
        self.elapsed = self.frames as f64 * self.step;
    }

    /// Elapsed time as f32 for rendering math.
    pub fn seconds(&self) -> f32 {
        self.elapsed as f32
    }

    /// Time value pushed into effect layer uniforms.
    pub fn effect_time(&self) -> f32 {
        self.seconds() * TIME_UNIFORM_SCALE
    }
}

/// Which view the host application currently shows.
///
/// The orrery scene is mounted while in [`ViewState::Orrery`] and torn down
/// on exit.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewState {
    #[default]
    Orrery,
    /// A dashboard module owned by the external router.
    Module,
}

/// Ordered stages of one frame.
///
/// Configured as a chain, so every frame consumes input, advances the clock,
/// runs kinematics, pushes effect time, updates the camera and finally syncs
/// render transforms before Bevy renders.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Pointer, wheel, click and resize handlers.
    Input,
    /// Simulation clock advance.
    Clock,
    /// Orbital motion, spin and particle recycling.
    Kinematics,
    /// Time-varying effect layer parameters.
    Effects,
    /// Camera controller update.
    Camera,
    /// Copy simulation state into transforms and particle meshes.
    Sync,
}

/// Mount lifecycle status of the orrery view, read by the UI.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub enum OrreryStatus {
    /// Nothing mounted.
    #[default]
    Idle,
    /// Scene composed and the frame pipeline is running.
    Running {
        /// Number of primary bodies composed.
        bodies: usize,
        /// Number of bodies that fell back to their minimal form.
        degraded: usize,
    },
    /// Mount failed; the view must show an error instead of a frozen frame.
    Failed(String),
}

impl OrreryStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, OrreryStatus::Running { .. })
    }
}

/// Request to leave the orrery for a dashboard module.
///
/// Consumed by the external router.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub route: &'static str,
}

/// Request to tear down and rebuild the whole scene.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ResetScene;
