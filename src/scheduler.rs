//! Frame scheduler: mount, per-frame pipeline and teardown of the orrery.
//!
//! Mount runs on entering [`ViewState::Orrery`], teardown on leaving it.
//! While mounted, every frame runs the [`FrameSet`] chain in `Update`:
//! input, clock, kinematics, effects, camera, then sync, after which Bevy
//! renders. Teardown clears listeners, removes the simulation state (which
//! stops the chain before its next run) and releases everything in the
//! resource ledger.

use bevy::ecs::system::SystemParam;
use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera::{CameraController, Viewport, camera_bundle, sync_camera, update_camera};
use crate::config::OrreryConfig;
use crate::effects::{CompositionError, update_effect_time};
use crate::input::{
    InputListener, ListenerRegistry, PointerOverUi, click_to_pick, keyboard_shortcuts, listening, track_pointer,
    track_resize, wheel_zoom_camera,
};
use crate::kinematics::{SimulationState, advance_kinematics, tick_clock};
use crate::picking::{PickRequest, resolve_picks};
use crate::scene::background::twinkle_stars;
use crate::scene::sync::{
    sync_asteroids, sync_body_positions, sync_cloud_spin, sync_lens_flare, sync_moons, sync_particle_meshes,
    sync_sun, sync_surface_spin,
};
use crate::scene::{
    CompositionProgress, CompositionReport, ResourceLedger, SceneAssets, SceneHandles, compose, record_composition,
};
use crate::texture::{
    PendingTextures, SceneTextures, TextureResolver, apply_resolved_textures, poll_texture_tasks, request_textures,
};
use crate::types::{FrameSet, NavigationRequest, OrreryStatus, ResetScene, ViewState};

/// Why the view could not be mounted.
#[derive(thiserror::Error, Debug)]
pub enum MountError {
    #[error("no primary window to render into")]
    SurfaceUnavailable,

    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// Scene lifecycle without any rendering or UI plugins.
///
/// Requires `StatesPlugin`, `InputPlugin`, `WindowPlugin` and the asset
/// stores for meshes, standard materials, effect materials and images (all
/// provided by `DefaultPlugins` plus the effect material plugin).
pub struct OrreryCorePlugin;

impl Plugin for OrreryCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<ViewState>()
            .init_resource::<OrreryConfig>()
            .init_resource::<OrreryStatus>()
            .init_resource::<ResourceLedger>()
            .init_resource::<TextureResolver>()
            .init_resource::<PendingTextures>()
            .init_resource::<SceneTextures>()
            .init_resource::<Viewport>()
            .init_resource::<ListenerRegistry>()
            .init_resource::<PointerOverUi>()
            .init_resource::<CompositionReport>()
            .add_message::<NavigationRequest>()
            .add_message::<CompositionProgress>()
            .add_message::<ResetScene>()
            .add_message::<PickRequest>()
            .configure_sets(
                Update,
                (
                    FrameSet::Input,
                    FrameSet::Clock,
                    FrameSet::Kinematics,
                    FrameSet::Effects,
                    FrameSet::Camera,
                    FrameSet::Sync,
                )
                    .chain(),
            );

        for set in [
            FrameSet::Input,
            FrameSet::Clock,
            FrameSet::Kinematics,
            FrameSet::Effects,
            FrameSet::Camera,
            FrameSet::Sync,
        ] {
            app.configure_sets(Update, set.run_if(frame_running));
        }

        app.add_systems(OnEnter(ViewState::Orrery), mount_orrery)
            .add_systems(Update, record_composition.before(FrameSet::Input))
            .add_systems(OnExit(ViewState::Orrery), teardown_orrery)
            .add_systems(
                Update,
                rebuild_orrery
                    .run_if(on_message::<ResetScene>)
                    .run_if(in_state(ViewState::Orrery))
                    .after(FrameSet::Sync),
            )
            .add_systems(
                Update,
                (
                    track_pointer.run_if(listening(InputListener::PointerMove)),
                    track_resize.run_if(listening(InputListener::Resize)),
                    wheel_zoom_camera.run_if(listening(InputListener::Wheel)),
                    keyboard_shortcuts.run_if(listening(InputListener::Keyboard)),
                    click_to_pick.run_if(listening(InputListener::Click)),
                    resolve_picks,
                )
                    .chain()
                    .in_set(FrameSet::Input),
            )
            .add_systems(Update, tick_clock.in_set(FrameSet::Clock))
            .add_systems(Update, advance_kinematics.in_set(FrameSet::Kinematics))
            .add_systems(Update, (update_effect_time, twinkle_stars).in_set(FrameSet::Effects))
            .add_systems(Update, update_camera.in_set(FrameSet::Camera))
            .add_systems(
                Update,
                (
                    sync_body_positions,
                    sync_surface_spin,
                    sync_cloud_spin,
                    sync_moons,
                    sync_sun,
                    sync_lens_flare,
                    sync_asteroids,
                    sync_particle_meshes,
                    sync_camera,
                    (request_textures, poll_texture_tasks, apply_resolved_textures).chain(),
                )
                    .in_set(FrameSet::Sync),
            );
    }
}

/// Run condition for the frame pipeline: the view is shown and mounted.
pub fn frame_running(view: Option<Res<State<ViewState>>>, state: Option<Res<SimulationState>>) -> bool {
    state.is_some() && view.is_some_and(|v| *v.get() == ViewState::Orrery)
}

/// Everything mount and teardown touch.
#[derive(SystemParam)]
pub struct OrreryMount<'w, 's> {
    commands: Commands<'w, 's>,
    assets: SceneAssets<'w>,
    config: Res<'w, OrreryConfig>,
    windows: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    status: ResMut<'w, OrreryStatus>,
    listeners: ResMut<'w, ListenerRegistry>,
    scene_textures: ResMut<'w, SceneTextures>,
    viewport: ResMut<'w, Viewport>,
    report: ResMut<'w, CompositionReport>,
}

impl OrreryMount<'_, '_> {
    fn mount(&mut self) {
        match self.try_mount() {
            Ok((bodies, degraded)) => {
                self.listeners.register_all();
                *self.status = OrreryStatus::Running { bodies, degraded };
                info!("Orrery mounted ({bodies} bodies, {degraded} minimal)");
            }
            Err(err) => {
                error!("Orrery mount failed: {err}");
                self.assets.release(&mut self.commands);
                *self.status = OrreryStatus::Failed(err.to_string());
            }
        }
    }

    fn try_mount(&mut self) -> Result<(usize, usize), MountError> {
        let window = self.windows.single().map_err(|_| MountError::SurfaceUnavailable)?;
        *self.viewport = Viewport::new(window.width(), window.height());

        let composed = compose(&mut self.commands, &mut self.assets, &self.config, self.config.catalog)?;
        let controller = CameraController::new(self.config.camera.clone());
        let camera = self.commands.spawn(camera_bundle(&controller, &self.viewport)).id();
        self.assets.ledger.track_root(camera);

        let mut handles = composed.handles;
        handles.camera = Some(camera);
        let bodies = handles.bodies.len();

        self.commands.insert_resource(controller);
        self.commands.insert_resource(handles);
        self.commands.insert_resource(composed.state);
        Ok((bodies, composed.degraded))
    }

    /// Release everything the mount created. Safe on a partial or absent
    /// mount.
    fn teardown(&mut self) -> usize {
        self.listeners.clear();
        self.commands.remove_resource::<SimulationState>();
        self.commands.remove_resource::<CameraController>();
        self.commands.remove_resource::<SceneHandles>();
        self.commands.insert_resource(GlobalAmbientLight::default());
        let released = self.assets.release(&mut self.commands);
        self.scene_textures.clear();
        self.report.clear();
        *self.status = OrreryStatus::Idle;
        released
    }
}

fn mount_orrery(mut mount: OrreryMount) {
    mount.mount();
}

fn teardown_orrery(mut mount: OrreryMount) {
    let released = mount.teardown();
    info!("Orrery unmounted, released {released} resources");
}

fn rebuild_orrery(mut mount: OrreryMount) {
    let released = mount.teardown();
    debug!("Rebuilding scene after releasing {released} resources");
    mount.mount();
}
