//! Headless Bevy integration tests for the mount lifecycle.
//!
//! These run the full core plugin without a GPU or renderer.

mod common;

use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use common::{headless_app_with, mounted_app, run_frames, test_config};
use orrery::camera::CameraController;
use orrery::effects::EffectMaterial;
use orrery::input::ListenerRegistry;
use orrery::kinematics::SimulationState;
use orrery::scene::sun::LensFlare;
use orrery::scene::{CompositionReport, CompositionStage, ResourceLedger, SceneHandles};
use orrery::texture::{DisabledTextureSource, TextureError, TextureResolver, TextureSource, TextureTarget};
use orrery::{CelestialBodyDescriptor, OrreryStatus, ViewState, describe_bodies};

fn leave_orrery(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<ViewState>>()
        .set(ViewState::Module);
    app.update();
}

fn enter_orrery(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<ViewState>>()
        .set(ViewState::Orrery);
    app.update();
}

#[test]
fn mount_composes_the_whole_system() {
    let app = mounted_app();

    let status = app.world().resource::<OrreryStatus>();
    assert_eq!(
        *status,
        OrreryStatus::Running {
            bodies: describe_bodies().len(),
            degraded: 0
        }
    );

    let handles = app.world().resource::<SceneHandles>();
    assert_eq!(handles.bodies.len(), describe_bodies().len());
    assert!(handles.camera.is_some());
    assert!(handles.sun.is_some());
    assert!(handles.asteroid_count > 0);
    assert_eq!(app.world().resource::<ListenerRegistry>().len(), 5);
}

#[test]
fn repeated_mounts_leave_nothing_behind() {
    let mut app = mounted_app();
    let meshes_after_first = app.world().resource::<Assets<Mesh>>().len();
    assert!(meshes_after_first > 0);

    for _ in 0..3 {
        run_frames(&mut app, 5);
        leave_orrery(&mut app);

        assert!(app.world().resource::<ResourceLedger>().is_empty());
        assert!(app.world().resource::<ListenerRegistry>().is_empty());
        assert!(!app.world().contains_resource::<SimulationState>());
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<StandardMaterial>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<EffectMaterial>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<Image>>().len(), 0);
        assert!(app.world().resource::<CompositionReport>().finished.is_empty());
        assert_eq!(
            app.world().resource::<GlobalAmbientLight>().brightness,
            GlobalAmbientLight::default().brightness
        );
        assert_eq!(*app.world().resource::<OrreryStatus>(), OrreryStatus::Idle);

        enter_orrery(&mut app);
        assert!(app.world().resource::<OrreryStatus>().is_running());
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), meshes_after_first);
    }
}

#[test]
fn mount_reports_every_stage_in_order() {
    let mut app = mounted_app();
    run_frames(&mut app, 1);

    let report = app.world().resource::<CompositionReport>();
    assert!(report.is_complete());
    let stages: Vec<_> = report.finished.iter().map(|p| p.stage).collect();
    assert_eq!(stages, CompositionStage::ALL.to_vec());

    let handles = app.world().resource::<SceneHandles>();
    let items = |stage| report.finished.iter().find(|p| p.stage == stage).map(|p| p.items);
    assert_eq!(items(CompositionStage::Bodies), Some(describe_bodies().len()));
    assert_eq!(items(CompositionStage::Belt), Some(handles.asteroid_count));
}

#[test]
fn lens_flare_tracks_the_camera() {
    let mut app = mounted_app();
    run_frames(&mut app, 3);

    let camera = app.world().resource::<CameraController>().transform().translation;
    let world = app.world_mut();
    let mut flares = world.query::<(&LensFlare, &Transform)>();
    let (flare, transform) = flares.single(world).expect("one lens flare");
    assert!((transform.translation.length() - flare.offset).abs() < 1e-3);
    let normal = transform.rotation * Vec3::Z;
    assert!(normal.dot(camera.normalize()) > 0.999);
}

#[test]
fn frames_stop_once_unmounted() {
    let mut app = mounted_app();
    let before = app.world().resource::<SimulationState>().clock.frames;
    run_frames(&mut app, 10);
    let frames = app.world().resource::<SimulationState>().clock.frames;
    assert_eq!(frames - before, 10);

    leave_orrery(&mut app);
    run_frames(&mut app, 10);
    assert!(!app.world().contains_resource::<SimulationState>());
}

#[test]
fn mercury_completes_one_orbit_in_its_period() {
    let mut app = mounted_app();
    let mercury = &describe_bodies()[0];
    let start = app.world().resource::<SimulationState>().bodies[0].position;

    let frames = (mercury.period() / test_config().frame_step).round() as usize;
    run_frames(&mut app, frames);

    let end = app.world().resource::<SimulationState>().bodies[0].position;
    assert!(start.distance(end) < 0.05, "Mercury drifted to {end:?} from {start:?}");
}

#[test]
fn missing_window_fails_the_mount() {
    let mut app = headless_app_with(None, TextureResolver::new(DisabledTextureSource), test_config());
    app.update();

    let status = app.world().resource::<OrreryStatus>();
    assert!(matches!(status, OrreryStatus::Failed(msg) if msg.contains("window")));
    assert!(app.world().resource::<ResourceLedger>().is_empty());
    assert!(app.world().resource::<ListenerRegistry>().is_empty());
    assert!(!app.world().contains_resource::<SimulationState>());
}

struct FailingSource;

impl TextureSource for FailingSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TextureError> {
        Err(TextureError::Io {
            location: location.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "unreachable"),
        })
    }
}

#[test]
fn failed_texture_fetch_falls_back() {
    let mut config = test_config();
    config.load_textures = true;
    let mut app = headless_app_with(Some(Window::default()), TextureResolver::new(FailingSource), config);
    app.update();
    assert!(app.world().resource::<OrreryStatus>().is_running());

    // Loads run on the io pool; give them a few frames.
    let mut applied = false;
    for _ in 0..200 {
        app.update();
        let world = app.world_mut();
        let mut targets = world.query::<&TextureTarget>();
        if targets.iter(world).all(|t| t.applied) {
            applied = true;
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(applied, "textures never resolved");

    let resolver = app.world().resource::<TextureResolver>();
    let mars = resolver.cached("Mars").expect("Mars resolved");
    assert!(mars.is_fallback());
    assert!(app.world().resource::<OrreryStatus>().is_running());
}

static WITH_BROKEN_BODY: [CelestialBodyDescriptor; 2] = [
    CelestialBodyDescriptor {
        name: "Steady",
        distance: 40.0,
        ..BASE
    },
    CelestialBodyDescriptor {
        name: "Broken",
        distance: 70.0,
        features: &[orrery::catalog::Feature::Atmosphere {
            color: orrery::catalog::Hex(0xFFFFFF),
            opacity: -1.0,
        }],
        ..BASE
    },
];

const BASE: CelestialBodyDescriptor = CelestialBodyDescriptor {
    name: "",
    radius: 3.0,
    distance: 0.0,
    speed: 1.0,
    rotation: 0.01,
    tilt: 0.0,
    color: orrery::catalog::Hex(0x808080),
    emissive: orrery::catalog::Hex::BLACK,
    roughness: 0.5,
    metalness: 0.0,
    route: None,
    description: None,
    texture: None,
    eccentricity: 0.0,
    wobble: 0.0,
    features: &[],
};

#[test]
fn broken_body_renders_minimal_while_others_compose() {
    let mut config = test_config();
    config.catalog = &WITH_BROKEN_BODY;
    let mut app = headless_app_with(Some(Window::default()), TextureResolver::new(DisabledTextureSource), config);
    app.update();

    assert_eq!(
        *app.world().resource::<OrreryStatus>(),
        OrreryStatus::Running { bodies: 2, degraded: 1 }
    );
    let state = app.world().resource::<SimulationState>();
    assert!(!state.bodies[0].degraded);
    assert!(state.bodies[1].degraded);
}
