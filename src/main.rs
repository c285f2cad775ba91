//! Orrery - real-time 3D solar system navigation view
//!
//! Desktop host for the orrery plugin. Clicking a planet opens its
//! dashboard module; the module view leads back to the system.

use bevy::prelude::*;
use bevy_egui::{EguiGlobalSettings, EguiPlugin, PrimaryEguiContext};

use orrery::OrreryPlugin;

/// Full-window camera that only draws the egui overlay.
#[derive(Component)]
struct OverlayUiCamera;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Orrery".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        // The egui context lives on the overlay camera, which outlives every
        // scene camera the orrery mounts and tears down
        .insert_resource(EguiGlobalSettings {
            auto_create_primary_context: false,
            ..default()
        })
        .insert_resource(ClearColor(Color::BLACK))
        .add_systems(Startup, spawn_overlay_camera)
        .add_plugins(OrreryPlugin)
        .run();
}

fn spawn_overlay_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            order: 10_000,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        OverlayUiCamera,
        PrimaryEguiContext,
        Name::new("Overlay UI camera"),
    ));
}
