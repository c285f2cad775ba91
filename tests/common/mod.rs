//! Common test utilities for integration tests.

#![allow(dead_code)]

use bevy::input::InputPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::window::WindowPlugin;
use orrery::effects::EffectMaterial;
use orrery::texture::{DisabledTextureSource, TextureResolver};
use orrery::{NavigationRequest, OrreryConfig, OrreryCorePlugin};

/// Navigation requests seen so far, in order.
#[derive(Resource, Default)]
pub struct SeenRoutes(pub Vec<&'static str>);

fn collect_routes(mut requests: MessageReader<NavigationRequest>, mut seen: ResMut<SeenRoutes>) {
    seen.0.extend(requests.read().map(|r| r.route));
}

/// Light config for tests: sparse starfield, no texture files.
pub fn test_config() -> OrreryConfig {
    OrreryConfig {
        star_density: 0.05,
        load_textures: false,
        ..default()
    }
}

/// Headless app with the core plugin and a primary window entity, before
/// its first update.
pub fn headless_app_with(window: Option<Window>, resolver: TextureResolver, config: OrreryConfig) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        InputPlugin,
        WindowPlugin {
            primary_window: window,
            exit_condition: bevy::window::ExitCondition::DontExit,
            ..default()
        },
    ))
    .init_resource::<Assets<Mesh>>()
    .init_resource::<Assets<StandardMaterial>>()
    .init_resource::<Assets<EffectMaterial>>()
    .init_resource::<Assets<Image>>()
    .insert_resource(config)
    .insert_resource(resolver)
    .init_resource::<SeenRoutes>()
    .add_plugins(OrreryCorePlugin)
    .add_systems(PostUpdate, collect_routes);
    app
}

/// Headless app, already mounted.
pub fn mounted_app() -> App {
    let mut app = headless_app_with(
        Some(Window::default()),
        TextureResolver::new(DisabledTextureSource),
        test_config(),
    );
    app.update();
    app
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}
