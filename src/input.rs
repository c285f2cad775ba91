//! Pointer, wheel, keyboard and resize listeners.
//!
//! Listeners are registered on mount and cleared on teardown; each system
//! only runs while its listener is registered. Handlers never touch GPU
//! state, they write camera targets, the viewport and pick requests that
//! the rest of the frame consumes.

use std::collections::HashSet;

use bevy::input::mouse::{AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::camera::{CameraController, Viewport};
use crate::picking::PickRequest;
use crate::types::ResetScene;

/// Pixels per line for trackpads that report pixel deltas.
const PIXELS_PER_LINE: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputListener {
    PointerMove,
    Click,
    Wheel,
    Resize,
    Keyboard,
}

impl InputListener {
    pub const ALL: [InputListener; 5] = [
        InputListener::PointerMove,
        InputListener::Click,
        InputListener::Wheel,
        InputListener::Resize,
        InputListener::Keyboard,
    ];
}

/// Listeners currently attached to the view.
#[derive(Resource, Default, Debug)]
pub struct ListenerRegistry {
    active: HashSet<InputListener>,
}

impl ListenerRegistry {
    pub fn register(&mut self, listener: InputListener) {
        self.active.insert(listener);
    }

    pub fn register_all(&mut self) {
        self.active.extend(InputListener::ALL);
    }

    /// Remove every listener. Safe to call when none are registered.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn is_active(&self, listener: InputListener) -> bool {
        self.active.contains(&listener)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Whether the pointer is over a UI panel this frame.
///
/// Written by the UI layer; clicks and wheel input over panels are ignored.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerOverUi(pub bool);

/// Run condition: `listener` is registered.
pub fn listening(listener: InputListener) -> impl Fn(Res<ListenerRegistry>) -> bool + Clone {
    move |registry: Res<ListenerRegistry>| registry.is_active(listener)
}

/// Convert a wheel reading into a zoom distance change.
///
/// Scrolling up moves the camera closer.
pub fn wheel_zoom(delta_y: f32, unit: MouseScrollUnit, step: f32) -> f32 {
    let lines = match unit {
        MouseScrollUnit::Line => delta_y,
        MouseScrollUnit::Pixel => delta_y / PIXELS_PER_LINE,
    };
    -lines * step
}

/// Free-look: the camera drifts toward the pointer.
pub fn track_pointer(
    mut moves: MessageReader<CursorMoved>,
    viewport: Res<Viewport>,
    mut controller: ResMut<CameraController>,
) {
    if let Some(last) = moves.read().last() {
        controller.pointer = viewport.to_ndc(last.position);
    }
}

/// Left click becomes a pick request at the cursor position.
pub fn click_to_pick(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    over_ui: Res<PointerOverUi>,
    mut picks: MessageWriter<PickRequest>,
) {
    if !mouse.just_pressed(MouseButton::Left) || over_ui.0 {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    if let Some(screen) = window.cursor_position() {
        picks.write(PickRequest { screen });
    }
}

pub fn wheel_zoom_camera(
    scroll: Res<AccumulatedMouseScroll>,
    over_ui: Res<PointerOverUi>,
    mut controller: ResMut<CameraController>,
) {
    if scroll.delta.y == 0.0 || over_ui.0 {
        return;
    }
    let delta = wheel_zoom(scroll.delta.y, scroll.unit, controller.settings.zoom_step);
    controller.zoom_by(delta);
}

/// `+`/`-` zoom, `Home`/`Esc` reset the camera, `R` rebuilds the scene.
pub fn keyboard_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    mut controller: ResMut<CameraController>,
    mut reset: MessageWriter<ResetScene>,
) {
    if keys.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        controller.zoom_in();
    }
    if keys.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        controller.zoom_out();
    }
    if keys.any_just_pressed([KeyCode::Home, KeyCode::Escape]) {
        controller.reset();
    }
    if keys.just_pressed(KeyCode::KeyR) {
        info!("Scene rebuild requested");
        reset.write(ResetScene);
    }
}

/// Track the window size; the camera projection picks it up in sync.
pub fn track_resize(
    mut resized: MessageReader<WindowResized>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
) {
    let Ok(primary) = windows.single() else {
        return;
    };
    if let Some(event) = resized.read().filter(|e| e.window == primary).last() {
        *viewport = Viewport::new(event.width, event.height);
        debug!("Viewport resized to {}x{}", event.width, event.height);
    }
}
