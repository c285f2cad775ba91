//! Phosphor icon definitions for the UI.
//!
//! Icons are initialized via `setup_fonts` on the first egui pass.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

/// Resource to track if fonts have been initialized.
#[derive(Resource, Default)]
pub struct FontsInitialized(pub bool);

/// Install the Phosphor icon font into the primary egui context.
pub fn setup_fonts(mut contexts: EguiContexts, mut initialized: ResMut<FontsInitialized>) {
    if initialized.0 {
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    ctx.set_fonts(fonts);
    initialized.0 = true;

    info!("Phosphor icon fonts initialized");
}

// Browse all icons at https://phosphoricons.com/

pub const PLANET: &str = egui_phosphor::regular::PLANET;
pub const SUN: &str = egui_phosphor::regular::SUN;
pub const COMET: &str = egui_phosphor::regular::SHOOTING_STAR;
pub const ASTEROID: &str = egui_phosphor::regular::ASTERISK;
pub const ZOOM_IN: &str = egui_phosphor::regular::MAGNIFYING_GLASS_PLUS;
pub const ZOOM_OUT: &str = egui_phosphor::regular::MAGNIFYING_GLASS_MINUS;
/// Camera back to the overview.
pub const RECENTER: &str = egui_phosphor::regular::CROSSHAIR;
/// Rebuild the whole scene.
pub const REBUILD: &str = egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE;
pub const OPEN: &str = egui_phosphor::regular::ARROW_RIGHT;
pub const BACK: &str = egui_phosphor::regular::ARROW_LEFT;
pub const WARNING: &str = egui_phosphor::regular::WARNING;
pub const LOADING: &str = egui_phosphor::regular::HOURGLASS;
pub const DONE: &str = egui_phosphor::regular::CHECK_CIRCLE;
