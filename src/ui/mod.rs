//! egui overlay: destinations, camera controls, system status and the
//! placeholder module view.

pub mod icons;
pub mod module;
pub mod navigation;
pub mod status;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::types::ViewState;

pub use module::ActiveRoute;

/// Plugin that adds all UI systems.
pub struct OrreryUiPlugin;

impl Plugin for OrreryUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<icons::FontsInitialized>()
            .init_resource::<ActiveRoute>()
            .add_systems(Update, module::route_navigation.run_if(in_state(ViewState::Orrery)))
            // Fonts first; icons render as tofu otherwise
            .add_systems(EguiPrimaryContextPass, icons::setup_fonts)
            .add_systems(
                EguiPrimaryContextPass,
                (navigation::navigation_panel, status::status_panel, status::error_overlay)
                    .after(icons::setup_fonts)
                    .run_if(fonts_ready)
                    .run_if(in_state(ViewState::Orrery)),
            )
            .add_systems(
                EguiPrimaryContextPass,
                module::module_view
                    .after(icons::setup_fonts)
                    .run_if(fonts_ready)
                    .run_if(in_state(ViewState::Module)),
            );
    }
}

fn fonts_ready(init: Res<icons::FontsInitialized>) -> bool {
    init.0
}

mod colors {
    use bevy_egui::egui::Color32;

    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(10, 12, 28, 220);
    pub const OVERLAY_BG: Color32 = Color32::from_rgb(4, 4, 12);
    pub const TEXT: Color32 = Color32::from_rgb(230, 232, 245);
    pub const MUTED: Color32 = Color32::from_rgb(140, 146, 170);
    pub const ONLINE: Color32 = Color32::from_rgb(120, 220, 140);
    pub const ERROR: Color32 = Color32::from_rgb(240, 90, 80);
}
