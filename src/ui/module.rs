//! Minimal router: follows navigation requests into a dashboard module and
//! back to the orrery.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use super::{colors, icons};
use crate::catalog::CelestialBodyDescriptor;
use crate::config::OrreryConfig;
use crate::types::{NavigationRequest, ViewState};

/// Route of the module currently shown, if any.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct ActiveRoute(pub Option<&'static str>);

/// Body that owns `route`.
pub fn route_owner(catalog: &'static [CelestialBodyDescriptor], route: &str) -> Option<&'static CelestialBodyDescriptor> {
    catalog.iter().find(|body| body.route == Some(route))
}

/// Switch to the module view on the last navigation request of the frame.
pub fn route_navigation(
    mut requests: MessageReader<NavigationRequest>,
    mut active: ResMut<ActiveRoute>,
    mut next: ResMut<NextState<ViewState>>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    info!("Navigating to {}", request.route);
    active.0 = Some(request.route);
    next.set(ViewState::Module);
}

/// Placeholder for the dashboard module behind a route.
pub fn module_view(
    mut contexts: EguiContexts,
    config: Res<OrreryConfig>,
    mut active: ResMut<ActiveRoute>,
    mut next: ResMut<NextState<ViewState>>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let route = active.0.unwrap_or("/");
    let owner = route_owner(config.catalog, route);

    egui::CentralPanel::default()
        .frame(egui::Frame::new().fill(colors::OVERLAY_BG).inner_margin(egui::Margin::same(24)))
        .show(ctx, |ui| {
            if ui.button(format!("{} Back to the system", icons::BACK)).clicked() {
                active.0 = None;
                next.set(ViewState::Orrery);
            }
            ui.add_space(16.0);
            let title = owner.map_or(route, |body| body.name);
            ui.heading(egui::RichText::new(format!("{} {title}", icons::PLANET)).size(28.0).color(colors::TEXT));
            if let Some(description) = owner.and_then(|body| body.description) {
                ui.label(egui::RichText::new(description).color(colors::MUTED));
            }
            ui.add_space(8.0);
            ui.label(egui::RichText::new(route).monospace().color(colors::MUTED));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use crate::catalog::describe_bodies;

    #[test]
    fn owner_lookup() {
        let earth = route_owner(describe_bodies(), "/earth").map(|b| b.name);
        assert_eq!(earth, Some("Earth"));
        assert!(route_owner(describe_bodies(), "/nowhere").is_none());
    }

    #[test]
    fn navigation_request_switches_view() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<ViewState>()
            .init_resource::<ActiveRoute>()
            .add_message::<NavigationRequest>()
            .add_systems(Update, route_navigation);
        app.update();

        app.world_mut().write_message(NavigationRequest { route: "/mars" });
        app.update();
        app.update();

        assert_eq!(app.world().resource::<ActiveRoute>().0, Some("/mars"));
        assert_eq!(*app.world().resource::<State<ViewState>>().get(), ViewState::Module);
    }
}
