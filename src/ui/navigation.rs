//! Destination list and on-screen camera controls.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use super::{colors, icons};
use crate::camera::CameraController;
use crate::catalog::CelestialBodyDescriptor;
use crate::config::OrreryConfig;
use crate::input::PointerOverUi;
use crate::types::{NavigationRequest, ResetScene};

/// One row of the destination list.
#[derive(Clone, Debug, PartialEq)]
pub struct Destination {
    pub index: usize,
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub route: &'static str,
}

/// Bodies that can be navigated to, in presentation order.
pub fn destinations(catalog: &'static [CelestialBodyDescriptor]) -> Vec<Destination> {
    catalog
        .iter()
        .enumerate()
        .filter_map(|(index, body)| {
            Some(Destination {
                index,
                name: body.name,
                description: body.description,
                route: body.route?,
            })
        })
        .collect()
}

pub fn navigation_panel(
    mut contexts: EguiContexts,
    config: Res<OrreryConfig>,
    mut controller: Option<ResMut<CameraController>>,
    mut navigation: MessageWriter<NavigationRequest>,
    mut reset: MessageWriter<ResetScene>,
    mut over_ui: ResMut<PointerOverUi>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Window::new("Destinations")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .resizable(false)
        .collapsible(true)
        .frame(egui::Frame::window(&ctx.style()).fill(colors::PANEL_BG))
        .show(ctx, |ui| {
            for destination in destinations(config.catalog) {
                let label = egui::RichText::new(format!("{} {}", icons::PLANET, destination.name))
                    .size(16.0)
                    .color(colors::TEXT);
                let response = ui
                    .add(egui::Button::new(label).frame(false))
                    .on_hover_text(format!("{} {}", icons::OPEN, destination.route));
                if let Some(description) = destination.description {
                    ui.label(egui::RichText::new(description).small().color(colors::MUTED));
                }
                if response.clicked() {
                    let radius = config.catalog[destination.index].radius;
                    if let Some(controller) = controller.as_deref_mut() {
                        controller.focus(destination.index, radius);
                    }
                    navigation.write(NavigationRequest {
                        route: destination.route,
                    });
                }
                ui.add_space(4.0);
            }
        });

    egui::Area::new(egui::Id::new("camera_controls"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(colors::PANEL_BG)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let button = |icon: &str| {
                            egui::Button::new(egui::RichText::new(icon).size(20.0).color(colors::TEXT))
                                .min_size(egui::vec2(36.0, 32.0))
                        };
                        if let Some(controller) = controller.as_deref_mut() {
                            if ui.add(button(icons::ZOOM_IN)).on_hover_text("Zoom in (+)").clicked() {
                                controller.zoom_in();
                            }
                            if ui.add(button(icons::ZOOM_OUT)).on_hover_text("Zoom out (-)").clicked() {
                                controller.zoom_out();
                            }
                            if ui.add(button(icons::RECENTER)).on_hover_text("Reset view (Home)").clicked() {
                                controller.reset();
                            }
                        }
                        if ui.add(button(icons::REBUILD)).on_hover_text("Rebuild scene (R)").clicked() {
                            reset.write(ResetScene);
                        }
                    });
                });
        });

    over_ui.0 = ctx.is_pointer_over_area() || ctx.wants_pointer_input();
}
