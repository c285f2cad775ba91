//! System status panel, composition and texture progress, and the mount
//! error overlay.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use super::{colors, icons};
use crate::catalog::COMET_NAME;
use crate::scene::{CompositionReport, CompositionStage, SceneHandles};
use crate::texture::{PendingTextures, TextureTarget};
use crate::types::{OrreryStatus, ResetScene};

/// Texture loading progress of the mounted scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub applied: usize,
    pub total: usize,
}

impl LoadProgress {
    pub fn is_complete(&self) -> bool {
        self.applied >= self.total
    }

    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.applied as f32 / self.total as f32
        }
    }
}

/// Each composition stage with its item count once finished.
pub fn stage_rows(report: &CompositionReport) -> Vec<(CompositionStage, Option<usize>)> {
    CompositionStage::ALL
        .iter()
        .map(|stage| {
            let items = report.finished.iter().find(|p| p.stage == *stage).map(|p| p.items);
            (*stage, items)
        })
        .collect()
}

/// One-line summary of the mount state.
pub fn status_line(status: &OrreryStatus) -> String {
    match status {
        OrreryStatus::Idle => "Idle".to_owned(),
        OrreryStatus::Running { bodies, degraded: 0 } => format!("Online: {bodies} bodies"),
        OrreryStatus::Running { bodies, degraded } => {
            format!("Online: {bodies} bodies ({degraded} in minimal form)")
        }
        OrreryStatus::Failed(message) => format!("Offline: {message}"),
    }
}

pub fn status_panel(
    mut contexts: EguiContexts,
    status: Res<OrreryStatus>,
    handles: Option<Res<SceneHandles>>,
    report: Res<CompositionReport>,
    targets: Query<&TextureTarget>,
    pending: Res<PendingTextures>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    if !status.is_running() {
        return;
    }

    let progress = LoadProgress {
        applied: targets.iter().filter(|t| t.applied).count(),
        total: targets.iter().count(),
    };

    egui::Window::new("System status")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .resizable(false)
        .collapsible(true)
        .frame(egui::Frame::window(&ctx.style()).fill(colors::PANEL_BG))
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("{} {}", icons::SUN, status_line(&status))).color(colors::ONLINE));
            if let Some(handles) = handles.as_deref() {
                ui.label(
                    egui::RichText::new(format!("{} {} asteroids", icons::ASTEROID, handles.asteroid_count))
                        .color(colors::TEXT),
                );
            }
            ui.label(egui::RichText::new(format!("{} Comet {COMET_NAME}", icons::COMET)).color(colors::TEXT));
            egui::CollapsingHeader::new("Composition")
                .default_open(!report.is_complete())
                .show(ui, |ui| {
                    for (stage, items) in stage_rows(&report) {
                        let text = match items {
                            Some(items) => format!("{} {} ({items})", icons::DONE, stage.label()),
                            None => format!("{} {}", icons::LOADING, stage.label()),
                        };
                        let color = if items.is_some() { colors::TEXT } else { colors::MUTED };
                        ui.label(egui::RichText::new(text).small().color(color));
                    }
                });
            if !progress.is_complete() {
                ui.add(
                    egui::ProgressBar::new(progress.fraction())
                        .text(format!("{} textures {}/{}", icons::LOADING, progress.applied, progress.total)),
                );
                if !pending.is_empty() {
                    ui.label(egui::RichText::new(format!("{} fetching", pending.len())).small().color(colors::MUTED));
                }
            }
        });
}

/// Full-screen notice when the view failed to mount.
pub fn error_overlay(mut contexts: EguiContexts, status: Res<OrreryStatus>, mut reset: MessageWriter<ResetScene>) {
    let OrreryStatus::Failed(message) = &*status else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::CentralPanel::default()
        .frame(egui::Frame::new().fill(colors::OVERLAY_BG))
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.35);
                ui.label(egui::RichText::new(icons::WARNING).size(48.0).color(colors::ERROR));
                ui.heading(egui::RichText::new("The orrery could not start").color(colors::TEXT));
                ui.label(egui::RichText::new(message).color(colors::MUTED));
                ui.add_space(12.0);
                if ui.button(format!("{} Retry", icons::REBUILD)).clicked() {
                    reset.write(ResetScene);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines() {
        assert_eq!(status_line(&OrreryStatus::Idle), "Idle");
        assert_eq!(
            status_line(&OrreryStatus::Running { bodies: 7, degraded: 0 }),
            "Online: 7 bodies"
        );
        assert_eq!(
            status_line(&OrreryStatus::Running { bodies: 7, degraded: 1 }),
            "Online: 7 bodies (1 in minimal form)"
        );
        assert!(status_line(&OrreryStatus::Failed("no window".into())).contains("no window"));
    }

    #[test]
    fn stage_rows_follow_composition_order() {
        let mut report = CompositionReport::default();
        report.finished.push(crate::scene::CompositionProgress {
            stage: CompositionStage::Sun,
            items: 1,
        });
        report.finished.push(crate::scene::CompositionProgress {
            stage: CompositionStage::Backdrop,
            items: 450,
        });
        let rows = stage_rows(&report);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], (CompositionStage::Backdrop, Some(450)));
        assert_eq!(rows[1], (CompositionStage::Sun, Some(1)));
        assert!(rows[2..].iter().all(|(_, items)| items.is_none()));
    }

    #[test]
    fn progress_with_no_targets_is_complete() {
        let progress = LoadProgress::default();
        assert!(progress.is_complete());
        assert_eq!(progress.fraction(), 1.0);
        let half = LoadProgress { applied: 3, total: 6 };
        assert!(!half.is_complete());
        assert_eq!(half.fraction(), 0.5);
    }
}
