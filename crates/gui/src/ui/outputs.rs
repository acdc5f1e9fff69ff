use egui::{Color32, RichText, Ui};

use scenecraft_gui_lib::i18n::t;
use scenecraft_gui_lib::state::DemoState;

use super::{image_preview, Textures};
use crate::viewport::ModelViewer;

pub fn show(ui: &mut Ui, state: &DemoState, textures: &Textures, viewer: &mut ModelViewer) {
    if let Some(err) = &state.error {
        ui.label(RichText::new(err).color(Color32::from_rgb(235, 90, 90)).strong());
        ui.add_space(6.0);
    }

    ui.columns(2, |cols| {
        cols[0].strong(t("preview.background"));
        image_preview(&mut cols[0], textures.background.as_ref());
        cols[1].strong(t("preview.foreground"));
        image_preview(&mut cols[1], textures.foreground.as_ref());
    });

    ui.separator();
    ui.strong(t("preview.final"));
    image_preview(ui, textures.blended.as_ref());

    ui.separator();
    ui.strong(t("model.title"));
    match &state.model_path {
        Some(path) => {
            ui.horizontal_wrapped(|ui| {
                ui.label(t("model.path"));
                ui.monospace(path.display().to_string());
                if ui.small_button(t("model.copy")).clicked() {
                    ui.ctx().copy_text(path.display().to_string());
                }
            });
            if state.model_mesh.is_none() {
                ui.weak(t("model.no_preview"));
            }
            viewer.show(ui, state.model_mesh.as_ref(), state.revision);
        }
        None => {
            ui.weak(t("model.none"));
        }
    }
}
