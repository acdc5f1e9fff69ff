use egui::Ui;

use scenecraft_gui_lib::i18n::t;
use scenecraft_gui_lib::state::{DemoState, InputSlot};

use super::{image_preview, pick_image, Textures};

pub fn show(ui: &mut Ui, state: &mut DemoState, textures: &Textures) {
    ui.heading(t("app.title"));
    ui.label(t("app.steps"));
    ui.add_space(6.0);

    for (slot, label, texture) in [
        (
            InputSlot::Background,
            "input.background",
            textures.background_input.as_ref(),
        ),
        (
            InputSlot::Foreground,
            "input.foreground",
            textures.foreground_input.as_ref(),
        ),
    ] {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.strong(t(label));
                if ui
                    .add_enabled(state.busy().is_none(), egui::Button::new(t("input.pick")))
                    .clicked()
                {
                    pick_image(state, slot);
                }
            });
            if let Some(input) = state.input(slot) {
                let name = input
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ui.weak(format!("{name} ({}x{})", input.image.width(), input.image.height()));
            }
            image_preview(ui, texture);
        });
    }

    ui.add_space(6.0);
    let idle = state.busy().is_none();
    if ui
        .add_enabled(idle, egui::Button::new(t("action.prepare")))
        .clicked()
    {
        state.start_prepare(Some(ui.ctx().clone()));
    }
}
