use egui::Ui;

use scenecraft_gui_lib::i18n::t;
use scenecraft_gui_lib::state::DemoState;

pub fn show(ui: &mut Ui, state: &DemoState) {
    ui.horizontal(|ui| {
        match state.busy() {
            Some(kind) => {
                ui.spinner();
                ui.label(t(kind.status_key()));
            }
            None => {
                ui.weak(state.notice.as_deref().unwrap_or(t("status.ready")));
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let studio = state.studio.config();
            ui.weak(format!("rembg: {:?}", studio.rembg.backend));
            ui.separator();
            ui.weak(format!("TripoSR: {}", studio.triposr.dir.display()));
        });
    });
}
