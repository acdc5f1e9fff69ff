use egui::{Slider, Ui};

use scenecraft_gui_lib::i18n::t;
use scenecraft_gui_lib::state::settings::{OFFSET_RANGE, OFFSET_STEP, SCALE_RANGE, SCALE_STEP};
use scenecraft_gui_lib::state::DemoState;

pub fn show(ui: &mut Ui, state: &mut DemoState) {
    ui.heading(t("placement.title"));

    let placement = &mut state.settings.placement;
    ui.add(
        Slider::new(&mut placement.x_offset, OFFSET_RANGE)
            .step_by(OFFSET_STEP)
            .text(t("placement.x")),
    );
    ui.add(
        Slider::new(&mut placement.y_offset, OFFSET_RANGE)
            .step_by(OFFSET_STEP)
            .text(t("placement.y")),
    );
    ui.add(
        Slider::new(&mut placement.scale, SCALE_RANGE)
            .step_by(SCALE_STEP)
            .text(t("placement.scale")),
    );

    ui.horizontal(|ui| {
        if ui.button(t("placement.reset")).clicked() {
            state.reset_placement();
        }
        let can_run = state.busy().is_none();
        if ui
            .add_enabled(can_run, egui::Button::new(t("action.blend")))
            .clicked()
        {
            state.start_blend(Some(ui.ctx().clone()));
        }
    });

    ui.add_space(4.0);
    if ui
        .add_enabled(state.busy().is_none(), egui::Button::new(t("action.reconstruct")))
        .clicked()
    {
        state.start_reconstruct(Some(ui.ctx().clone()));
    }
}
