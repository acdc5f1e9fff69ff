//! Application menu bar and settings window

use eframe::egui;

use scenecraft_gui_lib::i18n::{lang, set_lang, t, Lang};
use scenecraft_gui_lib::state::{DemoState, InputSlot};

use crate::ui::{pick_image, pick_save_path};

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut DemoState) {
    ui.menu_button(t("menu.file"), |ui| {
        for (slot, label) in [
            (InputSlot::Background, "menu.open_bg"),
            (InputSlot::Foreground, "menu.open_fg"),
        ] {
            if ui.button(t(label)).clicked() {
                ui.close_menu();
                pick_image(state, slot);
            }
        }
        ui.separator();
        if ui
            .add_enabled(state.blended.is_some(), egui::Button::new(t("menu.save_blend")))
            .clicked()
        {
            ui.close_menu();
            if let Some(path) = pick_save_path(state) {
                if let Err(e) = state.save_blended(&path) {
                    state.error = Some(e.to_string());
                }
            }
        }
        ui.separator();
        if ui.button(t("menu.quit")).clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

/// Show the settings menu
pub fn settings_menu(ui: &mut egui::Ui, show_window: &mut bool) {
    ui.menu_button(t("menu.settings"), |ui| {
        if ui.button(t("menu.preferences")).clicked() {
            *show_window = true;
            ui.close_menu();
        }
    });
}

/// Show the settings window
pub fn settings_window(ctx: &egui::Context, state: &mut DemoState, show_window: &mut bool) {
    let mut open = *show_window;
    let mut close_clicked = false;
    egui::Window::new(t("settings.title"))
        .open(&mut open)
        .resizable(false)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.heading(t("settings.ui"));
            ui.horizontal(|ui| {
                ui.label(t("settings.font_size"));
                ui.add(egui::Slider::new(&mut state.settings.ui.font_size, 10.0..=24.0).step_by(1.0));
            });
            ui.horizontal(|ui| {
                ui.label(t("menu.language"));
                for (l, name) in [(Lang::En, "English"), (Lang::Ru, "Русский")] {
                    if ui.selectable_label(lang() == l, name).clicked() {
                        set_lang(l);
                        state.settings.ui.language = l;
                    }
                }
            });
            ui.separator();
            if ui.button(t("settings.close")).clicked() {
                close_clicked = true;
            }
        });
    if close_clicked || (*show_window && !open) {
        state.settings.save();
    }
    *show_window = open && !close_clicked;
}
