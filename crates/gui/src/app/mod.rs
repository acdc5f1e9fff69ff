//! Main application module

mod menus;
mod styles;

use eframe::egui;

use scenecraft_gui_lib::state::DemoState;

use crate::ui::{inputs, outputs, placement, status_bar, Textures};
use crate::viewport::ModelViewer;

/// Main application
pub struct DemoApp {
    state: DemoState,
    textures: Textures,
    viewer: ModelViewer,
    show_settings_window: bool,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl DemoApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: DemoState) -> Self {
        scenecraft_gui_lib::i18n::set_lang(state.settings.ui.language);
        styles::configure_styles(&cc.egui_ctx, state.settings.ui.font_size);

        let mut viewer = ModelViewer::new();
        if let Some(gl) = &cc.gl {
            viewer.init_gl(gl);
        }

        let last_font_size = state.settings.ui.font_size;
        Self {
            state,
            textures: Textures::default(),
            viewer,
            show_settings_window: false,
            last_font_size,
        }
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        if self.state.poll() {
            self.state.settings.save();
        }
        if self.state.busy().is_some() {
            // Keep the spinner moving while a worker runs
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
        self.textures.refresh(ctx, &self.state);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::settings_menu(ui, &mut self.show_settings_window);
            });
        });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, &mut self.state, &mut self.show_settings_window);

        // ── Status bar ────────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            status_bar::show(ui, &self.state);
        });

        // ── Left panel: inputs and placement ─────────────────
        egui::SidePanel::left("inputs")
            .default_width(340.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    inputs::show(ui, &mut self.state, &self.textures);
                    ui.separator();
                    placement::show(ui, &mut self.state);
                });
            });

        // ── Central panel: previews and 3D result ────────────
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                outputs::show(ui, &self.state, &self.textures, &mut self.viewer);
            });
        });
    }

    fn on_exit(&mut self, gl: Option<&eframe::glow::Context>) {
        self.state.settings.save();
        if let Some(gl) = gl {
            self.viewer.destroy(gl);
        }
    }
}
