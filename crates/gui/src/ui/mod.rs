pub mod inputs;
pub mod outputs;
pub mod placement;
pub mod status_bar;

use std::path::PathBuf;

use eframe::egui;
use scenecraft_gui_lib::i18n::t;
use scenecraft_gui_lib::preview::{color_image, display_size, MAX_PREVIEW_SIDE};
use scenecraft_gui_lib::state::{DemoState, InputSlot};

/// GPU copies of every image the panels show.
#[derive(Default)]
pub struct Textures {
    revision: Option<u64>,
    pub background_input: Option<egui::TextureHandle>,
    pub foreground_input: Option<egui::TextureHandle>,
    pub background: Option<egui::TextureHandle>,
    pub foreground: Option<egui::TextureHandle>,
    pub blended: Option<egui::TextureHandle>,
}

impl Textures {
    /// Re-upload after any image in `state` changed.
    pub fn refresh(&mut self, ctx: &egui::Context, state: &DemoState) {
        if self.revision == Some(state.revision) {
            return;
        }
        self.revision = Some(state.revision);

        let load = |name: &str, img: &image::DynamicImage| {
            ctx.load_texture(
                name,
                color_image(img, MAX_PREVIEW_SIDE),
                egui::TextureOptions::LINEAR,
            )
        };
        self.background_input = state
            .input(InputSlot::Background)
            .map(|i| load("bg_input", &i.image));
        self.foreground_input = state
            .input(InputSlot::Foreground)
            .map(|i| load("fg_input", &i.image));
        self.background = state.prepared.as_ref().map(|p| load("bg", &p.background));
        self.foreground = state.prepared.as_ref().map(|p| load("fg_nobg", &p.foreground));
        self.blended = state
            .blended
            .as_ref()
            .map(|img| load("blended", &image::DynamicImage::ImageRgb8(img.clone())));
    }
}

/// Draw a texture scaled down to the available width.
pub fn image_preview(ui: &mut egui::Ui, texture: Option<&egui::TextureHandle>) {
    match texture {
        Some(tex) => {
            let [w, h] = tex.size();
            let size = display_size(w as u32, h as u32, ui.available_width());
            ui.add(egui::Image::new(tex).fit_to_exact_size(size));
        }
        None => {
            ui.weak(t("input.empty"));
        }
    }
}

/// Ask for an image file and load it into `slot`.
pub fn pick_image(state: &mut DemoState, slot: InputSlot) {
    let mut dialog = rfd::FileDialog::new()
        .set_title(t("input.pick_title"))
        .add_filter(t("input.images"), &["png", "jpg", "jpeg", "webp", "bmp"]);
    if let Some(dir) = &state.settings.last_dir {
        dialog = dialog.set_directory(dir);
    }
    if let Some(path) = dialog.pick_file() {
        if let Err(e) = state.load_input(slot, &path) {
            tracing::error!("Failed to open {}: {e}", path.display());
            state.error = Some(e.to_string());
        }
    }
}

pub fn pick_save_path(state: &DemoState) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .add_filter("PNG", &["png"])
        .set_file_name("blended.png");
    if let Some(dir) = &state.settings.last_dir {
        dialog = dialog.set_directory(dir);
    }
    dialog.save_file()
}
