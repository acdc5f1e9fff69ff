//! Interactive preview of the reconstructed model.

mod camera;
mod gl_renderer;

use std::sync::{Arc, Mutex};

use eframe::egui::{self, Ui};
use scenecraft_gui_lib::i18n::t;
use scenecraft_gui_lib::mesh::MeshData;

use camera::ArcBallCamera;
use gl_renderer::{GlRenderer, RenderParams};

const VIEW_HEIGHT: f32 = 360.0;
const BG_COLOR: [u8; 3] = [38, 38, 44];

/// OpenGL model viewer drawn through an egui paint callback
pub struct ModelViewer {
    camera: ArcBallCamera,
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
}

impl ModelViewer {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::default(),
            gl_renderer: None,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("model preview disabled: {e}"),
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera = ArcBallCamera::default();
    }

    /// Draw `mesh`; `version` changes whenever a new mesh is loaded.
    pub fn show(&mut self, ui: &mut Ui, mesh: Option<&Arc<MeshData>>, version: u64) {
        let Some(renderer) = self.gl_renderer.clone() else {
            ui.weak(t("model.no_gl"));
            return;
        };

        let size = egui::vec2(ui.available_width(), VIEW_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.camera.rotate(-delta.x * 0.5, delta.y * 0.5);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.zoom(scroll * 0.002);
            }
        }
        if response.double_clicked() {
            self.reset_camera();
        }

        let has_mesh = mesh.is_some();
        let camera = self.camera;
        let mesh = mesh.cloned();
        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();
                let clip = info.clip_rect_in_pixels();
                let params = RenderParams {
                    viewport: [
                        clip.left_px as f32,
                        clip.from_bottom_px as f32,
                        clip.width_px as f32,
                        clip.height_px as f32,
                    ],
                    bg_color: BG_COLOR,
                };
                if let Ok(mut r) = renderer.lock() {
                    r.sync_model(gl, mesh.as_deref(), version);
                    r.paint(gl, &camera, &params);
                }
            })),
        };
        ui.painter().add(callback);

        if !has_mesh {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                t("model.none"),
                egui::FontId::proportional(13.0),
                egui::Color32::from_rgb(140, 140, 150),
            );
        } else {
            ui.painter().text(
                egui::pos2(rect.center().x, rect.bottom() - 8.0),
                egui::Align2::CENTER_BOTTOM,
                t("model.nav_hint"),
                egui::FontId::proportional(11.0),
                egui::Color32::from_rgb(120, 120, 130),
            );
        }
    }
}
