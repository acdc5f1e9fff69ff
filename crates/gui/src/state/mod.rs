//! Demo state: the notebook flow of upload, cut out, blend, reconstruct.

pub mod jobs;
pub mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, RgbImage};
use shared::storage::open_rgba;
use shared::{Studio, StudioError};

use crate::i18n::t;
use crate::mesh::MeshData;
use jobs::{Job, JobHandle, JobKind, JobOutcome};
pub use settings::{AppSettings, PlacementSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    Background,
    Foreground,
}

/// An image the user picked from disk.
#[derive(Debug, Clone)]
pub struct InputImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

/// Images kept after "Remove BG & init".
#[derive(Debug, Clone)]
pub struct Prepared {
    pub background: Arc<DynamicImage>,
    pub foreground: Arc<DynamicImage>,
    pub fg_nobg_path: PathBuf,
}

pub struct DemoState {
    pub studio: Arc<Studio>,
    pub settings: AppSettings,

    pub background_input: Option<InputImage>,
    pub foreground_input: Option<InputImage>,
    pub prepared: Option<Prepared>,
    pub blended: Option<RgbImage>,
    pub model_path: Option<PathBuf>,
    /// Fitted mesh for the 3D preview
    pub model_mesh: Option<Arc<MeshData>>,

    /// Banner shown above the outputs
    pub error: Option<String>,
    /// Last successful action, for the status bar
    pub notice: Option<String>,

    /// Bumped whenever a displayed image changes
    pub revision: u64,

    job: Option<JobHandle>,
}

impl DemoState {
    pub fn new(studio: Arc<Studio>, settings: AppSettings) -> Self {
        Self {
            studio,
            settings,
            background_input: None,
            foreground_input: None,
            prepared: None,
            blended: None,
            model_path: None,
            model_mesh: None,
            error: None,
            notice: None,
            revision: 0,
            job: None,
        }
    }

    pub fn input(&self, slot: InputSlot) -> Option<&InputImage> {
        match slot {
            InputSlot::Background => self.background_input.as_ref(),
            InputSlot::Foreground => self.foreground_input.as_ref(),
        }
    }

    /// Read an image from disk into one of the two upload slots.
    pub fn load_input(&mut self, slot: InputSlot, path: &Path) -> Result<(), StudioError> {
        let image = DynamicImage::ImageRgba8(open_rgba(path)?);
        tracing::info!(
            "loaded {:?} {} ({}x{})",
            slot,
            path.display(),
            image.width(),
            image.height()
        );
        let input = Some(InputImage {
            path: path.to_path_buf(),
            image,
        });
        match slot {
            InputSlot::Background => self.background_input = input,
            InputSlot::Foreground => self.foreground_input = input,
        }
        if let Some(dir) = path.parent() {
            self.settings.last_dir = Some(dir.to_path_buf());
        }
        self.revision += 1;
        Ok(())
    }

    pub fn busy(&self) -> Option<JobKind> {
        self.job.as_ref().map(JobHandle::kind)
    }

    /// "Remove BG & init": cut the foreground out and reset the outputs.
    pub fn start_prepare(&mut self, repaint: Option<egui::Context>) {
        let (Some(bg), Some(fg)) = (&self.background_input, &self.foreground_input) else {
            self.error = Some(t("err.need_both").to_string());
            return;
        };
        let job = Job::Prepare {
            background: bg.image.clone(),
            foreground: fg.image.clone(),
        };
        self.start(job, repaint);
    }

    /// Blend the prepared pair using the current slider values.
    pub fn start_blend(&mut self, repaint: Option<egui::Context>) {
        let Some(prepared) = &self.prepared else {
            self.error = Some(t("err.need_prepare").to_string());
            return;
        };
        let job = Job::Blend {
            background: Arc::clone(&prepared.background),
            foreground: Arc::clone(&prepared.foreground),
            placement: self.settings.placement,
        };
        self.start(job, repaint);
    }

    /// Run TripoSR on the cut-out foreground.
    pub fn start_reconstruct(&mut self, repaint: Option<egui::Context>) {
        let Some(prepared) = &self.prepared else {
            self.error = Some(t("err.need_prepare_3d").to_string());
            return;
        };
        let job = Job::Reconstruct {
            foreground: Arc::clone(&prepared.foreground),
        };
        self.start(job, repaint);
    }

    fn start(&mut self, job: Job, repaint: Option<egui::Context>) {
        if self.job.is_some() {
            self.error = Some(t("err.busy").to_string());
            return;
        }
        self.error = None;
        self.notice = None;
        tracing::debug!("starting {:?}", job.kind());
        self.job = Some(JobHandle::spawn(Arc::clone(&self.studio), job, repaint));
    }

    /// Apply a finished job, if any. Returns true when state changed.
    pub fn poll(&mut self) -> bool {
        let Some(result) = self.job.as_ref().and_then(JobHandle::try_take) else {
            return false;
        };
        self.job = None;
        self.apply(result);
        true
    }

    /// Block until the running job finishes. No-op when idle.
    pub fn wait(&mut self) {
        if let Some(handle) = self.job.take() {
            let result = handle.wait();
            self.apply(result);
        }
    }

    fn apply(&mut self, result: Result<JobOutcome, StudioError>) {
        match result {
            Ok(JobOutcome::Prepared(pair)) => {
                self.prepared = Some(Prepared {
                    background: Arc::new(pair.background),
                    foreground: Arc::new(pair.foreground),
                    fg_nobg_path: pair.fg_nobg_path,
                });
                self.blended = None;
                self.model_path = None;
                self.model_mesh = None;
                self.notice = Some(t("status.ready").to_string());
            }
            Ok(JobOutcome::Blended(img)) => {
                self.blended = Some(img);
                self.notice = Some(t("status.ready").to_string());
            }
            Ok(JobOutcome::Reconstructed { path, mesh }) => {
                self.model_path = Some(path);
                self.model_mesh = mesh.map(Arc::new);
                self.notice = Some(t("status.ready").to_string());
            }
            Err(e) => {
                tracing::error!("{e}");
                self.error = Some(e.to_string());
            }
        }
        self.revision += 1;
    }

    pub fn reset_placement(&mut self) {
        self.settings.placement = PlacementSettings::default();
    }

    pub fn save_blended(&mut self, path: &Path) -> Result<(), StudioError> {
        let Some(img) = &self.blended else {
            return Err(StudioError::MissingInput("blended image"));
        };
        img.save(path)?;
        tracing::info!("saved {}", path.display());
        self.notice = Some(format!("{}: {}", t("status.saved"), path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use shared::config::RemoverBackend;
    use shared::StudioConfig;

    fn studio(root: &Path) -> Arc<Studio> {
        let mut config = StudioConfig::default();
        config.paths.static_dir = root.join("static");
        config.rembg.backend = RemoverBackend::ColorKey;
        config.ensure_dirs().unwrap();
        Arc::new(Studio::from_config(config))
    }

    fn write_png(path: &Path, w: u32, h: u32, color: [u8; 4]) {
        RgbaImage::from_pixel(w, h, Rgba(color)).save(path).unwrap();
    }

    #[test]
    fn test_prepare_requires_both_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = DemoState::new(studio(dir.path()), AppSettings::default());

        state.start_prepare(None);
        assert_eq!(
            state.error.as_deref(),
            Some("Please upload BOTH background and foreground images.")
        );
        assert!(state.busy().is_none());
    }

    #[test]
    fn test_blend_and_reconstruct_need_prepare() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = DemoState::new(studio(dir.path()), AppSettings::default());

        state.start_blend(None);
        assert_eq!(
            state.error.as_deref(),
            Some("You must run 'Remove BG & init' first.")
        );
        state.start_reconstruct(None);
        assert!(state
            .error
            .as_deref()
            .unwrap()
            .contains("foreground without background"));
    }

    #[test]
    fn test_load_input_remembers_folder() {
        let dir = tempfile::tempdir().unwrap();
        let bg = dir.path().join("bg.png");
        write_png(&bg, 8, 6, [10, 20, 30, 255]);

        let mut state = DemoState::new(studio(dir.path()), AppSettings::default());
        state.load_input(InputSlot::Background, &bg).unwrap();

        let input = state.input(InputSlot::Background).unwrap();
        assert_eq!((input.image.width(), input.image.height()), (8, 6));
        assert_eq!(state.settings.last_dir.as_deref(), Some(dir.path()));
        assert!(state.input(InputSlot::Foreground).is_none());
    }

    #[test]
    fn test_load_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = DemoState::new(studio(dir.path()), AppSettings::default());
        let err = state
            .load_input(InputSlot::Foreground, &dir.path().join("nope.png"))
            .unwrap_err();
        assert!(matches!(err, StudioError::NotFound(_)));
    }

    #[test]
    fn test_save_without_blend_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = DemoState::new(studio(dir.path()), AppSettings::default());
        assert!(state.save_blended(&dir.path().join("out.png")).is_err());
    }
}
