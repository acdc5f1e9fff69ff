//! The operations both front ends expose, wired to the configured tools.

use std::path::{Path, PathBuf};

use base64::Engine;
use image::{DynamicImage, RgbImage};

use crate::compose::{self, CanvasRect, CanvasSize};
use crate::config::StudioConfig;
use crate::discovery::{self, ReconstructionOutputs};
use crate::error::{Result, StudioError};
use crate::storage::{self, allowed_file, open_rgba, UploadStore};
use crate::tools::{
    remover_from_config, BackgroundRemover, GenerationRequest, LazyGenerator, Reconstructor,
    TripoSrCommand,
};

/// Background and cut-out foreground, saved and reloaded as RGBA.
#[derive(Debug, Clone)]
pub struct PreparedPair {
    pub bg_path: PathBuf,
    pub fg_raw_path: PathBuf,
    pub fg_nobg_path: PathBuf,
    pub background: DynamicImage,
    pub foreground: DynamicImage,
}

/// A captured 3D view: either raw file bytes or a (data URL) base64 string.
#[derive(Debug, Clone)]
pub enum ViewUpload {
    Bytes(Vec<u8>),
    Encoded(String),
}

impl ViewUpload {
    pub fn decode(self) -> Result<Vec<u8>> {
        match self {
            ViewUpload::Bytes(bytes) => Ok(bytes),
            ViewUpload::Encoded(text) => {
                let b64 = match text.split_once(',') {
                    Some((_, data)) => data,
                    None => text.as_str(),
                };
                base64::engine::general_purpose::STANDARD
                    .decode(b64.trim())
                    .map_err(|e| StudioError::Decode(e.to_string()))
            }
        }
    }
}

pub struct Studio {
    config: StudioConfig,
    store: UploadStore,
    remover: Box<dyn BackgroundRemover>,
    generator: LazyGenerator,
    reconstructor: Box<dyn Reconstructor>,
}

impl Studio {
    /// Studio backed by the external tools named in `config`.
    pub fn from_config(config: StudioConfig) -> Self {
        let remover = remover_from_config(&config.rembg);
        let generator = LazyGenerator::from_config(config.generator.clone());
        let reconstructor = Box::new(TripoSrCommand::new(config.triposr.clone()));
        Self::with_tools(config, remover, generator, reconstructor)
    }

    pub fn with_tools(
        config: StudioConfig,
        remover: Box<dyn BackgroundRemover>,
        generator: LazyGenerator,
        reconstructor: Box<dyn Reconstructor>,
    ) -> Self {
        let store = UploadStore::new(&config.paths);
        Self {
            config,
            store,
            remover,
            generator,
            reconstructor,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    pub fn generator(&self) -> &LazyGenerator {
        &self.generator
    }

    /// Save both images, cut the foreground out and reload the results.
    pub fn prepare_pair(&self, bg: &DynamicImage, fg: &DynamicImage) -> Result<PreparedPair> {
        let bg_path = self.store.save_rgba_png(bg, "bg")?;
        let fg_raw_path = self.store.save_rgba_png(fg, "raw")?;
        let fg_nobg_path = fg_raw_path.with_file_name(
            fg_raw_path
                .file_name()
                .map(|n| n.to_string_lossy().replace("_raw.png", "_nobg.png"))
                .unwrap_or_else(|| format!("{}_nobg.png", storage::new_id())),
        );

        self.remover
            .remove_background(&fg_raw_path, &fg_nobg_path)
            .inspect_err(|e| tracing::error!("background removal failed: {e}"))?;

        let background = DynamicImage::ImageRgba8(open_rgba(&bg_path)?);
        let foreground = DynamicImage::ImageRgba8(open_rgba(&fg_nobg_path)?);
        tracing::info!(
            "prepared {} + {}",
            bg_path.display(),
            fg_nobg_path.display()
        );

        Ok(PreparedPair {
            bg_path,
            fg_raw_path,
            fg_nobg_path,
            background,
            foreground,
        })
    }

    /// Upload flow: validate names, decode, then [`Studio::prepare_pair`].
    pub fn prepare_uploads(
        &self,
        bg_name: &str,
        bg_bytes: &[u8],
        fg_name: &str,
        fg_bytes: &[u8],
    ) -> Result<PreparedPair> {
        for name in [bg_name, fg_name] {
            if !allowed_file(name) {
                return Err(StudioError::UnsupportedFormat(name.to_string()));
            }
        }
        let bg = image::load_from_memory(bg_bytes)?;
        let fg = image::load_from_memory(fg_bytes)?;
        self.prepare_pair(&bg, &fg)
    }

    /// Generate a foreground from text and cut it out. Returns the cut-out.
    pub fn prompt_foreground(&self, request: &GenerationRequest) -> Result<PathBuf> {
        let generator = self.generator.get()?;

        let raw_path = self.store.upload_path("raw_local");
        tracing::info!("generating with {}: {}", generator.model_id(), request.prompt);
        generator
            .generate(request, &raw_path)
            .inspect_err(|e| tracing::error!("generation failed: {e}"))?;

        let nobg_path = self.store.upload_path("nobg_local");
        self.remover
            .remove_background(&raw_path, &nobg_path)
            .inspect_err(|e| tracing::error!("background removal failed: {e}"))?;
        Ok(nobg_path)
    }

    pub fn blend_centered(
        &self,
        bg: &DynamicImage,
        fg: &DynamicImage,
        x_off: f64,
        y_off: f64,
        scale: f64,
    ) -> Result<RgbImage> {
        compose::blend_centered(bg, fg, x_off, y_off, scale)
    }

    /// Canvas blend of two stored files into `final_<uuid>.png`.
    pub fn blend_files(
        &self,
        bg_path: &Path,
        fg_path: &Path,
        rect: CanvasRect,
        canvas: CanvasSize,
    ) -> Result<PathBuf> {
        let bg = DynamicImage::ImageRgba8(open_rgba(bg_path)?);
        let fg = DynamicImage::ImageRgba8(open_rgba(fg_path)?);

        let out = compose::blend_canvas(&bg, &fg, rect, canvas)?;
        let out_path = self
            .store
            .upload_dir()
            .join(format!("final_{}.png", storage::new_id()));
        out.save_with_format(&out_path, image::ImageFormat::Png)?;
        Ok(out_path)
    }

    /// Web flow: run the reconstruction and report whatever it produced.
    /// A failing tool is logged and yields empty outputs.
    pub fn reconstruct(&self, fg_path: &Path) -> Result<ReconstructionOutputs> {
        if !fg_path.is_file() {
            return Err(StudioError::NotFound("Foreground image".into()));
        }
        let out_dir = self.store.run_dir()?;

        if let Err(e) = self.reconstructor.reconstruct(fg_path, &out_dir) {
            tracing::error!("TripoSR error: {e}");
            return Ok(ReconstructionOutputs::default());
        }
        Ok(discovery::discover_outputs(&out_dir))
    }

    /// Demo flow: reconstruct a cut-out image and return the mesh path.
    pub fn reconstruct_model(&self, fg: &DynamicImage) -> Result<PathBuf> {
        let src = self.store.save_rgba_png(fg, "triposr_src")?;
        let out_dir = self.store.run_dir()?;

        self.reconstructor.reconstruct(&src, &out_dir)?;

        let model = discovery::find_model(&out_dir).ok_or(StudioError::NoModelOutput(out_dir))?;
        tracing::info!("returning 3D model: {}", model.display());
        Ok(model)
    }

    /// Store a captured 3D view so it can be used as a new foreground.
    pub fn save_view(&self, upload: ViewUpload) -> Result<PathBuf> {
        let bytes = upload.decode()?;
        if bytes.is_empty() {
            return Err(StudioError::MissingInput("image data"));
        }
        self.store.save_bytes(&bytes, "3dview")
    }
}
