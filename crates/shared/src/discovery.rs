//! Locate what the reconstruction tool wrote into its output folder.
//!
//! TripoSR's layout varies between versions, so files are matched by
//! extension and a few name hints rather than by fixed paths.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

/// Mesh formats the demo viewer can display.
pub const VIEWER_MODEL_EXT: &[&str] = &["obj", "glb", "gltf"];
/// Mesh formats accepted by the web editor.
pub const MODEL_EXT: &[&str] = &["obj", "ply", "glb", "gltf"];
pub const IMAGE_EXT: &[&str] = &["png", "jpg", "jpeg", "webp"];

const TEXTURE_HINTS: &[&str] = &["tex", "texture", "albedo", "baked"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionOutputs {
    pub model: Option<PathBuf>,
    pub render: Option<PathBuf>,
    pub texture: Option<PathBuf>,
}

impl ReconstructionOutputs {
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.render.is_none()
    }
}

fn has_ext(lower_name: &str, exts: &[&str]) -> bool {
    lower_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| exts.contains(&ext))
}

/// Every file under `dir`, logged as it is found.
///
/// Within a folder the files come first, in name order, then each
/// subfolder is walked in name order.
pub fn list_outputs(dir: &Path) -> Vec<PathBuf> {
    let found: Vec<PathBuf> = WalkDir::new(dir)
        .sort_by(|a, b| {
            (a.file_type().is_dir(), a.file_name()).cmp(&(b.file_type().is_dir(), b.file_name()))
        })
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    for path in &found {
        tracing::debug!("reconstruction output: {}", path.display());
    }
    found
}

fn files(dir: &Path) -> impl Iterator<Item = (String, PathBuf)> {
    list_outputs(dir).into_iter().map(|path| {
        let lower = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        (lower, path)
    })
}

/// First viewer-compatible mesh under `dir`.
pub fn find_model(dir: &Path) -> Option<PathBuf> {
    files(dir)
        .find(|(name, _)| has_ext(name, VIEWER_MODEL_EXT))
        .map(|(_, path)| path)
}

/// Pick a mesh, a preview render and a texture out of `dir`.
pub fn discover_outputs(dir: &Path) -> ReconstructionOutputs {
    let mut out = ReconstructionOutputs::default();

    for (name, path) in files(dir) {
        if has_ext(&name, MODEL_EXT) && out.model.is_none() {
            out.model = Some(path.clone());
        }

        if has_ext(&name, IMAGE_EXT) {
            if name.contains("input") {
                if out.render.is_none() {
                    out.render = Some(path);
                }
            } else if TEXTURE_HINTS.iter().any(|k| name.contains(k)) {
                if out.texture.is_none() {
                    out.texture = Some(path);
                }
            } else if out.render.is_none() {
                out.render = Some(path);
            }
        }
    }

    if out.texture.is_none() {
        out.texture = out.render.clone();
    }

    tracing::info!(
        "reconstruction outputs: model={:?} render={:?} texture={:?}",
        out.model,
        out.render,
        out.texture
    );
    out
}
