//! Upload folder bookkeeping: unique file names, `/static/...` URLs and back.

use std::path::{Component, Path, PathBuf};

use image::DynamicImage;
use uuid::Uuid;

use crate::config::PathsConfig;
use crate::error::{Result, StudioError};

/// Image extensions accepted by the upload endpoints.
pub const ALLOWED_EXT: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

const STATIC_PREFIX: &str = "/static/";

pub fn allowed_file(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXT.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Hex uuid without dashes.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    static_dir: PathBuf,
    upload_dir: PathBuf,
    triposr_dir: PathBuf,
}

impl UploadStore {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            static_dir: paths.static_dir.clone(),
            upload_dir: paths.upload_dir(),
            triposr_dir: paths.triposr_out_dir(),
        }
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// `<upload_dir>/<uuid>_<tag>.png`
    pub fn upload_path(&self, tag: &str) -> PathBuf {
        self.upload_dir.join(format!("{}_{tag}.png", new_id()))
    }

    /// Fresh output folder for one reconstruction run.
    pub fn run_dir(&self) -> Result<PathBuf> {
        let id = new_id();
        let dir = self.triposr_dir.join(&id[..8]);
        std::fs::create_dir_all(&dir).map_err(|e| StudioError::io(&dir, e))?;
        Ok(dir)
    }

    /// Public URL of a file inside the static folder.
    pub fn url_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.static_dir).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(format!("{STATIC_PREFIX}{}", parts.join("/")))
    }

    /// Map `/static/uploads/foo.png` (or `uploads/foo.png`) back to a file
    /// path. Only plain relative segments are accepted.
    pub fn path_for_url(&self, url: &str) -> Result<PathBuf> {
        let rel = url
            .strip_prefix(STATIC_PREFIX)
            .unwrap_or_else(|| url.trim_start_matches('/'));
        let rel = Path::new(rel);
        let clean = !rel.as_os_str().is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(StudioError::NotFound(format!("`{url}`")));
        }
        Ok(self.static_dir.join(rel))
    }

    /// Convert to RGBA and write a PNG tagged `tag`.
    pub fn save_rgba_png(&self, img: &DynamicImage, tag: &str) -> Result<PathBuf> {
        let path = self.upload_path(tag);
        save_rgba_png_at(img, &path)?;
        Ok(path)
    }

    /// Write raw bytes under a tagged name.
    pub fn save_bytes(&self, bytes: &[u8], tag: &str) -> Result<PathBuf> {
        let path = self.upload_path(tag);
        std::fs::write(&path, bytes).map_err(|e| StudioError::io(&path, e))?;
        Ok(path)
    }
}

pub fn save_rgba_png_at(img: &DynamicImage, path: &Path) -> Result<()> {
    img.to_rgba8()
        .save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

pub fn open_rgba(path: &Path) -> Result<image::RgbaImage> {
    if !path.is_file() {
        return Err(StudioError::NotFound(format!("`{}`", path.display())));
    }
    Ok(image::open(path)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> UploadStore {
        UploadStore::new(&PathsConfig {
            static_dir: root.to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("cat.png"));
        assert!(allowed_file("CAT.JPEG"));
        assert!(allowed_file("archive.tar.webp"));
        assert!(!allowed_file("noext"));
        assert!(!allowed_file("model.obj"));
        assert!(!allowed_file("trailing."));
    }

    #[test]
    fn test_upload_path_shape() {
        let store = store(Path::new("static"));
        let path = store.upload_path("bg");
        assert_eq!(path.parent().unwrap(), Path::new("static/uploads"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("_bg.png"));
        assert_eq!(name.len(), 32 + "_bg.png".len());
        assert_ne!(store.upload_path("bg"), path);
    }

    #[test]
    fn test_url_round_trip() {
        let store = store(Path::new("static"));
        let path = Path::new("static/uploads/abc_nobg.png");
        let url = store.url_for(path).unwrap();
        assert_eq!(url, "/static/uploads/abc_nobg.png");
        assert_eq!(store.path_for_url(&url).unwrap(), path);
    }

    #[test]
    fn test_url_for_outside_static() {
        let store = store(Path::new("static"));
        assert!(store.url_for(Path::new("/etc/passwd")).is_none());
    }

    #[test]
    fn test_path_for_url_without_prefix() {
        let store = store(Path::new("static"));
        assert_eq!(
            store.path_for_url("/uploads/a.png").unwrap(),
            Path::new("static/uploads/a.png")
        );
        assert_eq!(
            store.path_for_url("uploads/a.png").unwrap(),
            Path::new("static/uploads/a.png")
        );
    }

    #[test]
    fn test_path_for_url_rejects_traversal() {
        let store = store(Path::new("static"));
        assert!(store.path_for_url("/static/../Cargo.toml").is_err());
        assert!(store.path_for_url("/static/uploads/../../x").is_err());
        assert!(store.path_for_url("").is_err());
    }

    #[test]
    fn test_run_dir_created() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let dir = store.run_dir().unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir.file_name().unwrap().len(), 8);
        assert!(dir.starts_with(tmp.path().join("triposr")));
    }

    #[test]
    fn test_save_rgba_png() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        std::fs::create_dir_all(store.upload_dir()).unwrap();

        let img = DynamicImage::ImageRgb8(image::RgbImage::new(3, 2));
        let path = store.save_rgba_png(&img, "raw").unwrap();
        let back = open_rgba(&path).unwrap();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn test_open_missing() {
        assert!(matches!(
            open_rgba(Path::new("nope/missing.png")),
            Err(StudioError::NotFound(_))
        ));
    }
}
