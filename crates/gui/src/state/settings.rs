//! Application settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::i18n::Lang;

/// Slider ranges for the placement controls.
pub const OFFSET_RANGE: std::ops::RangeInclusive<f64> = -400.0..=400.0;
pub const OFFSET_STEP: f64 = 5.0;
pub const SCALE_RANGE: std::ops::RangeInclusive<f64> = 0.1..=3.0;
pub const SCALE_STEP: f64 = 0.05;

/// Foreground placement relative to the background centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementSettings {
    /// Horizontal offset in pixels, positive moves right
    pub x_offset: f64,
    /// Vertical offset in pixels, positive moves down
    pub y_offset: f64,
    /// Foreground scale factor
    pub scale: f64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            x_offset: 0.0,
            y_offset: 0.0,
            scale: 1.0,
        }
    }
}

impl PlacementSettings {
    /// Pull values persisted by an older build back into slider range.
    pub fn clamped(self) -> Self {
        Self {
            x_offset: self.x_offset.clamp(*OFFSET_RANGE.start(), *OFFSET_RANGE.end()),
            y_offset: self.y_offset.clamp(*OFFSET_RANGE.start(), *OFFSET_RANGE.end()),
            scale: if self.scale.is_finite() {
                self.scale.clamp(*SCALE_RANGE.start(), *SCALE_RANGE.end())
            } else {
                1.0
            },
        }
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
    /// Interface language
    #[serde(default)]
    pub language: Lang,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            language: Lang::En,
        }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// UI settings
    pub ui: UiSettings,
    /// Last used placement
    #[serde(default)]
    pub placement: PlacementSettings,
    /// Folder the file pickers open in
    #[serde(default)]
    pub last_dir: Option<PathBuf>,
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "scenecraft", "scenecraft")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(&json) {
            Ok(mut settings) => {
                settings.placement = settings.placement.clamped();
                settings
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::warn!("failed to save settings: {e}");
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");

        let mut settings = AppSettings::default();
        settings.ui.font_size = 18.0;
        settings.ui.language = Lang::Ru;
        settings.placement.x_offset = -120.0;
        settings.placement.scale = 0.55;
        settings.save_to(&path).unwrap();

        let loaded = AppSettings::load_from(&path);
        assert_eq!(loaded.ui.font_size, 18.0);
        assert_eq!(loaded.ui.language, Lang::Ru);
        assert_eq!(loaded.placement, settings.placement);
    }

    #[test]
    fn test_missing_or_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(AppSettings::load_from(&path).placement, PlacementSettings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppSettings::load_from(&path).ui.font_size, 14.0);
    }

    #[test]
    fn test_out_of_range_placement_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"ui":{"font_size":14.0},"placement":{"x_offset":900.0,"y_offset":-900.0,"scale":7.5}}"#,
        )
        .unwrap();

        let placement = AppSettings::load_from(&path).placement;
        assert_eq!(placement.x_offset, 400.0);
        assert_eq!(placement.y_offset, -400.0);
        assert_eq!(placement.scale, 3.0);
    }
}
