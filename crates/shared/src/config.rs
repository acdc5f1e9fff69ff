//! Studio configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! (or missing) file yields a working local setup. A handful of environment
//! variables override the file for quick experiments.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_STATIC_DIR: &str = "SCENECRAFT_STATIC_DIR";
pub const ENV_TRIPOSR_DIR: &str = "SCENECRAFT_TRIPOSR_DIR";
pub const ENV_PYTHON: &str = "SCENECRAFT_PYTHON";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),
}

/// Where uploaded and generated files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Served under `/static/`
    pub static_dir: PathBuf,
    /// Defaults to `<static_dir>/uploads`
    pub uploads: Option<PathBuf>,
    /// Defaults to `<static_dir>/triposr`
    pub triposr_out: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            uploads: None,
            triposr_out: None,
        }
    }
}

impl PathsConfig {
    pub fn upload_dir(&self) -> PathBuf {
        self.uploads
            .clone()
            .unwrap_or_else(|| self.static_dir.join("uploads"))
    }

    pub fn triposr_out_dir(&self) -> PathBuf {
        self.triposr_out
            .clone()
            .unwrap_or_else(|| self.static_dir.join("triposr"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoverBackend {
    /// The rembg command line tool
    #[default]
    Command,
    /// Border colour keying, no external tool needed
    ColorKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RembgConfig {
    pub backend: RemoverBackend,
    pub program: String,
    /// `{input}` and `{output}` are substituted
    pub args: Vec<String>,
    pub color_key_tolerance: u8,
}

impl Default for RembgConfig {
    fn default() -> Self {
        Self {
            backend: RemoverBackend::Command,
            program: "rembg".into(),
            args: vec!["i".into(), "{input}".into(), "{output}".into()],
            color_key_tolerance: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub model_id: String,
    pub default_steps: u32,
    pub default_guidance: f32,
    pub program: String,
    /// Starts the long-lived worker; `{model}` is substituted
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let args = [
            "scripts/generate.py",
            "--serve",
            "--model",
            "{model}",
        ];
        Self {
            model_id: "segmind/SSD-1B".into(),
            default_steps: 20,
            default_guidance: 7.0,
            program: "python3".into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            workdir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripoSrConfig {
    /// Directory containing TripoSR's `run.py`
    pub dir: PathBuf,
    pub python: String,
    pub script: String,
    pub bake_texture: bool,
    pub texture_resolution: u32,
}

impl Default for TripoSrConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            python: "python3".into(),
            script: "run.py".into(),
            bake_texture: true,
            texture_resolution: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub paths: PathsConfig,
    pub rembg: RembgConfig,
    pub generator: GeneratorConfig,
    pub triposr: TripoSrConfig,
}

impl StudioConfig {
    /// Load from `path` (if any), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_STATIC_DIR) {
            self.paths.static_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_TRIPOSR_DIR) {
            self.triposr.dir = PathBuf::from(dir);
        }
        if let Some(python) = lookup(ENV_PYTHON) {
            self.triposr.python = python.clone();
            self.generator.program = python;
        }
    }

    /// Create the upload and reconstruction output folders.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.paths.upload_dir())?;
        std::fs::create_dir_all(self.paths.triposr_out_dir())?;
        Ok(())
    }
}
