//! Error types shared by both front ends.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StudioError>;

/// Everything a studio operation can fail with.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Missing {0}")]
    MissingInput(&'static str),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Scale factor must be positive (got {0})")]
    InvalidScale(f64),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Could not decode data: {0}")]
    Decode(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error at `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} is not available: {detail}")]
    ToolMissing { tool: &'static str, detail: String },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error(
        "TripoSR finished but no 3D model (.obj / .glb / .gltf) was found in `{}`",
        .0.display()
    )]
    NoModelOutput(PathBuf),
}

/// Coarse classification used by front ends to pick a status code or banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Client,
    NotFound,
    Server,
}

impl StudioError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StudioError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StudioError::MissingInput(_)
            | StudioError::UnsupportedFormat(_)
            | StudioError::InvalidScale(_)
            | StudioError::InvalidDimensions(_)
            | StudioError::Decode(_) => ErrorKind::Client,
            StudioError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Server,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(StudioError::MissingInput("prompt").kind(), ErrorKind::Client);
        assert_eq!(StudioError::InvalidScale(0.0).kind(), ErrorKind::Client);
        assert_eq!(
            StudioError::NotFound("Foreground image".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(StudioError::ModelLoad("boom".into()).kind(), ErrorKind::Server);
        assert!(!StudioError::NoModelOutput(PathBuf::from("out")).is_client_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(StudioError::MissingInput("prompt").to_string(), "Missing prompt");
        assert_eq!(
            StudioError::NotFound("Foreground image".into()).to_string(),
            "Foreground image not found"
        );
    }
}
