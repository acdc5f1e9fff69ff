//! Core of the compositing studio: configuration, upload bookkeeping, 2D
//! compositing, external tool adapters and the operations built on them.
//! Shared by the web server and the desktop demo.

pub mod compose;
pub mod config;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod storage;
pub mod tools;

use serde::{Deserialize, Serialize};

pub use compose::{CanvasRect, CanvasSize, Placement};
pub use config::StudioConfig;
pub use discovery::ReconstructionOutputs;
pub use error::{ErrorKind, Result, StudioError};
pub use pipeline::{PreparedPair, Studio, ViewUpload};
pub use storage::UploadStore;
pub use tools::GenerationRequest;

/// Answer to `/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub image1: String,
    pub image2_nobg: String,
}

/// Answer to `/prompt_fg` and `/upload_3d_view`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForegroundResponse {
    pub fg: String,
}

/// Answer to `/blend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendResponse {
    #[serde(rename = "final")]
    pub final_url: String,
}

/// Answer to `/triposr`; any of the URLs may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconstructionResponse {
    pub model: Option<String>,
    pub render: Option<String>,
    pub texture: Option<String>,
}

impl ReconstructionResponse {
    pub fn from_outputs(outputs: &ReconstructionOutputs, store: &UploadStore) -> Self {
        let url = |p: &Option<std::path::PathBuf>| p.as_deref().and_then(|p| store.url_for(p));
        Self {
            model: url(&outputs.model),
            render: url(&outputs.render),
            texture: url(&outputs.texture),
        }
    }
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
