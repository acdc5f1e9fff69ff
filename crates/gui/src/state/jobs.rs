//! Background jobs.
//!
//! Background removal, blending and TripoSR can take seconds to minutes, so
//! each runs on its own thread and reports back over a channel that the UI
//! polls every frame.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use image::{DynamicImage, RgbImage};
use shared::{PreparedPair, Studio, StudioError};

use super::settings::PlacementSettings;
use crate::mesh::{self, MeshData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Prepare,
    Blend,
    Reconstruct,
}

impl JobKind {
    pub fn status_key(self) -> &'static str {
        match self {
            JobKind::Prepare => "status.preparing",
            JobKind::Blend => "status.blending",
            JobKind::Reconstruct => "status.reconstructing",
        }
    }
}

pub enum Job {
    Prepare {
        background: DynamicImage,
        foreground: DynamicImage,
    },
    Blend {
        background: Arc<DynamicImage>,
        foreground: Arc<DynamicImage>,
        placement: PlacementSettings,
    },
    Reconstruct {
        foreground: Arc<DynamicImage>,
    },
}

#[derive(Debug)]
pub enum JobOutcome {
    Prepared(PreparedPair),
    Blended(RgbImage),
    Reconstructed {
        path: PathBuf,
        /// `None` when the file cannot be previewed
        mesh: Option<MeshData>,
    },
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::Prepare { .. } => JobKind::Prepare,
            Job::Blend { .. } => JobKind::Blend,
            Job::Reconstruct { .. } => JobKind::Reconstruct,
        }
    }

    pub fn run(self, studio: &Studio) -> Result<JobOutcome, StudioError> {
        match self {
            Job::Prepare {
                background,
                foreground,
            } => studio
                .prepare_pair(&background, &foreground)
                .map(JobOutcome::Prepared),
            Job::Blend {
                background,
                foreground,
                placement,
            } => studio
                .blend_centered(
                    &background,
                    &foreground,
                    placement.x_offset,
                    placement.y_offset,
                    placement.scale,
                )
                .map(JobOutcome::Blended),
            Job::Reconstruct { foreground } => {
                let path = studio.reconstruct_model(&foreground)?;
                let mesh = mesh::load_preview(&path)
                    .inspect_err(|e| tracing::warn!("no preview for {}: {e}", path.display()))
                    .ok();
                Ok(JobOutcome::Reconstructed { path, mesh })
            }
        }
    }
}

/// A job running on a worker thread.
pub struct JobHandle {
    kind: JobKind,
    rx: Receiver<Result<JobOutcome, StudioError>>,
}

impl JobHandle {
    pub fn spawn(studio: Arc<Studio>, job: Job, repaint: Option<egui::Context>) -> Self {
        let kind = job.kind();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = job.run(&studio);
            // The receiver is gone when the app closed mid-job
            let _ = tx.send(result);
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
        Self { kind, rx }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// `None` while the job is still running.
    pub fn try_take(&self) -> Option<Result<JobOutcome, StudioError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    pub fn wait(self) -> Result<JobOutcome, StudioError> {
        self.rx.recv().unwrap_or_else(|_| Err(worker_lost()))
    }
}

fn worker_lost() -> StudioError {
    StudioError::ToolFailed {
        tool: "worker",
        status: "panicked".into(),
        stderr: String::new(),
    }
}
