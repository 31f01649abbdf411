//! Chunked bulk generation.
//!
//! A [`BatchRun`] produces the artifacts of one [`GenerationRequest`] chunk by
//! chunk. [`BatchRun::step`] does the synchronous work of a single chunk;
//! [`drive`] repeats it and yields to the async scheduler in between, which is
//! the only suspension point of a run. Cancellation is requested through a
//! caller owned [`CancellationToken`] and observed before each chunk.
//!
//! [`GenerationRequest`]: crate::GenerationRequest
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod driver;
mod run;
mod session;

pub use driver::drive;
pub use run::BatchRun;
pub use session::Session;

use crate::common::RunFailure;
use crate::encoder::ImagePayload;

// Artifact
//------------------------------------------------------------------------------

/// One generated code. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeArtifact {
    sequence_id: u32,
    code_text: String,
    image: ImagePayload,
}

impl CodeArtifact {
    pub fn new(sequence_id: u32, code_text: String, image: ImagePayload) -> Self {
        Self { sequence_id, code_text, image }
    }

    /// 1-based position inside the run.
    pub fn sequence_id(&self) -> u32 {
        self.sequence_id
    }

    pub fn code_text(&self) -> &str {
        &self.code_text
    }

    pub fn image(&self) -> &ImagePayload {
        &self.image
    }
}

// Status
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// No run has been started in the session.
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed(RunFailure),
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed(_))
    }
}

/// Snapshot handed to progress observers after every chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub completed: u32,
    pub total: u32,
    pub status: RunStatus,
}

impl Progress {
    /// Completed share of the run in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.completed) / f64::from(self.total)
    }
}

// Run state
//------------------------------------------------------------------------------

/// Results of a run. Artifacts are append-only and kept in sequence order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    artifacts: Vec<CodeArtifact>,
    total: u32,
    status: RunStatus,
}

impl RunState {
    pub(crate) fn new(total: u32) -> Self {
        Self { artifacts: Vec::with_capacity(total as usize), total, status: RunStatus::Running }
    }

    pub fn artifacts(&self) -> &[CodeArtifact] {
        &self.artifacts
    }

    pub fn completed(&self) -> u32 {
        self.artifacts.len() as u32
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn progress(&self) -> Progress {
        Progress { completed: self.completed(), total: self.total, status: self.status.clone() }
    }

    pub fn into_artifacts(self) -> Vec<CodeArtifact> {
        self.artifacts
    }
}
