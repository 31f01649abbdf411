use rand::{rngs::StdRng, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::{drive, BatchRun, CodeArtifact, Progress, RunStatus};
use crate::common::{Config, ExportResult, ValidationErrors};
use crate::encoder::{CodeEncoder, Encoder};
use crate::export::{export_to_table, ExportDocument};
use crate::request::GenerationRequest;

struct ActiveRun<E> {
    run: BatchRun<E, StdRng>,
    token: CancellationToken,
}

// Session
//------------------------------------------------------------------------------

/// Holds the single run of a user session.
///
/// Starting a run while the current one is still running cancels the current
/// one first, then replaces it. A rejected request leaves the current run and
/// its results untouched.
pub struct Session<E = CodeEncoder> {
    cfg: Config,
    encoder: E,
    active: Option<ActiveRun<E>>,
}

impl Session<CodeEncoder> {
    pub fn with_config(cfg: Config) -> Self {
        let encoder = CodeEncoder::new(cfg.render.clone());
        Self::new(cfg, encoder)
    }
}

impl Default for Session<CodeEncoder> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl<E: Encoder + Clone> Session<E> {
    pub fn new(cfg: Config, encoder: E) -> Self {
        Self { cfg, encoder, active: None }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Validates `req` and makes it the active run.
    ///
    /// Returns the token of the new run; cancelling it stops the run at the
    /// next chunk boundary.
    #[instrument(skip_all, fields(format = %req.format, method = ?req.method, quantity = req.quantity))]
    pub fn start(&mut self, req: GenerationRequest) -> Result<CancellationToken, ValidationErrors> {
        let run = BatchRun::new(req, &self.cfg, self.encoder.clone(), StdRng::from_os_rng())
            .inspect_err(|e| info!(error = %e, "Request rejected"))?;

        if let Some(mut prev) = self.active.take() {
            if !prev.run.status().is_terminal() {
                warn!(completed = prev.run.state().completed(), "Cancelling the active run");
                prev.token.cancel();
                prev.run.step(&prev.token);
            }
        }

        let token = CancellationToken::new();
        self.active = Some(ActiveRun { run, token: token.clone() });
        Ok(token)
    }

    /// Produces one chunk of the active run.
    pub fn step(&mut self) -> RunStatus {
        match self.active.as_mut() {
            Some(a) => a.run.step(&a.token).clone(),
            None => RunStatus::Idle,
        }
    }

    /// Drives the active run to a terminal status.
    #[instrument(skip_all)]
    pub async fn drive<F: FnMut(&Progress)>(&mut self, observe: F) -> RunStatus {
        match self.active.as_mut() {
            Some(a) => drive(&mut a.run, &a.token, observe).await,
            None => RunStatus::Idle,
        }
    }

    /// Requests cancellation of the active run. No-op once it is terminal.
    pub fn cancel(&self) {
        if let Some(a) = &self.active {
            if !a.run.status().is_terminal() {
                a.token.cancel();
            }
        }
    }

    pub fn status(&self) -> RunStatus {
        self.active.as_ref().map_or(RunStatus::Idle, |a| a.run.status().clone())
    }

    pub fn progress(&self) -> Option<Progress> {
        self.active.as_ref().map(|a| a.run.progress())
    }

    /// Artifacts of the active run, including partial results of a cancelled
    /// or failed run.
    pub fn artifacts(&self) -> &[CodeArtifact] {
        match &self.active {
            Some(a) => a.run.state().artifacts(),
            None => &[],
        }
    }

    pub fn export(&self) -> ExportResult<ExportDocument> {
        export_to_table(self.artifacts(), &self.cfg.export)
    }
}
