use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{CodeArtifact, Progress, RunState, RunStatus};
use crate::common::{Config, RunFailure, ValidationErrors};
use crate::encoder::Encoder;
use crate::identity::CodeIdentity;
use crate::request::GenerationRequest;

// Batch run
//------------------------------------------------------------------------------

/// A validated run of one request.
pub struct BatchRun<E, R> {
    req: GenerationRequest,
    ident: CodeIdentity,
    encoder: E,
    rng: R,
    chunk_sz: u32,
    state: RunState,
}

impl<E: Encoder, R: Rng> BatchRun<E, R> {
    /// Validates `req` and prepares a run with zero progress.
    pub fn new(
        req: GenerationRequest,
        cfg: &Config,
        encoder: E,
        rng: R,
    ) -> Result<Self, ValidationErrors> {
        req.validate(cfg.max_quantity)?;

        let total = req.count();
        info!(format = %req.format, method = ?req.method, total, "Starting run");
        Ok(Self {
            req,
            ident: CodeIdentity::from(cfg),
            encoder,
            rng,
            chunk_sz: u32::try_from(cfg.chunk_size).unwrap_or(u32::MAX).max(1),
            state: RunState::new(total),
        })
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.req
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn status(&self) -> &RunStatus {
        &self.state.status
    }

    pub fn progress(&self) -> Progress {
        self.state.progress()
    }

    pub fn into_state(self) -> RunState {
        self.state
    }

    /// Produces the next chunk.
    ///
    /// The token is checked once, before any item of the chunk is produced.
    /// The chunk is appended as a whole, so observers never see a partial
    /// one. On an encoding failure the items produced before the failing one
    /// are kept and the run ends as [`RunStatus::Failed`]. Once terminal,
    /// further calls change nothing.
    pub fn step(&mut self, token: &CancellationToken) -> &RunStatus {
        if self.state.status.is_terminal() {
            return &self.state.status;
        }

        if token.is_cancelled() {
            info!(completed = self.state.completed(), total = self.state.total, "Run cancelled");
            self.state.status = RunStatus::Cancelled;
            return &self.state.status;
        }

        let done = self.state.completed();
        let end = done.saturating_add(self.chunk_sz).min(self.state.total);
        let mut chunk = Vec::with_capacity((end - done) as usize);
        let mut failure = None;

        for idx in done..end {
            let code = self.ident.produce(&self.req, idx, &mut self.rng);
            match self.encoder.encode(&code, self.req.format) {
                Ok(img) => chunk.push(CodeArtifact::new(idx + 1, code, img)),
                Err(e) => {
                    failure = Some(RunFailure {
                        sequence_id: idx + 1,
                        code_text: code,
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        self.state.artifacts.extend(chunk);
        debug!(completed = self.state.completed(), total = self.state.total, "Chunk appended");

        if let Some(f) = failure {
            warn!(error = %f, completed = self.state.completed(), "Run failed");
            self.state.status = RunStatus::Failed(f);
        } else if self.state.completed() == self.state.total {
            info!(total = self.state.total, "Run completed");
            self.state.status = RunStatus::Completed;
        }

        &self.state.status
    }
}

#[cfg(test)]
pub(crate) mod run_tests {
    use std::cell::Cell;
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};
    use test_case::test_case;
    use tokio_util::sync::CancellationToken;

    use super::BatchRun;
    use crate::batch::RunStatus;
    use crate::common::{Config, EncodeError, EncodeResult, Field, Format, Method};
    use crate::encoder::{Encoder, ImagePayload};
    use crate::request::GenerationRequest;

    /// Encoder producing a tiny fake payload, optionally failing on one code.
    #[derive(Default)]
    pub(crate) struct StubEncoder {
        pub fail_on: Option<String>,
        pub calls: Cell<usize>,
    }

    impl Encoder for StubEncoder {
        fn encode(&self, text: &str, _format: Format) -> EncodeResult<ImagePayload> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_on.as_deref() == Some(text) {
                return Err(EncodeError::Linear(format!("cannot encode {text}")));
            }
            Ok(ImagePayload::png(text.as_bytes().to_vec()))
        }
    }

    fn cfg(chunk_size: usize) -> Config {
        Config { chunk_size, ..Default::default() }
    }

    fn serial(prefix: &str, start: i64, qty: i64) -> GenerationRequest {
        GenerationRequest::new(Format::Matrix, Method::Serial)
            .with_prefix(prefix)
            .with_start_number(start)
            .with_quantity(qty)
    }

    fn new_run(
        req: GenerationRequest,
        chunk_size: usize,
        enc: &StubEncoder,
    ) -> BatchRun<&StubEncoder, StdRng> {
        BatchRun::new(req, &cfg(chunk_size), enc, StdRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn test_example_run() {
        let enc = StubEncoder::default();
        let mut run = new_run(serial("A", 1, 3), 100, &enc);
        let token = CancellationToken::new();

        assert_eq!(*run.step(&token), RunStatus::Completed);
        let codes: Vec<_> = run.state().artifacts().iter().map(|a| a.code_text()).collect();
        assert_eq!(codes, ["A00001", "A00002", "A00003"]);
        let ids: Vec<_> = run.state().artifacts().iter().map(|a| a.sequence_id()).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(run.progress().ratio(), 1.0);
    }

    #[test]
    fn test_rejected_request() {
        let enc = StubEncoder::default();
        let err = BatchRun::new(serial("A", 0, 5), &cfg(100), &enc, StdRng::seed_from_u64(0))
            .err()
            .unwrap();
        assert!(err.get(Field::StartNumber).is_some());
        assert_eq!(enc.calls.get(), 0);
    }

    #[test_case(250, 100, &[100, 200, 250])]
    #[test_case(100, 100, &[100])]
    #[test_case(7, 3, &[3, 6, 7])]
    #[test_case(1, 100, &[1])]
    fn test_chunk_progress(qty: i64, chunk: usize, exp: &[u32]) {
        let enc = StubEncoder::default();
        let mut run = new_run(serial("", 1, qty), chunk, &enc);
        let token = CancellationToken::new();

        let mut seen = Vec::new();
        while !run.step(&token).is_terminal() {
            seen.push(run.progress().completed);
        }
        seen.push(run.progress().completed);

        assert_eq!(seen, exp);
        assert_eq!(*run.status(), RunStatus::Completed);
        assert_eq!(enc.calls.get(), qty as usize);
    }

    #[test]
    fn test_cancel_before_first_chunk() {
        let enc = StubEncoder::default();
        let mut run = new_run(serial("A", 1, 500), 100, &enc);
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(*run.step(&token), RunStatus::Cancelled);
        assert!(run.state().artifacts().is_empty());
        assert_eq!(enc.calls.get(), 0);
    }

    #[test_case(1)]
    #[test_case(3)]
    fn test_cancel_after_chunks(k: usize) {
        let enc = StubEncoder::default();
        let mut run = new_run(serial("A", 1, 1000), 100, &enc);
        let token = CancellationToken::new();

        for _ in 0..k {
            assert_eq!(*run.step(&token), RunStatus::Running);
        }
        token.cancel();
        assert_eq!(*run.step(&token), RunStatus::Cancelled);
        assert_eq!(run.state().artifacts().len(), k * 100);
        assert_eq!(run.progress().ratio(), k as f64 / 10.0);

        // Progress stops advancing once cancelled
        assert_eq!(*run.step(&token), RunStatus::Cancelled);
        assert_eq!(run.state().artifacts().len(), k * 100);
    }

    #[test]
    fn test_cancel_after_completion_is_noop() {
        let enc = StubEncoder::default();
        let mut run = new_run(serial("A", 1, 100), 100, &enc);
        let token = CancellationToken::new();

        assert_eq!(*run.step(&token), RunStatus::Completed);
        token.cancel();
        assert_eq!(*run.step(&token), RunStatus::Completed);
        assert_eq!(run.state().artifacts().len(), 100);
    }

    #[test]
    fn test_failure_keeps_partial_results() {
        let enc = StubEncoder { fail_on: Some("B00150".to_string()), ..Default::default() };
        let mut run = new_run(serial("b", 1, 300), 100, &enc);
        let token = CancellationToken::new();

        assert_eq!(*run.step(&token), RunStatus::Running);
        let RunStatus::Failed(f) = run.step(&token).clone() else { panic!("Expected failure") };
        assert_eq!(f.sequence_id, 150);
        assert_eq!(f.code_text, "B00150");

        let arts = run.state().artifacts();
        assert_eq!(arts.len(), 149);
        assert_eq!(arts.last().unwrap().sequence_id(), 149);

        // No retry after failing
        let calls = enc.calls.get();
        assert!(run.step(&token).is_terminal());
        assert_eq!(enc.calls.get(), calls);
    }

    #[test_case(0; "zero")]
    #[test_case(1 << 32; "wider than u32")]
    #[test_case(usize::MAX; "max")]
    fn test_unchecked_chunk_size_still_progresses(chunk_size: usize) {
        let enc = StubEncoder::default();
        let mut run = new_run(serial("A", 1, 3), chunk_size, &enc);
        let token = CancellationToken::new();

        assert_eq!(*run.step(&token), RunStatus::Completed);
        assert_eq!(run.state().artifacts().len(), 3);
    }

    #[test]
    fn test_random_run_accepts_duplicates() {
        let enc = StubEncoder::default();
        let req = GenerationRequest::new(Format::Linear, Method::Random).with_quantity(1000);
        let cfg = Config { random_len: 1, ..Default::default() };
        let mut run = BatchRun::new(req, &cfg, &enc, StdRng::seed_from_u64(5)).unwrap();
        let token = CancellationToken::new();
        while !run.step(&token).is_terminal() {}

        // A single character suffix over 1000 items must collide
        assert_eq!(*run.status(), RunStatus::Completed);
        assert_eq!(run.state().artifacts().len(), 1000);
        let distinct: HashSet<_> = run.state().artifacts().iter().map(|a| a.code_text()).collect();
        assert!(distinct.len() <= 36);
    }
}
