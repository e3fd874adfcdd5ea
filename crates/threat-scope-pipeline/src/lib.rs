#![warn(missing_docs)]
//! # threat-scope-pipeline
//!
//! ## Purpose
//! Implements the analysis pipeline: the `Idle -> Processing ->
//! Completed | Failed` state machine and the worker runner that drives it.
//!
//! ## Responsibilities
//! - Guarantee consumers observe `Processing` before any terminal state.
//! - Allow at most one in-flight job per pipeline; a new submission cancels
//!   the previous job's right to report.
//! - Drop stale worker completions so an old job never overwrites a newer
//!   submission's state (lost-update guard).
//! - Surface decode and synthesis failures as recoverable `Failed` states.
//!
//! ## Data flow
//! Dashboard submits an [`ImagePayload`] -> [`AnalysisPipeline::submit`] bumps
//! the generation and enters `Processing` -> a worker thread sleeps the
//! configured latency and runs the synthesizer -> its [`JobEvent`] flows back
//! over an mpsc channel -> [`AnalysisPipeline::apply_event`] accepts it only
//! when the generation still matches.
//!
//! ## Ownership and lifetimes
//! The pipeline owns its state; workers own a payload clone and a channel
//! sender. Superseded workers finish detached and their send result is
//! ignored.
//!
//! ## Error model
//! Submission precondition failures return [`PipelineError`]; job outcomes
//! carry [`PipelineFailure`] reasons that keep resubmission possible.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;
use threat_scope_intake::{ImagePayload, IntakeConfig, content_digest_hex};
use threat_scope_report::DetectionReport;
use threat_scope_synth::{ReportSynthesizer, SynthesisError};

/// Simulated analysis latency used by the demo shell, in milliseconds.
pub const DEFAULT_ANALYSIS_LATENCY_MS: u64 = 2_000;

/// Identity of one submission accepted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionId {
    /// Monotonic per-pipeline submission counter.
    pub generation: u64,
    /// Content digest of the submitted payload.
    pub digest_hex: String,
}

/// Observable pipeline state.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// No submission yet, or the pipeline was reset.
    Idle,
    /// A job is in flight for this submission.
    Processing {
        /// The active submission.
        submission: SubmissionId,
    },
    /// The newest submission finished with a report.
    Completed {
        /// The submission the report belongs to.
        submission: SubmissionId,
        /// The produced report.
        report: DetectionReport,
    },
    /// The newest submission failed; the user may resubmit.
    Failed {
        /// The submission that failed.
        submission: SubmissionId,
        /// Failure classification.
        reason: PipelineFailure,
    },
}

/// Work order handed to a worker for one submission.
#[derive(Debug, Clone)]
pub struct JobTicket {
    /// Generation the worker must stamp on its event.
    pub generation: u64,
    /// Payload to analyze.
    pub payload: ImagePayload,
}

/// Terminal outcome produced by a worker.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Analysis produced a report.
    Completed(DetectionReport),
    /// Analysis failed.
    Failed(PipelineFailure),
}

/// Worker completion message.
#[derive(Debug, Clone, PartialEq)]
pub struct JobEvent {
    /// Generation stamped at submission time.
    pub generation: u64,
    /// Digest of the analyzed payload.
    pub digest_hex: String,
    /// Terminal outcome.
    pub outcome: JobOutcome,
}

/// Analysis pipeline state machine.
///
/// Pure sequencing logic with no threads of its own; [`PipelineRunner`] wires
/// it to workers. Keeping the machine synchronous makes the lost-update guard
/// directly testable.
#[derive(Debug)]
pub struct AnalysisPipeline {
    generation: u64,
    state: PipelineState,
}

impl AnalysisPipeline {
    /// Creates an idle pipeline.
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: PipelineState::Idle,
        }
    }

    /// Returns the current state snapshot.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Returns the current submission generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn begin_submission(&mut self, digest_hex: String) -> SubmissionId {
        self.generation += 1;
        let submission = SubmissionId {
            generation: self.generation,
            digest_hex,
        };
        self.state = PipelineState::Processing {
            submission: submission.clone(),
        };
        submission
    }

    /// Accepts a new submission and enters `Processing`.
    ///
    /// Bumping the generation revokes any in-flight job's right to report:
    /// its later event no longer matches and is dropped by
    /// [`AnalysisPipeline::apply_event`].
    ///
    /// # Errors
    /// Returns [`PipelineError::EmptyPayload`] for zero-length payloads.
    pub fn submit(&mut self, payload: ImagePayload) -> Result<JobTicket, PipelineError> {
        if payload.is_empty() {
            return Err(PipelineError::EmptyPayload);
        }

        let submission = self.begin_submission(payload.digest_hex.clone());
        Ok(JobTicket {
            generation: submission.generation,
            payload,
        })
    }

    /// Records a submission whose payload failed decoding.
    ///
    /// The submission passes through `Processing` and lands in `Failed` within
    /// this call, so the observable sequence stays
    /// `Processing -> Failed` for the same generation.
    pub fn submit_undecodable(&mut self, digest_hex: impl Into<String>, reason: PipelineFailure) {
        let submission = self.begin_submission(digest_hex.into());
        self.state = PipelineState::Failed { submission, reason };
    }

    /// Applies a worker event; returns `true` when the state advanced.
    ///
    /// Events are discarded when their generation is stale or the pipeline is
    /// no longer `Processing`. This is the lost-update guard: at most one
    /// terminal transition happens per submission, and it always carries the
    /// newest submission's outcome.
    pub fn apply_event(&mut self, event: JobEvent) -> bool {
        let PipelineState::Processing { submission } = &self.state else {
            return false;
        };
        if event.generation != self.generation || event.generation != submission.generation {
            return false;
        }

        let submission = submission.clone();
        self.state = match event.outcome {
            JobOutcome::Completed(report) => PipelineState::Completed { submission, report },
            JobOutcome::Failed(reason) => PipelineState::Failed { submission, reason },
        };
        true
    }

    /// Cancels any in-flight job and returns to `Idle`.
    ///
    /// Used on dashboard teardown; the generation bump orphans pending worker
    /// events.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.state = PipelineState::Idle;
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one job to completion: simulated latency, then synthesis.
///
/// The send result is intentionally ignored; a dropped receiver means the
/// pipeline was torn down.
pub fn spawn_job(
    synthesizer: Arc<dyn ReportSynthesizer>,
    ticket: JobTicket,
    latency: Duration,
    events: Sender<JobEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        std::thread::sleep(latency);

        let outcome = match synthesizer.synthesize(&ticket.payload) {
            Ok(report) => JobOutcome::Completed(report),
            Err(error) => JobOutcome::Failed(PipelineFailure::Synthesis(error.to_string())),
        };

        let _ = events.send(JobEvent {
            generation: ticket.generation,
            digest_hex: ticket.payload.digest_hex.clone(),
            outcome,
        });
    })
}

/// Pipeline plus worker plumbing for one dashboard instance.
pub struct PipelineRunner {
    pipeline: AnalysisPipeline,
    synthesizer: Arc<dyn ReportSynthesizer>,
    latency: Duration,
    events_tx: Sender<JobEvent>,
    events_rx: Receiver<JobEvent>,
    worker: Option<JoinHandle<()>>,
}

impl PipelineRunner {
    /// Creates a runner around the given synthesizer and latency.
    pub fn new(synthesizer: Arc<dyn ReportSynthesizer>, latency: Duration) -> Self {
        let (events_tx, events_rx) = channel();
        Self {
            pipeline: AnalysisPipeline::new(),
            synthesizer,
            latency,
            events_tx,
            events_rx,
            worker: None,
        }
    }

    /// Returns the current pipeline state.
    pub fn state(&self) -> &PipelineState {
        self.pipeline.state()
    }

    /// Submits a payload, cancelling any in-flight job, and spawns its worker.
    ///
    /// The superseded worker keeps running detached; its event arrives stale
    /// and is dropped during [`PipelineRunner::poll`].
    ///
    /// # Errors
    /// Propagates [`AnalysisPipeline::submit`] precondition failures.
    pub fn submit(&mut self, payload: ImagePayload) -> Result<(), PipelineError> {
        let ticket = self.pipeline.submit(payload)?;
        let handle = spawn_job(
            Arc::clone(&self.synthesizer),
            ticket,
            self.latency,
            self.events_tx.clone(),
        );
        self.worker = Some(handle);
        Ok(())
    }

    /// Validates raw picker bytes and submits them.
    ///
    /// Undecodable-but-non-empty buffers are accepted as a submission that
    /// immediately fails with a decode reason, keeping the retry affordance
    /// on the dashboard side.
    ///
    /// # Errors
    /// Returns [`PipelineError::EmptyPayload`] for zero-length buffers.
    pub fn submit_bytes(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        config: &IntakeConfig,
    ) -> Result<(), PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyPayload);
        }

        let digest_hex = content_digest_hex(&bytes);
        match ImagePayload::from_bytes(file_name, bytes, config) {
            Ok(payload) => self.submit(payload),
            Err(error) => {
                self.pipeline
                    .submit_undecodable(digest_hex, PipelineFailure::Decode(error.to_string()));
                Ok(())
            }
        }
    }

    /// Drains pending worker events; returns `true` when the state advanced.
    pub fn poll(&mut self) -> bool {
        let mut advanced = false;
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    if self.pipeline.apply_event(event) {
                        advanced = true;
                    }
                }
                Err(TryRecvError::Empty) => break,
                // Sender end lives in self, so this arm is unreachable in
                // practice; treat it as a quiet stop.
                Err(TryRecvError::Disconnected) => break,
            }
        }
        advanced
    }

    /// Cancels the in-flight job and resets to `Idle`.
    pub fn cancel(&mut self) {
        self.pipeline.cancel();
    }

    /// Cancels and joins the most recent worker. Blocks up to one latency.
    pub fn shutdown(mut self) {
        self.pipeline.cancel();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

/// Submission precondition errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Payload had no bytes.
    #[error("cannot analyze an empty payload")]
    EmptyPayload,
}

/// Classified reasons for a failed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineFailure {
    /// Payload could not be decoded as an image.
    #[error("image decode failure: {0}")]
    Decode(String),
    /// Analysis backend failed.
    #[error("analysis failure: {0}")]
    Synthesis(String),
}

impl From<SynthesisError> for PipelineFailure {
    fn from(error: SynthesisError) -> Self {
        Self::Synthesis(error.to_string())
    }
}
