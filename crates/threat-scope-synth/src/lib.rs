#![warn(missing_docs)]
//! # threat-scope-synth
//!
//! ## Purpose
//! Defines the report synthesizer capability consumed by the analysis
//! pipeline, with a deterministic mock and a remote-backend variant.
//!
//! ## Responsibilities
//! - Abstract report production behind [`ReportSynthesizer`].
//! - Provide a seedable [`MockSynthesizer`] whose output always satisfies the
//!   report invariants.
//! - Provide [`RemoteSynthesizer`] with endpoint policy validation and bounded
//!   retry over an injectable transport.
//!
//! ## Data flow
//! Pipeline worker passes an [`ImagePayload`] -> synthesizer returns a
//! [`DetectionReport`] or [`SynthesisError`] -> pipeline maps the outcome into
//! its terminal state.
//!
//! ## Ownership and lifetimes
//! Synthesizers are shared as `Arc<dyn ReportSynthesizer>` across worker
//! threads; all outputs are owned values.
//!
//! ## Error model
//! Endpoint policy violations, transport failures, and contract-violating
//! responses surface as [`SynthesisError`]; the mock variant is infallible in
//! practice but keeps the fallible signature real backends need.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use threat_scope_intake::ImagePayload;
use threat_scope_report::{
    DetectedObject, DetectionReport, FaceFinding, Gender, GeoCoordinates, LocationFinding,
    PersonFinding, ReportError, ThreatLevel,
};
use url::Url;

/// Capability interface the pipeline depends on.
///
/// Implementations must uphold the report invariants: the pipeline trusts the
/// returned report without re-validating defensively on the hot path.
pub trait ReportSynthesizer: Send + Sync {
    /// Produces a detection report for one image payload.
    ///
    /// # Errors
    /// Returns [`SynthesisError`] when the backing analysis fails.
    fn synthesize(&self, payload: &ImagePayload) -> Result<DetectionReport, SynthesisError>;
}

/// Deterministic mock synthesizer.
///
/// The same `(seed, payload)` pair always yields the same report, which keeps
/// pipeline tests and demo runs reproducible.
#[derive(Debug, Clone, Copy)]
pub struct MockSynthesizer {
    seed: u64,
}

impl MockSynthesizer {
    /// Creates a mock synthesizer with the given base seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ReportSynthesizer for MockSynthesizer {
    fn synthesize(&self, payload: &ImagePayload) -> Result<DetectionReport, SynthesisError> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ payload.digest_seed());

        let face = FaceFinding {
            detected: true,
            confidence: 0.94,
            emotions: vec!["Neutral".to_string(), "Alert".to_string()],
        };
        let person = PersonFinding {
            gender: if rng.random_bool(0.5) {
                Gender::Male
            } else {
                Gender::Female
            },
            age_years: rng.random_range(20..60),
            confidence: 0.87,
        };
        let objects = vec![
            DetectedObject {
                name: "Backpack".to_string(),
                confidence: 0.91,
            },
            DetectedObject {
                name: "Phone".to_string(),
                confidence: 0.88,
            },
            DetectedObject {
                name: "Watch".to_string(),
                confidence: 0.76,
            },
        ];
        let location = Some(LocationFinding {
            address: "Airport Road, Mumbai - 400099".to_string(),
            coordinates: Some(GeoCoordinates {
                latitude: 19.0896,
                longitude: 72.8656,
            }),
        });
        let threat_level = ThreatLevel::new(rng.random_range(1..=5))?;

        Ok(DetectionReport::new(
            face,
            person,
            objects,
            "Gate 5, Terminal 2, Airport Road, Mumbai - 400099",
            location,
            threat_level,
        )?)
    }
}

/// Bounded retry policy for remote synthesis calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts including the first one.
    pub max_attempts: u32,
    /// Base delay before the first retry.
    pub base_delay_ms: u64,
    /// Cap applied to the exponential backoff.
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Returns the backoff delay before retry number `retry` (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let delay = self
            .base_delay_ms
            .saturating_mul(1_u64 << exponent)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2_000,
        }
    }
}

/// Abstract transport used by the remote synthesizer.
pub trait InferenceTransport: Send + Sync {
    /// Sends payload bytes to the inference endpoint and returns raw report
    /// JSON.
    ///
    /// # Errors
    /// Returns [`SynthesisError::Transport`] for network-class failures.
    fn analyze(&self, endpoint: &str, payload: &ImagePayload) -> Result<Vec<u8>, SynthesisError>;
}

/// Remote inference synthesizer with endpoint policy and bounded retry.
#[derive(Clone)]
pub struct RemoteSynthesizer {
    endpoint: String,
    retry: RetryPolicy,
    transport: Arc<dyn InferenceTransport>,
}

impl RemoteSynthesizer {
    /// Creates a validated remote synthesizer.
    ///
    /// # Errors
    /// Returns [`SynthesisError::InvalidEndpoint`] when the URL does not parse
    /// or is not HTTPS.
    pub fn new(
        endpoint: impl Into<String>,
        retry: RetryPolicy,
        transport: Arc<dyn InferenceTransport>,
    ) -> Result<Self, SynthesisError> {
        let endpoint = endpoint.into();
        validate_inference_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            retry,
            transport,
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ReportSynthesizer for RemoteSynthesizer {
    fn synthesize(&self, payload: &ImagePayload) -> Result<DetectionReport, SynthesisError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.analyze(&self.endpoint, payload) {
                Ok(raw) => {
                    let report = DetectionReport::from_json_bytes(&raw)
                        .map_err(SynthesisError::InvalidReport)?;
                    return Ok(report);
                }
                Err(error @ SynthesisError::Transport(_)) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(error);
                    }
                    std::thread::sleep(self.retry.backoff_delay(attempt));
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Validates remote inference endpoint constraints.
///
/// # Errors
/// Returns [`SynthesisError::InvalidEndpoint`] for unparseable or non-HTTPS
/// URLs.
pub fn validate_inference_endpoint(endpoint: &str) -> Result<(), SynthesisError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| SynthesisError::InvalidEndpoint(format!("invalid url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(SynthesisError::InvalidEndpoint(
            "inference endpoint must use https".to_string(),
        ));
    }

    Ok(())
}

/// Errors produced by synthesizer implementations.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Endpoint violates policy requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Network-class failure talking to the backend.
    #[error("inference transport failure: {0}")]
    Transport(String),
    /// Backend response violated the report contract.
    #[error("invalid report from backend: {0}")]
    InvalidReport(#[source] ReportError),
    /// Local report assembly failed invariant checks.
    #[error("report assembly failure: {0}")]
    Report(#[from] ReportError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for mock determinism, endpoint policy, and retry backoff.

    use super::*;
    use std::sync::Mutex;
    use threat_scope_intake::{IntakeConfig, ImageSource, SyntheticImageSource};

    fn fixture_payload() -> ImagePayload {
        SyntheticImageSource::new("fixture.jpg", 64, 3)
            .next_image(&IntakeConfig::default())
            .expect("fixture payload should build")
    }

    #[test]
    fn mock_is_deterministic_per_seed_and_payload() {
        let payload = fixture_payload();
        let synthesizer = MockSynthesizer::new(7);

        let first = synthesizer.synthesize(&payload).expect("synthesis should work");
        let second = synthesizer.synthesize(&payload).expect("synthesis should work");
        assert_eq!(first, second);
    }

    #[test]
    fn mock_reports_satisfy_invariants_across_seeds() {
        let payload = fixture_payload();
        for seed in 0..32 {
            let report = MockSynthesizer::new(seed)
                .synthesize(&payload)
                .expect("synthesis should work");
            report.validate().expect("report invariants should hold");
            assert!((1..=5).contains(&report.threat_level.get()));
        }
    }

    #[test]
    fn remote_requires_https_endpoint() {
        struct NoopTransport;
        impl InferenceTransport for NoopTransport {
            fn analyze(
                &self,
                _endpoint: &str,
                _payload: &ImagePayload,
            ) -> Result<Vec<u8>, SynthesisError> {
                Err(SynthesisError::Transport("unused".to_string()))
            }
        }

        let result = RemoteSynthesizer::new(
            "http://inference.example.test/analyze",
            RetryPolicy::default(),
            Arc::new(NoopTransport),
        );
        assert!(matches!(result, Err(SynthesisError::InvalidEndpoint(_))));
    }

    #[test]
    fn remote_retries_transient_transport_failures() {
        struct FlakyTransport {
            attempts: Mutex<u32>,
            response: Vec<u8>,
        }
        impl InferenceTransport for FlakyTransport {
            fn analyze(
                &self,
                _endpoint: &str,
                _payload: &ImagePayload,
            ) -> Result<Vec<u8>, SynthesisError> {
                let mut attempts = self.attempts.lock().expect("attempt lock should work");
                *attempts += 1;
                if *attempts < 3 {
                    Err(SynthesisError::Transport("timeout".to_string()))
                } else {
                    Ok(self.response.clone())
                }
            }
        }

        let payload = fixture_payload();
        let canned = MockSynthesizer::new(1)
            .synthesize(&payload)
            .expect("canned report should build")
            .to_json_bytes()
            .expect("canned report should encode");

        let transport = Arc::new(FlakyTransport {
            attempts: Mutex::new(0),
            response: canned,
        });
        let synthesizer = RemoteSynthesizer::new(
            "https://inference.example.test/analyze",
            RetryPolicy {
                max_attempts: 3,
                base_delay_ms: 1,
                max_delay_ms: 2,
            },
            Arc::clone(&transport) as Arc<dyn InferenceTransport>,
        )
        .expect("remote synthesizer should build");

        let report = synthesizer
            .synthesize(&payload)
            .expect("synthesis should recover");
        report.validate().expect("report invariants should hold");
        assert_eq!(*transport.attempts.lock().expect("lock should work"), 3);
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 350,
        };
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(350));
    }
}
