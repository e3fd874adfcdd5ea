#![warn(missing_docs)]
//! # threat-scope-app
//!
//! ## Purpose
//! Orchestrates session gating, image intake, the analysis pipeline, and view
//! projection for the threat-scope console.
//!
//! ## Responsibilities
//! - Own the top-level session manager and routing between entry and
//!   dashboard views.
//! - Drive the dashboard state machine
//!   `NoImage -> ImageSelected -> Processing -> ResultsShown`.
//! - Emit fire-and-forget notifications for completions and rejections.
//! - Tear the pipeline down on logout so stale jobs cannot report.
//!
//! ## Data flow
//! Credentials -> [`App::submit_login`] -> dashboard construction with the
//! injected session context -> image bytes -> pipeline submission ->
//! [`Dashboard::poll`] applies worker events -> view projections render the
//! report.
//!
//! ## Ownership and lifetimes
//! [`App`] owns the session manager and the dashboard; the dashboard owns its
//! pipeline runner. Dropping the dashboard cancels in-flight analysis.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Every failure is scoped to
//! the current view and recoverable by user action; nothing here aborts the
//! process.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use threat_scope_intake::{IntakeConfig, IntakeError};
use threat_scope_pipeline::{
    DEFAULT_ANALYSIS_LATENCY_MS, PipelineError, PipelineFailure, PipelineRunner, PipelineState,
};
use threat_scope_report::DetectionReport;
use threat_scope_session::{Credentials, GateDecision, SessionContext, SessionError, SessionManager};
use threat_scope_synth::{ReportSynthesizer, SynthesisError};
use threat_scope_view::{
    DetectionDetailView, LocationView, ThreatLevelView, detection_details, location_view,
    threat_level_view,
};

/// Build-time application version loaded from the root `VERSION` file.
pub const APP_VERSION: &str = env!("THREAT_SCOPE_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Notification urgency, mirrored by the shell's toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Neutral/informational.
    Info,
    /// Error-styled; something the user must react to.
    Destructive,
}

/// One short-lived, dismissible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Toast title.
    pub title: String,
    /// Toast body text.
    pub description: String,
    /// Styling hint.
    pub kind: NotificationKind,
}

impl Notification {
    /// Builds an informational notification.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NotificationKind::Info,
        }
    }

    /// Builds a destructive notification.
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NotificationKind::Destructive,
        }
    }
}

/// Fire-and-forget notification collaborator.
///
/// Not part of the data model; implementations must not block.
pub trait NotificationSink: Send + Sync {
    /// Delivers one notification.
    fn notify(&self, notification: Notification);
}

/// Sink that drops all notifications. Default for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn notify(&self, _notification: Notification) {}
}

/// Active top-level view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Login/entry view.
    Entry,
    /// Protected dashboard view.
    Dashboard,
}

/// Dashboard-level state machine composing intake, pipeline, and results.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// Nothing selected yet.
    NoImage,
    /// An image is selected; analysis is not running (fresh selection or a
    /// failed run awaiting resubmission).
    ImageSelected {
        /// Content digest of the selected image.
        digest_hex: String,
    },
    /// Analysis in flight for the selected image.
    Processing {
        /// Content digest of the image being analyzed.
        digest_hex: String,
    },
    /// Analysis finished; report available for rendering.
    ResultsShown {
        /// The completed report.
        report: DetectionReport,
    },
}

/// Rendered projections for one completed report.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRender {
    /// Threat assessment card.
    pub threat: ThreatLevelView,
    /// Face/person/objects/text sections.
    pub details: DetectionDetailView,
    /// Location card; absent without a resolved place.
    pub location: Option<LocationView>,
}

/// Protected dashboard view.
///
/// Constructed only behind [`GateDecision::Proceed`]; holds the injected
/// session context rather than reading ambient state.
pub struct Dashboard {
    session: SessionContext,
    runner: PipelineRunner,
    intake: IntakeConfig,
    state: DashboardState,
    notifications: Arc<dyn NotificationSink>,
}

impl Dashboard {
    /// Creates a dashboard bound to an open session.
    pub fn new(
        session: SessionContext,
        synthesizer: Arc<dyn ReportSynthesizer>,
        latency: Duration,
        intake: IntakeConfig,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            session,
            runner: PipelineRunner::new(synthesizer, latency),
            intake,
            state: DashboardState::NoImage,
            notifications,
        }
    }

    /// Returns the session context this dashboard was constructed with.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Returns the current dashboard state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Selects an image and starts its analysis.
    ///
    /// Allowed from any state; a submission during `Processing` cancels the
    /// in-flight job. Undecodable selections reject immediately with a
    /// destructive notification and keep the dashboard ready for another
    /// selection.
    ///
    /// # Errors
    /// Returns [`AppError::Pipeline`] for empty buffers.
    pub fn select_image(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        let file_name = file_name.into();
        self.runner
            .submit_bytes(file_name.clone(), bytes, &self.intake)?;

        match self.runner.state() {
            PipelineState::Processing { submission } => {
                log::info!(
                    "analysis started: session={} digest={} file={}",
                    self.session.session_id,
                    submission.digest_hex,
                    file_name
                );
                self.state = DashboardState::Processing {
                    digest_hex: submission.digest_hex.clone(),
                };
            }
            PipelineState::Failed { submission, reason } => {
                log::warn!(
                    "image rejected at intake: digest={} reason={reason}",
                    submission.digest_hex
                );
                self.notifications.notify(Notification::destructive(
                    "Image Rejected",
                    reason.to_string(),
                ));
                self.state = DashboardState::ImageSelected {
                    digest_hex: submission.digest_hex.clone(),
                };
            }
            // submit_bytes leaves the pipeline in Processing or Failed.
            _ => {}
        }
        Ok(())
    }

    /// Applies pending pipeline events; returns `true` when the dashboard
    /// state changed.
    pub fn poll(&mut self) -> bool {
        if !self.runner.poll() {
            return false;
        }

        match self.runner.state() {
            PipelineState::Completed { submission, report } => {
                log::info!(
                    "analysis complete: digest={} threat_level={}",
                    submission.digest_hex,
                    report.threat_level.get()
                );
                self.state = DashboardState::ResultsShown {
                    report: report.clone(),
                };
                self.notifications.notify(Notification::info(
                    "Analysis Complete",
                    "Threat detection processing finished",
                ));
                true
            }
            PipelineState::Failed { submission, reason } => {
                log::warn!(
                    "analysis failed: digest={} reason={reason}",
                    submission.digest_hex
                );
                self.notifications.notify(Notification::destructive(
                    "Analysis Failed",
                    reason.to_string(),
                ));
                // The selection survives so the user can resubmit.
                self.state = DashboardState::ImageSelected {
                    digest_hex: submission.digest_hex.clone(),
                };
                true
            }
            _ => false,
        }
    }

    /// Projects the completed report into view models.
    ///
    /// Returns `None` outside `ResultsShown`.
    pub fn render(&self) -> Option<DashboardRender> {
        let DashboardState::ResultsShown { report } = &self.state else {
            return None;
        };
        Some(DashboardRender {
            threat: threat_level_view(i64::from(report.threat_level.get())),
            details: detection_details(report),
            location: location_view(report.location.as_ref()),
        })
    }

    /// Tears the dashboard down, cancelling any in-flight analysis.
    pub fn shutdown(self) {
        self.runner.shutdown();
    }
}

/// Top-level application: session lifecycle, routing, dashboard ownership.
pub struct App {
    session: SessionManager,
    route: Route,
    dashboard: Option<Dashboard>,
    synthesizer: Arc<dyn ReportSynthesizer>,
    notifications: Arc<dyn NotificationSink>,
    latency: Duration,
    intake: IntakeConfig,
}

impl App {
    /// Creates an app at the entry view with no open session.
    pub fn new(
        synthesizer: Arc<dyn ReportSynthesizer>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            session: SessionManager::new(),
            route: Route::Entry,
            dashboard: None,
            synthesizer,
            notifications,
            latency: Duration::from_millis(DEFAULT_ANALYSIS_LATENCY_MS),
            intake: IntakeConfig::default(),
        }
    }

    /// Overrides the simulated analysis latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Overrides the intake configuration.
    pub fn with_intake(mut self, intake: IntakeConfig) -> Self {
        self.intake = intake;
        self
    }

    /// Returns the active route.
    pub fn route(&self) -> Route {
        self.route
    }

    /// Returns the session manager snapshot.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Returns the dashboard when one is open.
    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    /// Returns the dashboard mutably when one is open.
    pub fn dashboard_mut(&mut self) -> Option<&mut Dashboard> {
        self.dashboard.as_mut()
    }

    /// Validates credentials and, on success, navigates to the dashboard.
    ///
    /// On rejection nothing changes: no session, no navigation; the failure
    /// surfaces as a destructive notification and an error value.
    ///
    /// # Errors
    /// Returns [`AppError::Session`] for credential rejections.
    pub fn submit_login(
        &mut self,
        credentials: &Credentials,
        now_ms: u64,
    ) -> Result<(), AppError> {
        let context = match self.session.login(credentials, now_ms) {
            Ok(context) => context,
            Err(error) => {
                log::warn!("login rejected: {error}");
                self.notifications
                    .notify(Notification::destructive("Login Rejected", error.to_string()));
                return Err(AppError::Session(error));
            }
        };

        log::info!("session opened: id={}", context.session_id);
        self.dashboard = Some(Dashboard::new(
            context,
            Arc::clone(&self.synthesizer),
            self.latency,
            self.intake,
            Arc::clone(&self.notifications),
        ));
        self.route = Route::Dashboard;
        Ok(())
    }

    /// Handles direct navigation to the dashboard route.
    ///
    /// Unauthenticated callers are redirected to the entry view before any
    /// dashboard state exists; there is no partial render.
    pub fn enter_dashboard(&mut self) -> GateDecision {
        match self.session.guard() {
            GateDecision::Proceed => {
                if self.dashboard.is_none()
                    && let threat_scope_session::SessionState::Authenticated(context) =
                        self.session.state()
                {
                    self.dashboard = Some(Dashboard::new(
                        context.clone(),
                        Arc::clone(&self.synthesizer),
                        self.latency,
                        self.intake,
                        Arc::clone(&self.notifications),
                    ));
                }
                self.route = Route::Dashboard;
                GateDecision::Proceed
            }
            GateDecision::RedirectToEntry => {
                self.route = Route::Entry;
                self.dashboard = None;
                GateDecision::RedirectToEntry
            }
        }
    }

    /// Logs out from any state: closes the session, drops the dashboard
    /// (cancelling in-flight analysis), and returns to the entry view.
    pub fn logout(&mut self) {
        if let Some(dashboard) = self.dashboard.take() {
            dashboard.shutdown();
        }
        self.session.logout();
        self.route = Route::Entry;
        log::info!("session closed");
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Credential/session failure.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    /// Image intake failure.
    #[error("intake error: {0}")]
    Intake(#[from] IntakeError),
    /// Pipeline submission failure.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    /// Analysis job failure.
    #[error("analysis error: {0}")]
    Analysis(#[from] PipelineFailure),
    /// Synthesizer configuration failure.
    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for routing and the session gate.

    use super::*;
    use threat_scope_synth::MockSynthesizer;

    fn demo_app() -> App {
        App::new(
            Arc::new(MockSynthesizer::new(0)),
            Arc::new(NullNotificationSink),
        )
        .with_latency(Duration::from_millis(1))
    }

    #[test]
    fn unauthenticated_dashboard_entry_redirects() {
        let mut app = demo_app();
        assert_eq!(app.enter_dashboard(), GateDecision::RedirectToEntry);
        assert_eq!(app.route(), Route::Entry);
        assert!(app.dashboard().is_none());
    }

    #[test]
    fn login_navigates_to_dashboard_exactly_once() {
        let mut app = demo_app();
        let credentials = Credentials {
            identifier: "123456789012".to_string(),
            date_of_birth: "1990-01-01".to_string(),
        };

        app.submit_login(&credentials, 1_000).expect("login should succeed");
        assert_eq!(app.route(), Route::Dashboard);
        assert!(matches!(
            app.dashboard().map(Dashboard::state),
            Some(DashboardState::NoImage)
        ));
    }
}
