//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use threat_scope_app::{App, Notification, NotificationSink};
use threat_scope_intake::{ImagePayload, ImageSource, IntakeConfig, SyntheticImageSource};
use threat_scope_session::Credentials;
use threat_scope_synth::MockSynthesizer;

/// Sink that records every delivered notification for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    /// Returns a snapshot of delivered notifications in order.
    #[allow(dead_code)]
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .expect("notification lock should work")
            .clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.delivered
            .lock()
            .expect("notification lock should work")
            .push(notification);
    }
}

/// Creates a deterministic image payload with the given fill byte.
#[allow(dead_code)]
pub fn fixture_payload(fill: u8) -> ImagePayload {
    SyntheticImageSource::new("fixture.jpg", 64, fill)
        .next_image(&IntakeConfig::default())
        .expect("fixture payload should build")
}

/// Valid demo credentials from the entry-view contract.
#[allow(dead_code)]
pub fn valid_credentials() -> Credentials {
    Credentials {
        identifier: "123456789012".to_string(),
        date_of_birth: "1990-01-01".to_string(),
    }
}

/// Creates an app with a fast mock pipeline and a recording sink.
#[allow(dead_code)]
pub fn fast_app(sink: Arc<RecordingSink>) -> App {
    App::new(Arc::new(MockSynthesizer::new(11)), sink)
        .with_latency(Duration::from_millis(1))
}

/// Polls the dashboard until its state satisfies `done` or the deadline hits.
#[allow(dead_code)]
pub fn poll_until(app: &mut App, done: impl Fn(&threat_scope_app::DashboardState) -> bool) {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        let dashboard = app.dashboard_mut().expect("dashboard should be open");
        dashboard.poll();
        if done(dashboard.state()) {
            return;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "dashboard never reached expected state"
        );
        std::thread::sleep(Duration::from_millis(1));
    }
}
