//! Integration tests for the fire-and-forget notification channel.

mod common;

use std::sync::Arc;

use threat_scope_app::{DashboardState, NotificationKind};

#[test]
fn notification_tests_completion_emits_analysis_complete_toast() {
    let sink = Arc::new(common::RecordingSink::default());
    let mut app = common::fast_app(Arc::clone(&sink));

    app.submit_login(&common::valid_credentials(), 1_000)
        .expect("login should succeed");
    let payload = common::fixture_payload(1);
    app.dashboard_mut()
        .expect("dashboard should be open")
        .select_image(payload.file_name.clone(), payload.bytes.clone())
        .expect("submission should start");
    common::poll_until(&mut app, |state| {
        matches!(state, DashboardState::ResultsShown { .. })
    });

    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].title, "Analysis Complete");
    assert_eq!(delivered[0].description, "Threat detection processing finished");
    assert_eq!(delivered[0].kind, NotificationKind::Info);
}

#[test]
fn notification_tests_intake_rejection_emits_destructive_toast() {
    let sink = Arc::new(common::RecordingSink::default());
    let mut app = common::fast_app(Arc::clone(&sink));

    app.submit_login(&common::valid_credentials(), 1_000)
        .expect("login should succeed");
    app.dashboard_mut()
        .expect("dashboard should be open")
        .select_image("notes.txt", b"definitely not an image".to_vec())
        .expect("non-empty bytes are accepted as a submission");

    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].title, "Image Rejected");
    assert_eq!(delivered[0].kind, NotificationKind::Destructive);

    // Rejected selection leaves the dashboard ready for another attempt.
    assert!(matches!(
        app.dashboard().map(|dashboard| dashboard.state().clone()),
        Some(DashboardState::ImageSelected { .. })
    ));
}
