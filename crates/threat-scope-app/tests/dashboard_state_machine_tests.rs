//! Integration tests for the dashboard view state machine.

mod common;

use std::sync::Arc;

use threat_scope_app::DashboardState;
use threat_scope_synth::ReportSynthesizer;

#[test]
fn dashboard_state_machine_tests_walks_select_process_results() {
    let sink = Arc::new(common::RecordingSink::default());
    let mut app = common::fast_app(sink);

    app.submit_login(&common::valid_credentials(), 1_000)
        .expect("login should succeed");

    let dashboard = app.dashboard_mut().expect("dashboard should be open");
    assert!(matches!(dashboard.state(), DashboardState::NoImage));
    assert!(dashboard.render().is_none());

    let payload = common::fixture_payload(1);
    dashboard
        .select_image(payload.file_name.clone(), payload.bytes.clone())
        .expect("submission should start");
    assert!(matches!(dashboard.state(), DashboardState::Processing { .. }));

    common::poll_until(&mut app, |state| {
        matches!(state, DashboardState::ResultsShown { .. })
    });

    let render = app
        .dashboard()
        .and_then(|dashboard| dashboard.render())
        .expect("results should render");
    assert!((1..=5).contains(&(render.threat.level as u8)));
}

#[test]
fn dashboard_state_machine_tests_resubmission_from_results_restarts_processing() {
    let sink = Arc::new(common::RecordingSink::default());
    let mut app = common::fast_app(sink);

    app.submit_login(&common::valid_credentials(), 1_000)
        .expect("login should succeed");

    let first = common::fixture_payload(1);
    app.dashboard_mut()
        .expect("dashboard should be open")
        .select_image(first.file_name.clone(), first.bytes.clone())
        .expect("first submission should start");
    common::poll_until(&mut app, |state| {
        matches!(state, DashboardState::ResultsShown { .. })
    });

    let second = common::fixture_payload(2);
    let dashboard = app.dashboard_mut().expect("dashboard should be open");
    dashboard
        .select_image(second.file_name.clone(), second.bytes.clone())
        .expect("second submission should start");
    match dashboard.state() {
        DashboardState::Processing { digest_hex } => {
            assert_eq!(digest_hex, &second.digest_hex);
        }
        other => panic!("expected Processing, got {other:?}"),
    }

    common::poll_until(&mut app, |state| {
        matches!(state, DashboardState::ResultsShown { .. })
    });
}

#[test]
fn dashboard_state_machine_tests_resubmission_during_processing_tracks_newest() {
    let sink = Arc::new(common::RecordingSink::default());
    let mut app = common::fast_app(sink);

    app.submit_login(&common::valid_credentials(), 1_000)
        .expect("login should succeed");

    let first = common::fixture_payload(3);
    let second = common::fixture_payload(4);
    let dashboard = app.dashboard_mut().expect("dashboard should be open");
    dashboard
        .select_image(first.file_name.clone(), first.bytes.clone())
        .expect("first submission should start");
    dashboard
        .select_image(second.file_name.clone(), second.bytes.clone())
        .expect("second submission should start");

    common::poll_until(&mut app, |state| {
        matches!(state, DashboardState::ResultsShown { .. })
    });

    // The shown report must come from the newest submission's pipeline run;
    // mock output is deterministic per payload digest.
    let shown = match app.dashboard().map(|dashboard| dashboard.state().clone()) {
        Some(DashboardState::ResultsShown { report }) => report,
        other => panic!("expected ResultsShown, got {other:?}"),
    };
    let expected = threat_scope_synth::MockSynthesizer::new(11)
        .synthesize(&second)
        .expect("mock synthesis should work");
    assert_eq!(shown, expected);
}
