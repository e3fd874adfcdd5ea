//! Integration tests for entry-view credential validation.

mod common;

use std::sync::Arc;

use threat_scope_app::{NotificationKind, Route};
use threat_scope_session::Credentials;

#[test]
fn login_validation_tests_rejects_non_twelve_digit_identifiers() {
    let sink = Arc::new(common::RecordingSink::default());
    let mut app = common::fast_app(Arc::clone(&sink));

    for identifier in ["12345", "123456789012345", "12345678901x", ""] {
        let credentials = Credentials {
            identifier: identifier.to_string(),
            date_of_birth: "1990-01-01".to_string(),
        };
        assert!(app.submit_login(&credentials, 1_000).is_err());
        assert!(!app.session().is_authenticated());
        assert_eq!(app.route(), Route::Entry);
    }

    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 4);
    for notification in delivered {
        assert_eq!(notification.kind, NotificationKind::Destructive);
        assert!(notification.description.contains("12 digits"));
    }
}

#[test]
fn login_validation_tests_rejects_blank_date_of_birth() {
    let sink = Arc::new(common::RecordingSink::default());
    let mut app = common::fast_app(Arc::clone(&sink));

    let credentials = Credentials {
        identifier: "123456789012".to_string(),
        date_of_birth: "   ".to_string(),
    };
    assert!(app.submit_login(&credentials, 1_000).is_err());
    assert!(!app.session().is_authenticated());
    assert_eq!(app.route(), Route::Entry);
}

#[test]
fn login_validation_tests_valid_credentials_navigate_exactly_once() {
    let sink = Arc::new(common::RecordingSink::default());
    let mut app = common::fast_app(Arc::clone(&sink));

    app.submit_login(&common::valid_credentials(), 1_000)
        .expect("login should succeed");

    assert!(app.session().is_authenticated());
    assert_eq!(app.route(), Route::Dashboard);
    assert!(app.dashboard().is_some());
    assert!(sink.delivered().is_empty(), "no toast on successful login");
}
