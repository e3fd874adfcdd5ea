//! # threat-scope-app binary
//!
//! Headless demo shell: logs in with sample credentials, submits a synthetic
//! image, waits for the analysis to finish, and prints the rendered report.

use std::sync::Arc;
use std::time::Duration;

use threat_scope_app::{
    App, DashboardState, Notification, NotificationKind, NotificationSink, app_version,
};
use threat_scope_intake::{ImageSource, IntakeConfig, SyntheticImageSource};
use threat_scope_session::Credentials;
use threat_scope_synth::MockSynthesizer;

/// Sink that prints toasts to stdout the way the shell would show them.
struct ConsoleNotificationSink;

impl NotificationSink for ConsoleNotificationSink {
    fn notify(&self, notification: Notification) {
        let marker = match notification.kind {
            NotificationKind::Info => "info",
            NotificationKind::Destructive => "error",
        };
        println!(
            "[toast/{marker}] {}: {}",
            notification.title, notification.description
        );
    }
}

fn main() {
    env_logger::init();
    println!("threat-scope-app {}", app_version());

    let seed = std::env::var("THREAT_SCOPE_SEED")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0);

    let mut app = App::new(
        Arc::new(MockSynthesizer::new(seed)),
        Arc::new(ConsoleNotificationSink),
    )
    .with_latency(Duration::from_millis(250));

    let credentials = Credentials {
        identifier: "123456789012".to_string(),
        date_of_birth: "1990-01-01".to_string(),
    };
    if let Err(error) = app.submit_login(&credentials, now_ms()) {
        eprintln!("demo login failed: {error}");
        std::process::exit(1);
    }

    let intake = IntakeConfig::default();
    let payload = match SyntheticImageSource::new("demo.jpg", 2048, seed as u8).next_image(&intake)
    {
        Ok(payload) => payload,
        Err(error) => {
            eprintln!("demo image failed to build: {error}");
            std::process::exit(1);
        }
    };

    let Some(dashboard) = app.dashboard_mut() else {
        eprintln!("dashboard missing after login");
        std::process::exit(1);
    };
    if let Err(error) = dashboard.select_image(payload.file_name.clone(), payload.bytes.clone()) {
        eprintln!("image submission failed: {error}");
        std::process::exit(1);
    }

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while !matches!(dashboard.state(), DashboardState::ResultsShown { .. }) {
        if std::time::Instant::now() > deadline {
            eprintln!("analysis did not finish in time");
            std::process::exit(1);
        }
        dashboard.poll();
        std::thread::sleep(Duration::from_millis(25));
    }

    if let Some(render) = dashboard.render() {
        println!(
            "threat: {} (level {}/5) - {}",
            render.threat.info.label, render.threat.level, render.threat.info.description
        );
        println!(
            "face: {} ({}), emotions: {}",
            render.details.face.status_label,
            render.details.face.confidence_pct,
            render.details.face.emotions.join(", ")
        );
        println!(
            "person: {} / {} ({})",
            render.details.person.gender_label,
            render.details.person.age_label,
            render.details.person.confidence_pct
        );
        for object in &render.details.objects {
            println!("object: {} ({})", object.name, object.confidence_pct);
        }
        println!("text: {}", render.details.extracted_text);
        if let Some(location) = &render.location {
            println!("location: {}", location.address);
            if let Some(url) = &location.map_url {
                println!("map: {url}");
            }
        }
    }

    app.logout();
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
