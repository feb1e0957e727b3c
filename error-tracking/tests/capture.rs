use assert_json_diff::assert_json_include;
use error_tracking::config::ErrorTrackingConfig;
use error_tracking::report::{User, MAX_LINKED_ERRORS};
use error_tracking::sink::MemoryReportSink;
use error_tracking::tracker::ErrorTracker;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
enum CheckoutError {
    #[error("payment failed")]
    Payment(#[source] GatewayError),
}

#[derive(Error, Debug)]
#[error("gateway timed out after {0}ms")]
struct GatewayError(u64);

#[derive(Error, Debug)]
#[error("level {depth}")]
struct Nested {
    depth: usize,
    #[source]
    inner: Option<Box<Nested>>,
}

fn config(dsn: Option<&str>) -> ErrorTrackingConfig {
    ErrorTrackingConfig {
        environment: String::from("staging"),
        release: String::from("web@1.4.0"),
        sentry_dsn: dsn.map(String::from),
        debug: false,
    }
}

#[test]
fn captures_chain_with_identified_user() {
    let sink = MemoryReportSink::default();
    let tracker = ErrorTracker::init(config(Some("https://key@errors.example.com/1")), sink.clone());
    assert!(tracker.is_enabled());

    tracker.identify(User {
        email: Some(String::from("someone@example.com")),
        ..User::new("u-1")
    });
    let event_id = tracker.capture_exception(&CheckoutError::Payment(GatewayError(3000)));

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].event_id, event_id);
    assert_json_include!(
        actual: serde_json::to_value(&reports[0]).unwrap(),
        expected: json!({
            "environment": "staging",
            "release": "web@1.4.0",
            "user": {"id": "u-1", "email": "someone@example.com"},
            "exception": [
                {"type": "CheckoutError", "value": "payment failed"},
                {"type": "GatewayError", "value": "gateway timed out after 3000ms"}
            ]
        })
    );
}

#[test]
fn disabled_without_dsn() {
    let sink = MemoryReportSink::default();
    let tracker = ErrorTracker::init(config(None), sink.clone());
    assert!(!tracker.is_enabled());

    let first = tracker.capture_exception(&GatewayError(10));
    let second = tracker.capture_exception(&GatewayError(10));

    assert_ne!(first, second);
    assert!(sink.reports().is_empty());
}

#[test]
fn empty_dsn_counts_as_missing() {
    let tracker = ErrorTracker::init(config(Some("")), MemoryReportSink::default());
    assert!(!tracker.is_enabled());
}

#[test]
fn linked_errors_are_capped() {
    let mut error = Nested {
        depth: 0,
        inner: None,
    };
    for depth in 1..10 {
        error = Nested {
            depth,
            inner: Some(Box::new(error)),
        };
    }

    let sink = MemoryReportSink::default();
    let tracker = ErrorTracker::init(config(Some("https://key@errors.example.com/1")), sink.clone());
    tracker.capture_exception(&error);

    let exception = &sink.reports()[0].exception;
    assert_eq!(exception.len(), MAX_LINKED_ERRORS);
    assert_eq!(exception[0].value, "level 9");
    assert_eq!(exception[4].value, "level 5");
}

#[test]
fn reports_without_identify_have_no_user() {
    let sink = MemoryReportSink::default();
    let tracker = ErrorTracker::init(config(Some("https://key@errors.example.com/1")), sink.clone());

    tracker.capture_exception(&GatewayError(1));

    assert!(sink.reports()[0].user.is_none());
}
