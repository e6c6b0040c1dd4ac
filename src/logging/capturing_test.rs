use std::io;
use std::sync::Arc;
use std::thread;

use super::*;
use crate::test_utils::RecordingLoggerFactory;

fn factory() -> (Arc<RecordingLoggerFactory>, CapturingLoggerFactory) {
    let recording = Arc::new(RecordingLoggerFactory::default());
    let capturing = CapturingLoggerFactory::new(recording.clone());
    (recording, capturing)
}

#[derive(Debug, thiserror::Error)]
#[error("partition table fetch failed")]
struct FetchFailed(#[source] io::Error);

#[test]
fn test_non_severe_records_are_forwarded_and_not_captured() {
    let (recording, capturing) = factory();
    let logger = capturing.logger("client.partition");

    logger.info("started");
    logger.warning("retrying");
    logger.warning_with("retrying", &io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
    logger.fine("detail");

    assert!(!capturing.severe_occurred());
    assert_eq!(capturing.severe_count(), 0);
    assert_eq!(recording.records().len(), 4);
    assert_eq!(recording.records()[0].logger_name, "client.partition");
}

#[test]
fn test_severe_without_cause_sets_flag_only() {
    let (recording, capturing) = factory();
    capturing.logger("a").severe("giving up");

    assert!(capturing.severe_occurred());
    assert_eq!(capturing.severe_count(), 1);
    assert_eq!(capturing.last_severe_cause(), None);
    assert_eq!(recording.count(Severity::Severe), 1);
}

#[test]
fn test_severe_with_cause_keeps_the_source_chain() {
    let (recording, capturing) = factory();
    let error = FetchFailed(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));

    capturing.logger("a").severe_with("unhandled", &error);

    let cause = capturing.last_severe_cause().unwrap();
    assert_eq!(cause.message, "partition table fetch failed");
    assert_eq!(cause.chain, vec!["pipe closed".to_string()]);
    assert_eq!(cause.to_string(), "partition table fetch failed: caused by: pipe closed");
    // delegate still saw the cause
    assert_eq!(recording.records()[0].cause, Some(cause));
}

#[test]
fn test_record_without_cause_leaves_previous_cause() {
    let (_, capturing) = factory();
    let logger = capturing.logger("a");
    let first = io::Error::new(io::ErrorKind::Other, "first");

    logger.severe_with("one", &first);
    logger.log_record(LogRecord::new("a", Severity::Severe, "two"));

    assert_eq!(capturing.severe_count(), 2);
    assert_eq!(capturing.last_severe_cause().unwrap().message, "first");

    let second = CapturedCause {
        message: "second".into(),
        chain: vec![],
    };
    logger.log_record(LogRecord::new("a", Severity::Severe, "three").with_cause(second.clone()));
    assert_eq!(capturing.last_severe_cause(), Some(second));
}

#[test]
fn test_level_queries_are_delegated_without_side_effects() {
    let recording = Arc::new(RecordingLoggerFactory::with_level(Severity::Warning));
    let capturing = CapturingLoggerFactory::new(recording.clone());
    let logger = capturing.logger("a");

    assert_eq!(logger.level(), Severity::Warning);
    assert!(logger.is_loggable(Severity::Severe));
    assert!(!logger.is_loggable(Severity::Info));
    assert!(!logger.is_loggable(Severity::Off));
    assert!(!capturing.severe_occurred());
    assert!(recording.records().is_empty());
}

#[test]
fn test_severe_is_captured_even_if_delegate_filters_it() {
    let recording = Arc::new(RecordingLoggerFactory::with_level(Severity::Off));
    let capturing = CapturingLoggerFactory::new(recording);
    let logger = capturing.logger("a");

    assert!(!logger.is_loggable(Severity::Severe));
    logger.severe("dropped by backend");
    assert!(capturing.severe_occurred());
}

#[test]
fn test_loggers_are_cached_per_name_and_share_state() {
    let (_, capturing) = factory();
    let a1 = capturing.logger("a");
    let a2 = capturing.logger("a");
    let b = capturing.logger("b");

    assert!(Arc::ptr_eq(&a1, &a2));
    assert!(!Arc::ptr_eq(&a1, &b));

    b.severe("from b");
    assert!(capturing.severe_occurred());
}

#[test]
fn test_reset_is_idempotent() {
    let (_, capturing) = factory();
    capturing.reset();
    assert!(capturing.snapshot().is_clean());

    capturing
        .logger("a")
        .severe_with("x", &io::Error::new(io::ErrorKind::Other, "x"));
    assert!(!capturing.snapshot().is_clean());

    capturing.reset();
    capturing.reset();
    let snapshot = capturing.snapshot();
    assert_eq!(
        snapshot,
        CaptureSnapshot {
            severe_occurred: false,
            severe_count: 0,
            cause: None,
        }
    );
}

#[test]
fn test_concurrent_loggers_aggregate_as_logical_or() {
    let (_, capturing) = factory();
    let capturing = Arc::new(capturing);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let capturing = capturing.clone();
            thread::spawn(move || {
                let logger = capturing.logger(&format!("logger.{i}"));
                for _ in 0..100 {
                    logger.info("noise");
                }
                if i % 2 == 0 {
                    logger.severe("boom");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert!(capturing.severe_occurred());
    assert_eq!(capturing.severe_count(), 4);
}
