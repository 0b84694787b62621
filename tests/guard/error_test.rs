/*!
 * Lock Error Tests
 * Display text, diagnostics and serialization
 */

use miette::Diagnostic;
use named_lock::{LockError, LockMode};
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn test_timeout_diagnostic_code() {
    let err = LockError::Timeout {
        name: "x".to_string(),
        timeout: Duration::from_millis(50),
        mode: LockMode::Exclusive,
    };

    let code = err.code().map(|c| c.to_string());
    assert_eq!(code.as_deref(), Some("named_lock::timeout"));
    assert!(err.help().is_some());
}

#[test]
fn test_error_serialization_round_trip() {
    let err = LockError::Timeout {
        name: "orders".to_string(),
        timeout: Duration::from_millis(250),
        mode: LockMode::UpgradableRead,
    };

    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["error_type"], "timeout");
    assert_eq!(json["details"]["name"], "orders");
    assert_eq!(json["details"]["mode"], "upgradable_read");

    let back: LockError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}

#[test]
fn test_mode_display() {
    assert_eq!(LockMode::Exclusive.to_string(), "exclusive");
    assert_eq!(LockMode::Read.to_string(), "read");
    assert_eq!(LockMode::Write.to_string(), "write");
    assert_eq!(LockMode::UpgradableRead.to_string(), "upgradeable read");
}
