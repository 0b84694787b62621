/*!
 * Error Types
 * Named lock errors with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for named lock operations
pub type LockResult<T> = Result<T, LockError>;

/// Mode a named lock is acquired (or requested) in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// Single owner, used by `NamedLock`
    Exclusive,
    /// Shared reader
    Read,
    /// Exclusive writer
    Write,
    /// Reader that may be promoted to writer
    UpgradableRead,
}

impl LockMode {
    /// Short lowercase identifier, used as a structured log field
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::Read => "read",
            Self::Write => "write",
            Self::UpgradableRead => "upgradeable read",
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named lock errors with serialization support
///
/// `name` fields hold the `Debug` rendering of the caller's key. Outer
/// quotes of string keys are stripped; escapes inside them are kept, so the
/// key `a"b` is reported as `a\"b`.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LockError {
    #[error(
        "Timed out after {}ms waiting to acquire {mode} lock on '{name}' - possible deadlock",
        .timeout.as_millis()
    )]
    #[diagnostic(
        code(named_lock::timeout),
        help("Another holder kept the lock longer than the timeout. Check for lock ordering cycles or re-entrant acquisition on the same name.")
    )]
    Timeout {
        name: String,
        timeout: Duration,
        mode: LockMode,
    },

    #[error("Release of '{name}' without a matching acquire")]
    #[diagnostic(
        code(named_lock::release_without_acquire),
        help("The registry holds no live entry for this guard. The key may have been mutated after it was acquired.")
    )]
    ReleaseWithoutAcquire { name: String },

    #[error("Lock on '{name}' already released")]
    #[diagnostic(
        code(named_lock::double_release),
        help("A guard releases exactly once. Drop it instead of releasing it again.")
    )]
    DoubleRelease { name: String },

    #[error("Invalid lock transition: {from} -> {to}")]
    #[diagnostic(
        code(named_lock::invalid_transition),
        help("Only upgradeable read -> write, write -> read and upgradeable read -> read are supported.")
    )]
    InvalidTransition { from: LockMode, to: LockMode },
}

impl LockError {
    /// Build a timeout error for `name`
    pub fn timeout<K: fmt::Debug>(name: &K, timeout: Duration, mode: LockMode) -> Self {
        Self::Timeout {
            name: render_name(name),
            timeout,
            mode,
        }
    }

    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Render a key for error messages and log fields
///
/// Strings are shown without the surrounding quotes `Debug` would add.
/// Anything else `Debug` escapes (quotes, backslashes, control characters)
/// stays escaped, so a rendered name is always a single printable line.
pub(crate) fn render_name<K: fmt::Debug>(name: &K) -> String {
    let rendered = format!("{:?}", name);
    match rendered.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.to_string(),
        None => rendered,
    }
}
