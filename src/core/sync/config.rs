/*!
 * Named Lock Configuration
 *
 * Runtime configuration for default timeouts and registry sizing
 */

use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the default acquire timeout (milliseconds)
pub const TIMEOUT_ENV: &str = "NAMED_LOCK_TIMEOUT_MS";

/// Environment variable overriding the initial registry capacity
pub const CAPACITY_ENV: &str = "NAMED_LOCK_INITIAL_CAPACITY";

/// Default acquire timeout: 5s
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Named lock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// Timeout used by the acquire calls that don't take one
    pub default_timeout: Duration,
    /// Number of names the registry map is pre-sized for
    pub initial_capacity: usize,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            initial_capacity: 0,
        }
    }
}

impl LockConfig {
    /// Configuration for short critical sections (100ms timeout)
    pub const fn short_lived() -> Self {
        Self {
            default_timeout: Duration::from_millis(100),
            initial_capacity: 0,
        }
    }

    /// Configuration for locks held across slow work (30s timeout)
    pub const fn long_wait() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            initial_capacity: 0,
        }
    }

    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub const fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Load configuration from the environment
    ///
    /// Environment variables:
    /// - NAMED_LOCK_TIMEOUT_MS: default acquire timeout (default: 5000)
    /// - NAMED_LOCK_INITIAL_CAPACITY: registry pre-size (default: 0)
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>(TIMEOUT_ENV) {
            config.default_timeout = Duration::from_millis(ms);
        }
        if let Some(capacity) = read_env::<usize>(CAPACITY_ENV) {
            config.initial_capacity = capacity;
        }

        config
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring invalid named lock setting");
            None
        }
    }
}
