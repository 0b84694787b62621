/*!
 * Named Exclusive Lock
 * One owner per name, backed by a `parking_lot::Mutex` per live name
 */

use crate::core::errors::{LockMode, LockResult};
use crate::core::guard::{ExclusiveGuard, NamedGuard};
use crate::core::sync::config::LockConfig;
use crate::core::sync::registry::{LockName, Registry, Wait};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Keyed mutual exclusion
///
/// Two callers locking the same name exclude each other; callers locking
/// different names never interact. Clones share the same registry.
///
/// # Example
///
/// ```
/// use named_lock::NamedLock;
/// use std::time::Duration;
///
/// let locks = NamedLock::new();
/// let guard = locks.acquire("account:7")?;
///
/// // Same name is busy
/// assert!(locks.acquire_timeout("account:7", Duration::from_millis(10)).is_err());
/// // Other names are not
/// let _other = locks.try_acquire("account:8")?;
///
/// drop(guard);
/// # Ok::<(), named_lock::LockError>(())
/// ```
#[derive(Clone)]
pub struct NamedLock<K: LockName> {
    registry: Arc<Registry<K, Mutex<()>>>,
    config: LockConfig,
}

impl<K: LockName> NamedLock<K> {
    pub fn new() -> Self {
        Self::with_config(LockConfig::default())
    }

    pub fn with_config(config: LockConfig) -> Self {
        Self {
            registry: Arc::new(Registry::with_capacity(config.initial_capacity)),
            config,
        }
    }

    /// Lock `name`, waiting up to the configured default timeout
    pub fn acquire(&self, name: K) -> LockResult<ExclusiveGuard<K>> {
        self.acquire_timeout(name, self.config.default_timeout)
    }

    /// Lock `name`, waiting up to `timeout`
    ///
    /// The first locker of a name always succeeds immediately. Later lockers
    /// wait for the current owner and fail with `LockError::Timeout` once
    /// `timeout` expires.
    #[instrument(level = "trace", skip(self))]
    pub fn acquire_timeout(&self, name: K, timeout: Duration) -> LockResult<ExclusiveGuard<K>> {
        let (primitive, held) =
            self.registry
                .acquire(&name, timeout, LockMode::Exclusive, |mutex, wait| match wait {
                    Wait::Immediate => mutex.try_lock_arc(),
                    Wait::Bounded(timeout) => mutex.try_lock_arc_for(timeout),
                })?;

        Ok(NamedGuard::new(
            Arc::clone(&self.registry),
            name,
            primitive,
            held,
            LockMode::Exclusive,
            "named_lock",
        ))
    }

    /// Lock `name` only if nobody holds it right now
    pub fn try_acquire(&self, name: K) -> LockResult<ExclusiveGuard<K>> {
        self.acquire_timeout(name, Duration::ZERO)
    }

    /// Run `f` while holding `name`
    #[instrument(level = "trace", skip(self, f))]
    pub fn with_lock<F, R>(&self, name: K, f: F) -> LockResult<R>
    where
        F: FnOnce() -> R,
    {
        let _guard = self.acquire(name)?;
        Ok(f())
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Registry backing this lock, for inspection
    pub fn registry(&self) -> &Registry<K, Mutex<()>> {
        &self.registry
    }
}

impl<K: LockName> Default for NamedLock<K> {
    fn default() -> Self {
        Self::new()
    }
}
