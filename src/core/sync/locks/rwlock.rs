/*!
 * Named Reader/Writer Lock
 * Many readers or one writer per name, backed by a `parking_lot::RwLock`
 */

use crate::core::errors::{LockMode, LockResult};
use crate::core::guard::{NamedGuard, RwGuard, RwHeld};
use crate::core::sync::config::LockConfig;
use crate::core::sync::registry::{LockName, Registry, Wait};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Keyed reader/writer locking
///
/// Per name: any number of readers, or one writer. One upgradeable reader
/// may coexist with plain readers and later promote itself to writer via
/// `RwGuard::upgrade`.
///
/// Entry liveness is tracked with an explicit holder count, the same as
/// `NamedLock`, not derived from the primitive's reader/waiter counts.
///
/// # Example
///
/// ```
/// use named_lock::NamedRwLock;
/// use std::time::Duration;
///
/// let locks = NamedRwLock::new();
/// let r1 = locks.acquire_read("config")?;
/// let r2 = locks.acquire_read("config")?;
/// assert_eq!(locks.registry().holders(&"config"), Some(2));
///
/// assert!(locks.acquire_write_timeout("config", Duration::from_millis(10)).is_err());
/// drop((r1, r2));
///
/// let _w = locks.acquire_write("config")?;
/// # Ok::<(), named_lock::LockError>(())
/// ```
#[derive(Clone)]
pub struct NamedRwLock<K: LockName> {
    registry: Arc<Registry<K, RwLock<()>>>,
    config: LockConfig,
}

impl<K: LockName> NamedRwLock<K> {
    pub fn new() -> Self {
        Self::with_config(LockConfig::default())
    }

    pub fn with_config(config: LockConfig) -> Self {
        Self {
            registry: Arc::new(Registry::with_capacity(config.initial_capacity)),
            config,
        }
    }

    pub fn acquire_read(&self, name: K) -> LockResult<RwGuard<K>> {
        self.acquire_read_timeout(name, self.config.default_timeout)
    }

    pub fn acquire_write(&self, name: K) -> LockResult<RwGuard<K>> {
        self.acquire_write_timeout(name, self.config.default_timeout)
    }

    pub fn acquire_upgradable_read(&self, name: K) -> LockResult<RwGuard<K>> {
        self.acquire_upgradable_read_timeout(name, self.config.default_timeout)
    }

    /// Take a shared read lock on `name`, waiting up to `timeout`
    pub fn acquire_read_timeout(&self, name: K, timeout: Duration) -> LockResult<RwGuard<K>> {
        self.acquire_mode(name, timeout, LockMode::Read)
    }

    /// Take the exclusive write lock on `name`, waiting up to `timeout`
    pub fn acquire_write_timeout(&self, name: K, timeout: Duration) -> LockResult<RwGuard<K>> {
        self.acquire_mode(name, timeout, LockMode::Write)
    }

    /// Take the upgradeable read lock on `name`, waiting up to `timeout`
    ///
    /// Plain readers are still admitted; writers and other upgradeable
    /// readers wait.
    pub fn acquire_upgradable_read_timeout(
        &self,
        name: K,
        timeout: Duration,
    ) -> LockResult<RwGuard<K>> {
        self.acquire_mode(name, timeout, LockMode::UpgradableRead)
    }

    /// Run `f` while holding a read lock on `name`
    #[instrument(level = "trace", skip(self, f))]
    pub fn with_read<F, R>(&self, name: K, f: F) -> LockResult<R>
    where
        F: FnOnce() -> R,
    {
        let _guard = self.acquire_read(name)?;
        Ok(f())
    }

    /// Run `f` while holding the write lock on `name`
    #[instrument(level = "trace", skip(self, f))]
    pub fn with_write<F, R>(&self, name: K, f: F) -> LockResult<R>
    where
        F: FnOnce() -> R,
    {
        let _guard = self.acquire_write(name)?;
        Ok(f())
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Registry backing this lock, for inspection
    pub fn registry(&self) -> &Registry<K, RwLock<()>> {
        &self.registry
    }

    #[instrument(level = "trace", skip(self))]
    fn acquire_mode(&self, name: K, timeout: Duration, mode: LockMode) -> LockResult<RwGuard<K>> {
        let (primitive, held) = self
            .registry
            .acquire(&name, timeout, mode, |rwlock, wait| claim(rwlock, wait, mode))?;

        Ok(NamedGuard::new(
            Arc::clone(&self.registry),
            name,
            primitive,
            held,
            mode,
            "named_rwlock",
        ))
    }
}

impl<K: LockName> Default for NamedRwLock<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn claim(rwlock: &Arc<RwLock<()>>, wait: Wait, mode: LockMode) -> Option<RwHeld> {
    match (mode, wait) {
        (LockMode::Read, Wait::Immediate) => rwlock.try_read_arc().map(RwHeld::Read),
        (LockMode::Read, Wait::Bounded(timeout)) => {
            rwlock.try_read_arc_for(timeout).map(RwHeld::Read)
        }
        (LockMode::UpgradableRead, Wait::Immediate) => rwlock
            .try_upgradable_read_arc()
            .map(RwHeld::UpgradableRead),
        (LockMode::UpgradableRead, Wait::Bounded(timeout)) => rwlock
            .try_upgradable_read_arc_for(timeout)
            .map(RwHeld::UpgradableRead),
        // Exclusive on a reader/writer lock is a write
        (LockMode::Write | LockMode::Exclusive, Wait::Immediate) => {
            rwlock.try_write_arc().map(RwHeld::Write)
        }
        (LockMode::Write | LockMode::Exclusive, Wait::Bounded(timeout)) => {
            rwlock.try_write_arc_for(timeout).map(RwHeld::Write)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::LockError;
    use crate::core::guard::Guard;
    use std::thread;

    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn test_each_mode_removes_entry() {
        let locks = NamedRwLock::new();

        for mode in [LockMode::Read, LockMode::Write, LockMode::UpgradableRead] {
            let guard = locks
                .acquire_mode("lock name", Duration::from_secs(1), mode)
                .unwrap();
            assert_eq!(guard.mode(), mode);
            assert_eq!(locks.registry().len(), 1);
            drop(guard);
            assert!(locks.registry().is_empty());
        }
    }

    #[test]
    fn test_readers_share() {
        let locks = NamedRwLock::new();
        let _r1 = locks.acquire_read("a").unwrap();
        let _r2 = locks.acquire_read_timeout("a", SHORT).unwrap();
        let _u = locks.acquire_upgradable_read_timeout("a", SHORT).unwrap();

        assert_eq!(locks.registry().len(), 1);
        assert_eq!(locks.registry().holders(&"a"), Some(3));
    }

    #[test]
    fn test_writer_excludes_readers() {
        let locks = NamedRwLock::new();
        let _w = locks.acquire_write("a").unwrap();

        let err = locks.acquire_read_timeout("a", SHORT).unwrap_err();
        assert_eq!(
            err,
            LockError::Timeout {
                name: "a".to_string(),
                timeout: SHORT,
                mode: LockMode::Read,
            }
        );
        assert!(locks.acquire_write_timeout("a", SHORT).is_err());
        assert!(locks.acquire_upgradable_read_timeout("a", SHORT).is_err());
        assert_eq!(locks.registry().holders(&"a"), Some(1));
    }

    #[test]
    fn test_single_upgradable_reader() {
        let locks = NamedRwLock::new();
        let _u = locks.acquire_upgradable_read("a").unwrap();

        let err = locks
            .acquire_upgradable_read_timeout("a", SHORT)
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_upgrade_and_downgrade() {
        let locks = NamedRwLock::new();
        let mut guard = locks.acquire_upgradable_read("a").unwrap();

        guard.upgrade().unwrap();
        assert_eq!(guard.mode(), LockMode::Write);
        assert!(locks.acquire_read_timeout("a", SHORT).is_err());

        guard.downgrade().unwrap();
        assert_eq!(guard.mode(), LockMode::Read);
        let reader = locks.acquire_read_timeout("a", SHORT).unwrap();

        drop(guard);
        drop(reader);
        assert!(locks.registry().is_empty());
    }

    #[test]
    fn test_try_upgrade_times_out_while_readers_remain() {
        let locks = NamedRwLock::new();
        let mut guard = locks.acquire_upgradable_read("a").unwrap();
        let reader = locks.acquire_read("a").unwrap();

        let err = guard.try_upgrade_for(SHORT).unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(guard.mode(), LockMode::UpgradableRead);

        drop(reader);
        guard.try_upgrade_for(Duration::from_secs(1)).unwrap();
        assert_eq!(guard.mode(), LockMode::Write);
    }

    #[test]
    fn test_invalid_transitions() {
        let locks = NamedRwLock::new();
        let mut reader = locks.acquire_read("a").unwrap();

        assert_eq!(
            reader.upgrade().unwrap_err(),
            LockError::InvalidTransition {
                from: LockMode::Read,
                to: LockMode::Write,
            }
        );
        assert!(reader.downgrade().is_err());
        assert_eq!(reader.mode(), LockMode::Read);

        reader.release().unwrap();
        assert!(matches!(
            reader.upgrade().unwrap_err(),
            LockError::DoubleRelease { .. }
        ));
    }

    #[test]
    fn test_writer_waits_for_reader() {
        let locks = NamedRwLock::new();
        let reader = locks.acquire_read("a").unwrap();

        let writer = {
            let locks = locks.clone();
            thread::spawn(move || {
                let guard = locks.acquire_write_timeout("a", Duration::from_secs(5)).unwrap();
                assert_eq!(guard.mode(), LockMode::Write);
            })
        };

        thread::sleep(Duration::from_millis(50));
        drop(reader);
        writer.join().unwrap();
        assert!(locks.registry().is_empty());
    }
}
