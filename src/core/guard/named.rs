/*!
 * Named Lock Guard
 *
 * Owns one acquisition of a named lock and hands it back to the registry
 * exactly once.
 */

use super::traits::{Guard, GuardDrop};
use super::GuardMetadata;
use crate::core::errors::{render_name, LockError, LockMode, LockResult};
use crate::core::sync::{LockName, Registry};
use crate::monitoring::millis_field;
use parking_lot::lock_api::{
    ArcMutexGuard, ArcRwLockReadGuard, ArcRwLockUpgradableReadGuard, ArcRwLockWriteGuard,
};
use parking_lot::{Mutex, RawMutex, RawRwLock, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Guard returned by `NamedLock`
pub type ExclusiveGuard<K> = NamedGuard<K, Mutex<()>, ArcMutexGuard<RawMutex, ()>>;

/// Guard returned by `NamedRwLock`
pub type RwGuard<K> = NamedGuard<K, RwLock<()>, RwHeld>;

/// Acquisition held by an `RwGuard`
pub enum RwHeld {
    Read(ArcRwLockReadGuard<RawRwLock, ()>),
    Write(ArcRwLockWriteGuard<RawRwLock, ()>),
    UpgradableRead(ArcRwLockUpgradableReadGuard<RawRwLock, ()>),
}

impl RwHeld {
    pub fn mode(&self) -> LockMode {
        match self {
            Self::Read(_) => LockMode::Read,
            Self::Write(_) => LockMode::Write,
            Self::UpgradableRead(_) => LockMode::UpgradableRead,
        }
    }
}

/// Scoped acquisition of a named lock
///
/// Dropping the guard releases the primitive and decrements the entry's
/// holder count, removing the entry when it reaches zero. `release` does
/// the same explicitly; a second `release` returns `DoubleRelease`.
///
/// The guard keeps its registry alive, so it may outlive the facade that
/// issued it.
pub struct NamedGuard<K, P, H>
where
    K: LockName,
    P: Default + Send + Sync + 'static,
    H: Send,
{
    registry: Arc<Registry<K, P>>,
    name: K,
    primitive: Arc<P>,
    held: Option<H>,
    mode: LockMode,
    metadata: GuardMetadata,
}

impl<K, P, H> NamedGuard<K, P, H>
where
    K: LockName,
    P: Default + Send + Sync + 'static,
    H: Send,
{
    pub(crate) fn new(
        registry: Arc<Registry<K, P>>,
        name: K,
        primitive: Arc<P>,
        held: H,
        mode: LockMode,
        resource_type: &'static str,
    ) -> Self {
        Self {
            registry,
            name,
            primitive,
            held: Some(held),
            mode,
            metadata: GuardMetadata::new(resource_type),
        }
    }

    /// Name this guard locks
    pub fn name(&self) -> &K {
        &self.name
    }

    /// Mode the lock is currently held in
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    fn released_error(&self) -> LockError {
        LockError::DoubleRelease {
            name: render_name(&self.name),
        }
    }
}

impl<K, P, H> fmt::Debug for NamedGuard<K, P, H>
where
    K: LockName,
    P: Default + Send + Sync + 'static,
    H: Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedGuard")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("active", &self.held.is_some())
            .finish()
    }
}

impl<K, P, H> Guard for NamedGuard<K, P, H>
where
    K: LockName,
    P: Default + Send + Sync + 'static,
    H: Send,
{
    fn resource_type(&self) -> &'static str {
        self.metadata.resource_type
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.held.is_some()
    }

    fn release(&mut self) -> LockResult<()> {
        let Some(held) = self.held.take() else {
            return Err(self.released_error());
        };

        let result = self.registry.release(&self.name, &self.primitive, held);
        debug!(
            name = ?self.name,
            mode = %self.mode,
            held_us = self.metadata.lifetime_micros(),
            "Released named lock"
        );
        result
    }
}

impl<K, P, H> GuardDrop for NamedGuard<K, P, H>
where
    K: LockName,
    P: Default + Send + Sync + 'static,
    H: Send,
{
    fn on_drop(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Err(e) = self.release() {
            error!(name = ?self.name, error = %e, "Failed to release named lock on drop");
        }
    }
}

impl<K, P, H> Drop for NamedGuard<K, P, H>
where
    K: LockName,
    P: Default + Send + Sync + 'static,
    H: Send,
{
    fn drop(&mut self) {
        self.on_drop();
    }
}

impl<K: LockName> NamedGuard<K, RwLock<()>, RwHeld> {
    /// Promote an upgradeable read to write, waiting for readers to leave
    ///
    /// Blocks without a timeout; prefer `try_upgrade_for` when other readers
    /// may be held by this thread.
    pub fn upgrade(&mut self) -> LockResult<()> {
        match self.held.take() {
            Some(RwHeld::UpgradableRead(guard)) => {
                self.held = Some(RwHeld::Write(ArcRwLockUpgradableReadGuard::upgrade(guard)));
                self.mode = LockMode::Write;
                Ok(())
            }
            other => {
                self.held = other;
                Err(self.transition_error(LockMode::Write))
            }
        }
    }

    /// Promote an upgradeable read to write within `timeout`
    ///
    /// On timeout the guard is still an upgradeable read.
    pub fn try_upgrade_for(&mut self, timeout: Duration) -> LockResult<()> {
        match self.held.take() {
            Some(RwHeld::UpgradableRead(guard)) => {
                match ArcRwLockUpgradableReadGuard::try_upgrade_for(guard, timeout) {
                    Ok(write) => {
                        self.held = Some(RwHeld::Write(write));
                        self.mode = LockMode::Write;
                        Ok(())
                    }
                    Err(guard) => {
                        self.held = Some(RwHeld::UpgradableRead(guard));
                        warn!(
                            name = ?self.name,
                            timeout_ms = millis_field(timeout),
                            "Named lock upgrade timed out - possible deadlock"
                        );
                        Err(LockError::timeout(&self.name, timeout, LockMode::Write))
                    }
                }
            }
            other => {
                self.held = other;
                Err(self.transition_error(LockMode::Write))
            }
        }
    }

    /// Drop from write or upgradeable read to a plain read
    ///
    /// Never blocks.
    pub fn downgrade(&mut self) -> LockResult<()> {
        match self.held.take() {
            Some(RwHeld::Write(guard)) => {
                self.held = Some(RwHeld::Read(ArcRwLockWriteGuard::downgrade(guard)));
                self.mode = LockMode::Read;
                Ok(())
            }
            Some(RwHeld::UpgradableRead(guard)) => {
                self.held = Some(RwHeld::Read(ArcRwLockUpgradableReadGuard::downgrade(guard)));
                self.mode = LockMode::Read;
                Ok(())
            }
            other => {
                self.held = other;
                Err(self.transition_error(LockMode::Read))
            }
        }
    }

    fn transition_error(&self, to: LockMode) -> LockError {
        match &self.held {
            None => self.released_error(),
            Some(held) => LockError::InvalidTransition {
                from: held.mode(),
                to,
            },
        }
    }
}
