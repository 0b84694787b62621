/*!
 * RAII Lock Guards
 *
 * Every successful named lock acquisition returns a guard. Dropping the
 * guard releases the lock and gives its holder count back to the registry;
 * `Guard::release` does the same explicitly and reports misuse.
 *
 * ## Example
 *
 * ```
 * use named_lock::{Guard, NamedLock};
 *
 * let locks = NamedLock::<String>::new();
 * {
 *     let _guard = locks.acquire("invoice-42".to_string())?;
 *     // critical section
 * } // released here
 *
 * let mut guard = locks.acquire("invoice-42".to_string())?;
 * guard.release()?;
 * assert!(guard.release().is_err());
 * # Ok::<(), named_lock::LockError>(())
 * ```
 */

mod named;
mod traits;

pub use named::{ExclusiveGuard, NamedGuard, RwGuard, RwHeld};
pub use traits::{Guard, GuardDrop};

use crate::monitoring::micros_field;
use std::time::Instant;

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: Instant,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: Instant::now(),
        }
    }

    /// Time since the guard was created, in microseconds
    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        micros_field(self.creation_time.elapsed())
    }
}
