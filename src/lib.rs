/*!
 * Named Lock Library
 *
 * Keyed mutual exclusion and keyed reader/writer locking: locks scoped to an
 * arbitrary runtime value instead of a variable. Callers using the same name
 * exclude each other, callers using different names proceed independently,
 * and a name costs memory only while someone holds or waits on it.
 *
 * ```
 * use named_lock::{NamedLock, NamedRwLock};
 *
 * let accounts = NamedLock::new();
 * let _guard = accounts.acquire(42u64)?;
 *
 * let documents = NamedRwLock::new();
 * let _a = documents.acquire_read("readme")?;
 * let _b = documents.acquire_read("readme")?;
 * # Ok::<(), named_lock::LockError>(())
 * ```
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{LockError, LockMode, LockResult};
pub use crate::core::guard::{ExclusiveGuard, Guard, GuardDrop, GuardMetadata, NamedGuard, RwGuard, RwHeld};
pub use crate::core::sync::{
    LockConfig, LockName, NamedLock, NamedRwLock, Registry, RegistryStats, DEFAULT_TIMEOUT,
};
pub use monitoring::init_tracing;
