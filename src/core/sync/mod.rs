/*!
 * Named Synchronization Primitives
 *
 * Locks scoped to a runtime value (a "name") rather than to a variable:
 * - `NamedLock`: one owner per name at a time
 * - `NamedRwLock`: readers, writers and upgradeable readers per name
 *
 * # Architecture
 *
 * Both facades share one `Registry` design mapping each name to a
 * reference-counted entry that owns a `parking_lot` primitive. Entries exist
 * only while some thread holds or waits on them.
 *
 * # Concurrency
 *
 * - The registry mutex covers O(1) map operations only
 * - Waiting on a busy name happens outside the registry mutex, so unrelated
 *   names never contend with each other
 * - Every wait is bounded by a timeout (default 5s, see `LockConfig`)
 */

mod config;
mod locks;
mod registry;

pub use config::{LockConfig, CAPACITY_ENV, DEFAULT_TIMEOUT, TIMEOUT_ENV};
pub use locks::{NamedLock, NamedRwLock};
pub use registry::{LockName, Registry, RegistryStats};
