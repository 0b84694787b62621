/*!
 * Core Module
 * Named locks, their guards and error handling
 */

pub mod errors;
pub mod guard;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use guard::{ExclusiveGuard, Guard, GuardDrop, GuardMetadata, NamedGuard, RwGuard, RwHeld};
pub use sync::{LockConfig, LockName, NamedLock, NamedRwLock, Registry, RegistryStats};
