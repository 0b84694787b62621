/*!
 * Named Lock Facades
 *
 * Public entry points over the shared registry:
 * - Exclusive locks (one `parking_lot::Mutex` per live name)
 * - Reader/writer locks (one `parking_lot::RwLock` per live name)
 */

mod exclusive;
mod rwlock;

// Re-export public API
pub use exclusive::NamedLock;
pub use rwlock::NamedRwLock;
