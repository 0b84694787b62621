/*!
 * Named Lock Registry
 *
 * Reference-counted map from name to lock primitive. An entry exists only
 * while at least one thread holds or waits on its primitive.
 */

use crate::core::errors::{render_name, LockError, LockMode, LockResult};
use crate::monitoring::millis_field;
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Key types usable as lock names
///
/// Mutating a key (through interior mutability) after acquiring it is undefined.
pub trait LockName: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> LockName for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// How long a claim on an entry's primitive may wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
    /// Entry was just created and nobody else can see it yet
    Immediate,
    /// Entry already exists; wait at most this long
    Bounded(Duration),
}

/// Per-name record
struct Entry<P> {
    primitive: Arc<P>,
    /// Threads holding or waiting on `primitive`, creator included.
    /// Only touched under the registry mutex.
    live_holders: usize,
}

struct RegistryState<K, P> {
    entries: HashMap<K, Entry<P>, RandomState>,
    entries_created: u64,
    entries_destroyed: u64,
    peak_entries: usize,
}

/// Point-in-time registry statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Entries currently live
    pub entries: usize,
    /// Highest number of simultaneously live entries
    pub peak_entries: usize,
    pub entries_created: u64,
    pub entries_destroyed: u64,
    /// Successful acquisitions
    pub acquisitions: u64,
    /// Acquisitions that gave up after their timeout
    pub timeouts: u64,
}

/// Registry of named lock entries
///
/// # Protocol
///
/// - A new entry is created, claimed and inserted in one critical section,
///   so no thread can observe an entry its creator has not claimed yet
/// - Claiming an existing entry happens after the registry mutex is
///   released; a slow holder on one name never stalls other names
/// - Releasing drops the primitive guard, decrements the holder count and
///   removes the entry at zero, all under the registry mutex
///
/// `P` is the per-name primitive (`parking_lot::Mutex<()>` or
/// `parking_lot::RwLock<()>`).
pub struct Registry<K, P> {
    state: Mutex<RegistryState<K, P>>,
    acquisitions: AtomicU64,
    timeouts: AtomicU64,
}

impl<K, P> Registry<K, P>
where
    K: LockName,
    P: Default + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a registry whose map is pre-sized for `capacity` names
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                entries: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
                entries_created: 0,
                entries_destroyed: 0,
                peak_entries: 0,
            }),
            acquisitions: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
        }
    }

    /// Find or create the entry for `name` and claim its primitive
    ///
    /// `claim` receives `Wait::Immediate` for a fresh entry (called under
    /// the registry mutex, must not block) and `Wait::Bounded(timeout)` for
    /// an existing one (called without the registry mutex). Returning `None`
    /// means the wait timed out; the holder count taken for this call is
    /// given back before the error is returned.
    pub(crate) fn acquire<H, F>(
        &self,
        name: &K,
        timeout: Duration,
        mode: LockMode,
        claim: F,
    ) -> LockResult<(Arc<P>, H)>
    where
        F: FnOnce(&Arc<P>, Wait) -> Option<H>,
    {
        let mut state = self.state.lock();

        let existing = state.entries.get_mut(name).map(|entry| {
            entry.live_holders += 1;
            (Arc::clone(&entry.primitive), entry.live_holders)
        });

        if let Some((primitive, holders)) = existing {
            drop(state);

            debug!(name = ?name, mode = %mode, holders, "Waiting on existing named lock");

            return match claim(&primitive, Wait::Bounded(timeout)) {
                Some(held) => {
                    self.acquisitions.fetch_add(1, Ordering::Relaxed);
                    Ok((primitive, held))
                }
                None => {
                    self.abandon(name, &primitive);
                    self.timeouts.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        name = ?name,
                        mode = %mode,
                        timeout_ms = millis_field(timeout),
                        "Named lock acquisition timed out - possible deadlock"
                    );
                    Err(LockError::timeout(name, timeout, mode))
                }
            };
        }

        let primitive = Arc::new(P::default());
        let Some(held) = claim(&primitive, Wait::Immediate) else {
            return Err(LockError::timeout(name, timeout, mode));
        };

        state.entries.insert(
            name.clone(),
            Entry {
                primitive: Arc::clone(&primitive),
                live_holders: 1,
            },
        );
        state.entries_created += 1;
        state.peak_entries = state.peak_entries.max(state.entries.len());
        drop(state);

        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        trace!(name = ?name, mode = %mode, "Created named lock entry");

        Ok((primitive, held))
    }

    /// Release `held` and drop one holder from the entry for `name`
    ///
    /// `primitive` identifies the entry the guard was issued against; a
    /// missing or different entry is reported as `ReleaseWithoutAcquire`
    /// and nothing in the map is touched. `held` is dropped either way.
    pub(crate) fn release<H>(&self, name: &K, primitive: &Arc<P>, held: H) -> LockResult<()> {
        let mut state = self.state.lock();
        drop(held);

        let remaining = match state.entries.get_mut(name) {
            Some(entry) if Arc::ptr_eq(&entry.primitive, primitive) => {
                entry.live_holders -= 1;
                Some(entry.live_holders)
            }
            _ => None,
        };

        match remaining {
            Some(0) => {
                state.entries.remove(name);
                state.entries_destroyed += 1;
                drop(state);
                trace!(name = ?name, "Destroyed named lock entry");
                Ok(())
            }
            Some(holders) => {
                drop(state);
                trace!(name = ?name, holders, "Released named lock");
                Ok(())
            }
            None => {
                drop(state);
                error!(name = ?name, "Named lock released without a matching entry");
                Err(LockError::ReleaseWithoutAcquire {
                    name: render_name(name),
                })
            }
        }
    }

    /// Give back the holder count of a claim that timed out
    fn abandon(&self, name: &K, primitive: &Arc<P>) {
        let mut state = self.state.lock();

        let remaining = match state.entries.get_mut(name) {
            Some(entry) if Arc::ptr_eq(&entry.primitive, primitive) => {
                entry.live_holders -= 1;
                entry.live_holders
            }
            _ => return,
        };

        if remaining == 0 {
            state.entries.remove(name);
            state.entries_destroyed += 1;
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Check if `name` has a live entry
    pub fn contains(&self, name: &K) -> bool {
        self.state.lock().entries.contains_key(name)
    }

    /// Holders (owners plus waiters) of the entry for `name`
    pub fn holders(&self, name: &K) -> Option<usize> {
        self.state
            .lock()
            .entries
            .get(name)
            .map(|entry| entry.live_holders)
    }

    /// Names with a live entry, in no particular order
    pub fn names(&self) -> Vec<K> {
        self.state.lock().entries.keys().cloned().collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let state = self.state.lock();
        RegistryStats {
            entries: state.entries.len(),
            peak_entries: state.peak_entries,
            entries_created: state.entries_created,
            entries_destroyed: state.entries_destroyed,
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

impl<K, P> Default for Registry<K, P>
where
    K: LockName,
    P: Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
