// ── Single-writer shared state ──
//
// The data model expects one owner per object tree: the session layer
// applies controller writes, device logic applies its own, never both at
// once. `SharedTable` serializes writers behind a mutex and publishes a
// fresh snapshot plus a version bump over `watch` channels after every
// write, so readers never hold the lock.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

/// Shared, observable owner of one piece of model state (usually a
/// [`Table`](super::Table) or [`PrecedenceTable`](super::PrecedenceTable)).
pub struct SharedTable<S: Clone + Send + Sync + 'static> {
    state: Mutex<S>,

    /// Version counter, bumped on every committed write.
    version: watch::Sender<u64>,

    /// Last committed state.
    snapshot: watch::Sender<Arc<S>>,
}

impl<S: Clone + Send + Sync + 'static> SharedTable<S> {
    pub fn new(state: S) -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(state.clone()));
        Self {
            state: Mutex::new(state),
            version,
            snapshot,
        }
    }

    /// Run a write against the state.
    ///
    /// A snapshot is published only when `f` returns `Ok`; on `Err` the
    /// state is rolled back to what it was before the call.
    pub fn write<R, E>(&self, f: impl FnOnce(&mut S) -> Result<R, E>) -> Result<R, E> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.clone();
        match f(&mut state) {
            Ok(out) => {
                self.snapshot.send_replace(Arc::new(state.clone()));
                self.version.send_modify(|v| *v += 1);
                tracing::trace!(version = *self.version.borrow(), "shared state committed");
                Ok(out)
            }
            Err(e) => {
                *state = before;
                Err(e)
            }
        }
    }

    /// Read the current state under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Last committed state, without locking.
    pub fn snapshot(&self) -> Arc<S> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to committed states.
    pub fn subscribe(&self) -> watch::Receiver<Arc<S>> {
        self.snapshot.subscribe()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn subscribe_version(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

impl<S: Clone + Send + Sync + Default + 'static> Default for SharedTable<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
