//! Reclamation-tracked client objects
//!
//! A scene object that owns GPU-side state is wrapped in a [`Tracked<T>`].
//! Cloning a `Tracked` adds an owner; when the last owner is dropped, on
//! whatever thread that happens, every registry watching the object receives
//! its entry id through a channel. Registries only ever hold a
//! [`WeakTracked<T>`], so registration never extends the object's life.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use flume::Sender;
use parking_lot::Mutex;
use smallvec::SmallVec;
use strata_core::ids::{EntryId, ObjectId};

/// One registry's interest in the reclamation of an object.
#[derive(Debug, Clone)]
struct ReclaimWatcher {
    sender: Sender<EntryId>,
    entry: EntryId,
}

struct TrackedInner<T> {
    id: ObjectId,
    value: T,
    watchers: Mutex<SmallVec<[ReclaimWatcher; 1]>>,
}

impl<T> Drop for TrackedInner<T> {
    fn drop(&mut self) {
        for watcher in self.watchers.get_mut().drain(..) {
            if watcher.sender.send(watcher.entry).is_err() {
                // The registry was shut down first; nothing left to notify.
                log::trace!(
                    "Reclamation of {:?} not delivered, registry is gone",
                    self.id
                );
            }
        }
    }
}

/// Shared owner of a client object whose reclamation is observable.
pub struct Tracked<T> {
    inner: Arc<TrackedInner<T>>,
}

impl<T> Tracked<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(TrackedInner {
                id: ObjectId::next(),
                value,
                watchers: Mutex::new(SmallVec::new()),
            }),
        }
    }

    /// Identity of the object, stable across clones.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// Number of live owners.
    #[inline]
    pub fn owner_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Mutable access while this is the only owner and no [`WeakTracked`]
    /// exists, so never while a registry tracks the object.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        Arc::get_mut(&mut self.inner).map(|inner| &mut inner.value)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakTracked<T> {
        WeakTracked {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Sends `entry` on `sender` once the last owner is dropped.
    pub fn add_reclaim_watcher(&self, sender: Sender<EntryId>, entry: EntryId) {
        self.inner
            .watchers
            .lock()
            .push(ReclaimWatcher { sender, entry });
    }

    /// Withdraws a watcher added with [`add_reclaim_watcher`](Self::add_reclaim_watcher).
    /// Returns `false` if no such watcher was registered.
    pub fn remove_reclaim_watcher(&self, sender: &Sender<EntryId>, entry: EntryId) -> bool {
        let mut watchers = self.inner.watchers.lock();
        let before = watchers.len();
        watchers.retain(|w| !(w.entry == entry && w.sender.same_channel(sender)));
        watchers.len() != before
    }

    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.lock().len()
    }
}

impl<T> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("id", &self.inner.id)
            .field("value", &self.inner.value)
            .finish_non_exhaustive()
    }
}

/// Non-owning link to a tracked object.
pub struct WeakTracked<T> {
    id: ObjectId,
    inner: Weak<TrackedInner<T>>,
}

impl<T> WeakTracked<T> {
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn upgrade(&self) -> Option<Tracked<T>> {
        self.inner.upgrade().map(|inner| Tracked { inner })
    }

    /// Whether at least one owner is still alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T> Clone for WeakTracked<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for WeakTracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakTracked")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
