//! GPU Resource Handle Registry
//!
//! Associates client objects ([`Tracked<T>`]) with the driver handles created
//! for them in each rendering context, and turns object reclamation into a
//! deferred, context-affine cleanup the render loop performs once per frame.
//!
//! # Flow
//!
//! ```text
//!  render thread                          any thread
//!  ─────────────                          ──────────
//!  register(&obj)      ──▶ entry (Created)
//!  put(id, ctx, h)     ──▶ entry (Populated)
//!                                         last Tracked<T> dropped
//!                          reclaim channel ◀── EntryId
//!  drain_pending_cleanup() ◀── claims queued ids, removes entries
//!  delete handles with ctx current
//! ```
//!
//! # Threading
//!
//! All mutation happens through `&mut self` on the render thread. The only
//! cross-thread path is the reclamation channel: drop hooks append to it, and
//! only a drain consumes it. Every queued id is received exactly once, and an
//! entry leaves the slot map exactly once, so no handle is handed out for
//! deletion twice.

mod cleanup;
mod entry;

use flume::{Receiver, Sender};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use strata_core::context::RenderContextRef;
use strata_core::errors::{Result, StrataError};
use strata_core::ids::{EntryId, ObjectId};
use strata_core::settings::{ContextMode, RegistrySettings};
use strata_resources::tracked::Tracked;

pub use cleanup::{CleanupBatch, HandleDeleter};
pub use entry::{ContextHandles, EntryState, HandleSlots, ResourceHandleEntry};

/// Registry of driver handles of type `H` for tracked objects of type `T`.
pub struct ResourceRegistry<T, H> {
    mode: ContextMode,
    entries: SlotMap<EntryId, ResourceHandleEntry<T, H>>,
    by_object: FxHashMap<ObjectId, EntryId>,
    /// Entries known to be unreachable, waiting for the next drain.
    pending: Vec<EntryId>,
    reclaim_tx: Sender<EntryId>,
    reclaim_rx: Receiver<EntryId>,
}

impl<T, H> ResourceRegistry<T, H> {
    #[must_use]
    pub fn new(settings: RegistrySettings) -> Self {
        let (reclaim_tx, reclaim_rx) = flume::unbounded();
        log::debug!(
            "Created resource registry (context mode: {:?})",
            settings.context_mode
        );
        Self {
            mode: settings.context_mode,
            entries: SlotMap::with_capacity_and_key(settings.initial_capacity),
            by_object: FxHashMap::default(),
            pending: Vec::new(),
            reclaim_tx,
            reclaim_rx,
        }
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    // ========================================================================
    // Registration & handle access
    // ========================================================================

    /// Starts tracking `object`.
    ///
    /// Fails with [`StrataError::DuplicateRegistration`] while an earlier
    /// entry for the same object has not been cleaned up.
    pub fn register(&mut self, object: &Tracked<T>) -> Result<EntryId> {
        let object_id = object.id();
        if let Some(existing) = self.by_object.get(&object_id) {
            log::warn!("Object {object_id:?} is already registered as {existing:?}");
            return Err(StrataError::DuplicateRegistration(object_id));
        }

        let id = self
            .entries
            .insert(ResourceHandleEntry::new(object.downgrade(), self.mode));
        self.by_object.insert(object_id, id);
        object.add_reclaim_watcher(self.reclaim_tx.clone(), id);
        log::trace!("Registered {object_id:?} as {id:?}");
        Ok(id)
    }

    /// Stores `handle` for `context`, returning the handle it replaced.
    ///
    /// In single-context mode the context only labels the shared slot.
    pub fn put(&mut self, id: EntryId, context: RenderContextRef, handle: H) -> Result<Option<H>> {
        let entry = self.entries.get_mut(id).ok_or(StrataError::StaleEntry(id))?;
        Ok(entry.put(context, handle))
    }

    /// Handle stored for `context`. Cleaned-up ids yield `None`.
    #[must_use]
    pub fn get(&self, id: EntryId, context: RenderContextRef) -> Option<&H> {
        self.entries.get(id)?.slots().get(context)
    }

    /// Takes the handle for `context` out of the registry so the caller can
    /// free it right away.
    ///
    /// Removing the last handle disposes of the entry. Cleaned-up ids yield
    /// `None`.
    pub fn remove(&mut self, id: EntryId, context: RenderContextRef) -> Option<H> {
        let entry = self.entries.get_mut(id)?;
        let removed = entry.remove(context);
        if entry.state() == EntryState::Disposed {
            log::trace!("{id:?} disposed after its last handle was removed");
            self.discard(id);
        }
        removed
    }

    /// Disposes of an entry at once, returning all of its handles.
    pub fn dispose(&mut self, id: EntryId) -> Option<CleanupBatch<H>> {
        let mut entry = self.discard(id)?;
        let handles = entry.finish(EntryState::Disposed);
        log::trace!("{id:?} disposed with {} handle(s)", handles.len());
        Some(CleanupBatch { entry: id, handles })
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&ResourceHandleEntry<T, H>> {
        self.entries.get(id)
    }

    /// Entry currently tracking `object`, if any.
    #[must_use]
    pub fn entry_for(&self, object: &Tracked<T>) -> Option<EntryId> {
        self.by_object.get(&object.id()).copied()
    }

    /// State of a live entry; `None` once it has left the registry.
    #[must_use]
    pub fn state(&self, id: EntryId) -> Option<EntryState> {
        self.entries.get(id).map(ResourceHandleEntry::state)
    }

    /// Whether `get(id, context)` would find a handle. In single-context mode
    /// this is true for any context once the shared slot is filled.
    #[must_use]
    pub fn contains_context(&self, id: EntryId, context: RenderContextRef) -> bool {
        self.get(id, context).is_some()
    }

    #[must_use]
    pub fn contexts(&self, id: EntryId) -> SmallVec<[RenderContextRef; 2]> {
        self.entries
            .get(id)
            .map(|entry| entry.slots().contexts())
            .unwrap_or_default()
    }

    /// Whether the tracked object still has an owner.
    #[must_use]
    pub fn is_reachable(&self, id: EntryId) -> bool {
        self.entries
            .get(id)
            .is_some_and(|entry| entry.object().is_alive())
    }

    /// A new owner of the tracked object, if it is still alive.
    #[must_use]
    pub fn tracked(&self, id: EntryId) -> Option<Tracked<T>> {
        self.entries.get(id)?.object().upgrade()
    }

    /// Number of entries not yet cleaned up, including pending ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upper bound on the number of entries the next drain will return.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len() + self.reclaim_rx.len()
    }

    // ========================================================================
    // Reclamation & cleanup
    // ========================================================================

    /// Queues an entry as if its object had just been reclaimed.
    ///
    /// Returns `false` for ids that are already pending or gone.
    pub fn mark_unreachable(&mut self, id: EntryId) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            return false;
        };
        if !entry.mark_pending() {
            return false;
        }
        self.pending.push(id);
        true
    }

    /// Moves reclamation signals received so far into the pending queue.
    /// Returns how many entries became pending.
    pub fn poll_reclaimed(&mut self) -> usize {
        let mut queued = 0;
        for id in self.reclaim_rx.try_iter() {
            let Some(entry) = self.entries.get_mut(id) else {
                log::trace!("Ignoring reclamation signal for stale {id:?}");
                continue;
            };
            if entry.mark_pending() {
                self.pending.push(id);
                queued += 1;
            } else {
                log::trace!("Duplicate reclamation signal for {id:?}");
            }
        }
        queued
    }

    /// Removes every entry whose object became unreachable since the last
    /// drain and returns the handles it held.
    ///
    /// Call once per frame from the render thread, then delete each handle
    /// with its context current.
    pub fn drain_pending_cleanup(&mut self) -> Vec<CleanupBatch<H>> {
        self.poll_reclaimed();
        let claimed = std::mem::take(&mut self.pending);

        let mut batches = Vec::with_capacity(claimed.len());
        for id in claimed {
            let Some(mut entry) = self.discard(id) else {
                continue;
            };
            let handles = entry.finish(EntryState::Cleaned);
            batches.push(CleanupBatch { entry: id, handles });
        }

        if !batches.is_empty() {
            let handle_count: usize = batches.iter().map(CleanupBatch::len).sum();
            log::debug!(
                "Drained {} entr(ies) with {handle_count} handle(s) for cleanup",
                batches.len()
            );
        }
        batches
    }

    /// Drains pending entries and deletes their handles, one context at a time.
    /// Returns the number of handles deleted.
    pub fn cleanup(&mut self, deleter: &mut impl HandleDeleter<H>) -> usize {
        let batches = self.drain_pending_cleanup();
        delete_grouped(batches, deleter)
    }

    /// Drops every handle stored for a destroyed context.
    ///
    /// The handles died with their context, so they are returned for
    /// bookkeeping only and must not be passed to the driver.
    pub fn forget_context(&mut self, context: RenderContextRef) -> Vec<(EntryId, H)> {
        let forgotten: Vec<(EntryId, H)> = self
            .entries
            .iter_mut()
            .filter_map(|(id, entry)| entry.forget(context).map(|handle| (id, handle)))
            .collect();
        if !forgotten.is_empty() {
            log::debug!(
                "Forgot {} handle(s) of destroyed context {context:?}",
                forgotten.len()
            );
        }
        forgotten
    }

    /// Deletes every outstanding handle, live or pending, and consumes the
    /// registry. Returns the number of handles deleted.
    pub fn shutdown(mut self, deleter: &mut impl HandleDeleter<H>) -> usize {
        self.poll_reclaimed();
        self.pending.clear();

        let ids: Vec<EntryId> = self.entries.keys().collect();
        let batches: Vec<CleanupBatch<H>> = ids
            .into_iter()
            .filter_map(|id| {
                let mut entry = self.discard(id)?;
                let handles = entry.finish(EntryState::Cleaned);
                Some(CleanupBatch { entry: id, handles })
            })
            .collect();

        let entry_count = batches.len();
        let deleted = delete_grouped(batches, deleter);
        log::info!("Registry shut down: {entry_count} entr(ies), {deleted} handle(s) deleted");
        deleted
    }

    /// Removes an entry from every index and stops watching its object.
    fn discard(&mut self, id: EntryId) -> Option<ResourceHandleEntry<T, H>> {
        let entry = self.entries.remove(id)?;
        self.by_object.remove(&entry.object_id());
        if let Some(object) = entry.object().upgrade() {
            object.remove_reclaim_watcher(&self.reclaim_tx, id);
        }
        Some(entry)
    }
}

impl<T, H> Default for ResourceRegistry<T, H> {
    fn default() -> Self {
        Self::new(RegistrySettings::from_process())
    }
}

impl<T, H> Drop for ResourceRegistry<T, H> {
    fn drop(&mut self) {
        let leaked: usize = self.entries.values().map(|entry| entry.slots().len()).sum();
        if leaked > 0 {
            log::warn!(
                "Resource registry dropped with {leaked} handle(s) in {} entr(ies); call shutdown() to delete them",
                self.entries.len()
            );
        }
    }
}

fn delete_grouped<H>(batches: Vec<CleanupBatch<H>>, deleter: &mut impl HandleDeleter<H>) -> usize {
    let mut grouped: Vec<_> = CleanupBatch::group_by_context(batches).into_iter().collect();
    grouped.sort_unstable_by_key(|(context, _)| *context);

    let mut deleted = 0;
    for (context, handles) in grouped {
        for (id, handle) in handles {
            log::trace!("Deleting handle of {id:?} in {context:?}");
            deleter.delete(context, handle);
            deleted += 1;
        }
    }
    deleted
}
