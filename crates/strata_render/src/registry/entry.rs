//! Per-object handle records.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use strata_core::context::RenderContextRef;
use strata_core::ids::ObjectId;
use strata_core::settings::ContextMode;
use strata_resources::tracked::WeakTracked;

/// Handles drained from one entry, tagged with their owning context.
pub type ContextHandles<H> = SmallVec<[(RenderContextRef, H); 2]>;

/// Lifecycle of one entry.
///
/// ```text
/// Created ──put──▶ Populated ──reclaimed──▶ PendingCleanup ──drain──▶ Cleaned
///    │                 │
///    └────remove all───┴──────────────────▶ Disposed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    Created,
    Populated,
    PendingCleanup,
    Cleaned,
    Disposed,
}

impl EntryState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cleaned | Self::Disposed)
    }
}

/// Handle storage, chosen once per entry from the deployment mode.
#[derive(Debug, Clone)]
pub enum HandleSlots<H> {
    /// Shared slot; remembers the context the handle was last stored under.
    Scalar(Option<(RenderContextRef, H)>),
    PerContext(FxHashMap<RenderContextRef, H>),
}

impl<H> HandleSlots<H> {
    #[must_use]
    pub fn for_mode(mode: ContextMode) -> Self {
        match mode {
            ContextMode::Single => Self::Scalar(None),
            ContextMode::Multi => Self::PerContext(FxHashMap::default()),
        }
    }

    /// Stores `handle`, returning whatever it replaced.
    pub fn put(&mut self, context: RenderContextRef, handle: H) -> Option<H> {
        match self {
            Self::Scalar(slot) => slot.replace((context, handle)).map(|(_, old)| old),
            Self::PerContext(map) => map.insert(context, handle),
        }
    }

    #[must_use]
    pub fn get(&self, context: RenderContextRef) -> Option<&H> {
        match self {
            Self::Scalar(slot) => slot.as_ref().map(|(_, handle)| handle),
            Self::PerContext(map) => map.get(&context),
        }
    }

    pub fn remove(&mut self, context: RenderContextRef) -> Option<H> {
        match self {
            Self::Scalar(slot) => slot.take().map(|(_, handle)| handle),
            Self::PerContext(map) => map.remove(&context),
        }
    }

    /// Whether a handle is visible from `context`.
    ///
    /// A scalar slot answers for every context once it holds a handle, and
    /// for none while it is empty.
    #[must_use]
    pub fn contains(&self, context: RenderContextRef) -> bool {
        self.get(context).is_some()
    }

    /// Contexts holding a handle. In scalar mode this is the context the
    /// shared handle was last stored under.
    #[must_use]
    pub fn contexts(&self) -> SmallVec<[RenderContextRef; 2]> {
        match self {
            Self::Scalar(slot) => slot.iter().map(|(context, _)| *context).collect(),
            Self::PerContext(map) => map.keys().copied().collect(),
        }
    }

    /// Removes a handle that belongs to `context` only.
    ///
    /// Unlike [`remove`](Self::remove), scalar slots are only cleared when the
    /// shared handle was stored under that exact context.
    pub fn forget(&mut self, context: RenderContextRef) -> Option<H> {
        match self {
            Self::Scalar(slot) => {
                if slot.as_ref().is_some_and(|(owner, _)| *owner == context) {
                    slot.take().map(|(_, handle)| handle)
                } else {
                    None
                }
            }
            Self::PerContext(map) => map.remove(&context),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(slot) => usize::from(slot.is_some()),
            Self::PerContext(map) => map.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes every handle out, ordered by context.
    pub fn drain(&mut self) -> ContextHandles<H> {
        match self {
            Self::Scalar(slot) => slot.take().into_iter().collect(),
            Self::PerContext(map) => {
                let mut handles: ContextHandles<H> = map.drain().collect();
                handles.sort_unstable_by_key(|(context, _)| *context);
                handles
            }
        }
    }
}

/// Registry record for one tracked object.
#[derive(Debug)]
pub struct ResourceHandleEntry<T, H> {
    object: WeakTracked<T>,
    state: EntryState,
    slots: HandleSlots<H>,
}

impl<T, H> ResourceHandleEntry<T, H> {
    pub(crate) fn new(object: WeakTracked<T>, mode: ContextMode) -> Self {
        Self {
            object,
            state: EntryState::Created,
            slots: HandleSlots::for_mode(mode),
        }
    }

    #[inline]
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        self.object.id()
    }

    #[inline]
    #[must_use]
    pub fn object(&self) -> &WeakTracked<T> {
        &self.object
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> EntryState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn slots(&self) -> &HandleSlots<H> {
        &self.slots
    }

    pub(crate) fn put(&mut self, context: RenderContextRef, handle: H) -> Option<H> {
        let replaced = self.slots.put(context, handle);
        if self.state == EntryState::Created {
            self.state = EntryState::Populated;
        }
        replaced
    }

    pub(crate) fn remove(&mut self, context: RenderContextRef) -> Option<H> {
        let removed = self.slots.remove(context);
        if removed.is_some() && self.slots.is_empty() && self.state != EntryState::PendingCleanup {
            self.state = EntryState::Disposed;
        }
        removed
    }

    pub(crate) fn forget(&mut self, context: RenderContextRef) -> Option<H> {
        self.slots.forget(context)
    }

    pub(crate) fn mark_pending(&mut self) -> bool {
        if matches!(self.state, EntryState::Created | EntryState::Populated) {
            self.state = EntryState::PendingCleanup;
            true
        } else {
            false
        }
    }

    /// Moves the entry to `terminal` and hands back every handle it held.
    pub(crate) fn finish(&mut self, terminal: EntryState) -> ContextHandles<H> {
        debug_assert!(terminal.is_terminal());
        self.state = terminal;
        self.slots.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_slot_ignores_context_on_lookup() {
        let (a, b) = (RenderContextRef::new(), RenderContextRef::new());
        let mut slots = HandleSlots::for_mode(ContextMode::Single);
        assert_eq!(slots.put(a, 7u32), None);
        assert_eq!(slots.get(b), Some(&7));
        assert_eq!(slots.put(b, 8), Some(7));
        assert_eq!(slots.contexts().as_slice(), &[b]);
    }

    #[test]
    fn contains_follows_mode() {
        let (a, b) = (RenderContextRef::new(), RenderContextRef::new());

        let mut scalar = HandleSlots::for_mode(ContextMode::Single);
        assert!(!scalar.contains(a), "empty slot holds nothing");
        scalar.put(a, 1u32);
        assert!(scalar.contains(b));

        let mut per_context = HandleSlots::for_mode(ContextMode::Multi);
        per_context.put(a, 1u32);
        assert!(per_context.contains(a));
        assert!(!per_context.contains(b));
    }

    #[test]
    fn scalar_forget_only_matches_owner() {
        let (a, b) = (RenderContextRef::new(), RenderContextRef::new());
        let mut slots = HandleSlots::for_mode(ContextMode::Single);
        slots.put(a, 1u32);
        assert_eq!(slots.forget(b), None);
        assert_eq!(slots.forget(a), Some(1));
        assert!(slots.is_empty());
    }

    #[test]
    fn per_context_drain_is_sorted_by_context() {
        let (a, b) = (RenderContextRef::new(), RenderContextRef::new());
        let mut slots = HandleSlots::for_mode(ContextMode::Multi);
        slots.put(b, 2u32);
        slots.put(a, 1);
        assert_eq!(slots.drain().as_slice(), &[(a, 1), (b, 2)]);
        assert!(slots.is_empty());
    }
}
