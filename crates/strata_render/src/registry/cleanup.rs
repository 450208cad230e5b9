//! Cleanup output and the driver-deletion seam.

use rustc_hash::FxHashMap;
use strata_core::context::RenderContextRef;
use strata_core::ids::EntryId;

use super::entry::ContextHandles;

/// Every handle an entry held when it left the registry.
///
/// The caller deletes each handle with its context current, then discards
/// the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupBatch<H> {
    pub entry: EntryId,
    pub handles: ContextHandles<H>,
}

impl<H> CleanupBatch<H> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Regroups drained batches per context, so each context can be made
    /// current once and all of its handles deleted together.
    pub fn group_by_context(
        batches: impl IntoIterator<Item = Self>,
    ) -> FxHashMap<RenderContextRef, Vec<(EntryId, H)>> {
        let mut grouped: FxHashMap<RenderContextRef, Vec<(EntryId, H)>> = FxHashMap::default();
        for batch in batches {
            for (context, handle) in batch.handles {
                grouped.entry(context).or_default().push((batch.entry, handle));
            }
        }
        grouped
    }
}

/// Issues the actual driver delete call for one handle.
///
/// Implementations run on the render thread during a drain and are expected
/// to make `context` current before deleting.
pub trait HandleDeleter<H> {
    fn delete(&mut self, context: RenderContextRef, handle: H);
}

impl<H, F> HandleDeleter<H> for F
where
    F: FnMut(RenderContextRef, H),
{
    fn delete(&mut self, context: RenderContextRef, handle: H) {
        self(context, handle);
    }
}
