//! Renderer-side resource bookkeeping for the Strata engine.
//!
//! The [`registry`] module owns the mapping from tracked client objects to
//! per-context driver handles and the deferred cleanup of those handles.

pub mod registry;

pub use registry::{
    CleanupBatch, EntryState, HandleDeleter, HandleSlots, ResourceHandleEntry, ResourceRegistry,
};
