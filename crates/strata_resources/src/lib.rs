//! CPU-side resources of the Strata engine.
//!
//! - [`buffer`]: typed vertex/index data with cursor access and dirty tracking
//! - [`tracked`]: shared owners whose reclamation registries can observe
//! - [`version_tracker`]: change tracking shared by the buffer types

pub mod buffer;
pub mod tracked;
pub mod version_tracker;

pub use buffer::{
    AccessMode, BufferData, BufferElement, ByteBufferData, ElementKind, FloatBufferData,
    IndexBufferData, IndexWidth, IntBufferData, ShortBufferData,
};
pub use tracked::{Tracked, WeakTracked};
pub use version_tracker::{ChangeTracker, MutGuard};
