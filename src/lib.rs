//! # Strata
//!
//! GPU resource lifecycle bookkeeping for a scene-graph renderer.
//!
//! Scene objects keep their geometry in typed [`BufferData`] stores and are
//! wrapped in [`Tracked`] owners. The renderer registers each tracked object
//! in a [`ResourceRegistry`], stores the driver handles it creates per
//! [`RenderContextRef`], and once per frame drains the entries whose objects
//! were dropped, deleting their handles with the right context current.
//!
//! ```rust,ignore
//! use strata::prelude::*;
//!
//! let contexts = ContextManager::new();
//! let main = contexts.create_context(Some("main"));
//! let mut registry: ResourceRegistry<FloatBufferData, u32> =
//!     ResourceRegistry::new(RegistrySettings::multi());
//!
//! let positions = Tracked::new(FloatBufferData::from_slice(&[0.0; 9]).with_tuple_size(3));
//! let id = registry.register(&positions)?;
//! registry.put(id, main, 42)?;
//!
//! drop(positions);
//! registry.cleanup(&mut |ctx, handle| delete_vbo(ctx, handle));
//! ```

pub use strata_core::{context, errors, ids, settings};
pub use strata_render::registry;
pub use strata_resources::{buffer, tracked, version_tracker};

pub use strata_core::{
    ContextManager, ContextMode, EntryId, ObjectId, RegistrySettings, RenderContextRef, Result,
    StrataError,
};
pub use strata_render::{
    CleanupBatch, EntryState, HandleDeleter, HandleSlots, ResourceHandleEntry, ResourceRegistry,
};
pub use strata_resources::{
    AccessMode, BufferData, BufferElement, ByteBufferData, ElementKind, FloatBufferData,
    IndexBufferData, IndexWidth, IntBufferData, ShortBufferData, Tracked, WeakTracked,
};

pub mod prelude {
    pub use crate::{
        AccessMode, BufferData, CleanupBatch, ContextManager, ContextMode, EntryId, EntryState,
        FloatBufferData, HandleDeleter, IndexBufferData, IndexWidth, IntBufferData,
        RegistrySettings, RenderContextRef, ResourceRegistry, StrataError, Tracked,
    };
}
