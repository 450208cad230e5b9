//! Foundational types for the Strata engine: errors, identifiers, render
//! context identity and registry settings.

pub mod context;
pub mod errors;
pub mod ids;
pub mod settings;

pub use context::{ContextManager, RenderContextRef};
pub use errors::{Result, StrataError};
pub use ids::{EntryId, ObjectId};
pub use settings::{ContextMode, RegistrySettings};
