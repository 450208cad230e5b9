//! Render Context Identity
//!
//! A [`RenderContextRef`] names one native rendering context. The windowing
//! layer creates and destroys contexts; everything else only compares and
//! hashes the token.
//!
//! [`ContextManager`] is the bookkeeping side of that layer: it hands out
//! fresh refs and remembers which ones are still live, so a renderer can purge
//! handles that died together with their context.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one native rendering context.
///
/// Ids are never reused for the lifetime of the process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderContextRef(u64);

impl RenderContextRef {
    /// Allocates a fresh, never-before-seen context identity.
    #[must_use]
    pub fn new() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Default for RenderContextRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ctx#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct ContextInfo {
    label: String,
}

/// Tracks the set of live rendering contexts.
///
/// Interior locking lets the windowing layer share one manager between the
/// render thread and whichever thread owns the canvases.
#[derive(Debug, Default)]
pub struct ContextManager {
    live: RwLock<FxHashMap<RenderContextRef, ContextInfo>>,
}

impl ContextManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new live context with an optional debug label.
    pub fn create_context(&self, label: Option<&str>) -> RenderContextRef {
        let context = RenderContextRef::new();
        let label = label.unwrap_or("RenderContext").to_string();
        log::debug!("Created render context {context:?} ({label})");
        self.live.write().insert(context, ContextInfo { label });
        context
    }

    /// Marks a context as destroyed. Returns `false` if it was not live.
    pub fn destroy_context(&self, context: RenderContextRef) -> bool {
        let removed = self.live.write().remove(&context);
        match removed {
            Some(info) => {
                log::debug!("Destroyed render context {context:?} ({})", info.label);
                true
            }
            None => {
                log::warn!("Attempted to destroy unknown render context {context:?}");
                false
            }
        }
    }

    #[must_use]
    pub fn is_live(&self, context: RenderContextRef) -> bool {
        self.live.read().contains_key(&context)
    }

    #[must_use]
    pub fn label(&self, context: RenderContextRef) -> Option<String> {
        self.live.read().get(&context).map(|info| info.label.clone())
    }

    /// Snapshot of all live contexts, in creation order.
    #[must_use]
    pub fn live_contexts(&self) -> Vec<RenderContextRef> {
        let mut contexts: Vec<_> = self.live.read().keys().copied().collect();
        contexts.sort_unstable();
        contexts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_refs_never_collide() {
        let a = RenderContextRef::new();
        let b = RenderContextRef::new();
        assert_ne!(a, b);
    }

    #[test]
    fn destroy_twice_reports_unknown() {
        let manager = ContextManager::new();
        let ctx = manager.create_context(Some("main"));
        assert!(manager.destroy_context(ctx));
        assert!(!manager.destroy_context(ctx));
    }
}
