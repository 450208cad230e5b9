//! Identifier types shared between the resource and render crates.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::new_key_type;

new_key_type! {
    /// Generational key of one registry entry.
    ///
    /// Once an entry is cleaned up its key never resolves again, even if the
    /// underlying slot is reused.
    pub struct EntryId;
}

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a tracked client object.
///
/// Allocated from a process-wide counter and never reused, so a new object
/// that happens to live at the same address as a reclaimed one is unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_are_unique_and_increasing() {
        let a = ObjectId::next();
        let b = ObjectId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
