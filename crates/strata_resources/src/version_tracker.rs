/// Change tracker - records mutations of CPU-side data awaiting upload.
///
/// The version only ever grows; the dirty flag is cleared by the upload side
/// once it has consumed the current version.
#[derive(Debug, Clone, Copy)]
pub struct ChangeTracker {
    version: u64,
    dirty: bool,
}

impl ChangeTracker {
    /// New data has never been uploaded, so it starts dirty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: 0,
            dirty: true,
        }
    }

    /// Records a mutation: bumps the version and sets the dirty flag.
    #[inline]
    pub fn changed(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.dirty = true;
    }

    #[inline]
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable guard - marks the tracker changed when the scope ends
pub struct MutGuard<'a, T: ?Sized> {
    data: &'a mut T,
    tracker: &'a mut ChangeTracker,
}

impl<'a, T: ?Sized> MutGuard<'a, T> {
    pub fn new(data: &'a mut T, tracker: &'a mut ChangeTracker) -> Self {
        Self { data, tracker }
    }
}

impl<T: ?Sized> std::ops::Deref for MutGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl<T: ?Sized> std::ops::DerefMut for MutGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.data
    }
}

impl<T: ?Sized> Drop for MutGuard<'_, T> {
    fn drop(&mut self) {
        self.tracker.changed();
    }
}
