//! CPU-side buffer data
//!
//! [`BufferData<T>`] is the typed store every mesh, quad and widget keeps its
//! vertex attributes in before upload. It behaves like a classic NIO-style
//! buffer: a fixed capacity, a cursor (`position`) that advances on sequential
//! access, and a `limit` that bounds it.
//!
//! ```text
//!  0 <= position <= limit <= capacity
//!  [ written .......... | remaining .......... | beyond limit ]
//! ```
//!
//! Every mutation marks the buffer dirty; the upload side reads
//! [`BufferData::as_bytes`] and clears the flag with [`BufferData::mark_clean`].
//! Index lists live in [`IndexBufferData`] and its fixed-width forms
//! ([`ByteBufferData`], [`ShortBufferData`], [`IntBufferData`]), which layer
//! width selection and non-negativity checks on top of this type.

mod index;

use std::fmt;

use bytemuck::Pod;
use strata_core::errors::{Result, StrataError};

use crate::version_tracker::{ChangeTracker, MutGuard};

pub use index::{ByteBufferData, IndexBufferData, IndexWidth, IntBufferData, ShortBufferData};

// ============================================================================
// Element types
// ============================================================================

/// Primitive kind of a buffer element, as the upload side needs to know it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
}

impl ElementKind {
    #[must_use]
    pub const fn byte_width(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
        }
    }
}

/// A primitive that can be stored in a [`BufferData`].
pub trait BufferElement: Pod + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const KIND: ElementKind;
}

macro_rules! impl_buffer_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl BufferElement for $ty {
                const KIND: ElementKind = ElementKind::$kind;
            }
        )*
    };
}

impl_buffer_element! {
    i8 => Byte,
    u8 => UnsignedByte,
    i16 => Short,
    u16 => UnsignedShort,
    i32 => Int,
    u32 => UnsignedInt,
    f32 => Float,
}

/// Vertex attribute data (positions, normals, UVs, ...).
pub type FloatBufferData = BufferData<f32>;

// ============================================================================
// Access mode
// ============================================================================

/// Expected update frequency of the buffer contents.
///
/// Only used to pick an upload strategy; never affects correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessMode {
    /// Written once, drawn many times.
    #[default]
    Static,
    /// Rewritten occasionally.
    Dynamic,
    /// Rewritten every frame.
    Stream,
}

// ============================================================================
// BufferData
// ============================================================================

#[derive(Debug)]
pub struct BufferData<T: BufferElement> {
    data: Vec<T>,
    position: usize,
    limit: usize,
    /// Components per vertex (3 for positions, 2 for UVs, ...).
    tuple_size: usize,
    access_mode: AccessMode,
    tracker: ChangeTracker,
}

impl<T: BufferElement> BufferData<T> {
    /// Zero-filled buffer of `capacity` elements, cursor at the start.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::from_vec(vec![T::default(); capacity])
    }

    /// Buffer holding a copy of `values`, ready to be read from the start.
    #[must_use]
    pub fn from_slice(values: &[T]) -> Self {
        Self::from_vec(values.to_vec())
    }

    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        let limit = data.len();
        Self {
            data,
            position: 0,
            limit,
            tuple_size: 1,
            access_mode: AccessMode::default(),
            tracker: ChangeTracker::new(),
        }
    }

    #[must_use]
    pub fn with_access_mode(mut self, access_mode: AccessMode) -> Self {
        self.access_mode = access_mode;
        self
    }

    #[must_use]
    pub fn with_tuple_size(mut self, tuple_size: usize) -> Self {
        self.tuple_size = tuple_size.max(1);
        self
    }

    // === Metadata ===

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    /// Width of one element in bytes (1, 2 or 4).
    #[inline]
    #[must_use]
    pub fn byte_width(&self) -> usize {
        T::KIND.byte_width()
    }

    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len() * self.byte_width()
    }

    #[inline]
    #[must_use]
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    pub fn set_access_mode(&mut self, access_mode: AccessMode) {
        self.access_mode = access_mode;
    }

    #[inline]
    #[must_use]
    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    /// Number of whole tuples within the limit.
    #[inline]
    #[must_use]
    pub fn tuple_count(&self) -> usize {
        self.limit / self.tuple_size
    }

    // === Dirty tracking ===

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.tracker.changed();
    }

    #[inline]
    pub fn mark_clean(&mut self) {
        self.tracker.mark_clean();
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    // === Cursor ===

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    #[inline]
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(StrataError::InvalidCursor {
                value: position,
                bound: self.limit,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Moves the limit; the position is clamped to it.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.capacity() {
            return Err(StrataError::InvalidCursor {
                value: limit,
                bound: self.capacity(),
            });
        }
        self.limit = limit;
        self.position = self.position.min(limit);
        Ok(())
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Limit becomes the current position and the cursor returns to the start.
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Resets the cursor for a full rewrite. Contents are kept.
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity();
    }

    // === Reads ===

    pub fn get(&mut self) -> Result<T> {
        if !self.has_remaining() {
            return Err(StrataError::BufferUnderflow {
                position: self.position,
                limit: self.limit,
            });
        }
        let value = self.data[self.position];
        self.position += 1;
        Ok(value)
    }

    pub fn get_at(&self, index: usize) -> Result<T> {
        self.data
            .get(index)
            .copied()
            .ok_or(StrataError::IndexOutOfBounds {
                index,
                capacity: self.capacity(),
            })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Elements between the position and the limit.
    #[inline]
    #[must_use]
    pub fn remaining_slice(&self) -> &[T] {
        &self.data[self.position..self.limit]
    }

    /// Raw bytes of the whole store, as handed to the driver on upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Direct mutable access; the buffer is marked changed when the guard drops.
    pub fn data_mut(&mut self) -> MutGuard<'_, [T]> {
        MutGuard::new(self.data.as_mut_slice(), &mut self.tracker)
    }

    // === Writes ===

    fn ensure_remaining(&self, requested: usize) -> Result<()> {
        if requested > self.remaining() {
            return Err(StrataError::CapacityExceeded {
                requested,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn put(&mut self, value: T) -> Result<&mut Self> {
        self.ensure_remaining(1)?;
        self.data[self.position] = value;
        self.position += 1;
        self.tracker.changed();
        Ok(self)
    }

    /// Random write, checked against capacity rather than the cursor.
    pub fn put_at(&mut self, index: usize, value: T) -> Result<&mut Self> {
        let capacity = self.capacity();
        let slot = self
            .data
            .get_mut(index)
            .ok_or(StrataError::IndexOutOfBounds { index, capacity })?;
        *slot = value;
        self.tracker.changed();
        Ok(self)
    }

    /// Copies all of `values` at the cursor. Nothing is written if they do not fit.
    pub fn put_slice(&mut self, values: &[T]) -> Result<&mut Self> {
        self.ensure_remaining(values.len())?;
        let start = self.position;
        self.data[start..start + values.len()].copy_from_slice(values);
        self.position += values.len();
        self.tracker.changed();
        Ok(self)
    }

    pub fn put_slice_range(&mut self, values: &[T], offset: usize, length: usize) -> Result<&mut Self> {
        let end = offset.saturating_add(length);
        if end > values.len() {
            return Err(StrataError::IndexOutOfBounds {
                index: end,
                capacity: values.len(),
            });
        }
        self.put_slice(&values[offset..end])
    }

    /// Copies the remaining elements of `source`, advancing both cursors.
    pub fn put_buffer(&mut self, source: &mut BufferData<T>) -> Result<&mut Self> {
        let count = source.remaining();
        self.ensure_remaining(count)?;
        let start = self.position;
        self.data[start..start + count].copy_from_slice(source.remaining_slice());
        self.position += count;
        source.position += count;
        self.tracker.changed();
        Ok(self)
    }

    // === Reallocation ===

    /// Reallocates to `capacity` elements, keeping the common prefix.
    ///
    /// A limit that spanned the whole buffer keeps spanning it; otherwise it
    /// is clamped, and so is the position.
    pub fn resize(&mut self, capacity: usize) {
        let full = self.limit == self.capacity();
        self.data.resize(capacity, T::default());
        self.limit = if full { capacity } else { self.limit.min(capacity) };
        self.position = self.position.min(self.limit);
        self.tracker.changed();
    }

    /// Independent copy with identical contents, limit, tuple size and access
    /// mode. The cursor starts at zero and the copy is dirty.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            data: self.data.clone(),
            position: 0,
            limit: self.limit,
            tuple_size: self.tuple_size,
            access_mode: self.access_mode,
            tracker: ChangeTracker::new(),
        }
    }
}

impl<T: BufferElement> PartialEq for BufferData<T> {
    /// Content equality: elements and limit, ignoring cursor and dirty state.
    fn eq(&self, other: &Self) -> bool {
        self.limit == other.limit && self.data == other.data
    }
}
