//! Index buffers
//!
//! Index lists are stored in the narrowest width that can address every
//! vertex of the owning mesh. Values are accepted as signed integers so that
//! negative indices, which are always a caller bug, are rejected explicitly
//! instead of wrapping.
//!
//! [`IndexBufferData`] picks its width at run time. [`ByteBufferData`],
//! [`ShortBufferData`] and [`IntBufferData`] pin it to 8, 16 and 32 bits for
//! owners that know their vertex count up front.

use std::ops::{Deref, DerefMut};

use strata_core::errors::{Result, StrataError};

use super::{AccessMode, BufferData};

/// Storage width of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
}

impl IndexWidth {
    /// Narrowest width able to hold `max_index`.
    #[must_use]
    pub const fn for_max_index(max_index: u32) -> Self {
        if max_index < 256 {
            Self::U8
        } else if max_index < 65536 {
            Self::U16
        } else {
            Self::U32
        }
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
        }
    }

    #[must_use]
    pub const fn byte_width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    #[must_use]
    pub const fn max_value(self) -> u32 {
        match self {
            Self::U8 => u8::MAX as u32,
            Self::U16 => u16::MAX as u32,
            Self::U32 => u32::MAX,
        }
    }

    fn check(self, value: i64) -> Result<u32> {
        if value < 0 || value > i64::from(self.max_value()) {
            return Err(StrataError::InvalidIndexValue {
                value,
                width: self.bits(),
            });
        }
        Ok(value as u32)
    }
}

#[derive(Debug, PartialEq)]
enum IndexStorage {
    U8(BufferData<u8>),
    U16(BufferData<u16>),
    U32(BufferData<u32>),
}

macro_rules! dispatch {
    ($storage:expr, $buf:ident => $body:expr) => {
        match $storage {
            IndexStorage::U8($buf) => $body,
            IndexStorage::U16($buf) => $body,
            IndexStorage::U32($buf) => $body,
        }
    };
}

/// Buffer of non-negative vertex indices in an 8, 16 or 32-bit store.
#[derive(Debug, PartialEq)]
pub struct IndexBufferData {
    storage: IndexStorage,
}

impl IndexBufferData {
    /// Zero-filled index buffer of `count` entries.
    #[must_use]
    pub fn new(width: IndexWidth, count: usize) -> Self {
        let storage = match width {
            IndexWidth::U8 => IndexStorage::U8(BufferData::new(count)),
            IndexWidth::U16 => IndexStorage::U16(BufferData::new(count)),
            IndexWidth::U32 => IndexStorage::U32(BufferData::new(count)),
        };
        Self { storage }
    }

    /// Index buffer sized for a mesh whose largest vertex index is `max_index`.
    #[must_use]
    pub fn for_max_index(count: usize, max_index: u32) -> Self {
        Self::new(IndexWidth::for_max_index(max_index), count)
    }

    /// Narrowest index buffer holding `indices`, ready to be read from the start.
    #[must_use]
    pub fn from_indices(indices: &[u32]) -> Self {
        let max_index = indices.iter().copied().max().unwrap_or(0);
        let storage = match IndexWidth::for_max_index(max_index) {
            IndexWidth::U8 => IndexStorage::U8(BufferData::from_vec(
                indices.iter().map(|&i| i as u8).collect(),
            )),
            IndexWidth::U16 => IndexStorage::U16(BufferData::from_vec(
                indices.iter().map(|&i| i as u16).collect(),
            )),
            IndexWidth::U32 => IndexStorage::U32(BufferData::from_slice(indices)),
        };
        Self { storage }
    }

    #[must_use]
    pub fn with_access_mode(mut self, access_mode: AccessMode) -> Self {
        self.set_access_mode(access_mode);
        self
    }

    // === Metadata ===

    #[must_use]
    pub fn width(&self) -> IndexWidth {
        match self.storage {
            IndexStorage::U8(_) => IndexWidth::U8,
            IndexStorage::U16(_) => IndexWidth::U16,
            IndexStorage::U32(_) => IndexWidth::U32,
        }
    }

    #[must_use]
    pub fn byte_width(&self) -> usize {
        self.width().byte_width()
    }

    #[must_use]
    pub fn access_mode(&self) -> AccessMode {
        dispatch!(&self.storage, b => b.access_mode())
    }

    pub fn set_access_mode(&mut self, access_mode: AccessMode) {
        dispatch!(&mut self.storage, b => b.set_access_mode(access_mode));
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        dispatch!(&self.storage, b => b.is_dirty())
    }

    pub fn mark_dirty(&mut self) {
        dispatch!(&mut self.storage, b => b.mark_dirty());
    }

    pub fn mark_clean(&mut self) {
        dispatch!(&mut self.storage, b => b.mark_clean());
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        dispatch!(&self.storage, b => b.version())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        dispatch!(&self.storage, b => b.as_bytes())
    }

    // === Cursor ===

    #[must_use]
    pub fn capacity(&self) -> usize {
        dispatch!(&self.storage, b => b.capacity())
    }

    #[must_use]
    pub fn position(&self) -> usize {
        dispatch!(&self.storage, b => b.position())
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        dispatch!(&self.storage, b => b.limit())
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        dispatch!(&self.storage, b => b.remaining())
    }

    #[must_use]
    pub fn has_remaining(&self) -> bool {
        dispatch!(&self.storage, b => b.has_remaining())
    }

    pub fn set_position(&mut self, position: usize) -> Result<()> {
        dispatch!(&mut self.storage, b => b.set_position(position))
    }

    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        dispatch!(&mut self.storage, b => b.set_limit(limit))
    }

    pub fn rewind(&mut self) {
        dispatch!(&mut self.storage, b => b.rewind());
    }

    pub fn flip(&mut self) {
        dispatch!(&mut self.storage, b => b.flip());
    }

    pub fn clear(&mut self) {
        dispatch!(&mut self.storage, b => b.clear());
    }

    // === Reads ===

    pub fn get(&mut self) -> Result<u32> {
        dispatch!(&mut self.storage, b => b.get().map(u32::from))
    }

    pub fn get_at(&self, index: usize) -> Result<u32> {
        dispatch!(&self.storage, b => b.get_at(index).map(u32::from))
    }

    /// Widened copy of the contents up to the limit.
    #[must_use]
    pub fn to_u32_vec(&self) -> Vec<u32> {
        let limit = self.limit();
        dispatch!(&self.storage, b => b.as_slice()[..limit].iter().map(|&i| u32::from(i)).collect())
    }

    /// Largest index up to the limit, `None` when empty.
    #[must_use]
    pub fn max_index(&self) -> Option<u32> {
        let limit = self.limit();
        dispatch!(&self.storage, b => b.as_slice()[..limit].iter().map(|&i| u32::from(i)).max())
    }

    // === Writes ===

    /// Writes one index at the cursor.
    ///
    /// Negative values and values wider than the store are rejected and the
    /// buffer is left untouched.
    pub fn put(&mut self, value: i64) -> Result<&mut Self> {
        let index = self.width().check(value)?;
        dispatch!(&mut self.storage, b => b.put(index as _).map(|_| ()))?;
        Ok(self)
    }

    /// Random write, checked against capacity rather than the cursor.
    pub fn put_at(&mut self, position: usize, value: i64) -> Result<&mut Self> {
        let index = self.width().check(value)?;
        dispatch!(&mut self.storage, b => b.put_at(position, index as _).map(|_| ()))?;
        Ok(self)
    }

    /// Writes every value at the cursor, one element at a time.
    ///
    /// All values are validated and the capacity is checked before the first
    /// write, so a failure leaves the buffer untouched.
    pub fn put_values<V: Copy + Into<i64>>(&mut self, values: &[V]) -> Result<&mut Self> {
        self.ensure_remaining(values.len())?;
        let width = self.width();
        let checked = values
            .iter()
            .map(|&v| width.check(v.into()))
            .collect::<Result<Vec<u32>>>()?;
        self.write_checked(&checked)
    }

    pub fn put_values_range<V: Copy + Into<i64>>(
        &mut self,
        values: &[V],
        offset: usize,
        length: usize,
    ) -> Result<&mut Self> {
        let end = offset.saturating_add(length);
        if end > values.len() {
            return Err(StrataError::IndexOutOfBounds {
                index: end,
                capacity: values.len(),
            });
        }
        self.put_values(&values[offset..end])
    }

    /// Copies the remaining indices of `source`, advancing both cursors.
    ///
    /// Buffers of equal width are copied as a block. Mixed widths go element
    /// by element through the narrow accessor, so a wide value that does not
    /// fit the destination is reported rather than truncated.
    pub fn put_index_buffer(&mut self, source: &mut IndexBufferData) -> Result<&mut Self> {
        if self.width() != source.width() {
            let count = source.remaining();
            self.ensure_remaining(count)?;
            let width = self.width();
            let start = source.position();
            let checked = (start..start + count)
                .map(|i| source.get_at(i).and_then(|v| width.check(i64::from(v))))
                .collect::<Result<Vec<u32>>>()?;
            self.write_checked(&checked)?;
            source.set_position(start + count)?;
            return Ok(self);
        }

        match (&mut self.storage, &mut source.storage) {
            (IndexStorage::U8(dst), IndexStorage::U8(src)) => {
                dst.put_buffer(src)?;
            }
            (IndexStorage::U16(dst), IndexStorage::U16(src)) => {
                dst.put_buffer(src)?;
            }
            (IndexStorage::U32(dst), IndexStorage::U32(src)) => {
                dst.put_buffer(src)?;
            }
            _ => unreachable!("index widths were checked to match"),
        }
        Ok(self)
    }

    fn ensure_remaining(&self, requested: usize) -> Result<()> {
        if requested > self.remaining() {
            return Err(StrataError::CapacityExceeded {
                requested,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn write_checked(&mut self, checked: &[u32]) -> Result<&mut Self> {
        for &index in checked {
            dispatch!(&mut self.storage, b => b.put(index as _).map(|_| ()))?;
        }
        Ok(self)
    }

    // === Copies ===

    /// Independent copy with identical contents, width, limit and access mode.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let storage = match &self.storage {
            IndexStorage::U8(b) => IndexStorage::U8(b.deep_copy()),
            IndexStorage::U16(b) => IndexStorage::U16(b.deep_copy()),
            IndexStorage::U32(b) => IndexStorage::U32(b.deep_copy()),
        };
        Self { storage }
    }

    /// Copy of the contents (up to the limit) re-encoded at `width`.
    pub fn to_width(&self, width: IndexWidth) -> Result<Self> {
        let values = self.to_u32_vec();
        let mut converted = Self::new(width, values.len()).with_access_mode(self.access_mode());
        converted.put_values(&values)?;
        converted.rewind();
        Ok(converted)
    }
}

// ============================================================================
// Fixed-width index buffers
// ============================================================================

macro_rules! fixed_width_index_buffers {
    ($($name:ident => $width:ident, $prim:ident);* $(;)?) => {
        paste::paste! {
            $(
                #[doc = "Index buffer stored as `" $prim "`; negative and wider values are rejected."]
                #[derive(Debug, PartialEq)]
                pub struct [<$name BufferData>](IndexBufferData);

                impl [<$name BufferData>] {
                    pub const WIDTH: IndexWidth = IndexWidth::$width;

                    /// Zero-filled buffer of `capacity` indices.
                    #[must_use]
                    pub fn new(capacity: usize) -> Self {
                        Self(IndexBufferData::new(Self::WIDTH, capacity))
                    }

                    /// Buffer holding a copy of `indices`, ready to be read from the start.
                    #[must_use]
                    pub fn from_slice(indices: &[$prim]) -> Self {
                        Self(IndexBufferData {
                            storage: IndexStorage::$width(BufferData::from_slice(indices)),
                        })
                    }

                    #[must_use]
                    pub fn with_access_mode(self, access_mode: AccessMode) -> Self {
                        Self(self.0.with_access_mode(access_mode))
                    }

                    #[must_use]
                    pub fn deep_copy(&self) -> Self {
                        Self(self.0.deep_copy())
                    }

                    #[must_use]
                    pub fn into_inner(self) -> IndexBufferData {
                        self.0
                    }
                }

                impl Deref for [<$name BufferData>] {
                    type Target = IndexBufferData;

                    fn deref(&self) -> &Self::Target {
                        &self.0
                    }
                }

                impl DerefMut for [<$name BufferData>] {
                    fn deref_mut(&mut self) -> &mut Self::Target {
                        &mut self.0
                    }
                }

                impl From<[<$name BufferData>]> for IndexBufferData {
                    fn from(buffer: [<$name BufferData>]) -> Self {
                        buffer.0
                    }
                }
            )*
        }
    };
}

fixed_width_index_buffers! {
    Byte => U8, u8;
    Short => U16, u16;
    Int => U32, u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_follows_max_index() {
        assert_eq!(IndexWidth::for_max_index(255), IndexWidth::U8);
        assert_eq!(IndexWidth::for_max_index(256), IndexWidth::U16);
        assert_eq!(IndexWidth::for_max_index(65535), IndexWidth::U16);
        assert_eq!(IndexWidth::for_max_index(65536), IndexWidth::U32);
    }

    #[test]
    fn too_wide_value_is_rejected() {
        let mut indices = IndexBufferData::new(IndexWidth::U8, 1);
        assert_eq!(
            indices.put(256).unwrap_err(),
            StrataError::InvalidIndexValue { value: 256, width: 8 }
        );
        assert_eq!(indices.position(), 0);
    }

    #[test]
    fn from_indices_picks_narrowest_width() {
        let indices = IndexBufferData::from_indices(&[0, 1, 300]);
        assert_eq!(indices.width(), IndexWidth::U16);
        assert_eq!(indices.to_u32_vec(), vec![0, 1, 300]);
        assert_eq!(indices.max_index(), Some(300));
    }

    #[test]
    fn fixed_width_buffers_keep_their_width() {
        let bytes = ByteBufferData::from_slice(&[1, 2]);
        assert_eq!(bytes.width(), IndexWidth::U8);
        assert_eq!(ShortBufferData::new(3).width(), IndexWidth::U16);
        assert_eq!(IntBufferData::from_slice(&[7]).width(), IndexWidth::U32);

        let inner: IndexBufferData = bytes.into();
        assert_eq!(inner.to_u32_vec(), vec![1, 2]);
    }
}
