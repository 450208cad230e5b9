//! BufferData Tests
//!
//! Tests for:
//! - Cursor semantics: position, limit, remaining, flip, clear
//! - Sequential and random access bounds
//! - Bulk writes: all-or-nothing capacity checks, buffer-to-buffer copies
//! - Dirty tracking and versioning
//! - Deep copies: independence, preserved hints, reset cursor

use strata::buffer::{
    AccessMode, BufferData, ByteBufferData, ElementKind, FloatBufferData, IntBufferData,
    ShortBufferData,
};
use strata::StrataError;

type Int32Buffer = BufferData<i32>;
type Int16Buffer = BufferData<i16>;

// ============================================================================
// Cursor Tests
// ============================================================================

#[test]
fn new_buffer_spans_full_capacity() {
    let buffer = FloatBufferData::new(6);
    assert_eq!(buffer.capacity(), 6);
    assert_eq!(buffer.position(), 0);
    assert_eq!(buffer.limit(), 6);
    assert_eq!(buffer.remaining(), 6);
    assert!(buffer.has_remaining());
}

#[test]
fn sequential_put_advances_cursor() -> anyhow::Result<()> {
    let mut buffer = Int32Buffer::new(4);
    buffer.put(10)?.put(20)?;
    assert_eq!(buffer.position(), 2);
    assert_eq!(buffer.remaining(), 2);
    assert_eq!(buffer.as_slice(), &[10, 20, 0, 0]);
    Ok(())
}

#[test]
fn put_past_limit_is_capacity_exceeded() -> anyhow::Result<()> {
    let mut buffer = Int16Buffer::new(2);
    buffer.put(1)?.put(2)?;
    assert_eq!(
        buffer.put(3).unwrap_err(),
        StrataError::CapacityExceeded {
            requested: 1,
            remaining: 0
        }
    );
    Ok(())
}

#[test]
fn put_respects_lowered_limit() -> anyhow::Result<()> {
    let mut buffer = Int32Buffer::new(4);
    buffer.set_limit(1)?;
    buffer.put(5)?;
    assert!(matches!(buffer.put(6), Err(StrataError::CapacityExceeded { .. })));
    Ok(())
}

#[test]
fn get_past_limit_is_underflow() -> anyhow::Result<()> {
    let mut buffer = Int32Buffer::from_slice(&[7]);
    assert_eq!(buffer.get()?, 7);
    assert_eq!(
        buffer.get().unwrap_err(),
        StrataError::BufferUnderflow {
            position: 1,
            limit: 1
        }
    );
    Ok(())
}

#[test]
fn random_access_is_checked_against_capacity_not_cursor() -> anyhow::Result<()> {
    let mut buffer = Int32Buffer::new(4);
    buffer.set_limit(1)?;
    // Beyond the limit but inside the capacity.
    buffer.put_at(3, 9)?;
    assert_eq!(buffer.get_at(3)?, 9);
    assert_eq!(buffer.position(), 0);

    assert_eq!(
        buffer.put_at(4, 1).unwrap_err(),
        StrataError::IndexOutOfBounds {
            index: 4,
            capacity: 4
        }
    );
    assert!(buffer.get_at(4).is_err());
    Ok(())
}

#[test]
fn set_position_beyond_limit_fails() {
    let mut buffer = FloatBufferData::new(3);
    assert_eq!(
        buffer.set_position(4).unwrap_err(),
        StrataError::InvalidCursor { value: 4, bound: 3 }
    );
}

#[test]
fn clear_resets_cursor_but_keeps_contents() -> anyhow::Result<()> {
    let mut buffer = Int32Buffer::new(3);
    buffer.put_slice(&[1, 2])?;
    buffer.flip();
    buffer.clear();
    assert_eq!(buffer.position(), 0);
    assert_eq!(buffer.limit(), 3);
    assert_eq!(buffer.as_slice(), &[1, 2, 0]);
    Ok(())
}

// ============================================================================
// Bulk Write Tests
// ============================================================================

#[test]
fn bulk_put_over_capacity_leaves_contents_unchanged() -> anyhow::Result<()> {
    let mut buffer = Int32Buffer::new(4);
    buffer.put_at(0, 11)?;
    buffer.put_at(3, 44)?;

    let too_many = vec![1; buffer.capacity() + 1];
    assert_eq!(
        buffer.put_slice(&too_many).unwrap_err(),
        StrataError::CapacityExceeded {
            requested: 5,
            remaining: 4
        }
    );
    assert_eq!(buffer.as_slice(), &[11, 0, 0, 44]);
    assert_eq!(buffer.position(), 0);
    Ok(())
}

#[test]
fn bulk_put_range_copies_sub_slice() -> anyhow::Result<()> {
    let mut buffer = FloatBufferData::new(2);
    buffer.put_slice_range(&[1.0, 2.0, 3.0, 4.0], 1, 2)?;
    assert_eq!(buffer.as_slice(), &[2.0, 3.0]);
    assert!(buffer.put_slice_range(&[1.0], 1, 1).is_err());
    Ok(())
}

#[test]
fn put_buffer_copies_remaining_and_advances_both() -> anyhow::Result<()> {
    let mut source = Int32Buffer::from_slice(&[1, 2, 3, 4]);
    source.set_position(1)?;
    let mut target = Int32Buffer::new(5);
    target.put(0)?;

    target.put_buffer(&mut source)?;
    assert_eq!(target.as_slice(), &[0, 2, 3, 4, 0]);
    assert_eq!(target.position(), 4);
    assert!(!source.has_remaining());
    Ok(())
}

#[test]
fn undersized_put_buffer_copies_nothing() -> anyhow::Result<()> {
    let mut source = Int32Buffer::from_slice(&[1, 2, 3]);
    let mut target = Int32Buffer::new(2);
    assert!(matches!(
        target.put_buffer(&mut source),
        Err(StrataError::CapacityExceeded { requested: 3, remaining: 2 })
    ));
    assert_eq!(source.position(), 0);
    assert_eq!(target.as_slice(), &[0, 0]);
    Ok(())
}

// ============================================================================
// Dirty Tracking Tests
// ============================================================================

#[test]
fn new_buffer_is_dirty_until_cleaned() {
    let mut buffer = BufferData::<u8>::new(2);
    assert!(buffer.is_dirty());
    buffer.mark_clean();
    assert!(!buffer.is_dirty());
}

#[test]
fn every_mutation_marks_dirty() -> anyhow::Result<()> {
    let mut buffer = Int32Buffer::new(4);

    buffer.mark_clean();
    buffer.put(1)?;
    assert!(buffer.is_dirty());

    buffer.mark_clean();
    buffer.put_at(3, 1)?;
    assert!(buffer.is_dirty());

    buffer.mark_clean();
    buffer.put_slice(&[2, 3])?;
    assert!(buffer.is_dirty());

    buffer.mark_clean();
    buffer.resize(8);
    assert!(buffer.is_dirty());
    Ok(())
}

#[test]
fn cursor_moves_do_not_mark_dirty() -> anyhow::Result<()> {
    let mut buffer = Int32Buffer::from_slice(&[1, 2, 3]);
    buffer.mark_clean();
    buffer.get()?;
    buffer.rewind();
    buffer.flip();
    buffer.clear();
    assert!(!buffer.is_dirty());
    Ok(())
}

#[test]
fn failed_write_does_not_bump_version() {
    let mut buffer = Int32Buffer::new(1);
    let before = buffer.version();
    assert!(buffer.put_slice(&[1, 2]).is_err());
    assert_eq!(buffer.version(), before);
}

// ============================================================================
// Deep Copy Tests
// ============================================================================

#[test]
fn deep_copy_is_independent_of_original() -> anyhow::Result<()> {
    let mut original = IntBufferData::new(4);
    original.put_values(&[1u32, 2, 3, 4])?;

    let copy = original.deep_copy();
    original.put_at(0, 99)?;

    assert_eq!(copy.get_at(0)?, 1);
    assert_eq!(copy.to_u32_vec(), vec![1, 2, 3, 4]);
    assert_eq!(original.get_at(0)?, 99);
    Ok(())
}

#[test]
fn plain_deep_copy_is_independent_of_original() -> anyhow::Result<()> {
    let mut original = Int32Buffer::new(4);
    original.put_slice(&[1, 2, 3, 4])?;

    let copy = original.deep_copy();
    original.put_at(0, 99)?;

    assert_eq!(copy.as_slice(), &[1, 2, 3, 4]);
    Ok(())
}

#[test]
fn deep_copy_preserves_hints_and_resets_state() -> anyhow::Result<()> {
    let mut original = FloatBufferData::new(6)
        .with_access_mode(AccessMode::Stream)
        .with_tuple_size(3);
    original.put_slice(&[1.0, 2.0, 3.0])?;
    original.mark_clean();

    let copy = original.deep_copy();
    assert_eq!(copy.access_mode(), AccessMode::Stream);
    assert_eq!(copy.tuple_size(), 3);
    assert_eq!(copy.byte_width(), original.byte_width());
    assert_eq!(copy.position(), 0);
    assert_eq!(copy.limit(), original.limit());
    assert!(copy.is_dirty());
    assert_eq!(copy, original);
    Ok(())
}

// ============================================================================
// Metadata Tests
// ============================================================================

#[test]
fn element_widths_match_primitive_sizes() {
    assert_eq!(ByteBufferData::new(1).byte_width(), 1);
    assert_eq!(ShortBufferData::new(1).byte_width(), 2);
    assert_eq!(IntBufferData::new(1).byte_width(), 4);
    assert_eq!(Int16Buffer::new(1).kind(), ElementKind::Short);
    assert_eq!(FloatBufferData::new(1).kind(), ElementKind::Float);
    assert_eq!(FloatBufferData::new(3).byte_len(), 12);
}

#[test]
fn as_bytes_exposes_native_layout() {
    let buffer = ShortBufferData::from_slice(&[1, 2]);
    assert_eq!(buffer.as_bytes(), native_bytes(&[1u16, 2]).as_slice());
}

fn native_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}
