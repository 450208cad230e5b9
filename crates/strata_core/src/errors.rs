//! Error Types
//!
//! This module defines the error type shared by every Strata crate.
//!
//! # Overview
//!
//! [`StrataError`] covers two families of failures:
//! - Structural buffer errors (capacity, cursor, index validation). These abort
//!   the single operation and leave the buffer untouched.
//! - Registry lifecycle errors (duplicate registration, stale entries). These
//!   are reported to the caller and never corrupt the state of other entries.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, StrataError>`.
//!
//! ```rust,ignore
//! use strata::errors::Result;
//!
//! fn fill(buffer: &mut FloatBufferData) -> Result<()> {
//!     buffer.put_slice(&[0.0, 1.0, 2.0])?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::ids::{EntryId, ObjectId};

/// The main error type for the Strata engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrataError {
    // ========================================================================
    // Buffer Errors
    // ========================================================================
    /// A cursor write would run past the buffer limit.
    #[error("Buffer capacity exceeded: requested {requested} element(s), {remaining} remaining")]
    CapacityExceeded {
        /// Number of elements the write needed
        requested: usize,
        /// Number of elements left before the limit
        remaining: usize,
    },

    /// A sequential read ran past the buffer limit.
    #[error("Buffer underflow: position {position} reached limit {limit}")]
    BufferUnderflow { position: usize, limit: usize },

    /// Random access outside the buffer capacity.
    #[error("Buffer index out of bounds: {index} (capacity: {capacity})")]
    IndexOutOfBounds { index: usize, capacity: usize },

    /// Attempt to move the position past the limit, or the limit past the capacity.
    #[error("Invalid buffer cursor: {value} exceeds {bound}")]
    InvalidCursor { value: usize, bound: usize },

    /// A negative or too-wide value was written to an index buffer.
    #[error("Invalid value passed to {width}-bit index buffer: {value}")]
    InvalidIndexValue {
        /// The rejected value
        value: i64,
        /// Index width in bits
        width: u32,
    },

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// `register` was called twice for the same live object.
    #[error("Object {0:?} is already registered")]
    DuplicateRegistration(ObjectId),

    /// The entry has already been cleaned up or disposed.
    #[error("Resource entry {0:?} has already been cleaned up")]
    StaleEntry(EntryId),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Process-wide settings may only be installed once.
    #[error("Process settings were already installed")]
    SettingsAlreadyInstalled,
}

/// Alias for `Result<T, StrataError>`.
pub type Result<T> = std::result::Result<T, StrataError>;
