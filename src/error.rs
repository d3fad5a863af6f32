//! Error types for the trestle crate.
//!
//! This module provides a unified error type for all fallible operations in
//! the crate, using the `thiserror` crate for ergonomic error handling.

use thiserror::Error;

/// The main error type for trestle operations.
///
/// This enum represents all possible error conditions that can occur while
/// constructing, indexing, or encoding a [`Bitfield`](crate::Bitfield).
#[derive(Error, Debug)]
pub enum TrestleError {
    /// Malformed construction parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Index outside the addressable range, after trailing-index resolution
    #[error("Index out of range: index {index}, length {length}")]
    IndexOutOfRange {
        /// The index as passed by the caller, before normalization
        index: isize,
        /// The number of addressable bits
        length: usize,
    },

    /// Input bytes or text that cannot be reconstructed into a valid value
    #[error("Decode error: {0}")]
    Decode(String),

    /// Failure while producing an encoded representation
    #[error("Encode error: {0}")]
    Encode(String),
}

/// A specialized `Result` type for trestle operations.
///
/// This is a type alias for `Result<T, TrestleError>` and is used
/// throughout the crate for consistency.
pub type Result<T> = std::result::Result<T, TrestleError>;
