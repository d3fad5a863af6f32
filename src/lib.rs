//! Trestle - fixed-length bitfields for sequence flags.
//!
//! Trestle provides a compact, fixed-length array of boolean flags packed
//! into 32-bit words. It is the bookkeeping primitive used when annotating
//! large collections of records, one flag per record: which sequences have
//! been visited, which hits passed a filter, which columns of an alignment
//! are masked.
//!
//! # Key Characteristics
//!
//! - Packed 32-bit word storage via the `bitvec` crate
//! - Checked indexing that returns `Result`, never panics
//! - Negative indices resolve from the trailing end (`-1` is the last bit)
//! - Length is part of the value: equality compares length and content
//! - Binary and JSON encodings with a guaranteed round-trip
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```
//! use trestle::Bitfield;
//!
//! let mut flags = Bitfield::new(8);
//! flags.set(2, true).unwrap();
//! flags.set(4, true).unwrap();
//!
//! assert_eq!(flags.count_ones(), 2);
//! assert!(flags.get(2).unwrap());
//! assert!(!flags.get(3).unwrap());
//!
//! // Trailing-end access
//! assert!(!flags.get(-1).unwrap());
//! flags.toggle(-1).unwrap();
//! assert!(flags.get(7).unwrap());
//! ```
//!
//! ## Encoding
//!
//! ```
//! use trestle::Bitfield;
//!
//! let mut flags = Bitfield::new(100);
//! flags.set(42, true).unwrap();
//!
//! let bytes = flags.to_bytes().unwrap();
//! let restored = Bitfield::from_bytes(&bytes).unwrap();
//! assert_eq!(restored, flags);
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`](crate::Result) with
//! [`TrestleError`] describing what went wrong: an out-of-range index, a
//! malformed construction argument, or an encode/decode failure.

pub mod bitfield;
pub mod error;

// Re-export main types at crate root
pub use bitfield::{Bitfield, Iter, Word, BITS_PER_WORD};
pub use error::{Result, TrestleError};

/// Version of the trestle library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the library
pub const NAME: &str = "trestle";

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
