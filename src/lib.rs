//! # xorstream
//!
//! Lossless compression of `f64` time-series values using XOR deltas with
//! variable-width fields, the value half of the scheme described in
//! *"Gorilla: A Fast, Scalable, In-Memory Time Series Database"* (VLDB 2015).
//!
//! ## Format
//!
//! The first sample is stored as its raw 64-bit pattern. Every later sample is
//! XORed with its predecessor and written as one of three records:
//!
//! - `0`: identical to the previous sample.
//! - `10`: the nonzero bits fit inside the current leading/trailing zero
//!   window; only the window's meaningful bits follow.
//! - `11`: a new window: 5-bit leading zero count, 6-bit meaningful bit
//!   count (0 means 64), then the meaningful bits.
//!
//! The final byte is zero-padded. The stream stores no sample count, so the
//! caller must remember how many samples were pushed.
//!
//! ## Example
//!
//! ```rust
//! use xorstream::{Iter, Series};
//!
//! let mut series = Series::new();
//! for v in [12.0, 12.0, 24.0, 13.0] {
//!     series.push(v);
//! }
//! series.finish();
//!
//! let bytes = series.bytes().to_vec();
//! let mut it = Iter::with_count(&bytes, 4).unwrap();
//! let mut out = Vec::new();
//! while it.next() {
//!     out.push(it.value());
//! }
//! assert!(it.err().is_none());
//! assert_eq!(out, vec![12.0, 12.0, 24.0, 13.0]);
//! ```

pub mod bitbuffer;
pub mod decoder;
pub mod encoder;

// Re-export primary types at the crate root.
pub use bitbuffer::EndOfStream;
pub use decoder::{decode, Iter, Values};
pub use encoder::Series;
