use log::{debug, trace};

use crate::bitbuffer::{BitBuffer, EndOfStream};
use crate::decoder::Iter;

/// Width of the uncompressed first sample.
pub const FIRST_VALUE_BITS: u8 = 64;
/// Width of the leading-zero field in a new-window record.
pub const LEADING_FIELD_BITS: u8 = 5;
/// Width of the meaningful-bit-count field in a new-window record.
pub const SIGBITS_FIELD_BITS: u8 = 6;
/// Largest leading-zero count the 5-bit field can carry.
pub const MAX_LEADING: u8 = (1 << LEADING_FIELD_BITS) - 1;

/// Position of the meaningful bits inside a 64-bit XOR delta.
///
/// Encoder and decoder hold identical windows at every stream position: a
/// window only changes on a new-window record, and both sides derive it from
/// the same header fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) leading: u8,
    pub(crate) trailing: u8,
}

impl Window {
    /// The window announced for a nonzero `delta`. Leading zeros beyond
    /// `MAX_LEADING` are folded into the window so the count fits its field.
    pub(crate) fn of(delta: u64) -> Self {
        debug_assert!(delta != 0);
        Self {
            leading: (delta.leading_zeros() as u8).min(MAX_LEADING),
            trailing: delta.trailing_zeros() as u8,
        }
    }

    /// Rebuilds a window from new-window header fields. A zero `sigbits`
    /// stands for 64. Headers with `leading + sigbits > 64` only come from
    /// corrupted input and decode with no trailing zeros.
    pub(crate) fn from_header(leading: u8, sigbits: u8) -> Self {
        let sigbits = if sigbits == 0 { 64 } else { sigbits };
        Self {
            leading,
            trailing: 64u8.saturating_sub(leading + sigbits),
        }
    }

    /// Number of meaningful bits between the zero runs (1..=64).
    #[inline]
    pub(crate) fn meaningful_bits(self) -> u8 {
        64 - self.leading - self.trailing
    }

    /// Meaningful-bit count as written to the 6-bit field (64 becomes 0).
    #[inline]
    fn sigbits_field(self) -> u64 {
        u64::from(self.meaningful_bits()) & ((1 << SIGBITS_FIELD_BITS) - 1)
    }

    /// Whether a delta with this shape fits inside `self`.
    #[inline]
    fn contains(self, other: Window) -> bool {
        other.leading >= self.leading && other.trailing >= self.trailing
    }
}

/// The XOR compressor for a series of `f64` samples.
///
/// Record layout after the first sample:
///
/// | record       | bits                                             |
/// |--------------|--------------------------------------------------|
/// | unchanged    | `0`                                              |
/// | reuse window | `10` + window-width meaningful bits              |
/// | new window   | `11` + 5-bit leading + 6-bit width + width bits  |
///
/// # Example
/// ```
/// use xorstream::Series;
///
/// let mut series = Series::new();
/// series.push(12.0);
/// series.push(12.0);
/// series.push(24.0);
/// series.finish();
///
/// let mut it = series.iter().unwrap();
/// let mut out = Vec::new();
/// while it.next() {
///     out.push(it.value());
/// }
/// assert_eq!(out, vec![12.0, 12.0, 24.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Series {
    buf: BitBuffer,
    /// Number of samples pushed so far.
    count: u64,
    /// Previous sample as raw bits.
    last_bits: u64,
    /// Window of the most recent new-window record, if any.
    window: Option<Window>,
    /// Whether `finish()` has been called.
    finished: bool,
}

impl Series {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    /// Creates an empty series whose buffer pre-allocates `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BitBuffer::with_capacity(capacity),
            count: 0,
            last_bits: 0,
            window: None,
            finished: false,
        }
    }

    /// Appends a sample to the stream.
    ///
    /// # Panics
    ///
    /// Panics if called after `finish()`.
    pub fn push(&mut self, value: f64) {
        assert!(!self.finished, "cannot push after finish()");

        let bits = value.to_bits();
        if self.count == 0 {
            self.buf.write_bits(bits, FIRST_VALUE_BITS);
        } else {
            self.push_delta(bits ^ self.last_bits);
        }

        self.last_bits = bits;
        self.count += 1;
    }

    /// Pads the final byte with zero bits and seals the series. Calling it
    /// again has no effect.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.buf.flush(false);
        self.finished = true;
        debug!(
            "series finished: {} samples in {} bytes",
            self.count,
            self.buf.as_bytes().len()
        );
    }

    /// Returns the encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Consumes the series and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }

    /// Returns the number of bits written, including padding once finished.
    pub fn len_bits(&self) -> usize {
        self.buf.len_bits()
    }

    /// Returns the number of samples pushed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns `true` once `finish()` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns a decoder over this series that stops after the last pushed
    /// sample. Fails with `EndOfStream` if nothing has been pushed.
    pub fn iter(&self) -> Result<Iter<'_>, EndOfStream> {
        Iter::with_count(self.bytes(), self.count)
    }

    fn push_delta(&mut self, delta: u64) {
        if delta == 0 {
            self.buf.write_bit(false);
            return;
        }
        self.buf.write_bit(true);

        let shape = Window::of(delta);
        match self.window {
            Some(window) if window.contains(shape) => {
                self.buf.write_bit(false);
                self.buf
                    .write_bits(delta >> window.trailing, window.meaningful_bits());
            }
            _ => {
                trace!(
                    "new window: leading={} trailing={}",
                    shape.leading,
                    shape.trailing
                );
                self.window = Some(shape);
                self.buf.write_bit(true);
                self.buf
                    .write_bits(u64::from(shape.leading), LEADING_FIELD_BITS);
                self.buf.write_bits(shape.sigbits_field(), SIGBITS_FIELD_BITS);
                self.buf
                    .write_bits(delta >> shape.trailing, shape.meaningful_bits());
            }
        }
    }
}

impl Default for Series {
    fn default() -> Self {
        Self::new()
    }
}
