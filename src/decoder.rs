use log::debug;

use crate::bitbuffer::{BitReader, EndOfStream};
use crate::encoder::{Window, FIRST_VALUE_BITS, LEADING_FIELD_BITS, SIGBITS_FIELD_BITS};

/// Decodes exactly `count` samples from `bytes`.
///
/// # Example
/// ```
/// use xorstream::{decode, Series};
///
/// let mut series = Series::new();
/// for v in [1.5, 1.5, 2.25] {
///     series.push(v);
/// }
/// series.finish();
///
/// let values = decode(series.bytes(), 3).unwrap();
/// assert_eq!(values, vec![1.5, 1.5, 2.25]);
/// ```
pub fn decode(bytes: &[u8], count: u64) -> Result<Vec<f64>, EndOfStream> {
    if count == 0 {
        return Ok(Vec::new());
    }
    Iter::with_count(bytes, count)?.values().collect()
}

/// The XOR decompressor: replays a stream produced by `Series`.
///
/// The stream carries neither a sample count nor a terminator, and the zero
/// padding of the last byte reads as "unchanged" records. An iterator from
/// `Iter::new` therefore keeps returning the last value for up to seven extra
/// calls before failing with `EndOfStream`; use `Iter::with_count` (or
/// `Series::iter`) to stop at the last real sample.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    reader: BitReader<'a>,
    /// Current sample as raw bits.
    value_bits: u64,
    window: Window,
    first: bool,
    exhausted: bool,
    /// Samples still allowed, when the caller supplied a count.
    remaining: Option<u64>,
    err: Option<EndOfStream>,
}

impl<'a> Iter<'a> {
    /// Creates an unbounded iterator over `bytes`, reading the first sample.
    pub fn new(bytes: &'a [u8]) -> Result<Self, EndOfStream> {
        let mut reader = BitReader::new(bytes);
        let value_bits = reader.read_bits(FIRST_VALUE_BITS)?;
        Ok(Self {
            reader,
            value_bits,
            window: Window::default(),
            first: true,
            exhausted: false,
            remaining: None,
            err: None,
        })
    }

    /// Creates an iterator that yields at most `count` samples.
    pub fn with_count(bytes: &'a [u8], count: u64) -> Result<Self, EndOfStream> {
        let mut it = Self::new(bytes)?;
        it.remaining = Some(count);
        Ok(it)
    }

    /// Advances to the next sample. Returns `false` once the sample bound is
    /// reached or a read has failed; see `err()` to tell the two apart.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.err.is_some() || self.exhausted {
            return false;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                self.exhausted = true;
                return false;
            }
            *remaining -= 1;
        }

        if self.first {
            self.first = false;
            return true;
        }

        match self.read_record() {
            Ok(()) => true,
            Err(e) => {
                debug!(
                    "decoder stopped at bit {}: {}",
                    self.reader.position(),
                    e
                );
                self.err = Some(e);
                false
            }
        }
    }

    /// Returns the sample decoded by the last successful `next()`.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.value_bits)
    }

    /// Returns the error that stopped decoding, if any.
    pub fn err(&self) -> Option<EndOfStream> {
        self.err
    }

    /// Converts this decoder into a standard iterator over the remaining
    /// samples. A read failure is yielded once, then the iterator ends.
    pub fn values(self) -> Values<'a> {
        Values {
            iter: self,
            done: false,
        }
    }

    fn read_record(&mut self) -> Result<(), EndOfStream> {
        if !self.reader.read_bit()? {
            return Ok(());
        }
        if self.reader.read_bit()? {
            let leading = self.reader.read_bits(LEADING_FIELD_BITS)? as u8;
            let sigbits = self.reader.read_bits(SIGBITS_FIELD_BITS)? as u8;
            self.window = Window::from_header(leading, sigbits);
        }
        let meaningful = self.reader.read_bits(self.window.meaningful_bits())?;
        self.value_bits ^= meaningful << self.window.trailing;
        Ok(())
    }
}

/// A standard iterator adapter returned by `Iter::values`.
#[derive(Debug, Clone)]
pub struct Values<'a> {
    iter: Iter<'a>,
    done: bool,
}

impl<'a> Iterator for Values<'a> {
    type Item = Result<f64, EndOfStream>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.iter.next() {
            return Some(Ok(self.iter.value()));
        }
        self.done = true;
        self.iter.err().map(Err)
    }
}
