/// Error returned when a read needs more bits than the stream has left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfStream;

impl std::fmt::Display for EndOfStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unexpected end of bit stream")
    }
}

impl std::error::Error for EndOfStream {}

/// A growable bit buffer that supports writing individual bits and multi-bit
/// fields, most-significant bit first. Used as the output of `Series`.
#[derive(Debug, Clone)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    /// Number of valid bits in the last byte (1..=8, or 0 if empty).
    bit_count: u8,
}

impl BitBuffer {
    /// Creates a new empty `BitBuffer`.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bit_count: 0,
        }
    }

    /// Creates a `BitBuffer` with the given pre-allocated capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            bit_count: 0,
        }
    }

    /// Returns the total number of bits written, including flush padding.
    #[inline]
    pub fn len_bits(&self) -> usize {
        if self.bytes.is_empty() {
            0
        } else {
            (self.bytes.len() - 1) * 8 + self.bit_count as usize
        }
    }

    /// Returns `true` if no bits have been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the underlying bytes. Unwritten bits of a partial last byte
    /// read as zero.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer and returns the raw byte vector.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Writes a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_count == 0 || self.bit_count == 8 {
            self.bytes.push(0);
            self.bit_count = 0;
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << (7 - self.bit_count);
            }
        }
        self.bit_count += 1;
    }

    /// Writes the lowest `n` bits of `value` (big-endian order). `n` must be <= 64.
    pub fn write_bits(&mut self, value: u64, n: u8) {
        debug_assert!(n <= 64);
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Pads the current byte to completion with `pad`. Does nothing when the
    /// buffer is already byte-aligned.
    pub fn flush(&mut self, pad: bool) {
        while self.bit_count != 0 && self.bit_count != 8 {
            self.write_bit(pad);
        }
    }
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// A cursor for reading bits sequentially from a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    /// Total number of valid bits.
    total_bits: usize,
    /// Current bit position (0-indexed from the start).
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a `BitReader` over every bit of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::from_raw(bytes, bytes.len() * 8)
    }

    /// Creates a `BitReader` over the bits written so far to `buffer`.
    pub fn from_buffer(buffer: &'a BitBuffer) -> Self {
        Self::from_raw(buffer.as_bytes(), buffer.len_bits())
    }

    /// Creates a `BitReader` from raw bytes and a total bit count.
    pub fn from_raw(bytes: &'a [u8], total_bits: usize) -> Self {
        debug_assert!(total_bits <= bytes.len() * 8, "total_bits exceeds bytes length");
        Self {
            bytes,
            total_bits,
            pos: 0,
        }
    }

    /// Returns the number of bits consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bits remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.total_bits.saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.total_bits
    }

    /// Reads a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool, EndOfStream> {
        if self.pos >= self.total_bits {
            return Err(EndOfStream);
        }
        let byte_idx = self.pos / 8;
        let bit_idx = self.pos % 8;
        self.pos += 1;
        Ok((self.bytes[byte_idx] >> (7 - bit_idx)) & 1 == 1)
    }

    /// Reads `n` bits as a `u64` (big-endian). Nothing is consumed when fewer
    /// than `n` bits remain.
    pub fn read_bits(&mut self, n: u8) -> Result<u64, EndOfStream> {
        debug_assert!(n <= 64);
        if self.remaining() < n as usize {
            return Err(EndOfStream);
        }
        let mut value: u64 = 0;
        for _ in 0..n {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }
}
