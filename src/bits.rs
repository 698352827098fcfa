//! Bit-packed per-pixel flags.
//!
//! [`BitArray`] stores one flag per pixel at one bit each, which is what makes
//! it affordable to keep a lit-mask for a few hundred pixels on a small MCU.
//! Bit `i` lives in byte `i / 8` at bit position `i % 8`.

use crate::random::RandomSource;
use crate::types::{BufferError, check_percent, rotation};
use heapless::Vec;

/// Fixed-length, bit-packed boolean vector.
///
/// # Type Parameters
/// * `CAP` - Backing storage in bytes; holds up to `CAP * 8` bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitArray<const CAP: usize> {
    bytes: Vec<u8, CAP>,
    len: usize,
}

impl<const CAP: usize> BitArray<CAP> {
    /// Creates an array of `len` bits, all cleared.
    ///
    /// # Errors
    /// * `CapacityExceeded` - `ceil(len / 8)` is larger than `CAP`
    pub fn new(len: usize) -> Result<Self, BufferError> {
        let required = len.div_ceil(8);
        let mut bytes = Vec::new();
        bytes
            .resize(required, 0)
            .map_err(|_| BufferError::CapacityExceeded {
                required,
                capacity: CAP,
            })?;
        Ok(Self { bytes, len })
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns bit `index`.
    pub fn get(&self, index: usize) -> Result<bool, BufferError> {
        self.check_index(index)?;
        Ok(self.bit(index))
    }

    /// Sets bit `index` to `value`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<(), BufferError> {
        self.check_index(index)?;
        self.put(index, value);
        Ok(())
    }

    /// Sets every bit to `value`.
    pub fn fill(&mut self, value: bool) {
        let byte = if value { 0xFF } else { 0x00 };
        self.bytes.iter_mut().for_each(|b| *b = byte);
        self.clear_padding();
    }

    /// Tiles a `width`-bit pattern across the array, most significant bit first.
    ///
    /// `repeat(0b01111, 5)` lights four of every five pixels, starting with an
    /// unlit one. The final tile is truncated when `width` does not divide the
    /// length.
    ///
    /// # Errors
    /// * `InvalidPatternWidth` - `width` is 0 or larger than 32
    pub fn repeat(&mut self, pattern: u32, width: u8) -> Result<(), BufferError> {
        if width == 0 || width > 32 {
            return Err(BufferError::InvalidPatternWidth(width));
        }
        let width = width as usize;
        for i in 0..self.len {
            let shift = width - 1 - (i % width);
            self.put(i, (pattern >> shift) & 1 == 1);
        }
        Ok(())
    }

    /// Rotates all bits by `steps`; positive moves bits toward higher indices.
    ///
    /// Rotation is done in place with three reversals, so no scratch buffer is
    /// needed for long masks.
    pub fn scroll(&mut self, steps: isize) {
        let k = rotation(steps, self.len);
        if k == 0 {
            return;
        }
        self.reverse(0, self.len);
        self.reverse(0, k);
        self.reverse(k, self.len);
    }

    /// Sets each bit independently with probability `pct / 100`.
    ///
    /// Only the expected count is guaranteed, not the exact count.
    ///
    /// # Errors
    /// * `InvalidPercent` - `pct` is above 100
    pub fn randomize<R: RandomSource + ?Sized>(
        &mut self,
        pct: u8,
        rng: &mut R,
    ) -> Result<(), BufferError> {
        check_percent(pct)?;
        for i in 0..self.len {
            let value = rng.percent_chance(pct);
            self.put(i, value);
        }
        Ok(())
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterates over the bits from index 0.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    /// Raw packed storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn check_index(&self, index: usize) -> Result<(), BufferError> {
        if index >= self.len {
            return Err(BufferError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    #[inline]
    fn bit(&self, index: usize) -> bool {
        self.bytes[index / 8] & (1 << (index % 8)) != 0
    }

    #[inline]
    fn put(&mut self, index: usize, value: bool) {
        let mask = 1 << (index % 8);
        if value {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
    }

    fn reverse(&mut self, mut lo: usize, mut hi: usize) {
        while lo + 1 < hi {
            hi -= 1;
            let a = self.bit(lo);
            let b = self.bit(hi);
            if a != b {
                self.put(lo, b);
                self.put(hi, a);
            }
            lo += 1;
        }
    }

    // Bits past `len` in the last byte stay zero.
    fn clear_padding(&mut self) {
        let used = self.len % 8;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << used) - 1;
            }
        }
    }
}

impl<const CAP: usize> Default for BitArray<CAP> {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            len: 0,
        }
    }
}

impl<const CAP: usize> core::fmt::Display for BitArray<CAP> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
