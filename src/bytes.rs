//! Multi-byte per-pixel metadata.
//!
//! [`ByteArray`] keeps `len` items of `bytes_per_item` bytes each. With one
//! byte per item it suits scalar tracks such as a heat map; with three or four
//! bytes it holds palettes of RGB(W) colors.

use crate::colors::Color;
use crate::types::{BufferError, check_window, lerp_channel, rotation};
use heapless::Vec;

/// Fixed-length vector of 1-4 byte items.
///
/// # Type Parameters
/// * `CAP` - Backing storage in bytes; `len * bytes_per_item` must fit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteArray<const CAP: usize> {
    bytes: Vec<u8, CAP>,
    len: usize,
    bytes_per_item: usize,
}

impl<const CAP: usize> ByteArray<CAP> {
    /// Creates `len` zeroed items of `bytes_per_item` bytes.
    ///
    /// # Errors
    /// * `InvalidItemWidth` - `bytes_per_item` is not 1 to 4
    /// * `CapacityExceeded` - the items do not fit in `CAP` bytes
    pub fn new(len: usize, bytes_per_item: usize) -> Result<Self, BufferError> {
        if !(1..=4).contains(&bytes_per_item) {
            return Err(BufferError::InvalidItemWidth(bytes_per_item));
        }
        let exceeded = |required| BufferError::CapacityExceeded {
            required,
            capacity: CAP,
        };
        let required = len.checked_mul(bytes_per_item).ok_or(exceeded(usize::MAX))?;
        let mut bytes = Vec::new();
        bytes.resize(required, 0).map_err(|_| exceeded(required))?;
        Ok(Self {
            bytes,
            len,
            bytes_per_item,
        })
    }

    /// Number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn bytes_per_item(&self) -> usize {
        self.bytes_per_item
    }

    /// Returns the bytes of item `index`.
    pub fn get(&self, index: usize) -> Result<&[u8], BufferError> {
        let range = self.item_range(index)?;
        Ok(&self.bytes[range])
    }

    /// Overwrites item `index`; `value` must be exactly `bytes_per_item` long.
    pub fn set(&mut self, index: usize, value: &[u8]) -> Result<(), BufferError> {
        self.check_width(value)?;
        let range = self.item_range(index)?;
        self.bytes[range].copy_from_slice(value);
        Ok(())
    }

    /// Returns item `index` as a big-endian unsigned integer.
    pub fn get_value(&self, index: usize) -> Result<u32, BufferError> {
        Ok(self
            .get(index)?
            .iter()
            .fold(0u32, |acc, b| (acc << 8) | *b as u32))
    }

    /// Stores the low `bytes_per_item` bytes of `value`, big-endian.
    ///
    /// With three bytes per item `0xC86432` stores `[200, 100, 50]`.
    pub fn set_value(&mut self, index: usize, value: u32) -> Result<(), BufferError> {
        let encoded = value.to_be_bytes();
        let width = self.bytes_per_item;
        self.set(index, &encoded[4 - width..])
    }

    /// Returns item `index` as a color (channels beyond the item width are 0).
    pub fn get_color(&self, index: usize) -> Result<Color, BufferError> {
        Ok(Color::from_channels(self.get(index)?))
    }

    /// Stores the first `bytes_per_item` channels of `color`.
    pub fn set_color(&mut self, index: usize, color: Color) -> Result<(), BufferError> {
        let channels = color.channels();
        let width = self.bytes_per_item;
        self.set(index, &channels[..width])
    }

    /// Writes `value` to every item.
    pub fn fill(&mut self, value: &[u8]) -> Result<(), BufferError> {
        self.check_width(value)?;
        for item in self.bytes.chunks_exact_mut(self.bytes_per_item) {
            item.copy_from_slice(value);
        }
        Ok(())
    }

    /// Fills the array with a per-channel linear gradient from `start` to `end`.
    ///
    /// Item 0 equals `start` and the last item equals `end`; a single item
    /// receives `start`.
    pub fn fill_gradient(&mut self, start: &[u8], end: &[u8]) -> Result<(), BufferError> {
        self.check_width(start)?;
        self.check_width(end)?;
        let span = self.len.saturating_sub(1);
        for (i, item) in self.bytes.chunks_exact_mut(self.bytes_per_item).enumerate() {
            for (ch, byte) in item.iter_mut().enumerate() {
                *byte = lerp_channel(start[ch], end[ch], i, span);
            }
        }
        Ok(())
    }

    /// Rotates whole items by `steps`; positive moves items toward higher indices.
    pub fn scroll(&mut self, steps: isize) {
        let k = rotation(steps, self.len);
        self.bytes.rotate_right(k * self.bytes_per_item);
    }

    /// Rotates only the items in `[start, end)`.
    pub fn scroll_range(&mut self, steps: isize, start: usize, end: usize) -> Result<(), BufferError> {
        check_window(start, end, self.len)?;
        let k = rotation(steps, end - start);
        let w = self.bytes_per_item;
        self.bytes[start * w..end * w].rotate_right(k * w);
        Ok(())
    }

    /// Iterates over items as byte slices.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.bytes.chunks_exact(self.bytes_per_item)
    }

    /// Raw item storage, `len * bytes_per_item` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn check_width(&self, value: &[u8]) -> Result<(), BufferError> {
        if value.len() != self.bytes_per_item {
            return Err(BufferError::ItemWidthMismatch {
                expected: self.bytes_per_item,
                actual: value.len(),
            });
        }
        Ok(())
    }

    fn item_range(&self, index: usize) -> Result<core::ops::Range<usize>, BufferError> {
        if index >= self.len {
            return Err(BufferError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let start = index * self.bytes_per_item;
        Ok(start..start + self.bytes_per_item)
    }
}

impl<const CAP: usize> Default for ByteArray<CAP> {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            len: 0,
            bytes_per_item: 1,
        }
    }
}
