//! The strip's authoritative color state.
//!
//! [`PixelBuffer`] stores `pixel_count` pixels of 3 (RGB) or 4 (RGBW) bytes in
//! the exact layout handed to the transport. When a repeat count is set, only
//! the first `repeat_count` pixels are computed by animations and
//! [`PixelBuffer::project_repeat`] derives the rest of the strip from them.

use crate::colors::{self, Color};
use crate::random::RandomSource;
use crate::types::{BufferError, RepeatMode, check_percent, check_window, lerp_channel, rotation};
use heapless::Vec;

/// Color buffer for one LED strip.
///
/// # Type Parameters
/// * `CAP` - Backing storage in bytes; `pixel_count * bytes_per_pixel` must fit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer<const CAP: usize> {
    bytes: Vec<u8, CAP>,
    pixel_count: usize,
    bytes_per_pixel: usize,
    repeat_count: usize,
    repeat_mode: RepeatMode,
}

impl<const CAP: usize> PixelBuffer<CAP> {
    /// Creates a black buffer of `pixel_count` pixels.
    ///
    /// # Errors
    /// * `InvalidBytesPerPixel` - `bytes_per_pixel` is not 3 or 4
    /// * `CapacityExceeded` - the pixels do not fit in `CAP` bytes
    pub fn new(pixel_count: usize, bytes_per_pixel: usize) -> Result<Self, BufferError> {
        if bytes_per_pixel != 3 && bytes_per_pixel != 4 {
            return Err(BufferError::InvalidBytesPerPixel(bytes_per_pixel));
        }
        let exceeded = |required| BufferError::CapacityExceeded {
            required,
            capacity: CAP,
        };
        let required = pixel_count.checked_mul(bytes_per_pixel).ok_or(exceeded(usize::MAX))?;
        let mut bytes = Vec::new();
        bytes.resize(required, 0).map_err(|_| exceeded(required))?;
        Ok(Self {
            bytes,
            pixel_count,
            bytes_per_pixel,
            repeat_count: 0,
            repeat_mode: RepeatMode::Stripe,
        })
    }

    /// Creates an RGB buffer.
    pub fn rgb(pixel_count: usize) -> Result<Self, BufferError> {
        Self::new(pixel_count, 3)
    }

    /// Creates an RGBW buffer.
    pub fn rgbw(pixel_count: usize) -> Result<Self, BufferError> {
        Self::new(pixel_count, 4)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    #[inline]
    pub fn repeat_count(&self) -> usize {
        self.repeat_count
    }

    #[inline]
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    /// Sets how many leading pixels are computed independently (0 disables).
    ///
    /// # Errors
    /// * `InvalidRepeatCount` - `count` is larger than the pixel count
    pub fn set_repeat_count(&mut self, count: usize) -> Result<(), BufferError> {
        if count > self.pixel_count {
            return Err(BufferError::InvalidRepeatCount {
                count,
                pixel_count: self.pixel_count,
            });
        }
        self.repeat_count = count;
        Ok(())
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    /// Sets repeat count and mode together.
    pub fn set_repeat(&mut self, count: usize, mode: RepeatMode) -> Result<(), BufferError> {
        self.set_repeat_count(count)?;
        self.set_repeat_mode(mode);
        Ok(())
    }

    /// Number of pixels animations need to compute: the repeat region when one
    /// is active, otherwise the whole strip.
    #[inline]
    pub fn active_len(&self) -> usize {
        if self.repeat_count > 0 {
            self.repeat_count
        } else {
            self.pixel_count
        }
    }

    /// Returns pixel `index`.
    pub fn get(&self, index: usize) -> Result<Color, BufferError> {
        self.check_index(index)?;
        Ok(self.pixel(index))
    }

    /// Sets pixel `index`.
    pub fn set(&mut self, index: usize, color: Color) -> Result<(), BufferError> {
        self.check_index(index)?;
        self.put(index, color);
        Ok(())
    }

    /// Fills the active region with `color`.
    pub fn fill(&mut self, color: Color) {
        for i in 0..self.active_len() {
            self.put(i, color);
        }
    }

    /// Fills pixels `[start, end)` with `color`.
    pub fn fill_range(&mut self, color: Color, start: usize, end: usize) -> Result<(), BufferError> {
        check_window(start, end, self.pixel_count)?;
        for i in start..end {
            self.put(i, color);
        }
        Ok(())
    }

    /// Sets every pixel, including the projected tail, to black.
    pub fn clear(&mut self) {
        self.bytes.iter_mut().for_each(|b| *b = 0);
    }

    /// Writes a linear gradient over `count` pixels starting at `start`.
    ///
    /// The first pixel gets `from` and the last gets `to`; interpolation rounds
    /// each channel to the nearest value.
    pub fn fill_gradient(
        &mut self,
        from: Color,
        to: Color,
        count: usize,
        start: usize,
    ) -> Result<(), BufferError> {
        let end = start.checked_add(count).ok_or(BufferError::WindowOutOfBounds {
            start,
            end: usize::MAX,
            len: self.pixel_count,
        })?;
        check_window(start, end, self.pixel_count)?;
        let span = count.saturating_sub(1);
        let (a, b) = (from.channels(), to.channels());
        for i in 0..count {
            let color = Color::rgbw(
                lerp_channel(a[0], b[0], i, span),
                lerp_channel(a[1], b[1], i, span),
                lerp_channel(a[2], b[2], i, span),
                lerp_channel(a[3], b[3], i, span),
            );
            self.put(start + i, color);
        }
        Ok(())
    }

    /// Fills the active region from a color generator.
    ///
    /// Returns the number of pixels written; a finite generator that runs dry
    /// leaves the remaining pixels untouched.
    pub fn fill_gen<G: IntoIterator<Item = Color>>(&mut self, generator: G) -> usize {
        let end = self.active_len();
        self.write_from(generator, 0, end)
    }

    /// Fills pixels `[start, end)` from a color generator.
    pub fn fill_gen_range<G: IntoIterator<Item = Color>>(
        &mut self,
        generator: G,
        start: usize,
        end: usize,
    ) -> Result<usize, BufferError> {
        check_window(start, end, self.pixel_count)?;
        Ok(self.write_from(generator, start, end))
    }

    /// Rotates the active region by `steps`; positive moves colors toward
    /// higher indices.
    pub fn scroll(&mut self, steps: isize) {
        let len = self.active_len();
        let k = rotation(steps, len);
        let bpp = self.bytes_per_pixel;
        self.bytes[..len * bpp].rotate_right(k * bpp);
    }

    /// Moves every pixel `pct` percent of the way toward `color`.
    ///
    /// `pct == 0` leaves the buffer unchanged and `pct == 100` sets every pixel
    /// to `color` exactly.
    pub fn blend_to_color(&mut self, color: Color, pct: u8) -> Result<(), BufferError> {
        self.blend_range(color, pct, 0, self.pixel_count)
    }

    /// Blends pixels `[start, end)` toward `color`.
    pub fn blend_range(
        &mut self,
        color: Color,
        pct: u8,
        start: usize,
        end: usize,
    ) -> Result<(), BufferError> {
        check_percent(pct)?;
        check_window(start, end, self.pixel_count)?;
        // Strips are mostly runs of equal colors; reuse the last result.
        let mut last: Option<(Color, Color)> = None;
        for i in start..end {
            let current = self.pixel(i);
            let blended = match last {
                Some((src, out)) if src == current => out,
                _ => colors::blend(current, color, pct),
            };
            last = Some((current, blended));
            self.put(i, blended);
        }
        Ok(())
    }

    /// Brightens (`shift > 0`) or dims (`shift < 0`) the active region by
    /// bit-shifting every channel.
    ///
    /// # Errors
    /// * `InvalidShift` - `shift` is outside `-7..=7`
    pub fn adjust(&mut self, shift: i8) -> Result<(), BufferError> {
        if !(-7..=7).contains(&shift) {
            return Err(BufferError::InvalidShift(shift));
        }
        for i in 0..self.active_len() {
            let color = colors::shift(self.pixel(i), shift);
            self.put(i, color);
        }
        Ok(())
    }

    /// Fills the active region with random colors, each channel masked by the
    /// matching channel of `mask`.
    ///
    /// Mid-range masks such as `0x3C3C3C` give soft pastels; `(255, 0, 127)`
    /// limits the output to reds and purples.
    pub fn fill_random<R: RandomSource + ?Sized>(&mut self, mask: Color, rng: &mut R) {
        for i in 0..self.active_len() {
            let bits = rng.next_u32().to_be_bytes();
            let color = Color::rgbw(bits[0], bits[1], bits[2], bits[3]);
            self.put(i, color.zip_with(mask, |c, m| c & m));
        }
    }

    /// Derives pixels `[repeat_count, pixel_count)` from the repeat region.
    ///
    /// Does nothing when repetition is disabled. The projection is idempotent.
    pub fn project_repeat(&mut self) {
        let r = self.repeat_count;
        let n = self.pixel_count;
        if r == 0 || r >= n {
            return;
        }
        let bpp = self.bytes_per_pixel;
        match self.repeat_mode {
            RepeatMode::Stripe => {
                let mut loc = r;
                while loc < n {
                    let chunk = r.min(n - loc);
                    self.bytes.copy_within(0..chunk * bpp, loc * bpp);
                    loc += chunk;
                }
            }
            RepeatMode::Mirror => {
                let period = 2 * r;
                for j in r..n {
                    let pos = j % period;
                    let src = if pos < r { pos } else { period - 1 - pos };
                    self.bytes.copy_within(src * bpp..(src + 1) * bpp, j * bpp);
                }
            }
        }
    }

    /// The transport-ready byte buffer, `pixel_count * bytes_per_pixel` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Iterates over every pixel color.
    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.bytes
            .chunks_exact(self.bytes_per_pixel)
            .map(Color::from_channels)
    }

    fn write_from<G: IntoIterator<Item = Color>>(
        &mut self,
        generator: G,
        start: usize,
        end: usize,
    ) -> usize {
        let mut written = 0;
        for (i, color) in (start..end).zip(generator) {
            self.put(i, color);
            written += 1;
        }
        written
    }

    fn check_index(&self, index: usize) -> Result<(), BufferError> {
        if index >= self.pixel_count {
            return Err(BufferError::IndexOutOfBounds {
                index,
                len: self.pixel_count,
            });
        }
        Ok(())
    }

    #[inline]
    fn pixel(&self, index: usize) -> Color {
        let start = index * self.bytes_per_pixel;
        Color::from_channels(&self.bytes[start..start + self.bytes_per_pixel])
    }

    #[inline]
    fn put(&mut self, index: usize, color: Color) {
        let bpp = self.bytes_per_pixel;
        let start = index * bpp;
        self.bytes[start..start + bpp].copy_from_slice(&color.channels()[..bpp]);
    }
}
