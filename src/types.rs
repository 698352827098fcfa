//! Core types shared by the containers, the pixel buffer and the engine.

/// How the repeat region is projected across the rest of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RepeatMode {
    /// Pixel `j` copies pixel `j % repeat_count`.
    #[default]
    Stripe,

    /// The region followed by its reverse forms one period of `2 * repeat_count`.
    ///
    /// The pixels on either side of each reflection point are equal, so with
    /// `repeat_count = 3` the strip reads `A B C C B A A B C C ...`.
    Mirror,
}

/// Errors raised by [`BitArray`](crate::BitArray), [`ByteArray`](crate::ByteArray)
/// and [`PixelBuffer`](crate::PixelBuffer).
///
/// Bounds errors are never clamped away: a window that does not fit the buffer
/// is reported as-is so that animation geometry stays intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// Element index outside `[0, len)`.
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Logical length of the container.
        len: usize,
    },

    /// Window `[start, end)` is inverted or extends past `len`.
    WindowOutOfBounds {
        /// Window start (inclusive).
        start: usize,
        /// Window end (exclusive).
        end: usize,
        /// Logical length of the container.
        len: usize,
    },

    /// Backing storage is too small for the requested length.
    CapacityExceeded {
        /// Bytes needed.
        required: usize,
        /// Bytes available.
        capacity: usize,
    },

    /// Bytes per item must be 1 to 4.
    InvalidItemWidth(usize),

    /// Bytes per pixel must be 3 (RGB) or 4 (RGBW).
    InvalidBytesPerPixel(usize),

    /// Repeat count larger than the pixel count.
    InvalidRepeatCount {
        /// Requested repeat count.
        count: usize,
        /// Pixels in the buffer.
        pixel_count: usize,
    },

    /// Value passed to `set` has the wrong number of bytes.
    ItemWidthMismatch {
        /// Bytes per item of the container.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// Percentage above 100.
    InvalidPercent(u8),

    /// Brightness shift outside `-7..=7`.
    InvalidShift(i8),

    /// Bit pattern width outside `1..=32`.
    InvalidPatternWidth(u8),
}

impl BufferError {
    /// Returns true for index and window errors.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            BufferError::IndexOutOfBounds { .. } | BufferError::WindowOutOfBounds { .. }
        )
    }

    /// Returns true for errors caused by invalid construction or configuration.
    pub fn is_configuration_error(&self) -> bool {
        !self.is_bounds_error()
    }
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BufferError::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of range for length {}", index, len)
            }
            BufferError::WindowOutOfBounds { start, end, len } => {
                write!(
                    f,
                    "window {}..{} out of range for length {}",
                    start, end, len
                )
            }
            BufferError::CapacityExceeded { required, capacity } => {
                write!(
                    f,
                    "buffer capacity exceeded: {} bytes required, {} available",
                    required, capacity
                )
            }
            BufferError::InvalidItemWidth(width) => {
                write!(f, "bytes per item must be between 1 and 4, got {}", width)
            }
            BufferError::InvalidBytesPerPixel(bpp) => {
                write!(f, "bytes per pixel must be 3 or 4, got {}", bpp)
            }
            BufferError::InvalidRepeatCount { count, pixel_count } => {
                write!(
                    f,
                    "repeat count {} exceeds pixel count {}",
                    count, pixel_count
                )
            }
            BufferError::ItemWidthMismatch { expected, actual } => {
                write!(f, "expected {} bytes per item, got {}", expected, actual)
            }
            BufferError::InvalidPercent(pct) => {
                write!(f, "percentage must be between 0 and 100, got {}", pct)
            }
            BufferError::InvalidShift(shift) => {
                write!(f, "shift must be between -7 and 7, got {}", shift)
            }
            BufferError::InvalidPatternWidth(width) => {
                write!(f, "pattern width must be between 1 and 32, got {}", width)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BufferError {}

/// Errors raised by an [`Animation`](crate::Animation) implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationError {
    /// A pixel buffer or container operation failed.
    Buffer(BufferError),

    /// A setting holds a value the animation cannot use.
    InvalidSetting {
        /// Name of the offending settings field.
        name: &'static str,
    },

    /// `calc_frame` ran on state that `setup` did not build.
    MissingState,
}

impl From<BufferError> for AnimationError {
    fn from(err: BufferError) -> Self {
        AnimationError::Buffer(err)
    }
}

impl core::fmt::Display for AnimationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AnimationError::Buffer(err) => write!(f, "buffer error: {}", err),
            AnimationError::InvalidSetting { name } => {
                write!(f, "invalid value for setting `{}`", name)
            }
            AnimationError::MissingState => write!(f, "animation state was not set up"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AnimationError {}

/// Validates that `pct` is a percentage.
pub(crate) fn check_percent(pct: u8) -> Result<(), BufferError> {
    if pct > 100 {
        return Err(BufferError::InvalidPercent(pct));
    }
    Ok(())
}

/// Validates `[start, end)` against `len`.
pub(crate) fn check_window(start: usize, end: usize, len: usize) -> Result<(), BufferError> {
    if start > end || end > len {
        return Err(BufferError::WindowOutOfBounds { start, end, len });
    }
    Ok(())
}

/// Normalizes a signed rotation into a right-rotation amount in `[0, len)`.
pub(crate) fn rotation(steps: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    steps.rem_euclid(len as isize) as usize
}

/// Interpolates one channel, rounding half away from zero.
///
/// Returns `start` at `index == 0` and `end` at `index == span`.
pub(crate) fn lerp_channel(start: u8, end: u8, index: usize, span: usize) -> u8 {
    let span = span.max(1) as i32;
    let delta = end as i32 - start as i32;
    let num = delta * index as i32;
    let step = (num.abs() + span / 2) / span;
    let value = start as i32 + if num < 0 { -step } else { step };
    value.clamp(0, 255) as u8
}
