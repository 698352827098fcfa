//! Color generators.
//!
//! A generator is any `Iterator<Item = Color>`: [`PixelBuffer::fill_gen`]
//! pulls one color per pixel and stops early when a finite generator runs dry.
//! Each value owns its own cursor, so two generators built from the same
//! parameters never share progress. Restarting means building a new one.
//!
//! [`PixelBuffer::fill_gen`]: crate::PixelBuffer::fill_gen

use crate::colors::{BLACK, Color, brightness_peak, color_wheel};
use crate::random::RandomSource;
use crate::types::{AnimationError, lerp_channel};

/// Pull-based producer of pixel colors.
///
/// Implemented for every `Iterator<Item = Color>`, including finite palettes
/// such as `palette.iter().copied()`.
pub trait ColorGenerator: Iterator<Item = Color> {}

impl<T: Iterator<Item = Color>> ColorGenerator for T {}

const WHEEL_STEPS: u16 = 360;

fn check_brightness(brightness: u8) -> Result<u8, AnimationError> {
    if !(1..=10).contains(&brightness) {
        return Err(AnimationError::InvalidSetting { name: "brightness" });
    }
    Ok(brightness_peak(brightness))
}

fn check_stripe_size(stripe_size: u16, min: u16) -> Result<u16, AnimationError> {
    if stripe_size < min {
        return Err(AnimationError::InvalidSetting {
            name: "stripe_size",
        });
    }
    Ok(stripe_size)
}

/// Walks the color wheel in 30 coarse steps, each stripe fading from a bright
/// hue toward a dim, slightly earlier hue.
#[derive(Debug, Clone)]
pub struct SteppedColorWheel {
    stripe_size: u16,
    peak: u8,
    cycle: u16,
    step: u16,
}

impl SteppedColorWheel {
    /// # Errors
    /// * `InvalidSetting` - `stripe_size` is 0 or `brightness` is outside 1-10
    pub fn new(stripe_size: u16, brightness: u8) -> Result<Self, AnimationError> {
        Ok(Self {
            stripe_size: check_stripe_size(stripe_size, 1)?,
            peak: check_brightness(brightness)?,
            cycle: 0,
            step: 0,
        })
    }
}

impl Iterator for SteppedColorWheel {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        let bright = color_wheel(self.cycle * 12, self.peak);
        let dim = color_wheel(((self.cycle + 26) % 30) * 12, 25);
        let span = (self.stripe_size - 1) as usize;
        let i = self.step as usize;
        let color = bright.zip_with(dim, |a, b| lerp_channel(a, b, i, span));

        self.step += 1;
        if self.step == self.stripe_size {
            self.step = 0;
            self.cycle = (self.cycle + 1) % 30;
        }
        Some(color)
    }
}

/// Walks the color wheel, repeating each hue `stripe_size` times.
#[derive(Debug, Clone)]
pub struct StripedColorWheel {
    skip: u16,
    stripe_size: u16,
    peak: u8,
    hue: u16,
    step: u16,
}

impl StripedColorWheel {
    /// Creates a wheel that advances `1 + skip` steps per stripe.
    ///
    /// # Errors
    /// * `InvalidSetting` - `stripe_size` is 0 or `brightness` is outside 1-10
    pub fn new(skip: u16, stripe_size: u16, brightness: u8) -> Result<Self, AnimationError> {
        Ok(Self {
            skip,
            stripe_size: check_stripe_size(stripe_size, 1)?,
            peak: check_brightness(brightness)?,
            hue: 0,
            step: 0,
        })
    }

    /// Starts the wheel at `hue` (taken modulo 360).
    pub fn starting_at(mut self, hue: u16) -> Self {
        self.hue = hue % WHEEL_STEPS;
        self
    }
}

impl Iterator for StripedColorWheel {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        let color = color_wheel(self.hue, self.peak);
        self.step += 1;
        if self.step == self.stripe_size {
            self.step = 0;
            self.hue = ((self.hue as u32 + 1 + self.skip as u32) % WHEEL_STEPS as u32) as u16;
        }
        Some(color)
    }
}

/// Direction of the brightness ramp in a [`FadingColorWheel`] stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeMode {
    /// Dim to bright.
    In,
    /// Bright to dim.
    Out,
    /// Dim to bright and back.
    #[default]
    InOut,
}

/// Walks the color wheel while fading each hue in and/or out.
///
/// Each stripe ends with one black pixel before the hue advances.
#[derive(Debug, Clone)]
pub struct FadingColorWheel {
    skip: u16,
    half: u16,
    mode: FadeMode,
    hue: u16,
    step: u16,
}

impl FadingColorWheel {
    /// # Errors
    /// * `InvalidSetting` - `stripe_size` is below 2
    pub fn new(skip: u16, stripe_size: u16, mode: FadeMode) -> Result<Self, AnimationError> {
        let stripe_size = check_stripe_size(stripe_size, 2)?;
        Ok(Self {
            skip: skip.max(1),
            half: stripe_size / 2,
            mode,
            hue: 0,
            step: 0,
        })
    }

    pub fn starting_at(mut self, hue: u16) -> Self {
        self.hue = hue % WHEEL_STEPS;
        self
    }

    fn period(&self) -> u16 {
        match self.mode {
            FadeMode::In | FadeMode::Out => self.half + 1,
            FadeMode::InOut => 2 * self.half,
        }
    }

    // Brightness level 1..=half for the current step, None for the gap pixel.
    fn level(&self) -> Option<u16> {
        let (h, s) = (self.half, self.step);
        match self.mode {
            FadeMode::In if s < h => Some(s + 1),
            FadeMode::Out if s < h => Some(h - s),
            FadeMode::InOut if s < h => Some(s + 1),
            FadeMode::InOut if s + 1 < 2 * h => Some(2 * h - 1 - s),
            _ => None,
        }
    }
}

impl Iterator for FadingColorWheel {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        let color = match self.level() {
            Some(level) => color_wheel(self.hue, (level as u32 * 250 / self.half as u32) as u8),
            None => BLACK,
        };
        self.step += 1;
        if self.step >= self.period() {
            self.step = 0;
            self.hue = ((self.hue as u32 + self.skip as u32) % WHEEL_STEPS as u32) as u16;
        }
        Some(color)
    }
}

/// Random saturated colors: two primaries share the brightness budget and the
/// third stays dark.
#[derive(Debug, Clone)]
pub struct RandomVivid<R> {
    rng: R,
    peak: u8,
}

impl<R: RandomSource> RandomVivid<R> {
    /// # Errors
    /// * `InvalidSetting` - `brightness` is outside 1-10
    pub fn new(rng: R, brightness: u8) -> Result<Self, AnimationError> {
        Ok(Self {
            rng,
            peak: check_brightness(brightness)?,
        })
    }
}

/// Draws one vivid color with channel sum `peak`.
pub(crate) fn vivid<R: RandomSource + ?Sized>(rng: &mut R, peak: u8) -> Color {
    let primary = 1 + rng.below(peak.saturating_sub(1) as u32) as u8;
    let secondary = peak - primary;
    match rng.below(3) {
        0 => Color::rgb(primary, secondary, 0),
        1 => Color::rgb(0, primary, secondary),
        _ => Color::rgb(secondary, 0, primary),
    }
}

impl<R: RandomSource> Iterator for RandomVivid<R> {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        Some(vivid(&mut self.rng, self.peak))
    }
}

/// Random colors with every channel masked.
///
/// Unmasked output is mostly pastel; a mask such as `(255, 0, 63)` keeps the
/// hue between red and purple.
#[derive(Debug, Clone)]
pub struct RandomPastel<R> {
    rng: R,
    mask: Color,
}

impl<R: RandomSource> RandomPastel<R> {
    /// Unmasked RGB output.
    pub fn new(rng: R) -> Self {
        Self::with_mask(rng, Color::rgb(0xFF, 0xFF, 0xFF))
    }

    /// Output channels are ANDed with `mask`; set `mask.w` to produce white.
    pub fn with_mask(rng: R, mask: Color) -> Self {
        Self { rng, mask }
    }
}

impl<R: RandomSource> Iterator for RandomPastel<R> {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        let [r, g, b, w] = self.rng.next_u32().to_be_bytes();
        Some(Color::rgbw(r, g, b, w).zip_with(self.mask, |c, m| c & m))
    }
}
