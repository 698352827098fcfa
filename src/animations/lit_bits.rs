use crate::bits::BitArray;
use crate::colors::BLACK;
use crate::engine::Animation;
use crate::generators::StripedColorWheel;
use crate::pixels::PixelBuffer;
use crate::random::RandomSource;
use crate::types::AnimationError;

/// Which pixels start out lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LitPattern {
    /// Each pixel is lit with this probability (0-100).
    Percent(u8),
    /// A `width`-bit pattern tiled across the strip, most significant bit first.
    Bits { pattern: u32, width: u8 },
}

impl Default for LitPattern {
    /// One dark pixel followed by four lit ones.
    fn default() -> Self {
        LitPattern::Bits {
            pattern: 0b01111,
            width: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitBitsSettings {
    pub lit: LitPattern,
    /// Pixels per color stripe.
    pub stripe_size: u16,
    /// Color wheel steps skipped between stripes.
    pub skip: u16,
    /// 1-10.
    pub brightness: u8,
    /// Mask movement per frame; negative scrolls toward pixel 0.
    pub step: isize,
}

impl Default for LitBitsSettings {
    fn default() -> Self {
        Self {
            lit: LitPattern::default(),
            stripe_size: 6,
            skip: 10,
            brightness: 6,
            step: 1,
        }
    }
}

/// Runtime state of [`LitBits`].
#[derive(Debug, Clone, Default)]
pub struct LitBitsState<const BITS: usize> {
    pub mask: BitArray<BITS>,
    colors: Option<StripedColorWheel>,
}

/// A lit-mask sliding over striped color-wheel colors.
///
/// Unlit pixels are black. The mask holds one bit per active pixel, so `BITS`
/// must be at least `ceil(active_len / 8)`.
#[derive(Debug, Clone)]
pub struct LitBits<R, const BITS: usize> {
    rng: R,
}

impl<R: RandomSource, const BITS: usize> LitBits<R, BITS> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RandomSource, const BITS: usize> Animation for LitBits<R, BITS> {
    type Settings = LitBitsSettings;
    type State = LitBitsState<BITS>;

    fn validate(&self, settings: &LitBitsSettings) -> Result<(), AnimationError> {
        match settings.lit {
            LitPattern::Percent(pct) if pct > 100 => {
                return Err(AnimationError::InvalidSetting { name: "lit" });
            }
            LitPattern::Bits { width, .. } if width == 0 || width > 32 => {
                return Err(AnimationError::InvalidSetting { name: "lit" });
            }
            _ => {}
        }
        StripedColorWheel::new(settings.skip, settings.stripe_size, settings.brightness)?;
        Ok(())
    }

    fn setup<const CAP: usize>(
        &mut self,
        settings: &LitBitsSettings,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<LitBitsState<BITS>, AnimationError> {
        let mut mask = BitArray::new(pixels.active_len())?;
        match settings.lit {
            LitPattern::Percent(pct) => mask.randomize(pct, &mut self.rng)?,
            LitPattern::Bits { pattern, width } => mask.repeat(pattern, width)?,
        }
        let colors =
            StripedColorWheel::new(settings.skip, settings.stripe_size, settings.brightness)?;
        pixels.fill(BLACK);
        Ok(LitBitsState {
            mask,
            colors: Some(colors),
        })
    }

    fn calc_frame<const CAP: usize>(
        &mut self,
        settings: &LitBitsSettings,
        state: &mut LitBitsState<BITS>,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<(), AnimationError> {
        let Some(wheel) = state.colors.as_mut() else {
            return Err(AnimationError::MissingState);
        };
        let mut colors = wheel.clone();
        for (i, lit) in state.mask.iter().enumerate() {
            let color = if lit { colors.next().unwrap_or(BLACK) } else { BLACK };
            pixels.set(i, color)?;
        }
        // Drift the palette by one pixel per frame
        wheel.next();
        state.mask.scroll(settings.step);
        Ok(())
    }
}
