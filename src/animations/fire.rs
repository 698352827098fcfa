use crate::bytes::ByteArray;
use crate::colors::Color;
use crate::engine::Animation;
use crate::pixels::PixelBuffer;
use crate::random::RandomSource;
use crate::types::AnimationError;

/// Pixels at the base of the flame where new sparks ignite.
const SPARK_ZONE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FireSettings {
    /// How fast the flame cools (1-100). Higher gives shorter flames.
    pub cooling: u8,
    /// Chance out of 255 that a new spark ignites each frame.
    pub sparking: u8,
    /// Put the base of the flame at the far end of the strip.
    pub reversed: bool,
}

impl Default for FireSettings {
    fn default() -> Self {
        Self {
            cooling: 55,
            sparking: 120,
            reversed: false,
        }
    }
}

/// Runtime state of [`Fire`]: one heat byte per active pixel.
#[derive(Debug, Clone, Default)]
pub struct FireState<const HEAT: usize> {
    pub heat: ByteArray<HEAT>,
}

/// Rising flame simulated on a heat map.
///
/// Every frame each cell cools a little, heat drifts up the strip, and sparks
/// ignite near the base. Heat is then mapped to black-red-yellow-white.
#[derive(Debug, Clone)]
pub struct Fire<R, const HEAT: usize> {
    rng: R,
}

impl<R: RandomSource, const HEAT: usize> Fire<R, HEAT> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

/// Maps a heat value to a flame color.
pub fn heat_color(temperature: u8) -> Color {
    let t192 = (temperature as u16 * 191 / 255) as u8;
    let ramp = (t192 & 0x3F) << 2;
    if t192 & 0x80 != 0 {
        Color::rgb(255, 255, ramp)
    } else if t192 & 0x40 != 0 {
        Color::rgb(255, ramp, 0)
    } else {
        Color::rgb(ramp, 0, 0)
    }
}

impl<R: RandomSource, const HEAT: usize> Animation for Fire<R, HEAT> {
    type Settings = FireSettings;
    type State = FireState<HEAT>;

    fn validate(&self, settings: &FireSettings) -> Result<(), AnimationError> {
        if !(1..=100).contains(&settings.cooling) {
            return Err(AnimationError::InvalidSetting { name: "cooling" });
        }
        Ok(())
    }

    fn setup<const CAP: usize>(
        &mut self,
        _settings: &FireSettings,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<FireState<HEAT>, AnimationError> {
        Ok(FireState {
            heat: ByteArray::new(pixels.active_len(), 1)?,
        })
    }

    fn calc_frame<const CAP: usize>(
        &mut self,
        settings: &FireSettings,
        state: &mut FireState<HEAT>,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<(), AnimationError> {
        let heat = state.heat.as_bytes_mut();
        let len = heat.len();
        if len == 0 {
            return Ok(());
        }

        // Short regions draw above 255; those saturate to full cooling
        let max_cooling = settings.cooling as u32 * 10 / len as u32 + 2;
        for cell in heat.iter_mut() {
            let cooldown = self.rng.below(max_cooling).min(u8::MAX as u32) as u8;
            *cell = cell.saturating_sub(cooldown);
        }

        for k in (2..len).rev() {
            heat[k] = ((heat[k - 1] as u16 + 2 * heat[k - 2] as u16) / 3) as u8;
        }

        if self.rng.below(256) < settings.sparking as u32 {
            let y = self.rng.below(SPARK_ZONE.min(len) as u32) as usize;
            heat[y] = heat[y].saturating_add(160 + self.rng.below(96) as u8);
        }

        for (j, cell) in heat.iter().enumerate() {
            let index = if settings.reversed { len - 1 - j } else { j };
            pixels.set(index, heat_color(*cell))?;
        }
        Ok(())
    }
}
