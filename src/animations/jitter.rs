use crate::colors::{Color, brightness_peak};
use crate::engine::Animation;
use crate::generators::vivid;
use crate::pixels::PixelBuffer;
use crate::random::RandomSource;
use crate::types::AnimationError;

/// Colors used for replaced pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JitterColors {
    /// Saturated colors at this brightness (1-10).
    Vivid(u8),
    /// Random colors with each channel ANDed with the mask.
    Masked(Color),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JitterSettings {
    /// Color every pixel fades toward.
    pub background: Color,
    /// Chance (0-100) that a pixel is replaced in a frame.
    pub replace_percent: u8,
    /// How far (0-100) each pixel moves toward the background per frame.
    pub fade_percent: u8,
    pub colors: JitterColors,
}

impl Default for JitterSettings {
    fn default() -> Self {
        Self {
            background: Color::from_u32(0x020212),
            replace_percent: 10,
            fade_percent: 20,
            colors: JitterColors::Vivid(8),
        }
    }
}

/// Random pixels flare up and fade back into the background.
#[derive(Debug, Clone)]
pub struct Jitter<R> {
    rng: R,
}

impl<R: RandomSource> Jitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RandomSource> Animation for Jitter<R> {
    type Settings = JitterSettings;
    type State = ();

    fn validate(&self, settings: &JitterSettings) -> Result<(), AnimationError> {
        if settings.replace_percent > 100 {
            return Err(AnimationError::InvalidSetting {
                name: "replace_percent",
            });
        }
        if settings.fade_percent > 100 {
            return Err(AnimationError::InvalidSetting {
                name: "fade_percent",
            });
        }
        if let JitterColors::Vivid(brightness) = settings.colors {
            if !(1..=10).contains(&brightness) {
                return Err(AnimationError::InvalidSetting { name: "brightness" });
            }
        }
        Ok(())
    }

    fn setup<const CAP: usize>(
        &mut self,
        settings: &JitterSettings,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<(), AnimationError> {
        pixels.fill(settings.background);
        Ok(())
    }

    fn calc_frame<const CAP: usize>(
        &mut self,
        settings: &JitterSettings,
        _state: &mut (),
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<(), AnimationError> {
        let active = pixels.active_len();
        pixels.blend_range(settings.background, settings.fade_percent, 0, active)?;
        for i in 0..active {
            if !self.rng.percent_chance(settings.replace_percent) {
                continue;
            }
            let color = match settings.colors {
                JitterColors::Vivid(brightness) => vivid(&mut self.rng, brightness_peak(brightness)),
                JitterColors::Masked(mask) => {
                    let [r, g, b, w] = self.rng.next_u32().to_be_bytes();
                    Color::rgbw(r, g, b, w).zip_with(mask, |c, m| c & m)
                }
            };
            pixels.set(i, color)?;
        }
        Ok(())
    }
}
