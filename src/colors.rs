//! Pixel colors and 8-bit channel helpers.
//!
//! [`Color`] carries up to four channels (R, G, B, W). Buffers with three bytes
//! per pixel ignore the white channel. HSV helpers go through `palette` so hue
//! math matches the rest of the embedded ecosystem.

use palette::{FromColor, Hsv, Srgb};

/// An RGB(W) pixel color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Color {
    /// Creates an RGB color with the white channel off.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, w: 0 }
    }

    /// Creates an RGBW color.
    #[inline]
    pub const fn rgbw(r: u8, g: u8, b: u8, w: u8) -> Self {
        Self { r, g, b, w }
    }

    /// Creates a color from a packed `0xRRGGBB` value.
    #[inline]
    pub const fn from_u32(val: u32) -> Self {
        Self::rgb((val >> 16) as u8, (val >> 8) as u8, val as u8)
    }

    /// Creates a color from a packed `0xRRGGBBWW` value.
    #[inline]
    pub const fn from_u32_rgbw(val: u32) -> Self {
        Self::rgbw((val >> 24) as u8, (val >> 16) as u8, (val >> 8) as u8, val as u8)
    }

    /// Creates a color from up to four channel bytes; missing channels are 0.
    pub fn from_channels(bytes: &[u8]) -> Self {
        let mut channels = [0u8; 4];
        for (dst, src) in channels.iter_mut().zip(bytes) {
            *dst = *src;
        }
        Self::rgbw(channels[0], channels[1], channels[2], channels[3])
    }

    /// Returns the channels in R, G, B, W order.
    #[inline]
    pub const fn channels(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.w]
    }

    /// Returns true when every channel is zero.
    #[inline]
    pub const fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0 && self.w == 0
    }

    /// Applies `op` to every channel.
    pub fn map(self, mut op: impl FnMut(u8) -> u8) -> Self {
        Self::rgbw(op(self.r), op(self.g), op(self.b), op(self.w))
    }

    /// Combines two colors channel by channel.
    pub fn zip_with(self, other: Color, mut op: impl FnMut(u8, u8) -> u8) -> Self {
        Self::rgbw(
            op(self.r, other.r),
            op(self.g, other.g),
            op(self.b, other.b),
            op(self.w, other.w),
        )
    }
}

impl From<Srgb<u8>> for Color {
    fn from(rgb: Srgb<u8>) -> Self {
        Color::rgb(rgb.red, rgb.green, rgb.blue)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(color: Color) -> Self {
        Srgb::new(color.r, color.g, color.b)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::rgb(r, g, b)
    }
}

pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const RED: Color = Color::rgb(255, 0, 0);
pub const GREEN: Color = Color::rgb(0, 255, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);

/// Blends `pct` percent of `to` into `from`, rounding to the nearest value.
///
/// `pct` above 100 is treated as 100.
pub fn blend(from: Color, to: Color, pct: u8) -> Color {
    let pct = pct.min(100) as u16;
    from.zip_with(to, |a, b| {
        ((a as u16 * (100 - pct) + b as u16 * pct + 50) / 100) as u8
    })
}

/// Brightens (`steps > 0`) or dims (`steps < 0`) a color by bit shifting.
///
/// Brightening saturates at 255.
pub fn shift(color: Color, steps: i8) -> Color {
    match steps {
        0 => color,
        s if s > 0 => color.map(|c| ((c as u16) << s.min(8)).min(255) as u8),
        s => color.map(|c| c >> (-(s as i16)).min(7)),
    }
}

/// Returns the color at `pos` on a 360-step red-green-blue wheel with peak `max`.
pub fn color_wheel(pos: u16, max: u8) -> Color {
    let pos = pos % 360;
    let rising = (max as u32 * (pos % 120) as u32 / 120) as u8;
    let falling = max - rising;
    if pos < 120 {
        Color::rgb(falling, rising, 0)
    } else if pos < 240 {
        Color::rgb(0, falling, rising)
    } else {
        Color::rgb(rising, 0, falling)
    }
}

/// Scales a 1-10 brightness level to a channel peak (10 -> 250).
#[inline]
pub(crate) fn brightness_peak(brightness: u8) -> u8 {
    brightness.min(10) * 25
}

/// Creates a color from HSV components (hue in degrees, saturation and value 0.0-1.0).
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Color {
    let rgb: Srgb<u8> = Srgb::from_color(Hsv::new(hue, saturation, value)).into_format();
    Color::from(rgb)
}

/// Creates a color from hue only (full saturation and value).
#[inline]
pub fn hue(hue: f32) -> Color {
    hsv(hue, 1.0, 1.0)
}
