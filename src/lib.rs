#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PixelBuffer`**: The strip's colors in transport byte order, with fill, gradient, blend and scroll operations
//! - **Repeat region**: Only the first `repeat_count` pixels are computed; `RepeatMode` projects them across the strip
//! - **`BitArray`** / **`ByteArray`**: Compact per-pixel metadata (lit masks, heat maps, palettes)
//! - **`ColorGenerator`**: Any `Iterator<Item = Color>` used to fill pixels
//! - **`Animation`**: Trait to implement for your per-frame color algorithm
//! - **`AnimationEngine`**: Runs an animation with frame timing, pause, resume and stop
//! - **`EngineControl`**: Shared handle for pausing or stopping an engine from another task
//! - **`LedStrip`**: Trait to implement for your strip driver
//! - **`TimeSource`**: Trait to implement for your timing system
//!
//! All storage is fixed-capacity (`heapless`), sized by a const generic byte
//! capacity, so the crate runs without an allocator.

pub use palette::Srgb;

pub mod animations;
pub mod bits;
pub mod bytes;
pub mod colors;
pub mod command;
pub mod engine;
pub mod generators;
pub mod pixels;
pub mod random;
pub mod time;
pub mod types;

pub use bits::BitArray;
pub use bytes::ByteArray;
pub use colors::{Color, blend, color_wheel, hsv, hue, shift};
pub use command::{EngineAction, EngineControl, EngineStatus};
pub use engine::{
    Animation, AnimationEngine, EngineError, EngineSettings, FrameTiming, LedStrip, RunLength,
};
pub use generators::{
    ColorGenerator, FadeMode, FadingColorWheel, RandomPastel, RandomVivid, SteppedColorWheel,
    StripedColorWheel,
};
pub use pixels::PixelBuffer;
pub use random::{RandomSource, Xorshift32};
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use types::{AnimationError, BufferError, RepeatMode};
