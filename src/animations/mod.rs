//! Built-in animations.
//!
//! Each animation implements [`Animation`](crate::Animation) with a typed
//! settings struct. Randomized animations take their [`RandomSource`] at
//! construction.
//!
//! [`RandomSource`]: crate::RandomSource

mod fire;
mod jitter;
mod lit_bits;
mod next_gen;

pub use fire::{Fire, FireSettings, FireState, heat_color};
pub use jitter::{Jitter, JitterColors, JitterSettings};
pub use lit_bits::{LitBits, LitBitsSettings, LitBitsState, LitPattern};
pub use next_gen::{NextGen, NextGenSettings, NextGenState};
