//! Shared test infrastructure for strip-animator integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use embedded_hal_async::delay::DelayNs;
use strip_animator::{
    Animation, AnimationError, Color, EngineAction, EngineControl, LedStrip, PixelBuffer,
    RandomSource, TimeDuration, TimeInstant, TimeSource,
};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }

    fn saturating_sub(self, other: Self) -> Self {
        TestDuration(self.0.saturating_sub(other.0))
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }

    fn checked_add(self, duration: Self::Duration) -> Option<Self> {
        self.0.checked_add(duration.0).map(TestInstant)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: core::cell::Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: core::cell::Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given duration
    pub fn advance(&self, duration: TestDuration) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + duration.0));
    }

    pub fn now_millis(&self) -> u64 {
        self.current_time.get().0
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Delay
// ============================================================================

/// Delay that advances the mock clock instead of sleeping.
///
/// Scripted control requests fire after the given number of delays, standing
/// in for another task acting while the engine is suspended.
pub struct MockDelay<'a> {
    timer: &'a MockTimeSource,
    control: Option<&'a EngineControl>,
    script: Vec<(usize, EngineAction)>,
    delays: Vec<u64>,
}

impl<'a> MockDelay<'a> {
    pub fn new(timer: &'a MockTimeSource) -> Self {
        Self {
            timer,
            control: None,
            script: Vec::new(),
            delays: Vec::new(),
        }
    }

    /// Requests `action` on `control` once `after` delays have elapsed.
    pub fn then(mut self, control: &'a EngineControl, after: usize, action: EngineAction) -> Self {
        self.control = Some(control);
        self.script.push((after, action));
        self
    }

    /// Every delay taken, in milliseconds.
    pub fn delays(&self) -> &[u64] {
        &self.delays
    }

    fn sleep(&mut self, millis: u64) {
        self.timer.advance(TestDuration(millis));
        self.delays.push(millis);
        if let Some(control) = self.control {
            let taken = self.delays.len();
            for (after, action) in &self.script {
                if *after == taken {
                    control.request(*action);
                }
            }
        }
    }
}

impl DelayNs for MockDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.sleep(ns as u64 / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.sleep(ms as u64);
    }
}

// ============================================================================
// Mock LED Strip
// ============================================================================

/// Mock strip that records every frame written
#[derive(Default)]
pub struct MockStrip {
    frames: Vec<Vec<u8>>,
    fail_after: Option<usize>,
}

impl MockStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip whose writes fail once `frames` frames have been accepted.
    pub fn failing_after(frames: usize) -> Self {
        Self {
            frames: Vec::new(),
            fail_after: Some(frames),
        }
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(|f| f.as_slice())
    }

    /// Pixel `index` of the last frame, assuming 3 bytes per pixel.
    pub fn last_pixel(&self, index: usize) -> Option<Color> {
        let frame = self.last_frame()?;
        frame.get(index * 3..index * 3 + 3).map(Color::from_channels)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl LedStrip for MockStrip {
    type Error = BusFault;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_after == Some(self.frames.len()) {
            return Err(BusFault);
        }
        self.frames.push(bytes.to_vec());
        Ok(())
    }
}

// ============================================================================
// Deterministic randomness
// ============================================================================

/// Random source replaying a fixed list of values
pub struct ScriptedRng {
    values: Vec<u32>,
    pos: usize,
}

impl ScriptedRng {
    pub fn new(values: &[u32]) -> Self {
        Self {
            values: values.to_vec(),
            pos: 0,
        }
    }
}

impl RandomSource for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value
    }
}

// ============================================================================
// Test animation
// ============================================================================

/// Paints pixel 0 with the frame number in the red channel.
#[derive(Default)]
pub struct FrameCounter {
    pub setups: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameCounterSettings {
    pub green: u8,
}

impl Animation for FrameCounter {
    type Settings = FrameCounterSettings;
    type State = u8;

    fn setup<const CAP: usize>(
        &mut self,
        _settings: &FrameCounterSettings,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<u8, AnimationError> {
        self.setups += 1;
        pixels.clear();
        Ok(0)
    }

    fn calc_frame<const CAP: usize>(
        &mut self,
        settings: &FrameCounterSettings,
        frame: &mut u8,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<(), AnimationError> {
        *frame = frame.wrapping_add(1);
        pixels.set(0, Color::rgb(*frame, settings.green, 0))?;
        Ok(())
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Collects every pixel of a buffer
pub fn colors<const CAP: usize>(pixels: &PixelBuffer<CAP>) -> Vec<Color> {
    pixels.iter().collect()
}
