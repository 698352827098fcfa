//! Animation engine with state management and frame timing.
//!
//! Provides [`AnimationEngine`], which drives one [`Animation`] over one
//! [`PixelBuffer`] and pushes every frame to a [`LedStrip`]. The engine can be
//! stepped manually with [`AnimationEngine::service`] from a super-loop, or
//! run to completion with the async [`AnimationEngine::play`].

use crate::command::{EngineAction, EngineControl, EngineStatus};
use crate::pixels::PixelBuffer;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::types::AnimationError;
use embedded_hal_async::delay::DelayNs;

/// Default time between frames.
pub const DEFAULT_INTERVAL_MS: u64 = 100;

/// Trait for abstracting the LED strip transport.
///
/// Implement this for your driver (RMT, SPI, PIO, bit-banged GPIO). The
/// engine calls it once per frame with `pixel_count * bytes_per_pixel` bytes
/// in R, G, B(, W) order; reorder channels here if the strip expects GRB.
pub trait LedStrip {
    /// Transport failure. The engine does not retry.
    type Error;

    /// Transmits one frame.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// A per-frame color algorithm.
///
/// The engine owns the animation, its settings and (during a run) its state.
/// Only the first [`PixelBuffer::active_len`] pixels need computing; the
/// engine projects them across the rest of the strip after every frame.
pub trait Animation {
    /// Tunables, merged from construction and per-run overrides.
    type Settings: Clone;

    /// Runtime values created at the start of every run and dropped at its end.
    type State: Default;

    /// Checks settings before a run starts or when they are reconfigured.
    fn validate(&self, _settings: &Self::Settings) -> Result<(), AnimationError> {
        Ok(())
    }

    /// Called once at the start of each run, before the first frame.
    fn setup<const CAP: usize>(
        &mut self,
        _settings: &Self::Settings,
        _pixels: &mut PixelBuffer<CAP>,
    ) -> Result<Self::State, AnimationError> {
        Ok(Self::State::default())
    }

    /// Computes one frame.
    fn calc_frame<const CAP: usize>(
        &mut self,
        settings: &Self::Settings,
        state: &mut Self::State,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<(), AnimationError>;
}

/// Engine configuration: frame interval plus the animation's own settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings<S, D> {
    /// Target time between frames.
    pub interval: D,
    /// Animation-specific settings.
    pub animation: S,
}

impl<S, D: TimeDuration> EngineSettings<S, D> {
    /// Wraps animation settings with the default 100 ms interval.
    pub fn new(animation: S) -> Self {
        Self {
            interval: D::from_millis(DEFAULT_INTERVAL_MS),
            animation,
        }
    }

    pub fn with_interval(mut self, interval: D) -> Self {
        self.interval = interval;
        self
    }
}

impl<S: Default, D: TimeDuration> Default for EngineSettings<S, D> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// How long a run lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunLength<D> {
    /// Until stopped.
    Indefinite,
    /// For this much running time; time spent paused does not count.
    For(D),
}

impl<D: TimeDuration> RunLength<D> {
    /// Converts a millisecond count; zero or negative means indefinite.
    pub fn from_millis(millis: i64) -> Self {
        if millis <= 0 {
            RunLength::Indefinite
        } else {
            RunLength::For(D::from_millis(millis as u64))
        }
    }
}

/// Timing information returned by [`AnimationEngine::service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameTiming<D> {
    /// Service again after this delay.
    Wait(D),
    /// Paused; nothing happens until resumed or stopped.
    Paused,
    /// The run ended and the engine is idle.
    Finished,
}

/// Errors that can occur during engine operations.
///
/// Any error raised while a run is active ends that run: the engine returns to
/// `Idle` and its state is dropped. Pixels already sent are not rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError<E> {
    /// Operation called from an invalid state.
    InvalidState {
        /// Human-readable description of expected state(s).
        expected: &'static str,
        /// The actual current state.
        actual: EngineStatus,
    },
    /// The animation rejected its settings or failed to compute a frame.
    Animation(AnimationError),
    /// The strip transport failed.
    Transport(E),
}

impl<E> From<AnimationError> for EngineError<E> {
    fn from(err: AnimationError) -> Self {
        EngineError::Animation(err)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for EngineError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EngineError::InvalidState { expected, actual } => {
                write!(
                    f,
                    "invalid state: expected {}, but engine is {:?}",
                    expected, actual
                )
            }
            EngineError::Animation(err) => write!(f, "animation failed: {}", err),
            EngineError::Transport(err) => write!(f, "strip transport failed: {:?}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for EngineError<E> {}

/// Drives one animation over one pixel buffer.
///
/// # Type Parameters
/// * `'a` - Lifetime of the time source and control handle references
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `L` - LED strip transport type
/// * `A` - Animation type
/// * `CAP` - Pixel buffer capacity in bytes
pub struct AnimationEngine<'a, I, T, L, A, const CAP: usize>
where
    I: TimeInstant,
    T: TimeSource<I>,
    L: LedStrip,
    A: Animation,
{
    animation: A,
    pixels: PixelBuffer<CAP>,
    strip: L,
    time_source: &'a T,
    control: &'a EngineControl,
    settings: EngineSettings<A::Settings, I::Duration>,
    state: Option<A::State>,
    status: EngineStatus,
    run_length: RunLength<I::Duration>,
    start_time: Option<I>,
    last_frame: Option<I>,
    pause_start_time: Option<I>,
    frame_count: u32,
}

impl<'a, I, T, L, A, const CAP: usize> AnimationEngine<'a, I, T, L, A, CAP>
where
    I: TimeInstant,
    T: TimeSource<I>,
    L: LedStrip,
    A: Animation,
{
    /// Creates an idle engine with the default frame interval.
    pub fn new(
        animation: A,
        settings: A::Settings,
        pixels: PixelBuffer<CAP>,
        strip: L,
        time_source: &'a T,
        control: &'a EngineControl,
    ) -> Self {
        control.publish(EngineStatus::Idle);
        Self {
            animation,
            pixels,
            strip,
            time_source,
            control,
            settings: EngineSettings::new(settings),
            state: None,
            status: EngineStatus::Idle,
            run_length: RunLength::Indefinite,
            start_time: None,
            last_frame: None,
            pause_start_time: None,
            frame_count: 0,
        }
    }

    /// Sets the time between frames.
    pub fn with_interval(mut self, interval: I::Duration) -> Self {
        self.settings.interval = interval;
        self
    }

    /// Applies `overrides` to the settings if the result validates.
    ///
    /// Changes persist across runs. On error the settings are left untouched.
    /// Allowed in any state; a running animation sees the change on its next
    /// frame.
    pub fn configure<F>(&mut self, overrides: F) -> Result<(), EngineError<L::Error>>
    where
        F: FnOnce(&mut EngineSettings<A::Settings, I::Duration>),
    {
        let mut candidate = self.settings.clone();
        overrides(&mut candidate);
        self.animation.validate(&candidate.animation)?;
        self.settings = candidate;
        Ok(())
    }

    /// Starts a run with the current settings.
    ///
    /// Must be called from `Idle` state.
    pub fn start(&mut self, run_length: RunLength<I::Duration>) -> Result<(), EngineError<L::Error>> {
        self.start_with(run_length, |_| {})
    }

    /// Merges `overrides` into the settings, then starts a run.
    ///
    /// Calls [`Animation::setup`] once. Control requests queued before the
    /// start are discarded.
    pub fn start_with<F>(
        &mut self,
        run_length: RunLength<I::Duration>,
        overrides: F,
    ) -> Result<(), EngineError<L::Error>>
    where
        F: FnOnce(&mut EngineSettings<A::Settings, I::Duration>),
    {
        if self.status != EngineStatus::Idle {
            return Err(EngineError::InvalidState {
                expected: "Idle",
                actual: self.status,
            });
        }

        self.configure(overrides)?;
        let _ = self.control.take_request();

        let state = self
            .animation
            .setup(&self.settings.animation, &mut self.pixels)?;

        self.state = Some(state);
        self.run_length = match run_length {
            RunLength::For(limit) if limit == I::Duration::ZERO => RunLength::Indefinite,
            other => other,
        };
        self.start_time = Some(self.time_source.now());
        self.last_frame = None;
        self.pause_start_time = None;
        self.frame_count = 0;
        self.set_status(EngineStatus::Running);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "animation started: {} pixels, {} active",
            self.pixels.pixel_count(),
            self.pixels.active_len()
        );

        Ok(())
    }

    /// Runs one check point of the frame loop.
    ///
    /// Applies any pending control request, then renders at most one frame if
    /// the interval has elapsed.
    ///
    /// # Returns
    /// * `Ok(FrameTiming::Wait(d))` - Service again after `d`
    /// * `Ok(FrameTiming::Paused)` - Paused, no frame rendered
    /// * `Ok(FrameTiming::Finished)` - Run ended, engine is `Idle`
    /// * `Err` - Not running, or the frame failed (engine is `Idle`)
    pub fn service(&mut self) -> Result<FrameTiming<I::Duration>, EngineError<L::Error>> {
        if let Some(action) = self.control.take_request() {
            self.apply_request(action);
        }

        match self.status {
            EngineStatus::Idle => Err(EngineError::InvalidState {
                expected: "Running, Paused, or Stopping",
                actual: self.status,
            }),
            EngineStatus::Stopping => {
                self.finish();
                Ok(FrameTiming::Finished)
            }
            EngineStatus::Paused => Ok(FrameTiming::Paused),
            EngineStatus::Running => self.service_running(),
        }
    }

    /// Runs the animation until the run length elapses or a stop is requested.
    ///
    /// Suspends on `delay` between frames, so other tasks on the same executor
    /// keep running. Returns the number of frames written.
    pub async fn play<D: DelayNs>(
        &mut self,
        delay: &mut D,
        run_length: RunLength<I::Duration>,
    ) -> Result<u32, EngineError<L::Error>> {
        self.play_with(delay, run_length, |_| {}).await
    }

    /// Like [`play`](Self::play), merging `overrides` into the settings first.
    pub async fn play_with<D, F>(
        &mut self,
        delay: &mut D,
        run_length: RunLength<I::Duration>,
        overrides: F,
    ) -> Result<u32, EngineError<L::Error>>
    where
        D: DelayNs,
        F: FnOnce(&mut EngineSettings<A::Settings, I::Duration>),
    {
        self.start_with(run_length, overrides)?;

        loop {
            match self.service()? {
                FrameTiming::Wait(wait) => delay.delay_ms(millis_u32(wait)).await,
                FrameTiming::Paused => delay.delay_ms(millis_u32(self.settings.interval)).await,
                FrameTiming::Finished => return Ok(self.frame_count),
            }
        }
    }

    /// Handles an engine action by dispatching to the matching method.
    pub fn handle_action(&mut self, action: EngineAction) -> Result<(), EngineError<L::Error>> {
        match action {
            EngineAction::Pause => self.pause(),
            EngineAction::Resume => self.resume(),
            EngineAction::Stop => self.stop(),
        }
    }

    /// Suspends the frame loop, keeping pixels and state.
    ///
    /// Must be called from `Running` state.
    pub fn pause(&mut self) -> Result<(), EngineError<L::Error>> {
        if self.status != EngineStatus::Running {
            return Err(EngineError::InvalidState {
                expected: "Running",
                actual: self.status,
            });
        }

        self.pause_start_time = Some(self.time_source.now());
        self.set_status(EngineStatus::Paused);

        #[cfg(feature = "defmt")]
        defmt::debug!("animation paused after {} frames", self.frame_count);

        Ok(())
    }

    /// Continues a paused run.
    ///
    /// Must be called from `Paused` state. The pause does not count toward the
    /// run length.
    pub fn resume(&mut self) -> Result<(), EngineError<L::Error>> {
        if self.status != EngineStatus::Paused {
            return Err(EngineError::InvalidState {
                expected: "Paused",
                actual: self.status,
            });
        }

        if let (Some(pause_start), Some(start)) = (self.pause_start_time, self.start_time) {
            let paused_for = self.time_source.now().duration_since(pause_start);
            // On instant overflow keep the old start; the run just ends early.
            self.start_time = Some(start.checked_add(paused_for).unwrap_or(start));
        }

        self.pause_start_time = None;
        self.set_status(EngineStatus::Running);

        #[cfg(feature = "defmt")]
        defmt::debug!("animation resumed");

        Ok(())
    }

    /// Requests the run to end at the next check point.
    ///
    /// Can be called from `Running`, `Paused`, or `Stopping`.
    pub fn stop(&mut self) -> Result<(), EngineError<L::Error>> {
        match self.status {
            EngineStatus::Running | EngineStatus::Paused | EngineStatus::Stopping => {
                self.set_status(EngineStatus::Stopping);

                #[cfg(feature = "defmt")]
                defmt::debug!("animation stop requested");

                Ok(())
            }
            EngineStatus::Idle => Err(EngineError::InvalidState {
                expected: "Running, Paused, or Stopping",
                actual: self.status,
            }),
        }
    }

    /// Returns the current run status.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == EngineStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.status == EngineStatus::Paused
    }

    /// Frames written in the current (or last) run.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Running time of the current run, excluding pauses.
    pub fn elapsed_time(&self) -> Option<I::Duration> {
        let start = self.start_time?;
        let now = self.pause_start_time.unwrap_or_else(|| self.time_source.now());
        Some(now.duration_since(start))
    }

    pub fn settings(&self) -> &EngineSettings<A::Settings, I::Duration> {
        &self.settings
    }

    /// Animation state; `None` while idle.
    pub fn state(&self) -> Option<&A::State> {
        self.state.as_ref()
    }

    pub fn pixels(&self) -> &PixelBuffer<CAP> {
        &self.pixels
    }

    /// Mutable pixel access, e.g. to change the repeat region between runs.
    pub fn pixels_mut(&mut self) -> &mut PixelBuffer<CAP> {
        &mut self.pixels
    }

    pub fn strip(&self) -> &L {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut L {
        &mut self.strip
    }

    pub fn animation(&self) -> &A {
        &self.animation
    }

    /// Takes the engine apart, returning the animation, pixels and strip.
    pub fn into_parts(self) -> (A, PixelBuffer<CAP>, L) {
        (self.animation, self.pixels, self.strip)
    }

    fn service_running(&mut self) -> Result<FrameTiming<I::Duration>, EngineError<L::Error>> {
        let now = self.time_source.now();
        let interval = self.settings.interval;

        if let (RunLength::For(limit), Some(start)) = (self.run_length, self.start_time) {
            if now.duration_since(start).as_millis() >= limit.as_millis() {
                self.finish();
                return Ok(FrameTiming::Finished);
            }
        }

        if let Some(last) = self.last_frame {
            let since = now.duration_since(last);
            if since.as_millis() < interval.as_millis() {
                return Ok(FrameTiming::Wait(interval.saturating_sub(since)));
            }
        }

        if let Err(err) = self.render_frame() {
            #[cfg(feature = "defmt")]
            defmt::warn!("frame {} failed, ending run", self.frame_count);

            self.finish();
            return Err(err);
        }

        self.last_frame = Some(now);
        Ok(FrameTiming::Wait(interval))
    }

    fn render_frame(&mut self) -> Result<(), EngineError<L::Error>> {
        let Some(state) = self.state.as_mut() else {
            return Err(EngineError::InvalidState {
                expected: "Running",
                actual: self.status,
            });
        };

        self.animation
            .calc_frame(&self.settings.animation, state, &mut self.pixels)?;
        self.pixels.project_repeat();
        self.strip
            .write(self.pixels.as_bytes())
            .map_err(EngineError::Transport)?;
        self.frame_count = self.frame_count.wrapping_add(1);
        Ok(())
    }

    fn apply_request(&mut self, action: EngineAction) {
        if let Err(_err) = self.handle_action(action) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "ignoring {} request while {}",
                action,
                self.status
            );
        }
    }

    fn finish(&mut self) {
        self.state = None;
        self.start_time = None;
        self.last_frame = None;
        self.pause_start_time = None;
        self.set_status(EngineStatus::Idle);

        #[cfg(feature = "defmt")]
        defmt::debug!("animation finished after {} frames", self.frame_count);
    }

    fn set_status(&mut self, status: EngineStatus) {
        self.status = status;
        self.control.publish(status);
    }
}

fn millis_u32<D: TimeDuration>(duration: D) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Color;
    use crate::types::BufferError;
    use core::cell::Cell;
    extern crate std;
    use std::format;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestDuration(u64);

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

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestInstant(u64);

    impl TimeInstant for TestInstant {
        type Duration = TestDuration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            TestDuration(self.0 - earlier.0)
        }

        fn checked_add(self, duration: Self::Duration) -> Option<Self> {
            Some(TestInstant(self.0 + duration.0))
        }
    }

    struct MockTimeSource {
        current_time: Cell<TestInstant>,
    }

    impl MockTimeSource {
        fn new() -> Self {
            Self {
                current_time: Cell::new(TestInstant(0)),
            }
        }

        fn advance(&self, millis: u64) {
            let current = self.current_time.get();
            self.current_time.set(TestInstant(current.0 + millis));
        }
    }

    impl TimeSource<TestInstant> for MockTimeSource {
        fn now(&self) -> TestInstant {
            self.current_time.get()
        }
    }

    #[derive(Default)]
    struct MockStrip {
        writes: usize,
        last: heapless::Vec<u8, 30>,
        fail: bool,
    }

    impl LedStrip for MockStrip {
        type Error = &'static str;

        fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err("bus fault");
            }
            self.writes += 1;
            self.last.clear();
            let _ = self.last.extend_from_slice(bytes);
            Ok(())
        }
    }

    // Writes the frame number into pixel 0; fails on frame `fail_at`.
    #[derive(Default)]
    struct Counter;

    #[derive(Debug, Clone, Default)]
    struct CounterSettings {
        fail_at: Option<u8>,
    }

    impl Animation for Counter {
        type Settings = CounterSettings;
        type State = u8;

        fn validate(&self, settings: &CounterSettings) -> Result<(), AnimationError> {
            if settings.fail_at == Some(0) {
                return Err(AnimationError::InvalidSetting { name: "fail_at" });
            }
            Ok(())
        }

        fn calc_frame<const CAP: usize>(
            &mut self,
            settings: &CounterSettings,
            frame: &mut u8,
            pixels: &mut PixelBuffer<CAP>,
        ) -> Result<(), AnimationError> {
            *frame += 1;
            if settings.fail_at == Some(*frame) {
                return Err(BufferError::IndexOutOfBounds { index: 99, len: 10 }.into());
            }
            pixels.set(0, Color::rgb(*frame, 0, 0))?;
            Ok(())
        }
    }

    type TestEngine<'a> =
        AnimationEngine<'a, TestInstant, MockTimeSource, MockStrip, Counter, 30>;

    fn engine<'a>(timer: &'a MockTimeSource, control: &'a EngineControl) -> TestEngine<'a> {
        let pixels = PixelBuffer::rgb(10).unwrap();
        AnimationEngine::new(
            Counter,
            CounterSettings::default(),
            pixels,
            MockStrip::default(),
            timer,
            control,
        )
    }

    #[test]
    fn service_requires_active_run() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        assert!(matches!(
            engine.service(),
            Err(EngineError::InvalidState {
                actual: EngineStatus::Idle,
                ..
            })
        ));
    }

    #[test]
    fn zero_run_length_runs_until_stopped() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.start(RunLength::For(TestDuration::ZERO)).unwrap();

        for _ in 0..3 {
            assert_eq!(engine.service(), Ok(FrameTiming::Wait(TestDuration(100))));
            timer.advance(100);
        }
        assert_eq!(engine.status(), EngineStatus::Running);
        assert_eq!(engine.frame_count(), 3);
    }

    #[test]
    fn first_frame_renders_immediately_then_waits_for_interval() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.start(RunLength::Indefinite).unwrap();

        assert_eq!(engine.service(), Ok(FrameTiming::Wait(TestDuration(100))));
        assert_eq!(engine.strip().writes, 1);

        timer.advance(40);
        assert_eq!(engine.service(), Ok(FrameTiming::Wait(TestDuration(60))));
        assert_eq!(engine.strip().writes, 1);

        timer.advance(60);
        assert_eq!(engine.service(), Ok(FrameTiming::Wait(TestDuration(100))));
        assert_eq!(engine.strip().writes, 2);
        assert_eq!(engine.frame_count(), 2);
        assert_eq!(engine.state(), Some(&2));
    }

    #[test]
    fn start_requires_idle_state() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.start(RunLength::Indefinite).unwrap();
        assert!(matches!(
            engine.start(RunLength::Indefinite),
            Err(EngineError::InvalidState {
                expected: "Idle",
                actual: EngineStatus::Running
            })
        ));
    }

    #[test]
    fn invalid_override_keeps_engine_idle_and_settings_unchanged() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        let result = engine.start_with(RunLength::Indefinite, |s| {
            s.animation.fail_at = Some(0);
            s.interval = TestDuration(5);
        });
        assert!(matches!(
            result,
            Err(EngineError::Animation(AnimationError::InvalidSetting {
                name: "fail_at"
            }))
        ));
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert_eq!(engine.settings().interval, TestDuration(100));
    }

    #[test]
    fn run_length_ends_run_and_clears_state() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.start(RunLength::For(TestDuration(250))).unwrap();

        engine.service().unwrap();
        timer.advance(100);
        engine.service().unwrap();
        timer.advance(100);
        engine.service().unwrap();
        timer.advance(50);
        assert_eq!(engine.service(), Ok(FrameTiming::Finished));
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert_eq!(control.status(), EngineStatus::Idle);
        assert!(engine.state().is_none());
        assert_eq!(engine.frame_count(), 3);
    }

    #[test]
    fn pause_time_does_not_count_toward_run_length() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.start(RunLength::For(TestDuration(200))).unwrap();
        engine.service().unwrap();

        timer.advance(100);
        engine.pause().unwrap();
        timer.advance(1000);
        assert_eq!(engine.service(), Ok(FrameTiming::Paused));
        assert_eq!(engine.strip().writes, 1);
        assert_eq!(engine.elapsed_time(), Some(TestDuration(100)));

        engine.resume().unwrap();
        assert_eq!(engine.elapsed_time(), Some(TestDuration(100)));
        assert!(matches!(engine.service(), Ok(FrameTiming::Wait(_))));
        assert_eq!(engine.strip().writes, 2);

        timer.advance(100);
        assert_eq!(engine.service(), Ok(FrameTiming::Finished));
    }

    #[test]
    fn pause_and_resume_validate_state() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        assert!(engine.pause().is_err());
        assert!(engine.resume().is_err());
        assert!(engine.stop().is_err());

        engine.start(RunLength::Indefinite).unwrap();
        assert!(engine.resume().is_err());
        engine.pause().unwrap();
        assert!(engine.pause().is_err());
        assert!(engine.is_paused());
    }

    #[test]
    fn stop_is_deferred_to_next_check_point() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.start(RunLength::Indefinite).unwrap();
        engine.service().unwrap();

        engine.stop().unwrap();
        assert_eq!(engine.status(), EngineStatus::Stopping);
        assert!(engine.state().is_some());

        assert_eq!(engine.service(), Ok(FrameTiming::Finished));
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert!(engine.state().is_none());
        assert_eq!(engine.strip().writes, 1);
    }

    #[test]
    fn control_requests_apply_at_service() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.start(RunLength::Indefinite).unwrap();
        assert_eq!(control.status(), EngineStatus::Running);

        control.pause();
        assert_eq!(engine.status(), EngineStatus::Running);
        assert_eq!(engine.service(), Ok(FrameTiming::Paused));
        assert_eq!(control.status(), EngineStatus::Paused);

        // Invalid for the current status; ignored
        control.pause();
        assert_eq!(engine.service(), Ok(FrameTiming::Paused));

        control.resume();
        assert!(matches!(engine.service(), Ok(FrameTiming::Wait(_))));

        control.stop();
        assert_eq!(engine.service(), Ok(FrameTiming::Finished));
        assert_eq!(control.status(), EngineStatus::Idle);
    }

    #[test]
    fn stale_requests_are_dropped_on_start() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        control.stop();
        engine.start(RunLength::Indefinite).unwrap();
        assert!(matches!(engine.service(), Ok(FrameTiming::Wait(_))));
    }

    #[test]
    fn animation_error_ends_run() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine
            .start_with(RunLength::Indefinite, |s| s.animation.fail_at = Some(2))
            .unwrap();
        engine.service().unwrap();
        timer.advance(100);
        assert!(matches!(
            engine.service(),
            Err(EngineError::Animation(AnimationError::Buffer(_)))
        ));
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert!(engine.state().is_none());
        // First frame stays on the strip
        assert_eq!(engine.strip().last[0], 1);
    }

    #[test]
    fn transport_error_ends_run() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.strip_mut().fail = true;
        engine.start(RunLength::Indefinite).unwrap();
        assert_eq!(engine.service(), Err(EngineError::Transport("bus fault")));
        assert_eq!(engine.status(), EngineStatus::Idle);
    }

    #[test]
    fn repeat_region_is_projected_before_write() {
        let timer = MockTimeSource::new();
        let control = EngineControl::new();
        let mut engine = engine(&timer, &control);
        engine.pixels_mut().set_repeat_count(1).unwrap();
        engine.start(RunLength::Indefinite).unwrap();
        engine.service().unwrap();
        let bytes = &engine.strip().last;
        assert_eq!(bytes.len(), 30);
        assert!(bytes.chunks(3).all(|px| px == [1, 0, 0]));
    }

    #[test]
    fn run_length_from_millis_treats_non_positive_as_indefinite() {
        assert_eq!(RunLength::<TestDuration>::from_millis(0), RunLength::Indefinite);
        assert_eq!(RunLength::<TestDuration>::from_millis(-5), RunLength::Indefinite);
        assert_eq!(
            RunLength::<TestDuration>::from_millis(1500),
            RunLength::For(TestDuration(1500))
        );
    }

    #[test]
    fn error_messages_format_correctly_for_display() {
        let err: EngineError<&str> = EngineError::InvalidState {
            expected: "Paused",
            actual: EngineStatus::Running,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Paused"));
        assert!(msg.contains("Running"));

        let msg = format!("{}", EngineError::Transport("bus fault"));
        assert!(msg.contains("bus fault"));
    }
}
