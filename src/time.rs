//! Time abstraction traits for platform-agnostic frame scheduling.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Saturating subtraction (returns ZERO on underflow).
    fn saturating_sub(self, other: Self) -> Self;
}

/// Trait abstraction for monotonic instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;

    /// Adds duration to instant, returns None on overflow.
    fn checked_add(self, duration: Self::Duration) -> Option<Self>;
}

/// Adapters for `embassy-time`.
#[cfg(feature = "embassy-time")]
pub mod embassy {
    use super::{TimeDuration, TimeInstant, TimeSource};

    /// Newtype wrapper for `embassy_time::Duration`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub struct EmbassyDuration(pub embassy_time::Duration);

    impl TimeDuration for EmbassyDuration {
        const ZERO: Self = EmbassyDuration(embassy_time::Duration::from_ticks(0));

        fn as_millis(&self) -> u64 {
            self.0.as_millis()
        }

        fn from_millis(millis: u64) -> Self {
            EmbassyDuration(embassy_time::Duration::from_millis(millis))
        }

        fn saturating_sub(self, other: Self) -> Self {
            EmbassyDuration(embassy_time::Duration::from_ticks(
                self.0.as_ticks().saturating_sub(other.0.as_ticks()),
            ))
        }
    }

    /// Newtype wrapper for `embassy_time::Instant`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub struct EmbassyInstant(pub embassy_time::Instant);

    impl TimeInstant for EmbassyInstant {
        type Duration = EmbassyDuration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            EmbassyDuration(self.0.saturating_duration_since(earlier.0))
        }

        fn checked_add(self, duration: Self::Duration) -> Option<Self> {
            self.0.checked_add(duration.0).map(EmbassyInstant)
        }
    }

    /// Time source reading the embassy monotonic clock.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct EmbassyClock;

    impl TimeSource<EmbassyInstant> for EmbassyClock {
        fn now(&self) -> EmbassyInstant {
            EmbassyInstant(embassy_time::Instant::now())
        }
    }
}
