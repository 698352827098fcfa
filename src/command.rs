//! Control requests for a running engine.
//!
//! [`EngineControl`] is shared by reference between the task that runs
//! [`AnimationEngine::play`](crate::AnimationEngine::play) and any other
//! cooperative task (button handler, network command loop). Requests are
//! picked up at the engine's next frame check point.

use core::sync::atomic::{AtomicU8, Ordering};

/// Run status of an animation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineStatus {
    /// Not running. State is cleared.
    #[default]
    Idle,
    /// Executing the frame loop.
    Running,
    /// Frame loop suspended. Buffer and state are retained.
    Paused,
    /// Stop requested; the run ends at the next check point.
    Stopping,
}

impl EngineStatus {
    const fn as_u8(self) -> u8 {
        match self {
            EngineStatus::Idle => 0,
            EngineStatus::Running => 1,
            EngineStatus::Paused => 2,
            EngineStatus::Stopping => 3,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => EngineStatus::Running,
            2 => EngineStatus::Paused,
            3 => EngineStatus::Stopping,
            _ => EngineStatus::Idle,
        }
    }
}

/// Actions for controlling an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineAction {
    /// Suspend the frame loop.
    Pause,
    /// Continue a paused run.
    Resume,
    /// End the run at the next check point.
    Stop,
}

const NO_REQUEST: u8 = 0;

impl EngineAction {
    const fn as_u8(self) -> u8 {
        match self {
            EngineAction::Pause => 1,
            EngineAction::Resume => 2,
            EngineAction::Stop => 3,
        }
    }

    const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(EngineAction::Pause),
            2 => Some(EngineAction::Resume),
            3 => Some(EngineAction::Stop),
            _ => None,
        }
    }
}

/// Shared, lock-free control handle.
///
/// Holds one pending request; a newer request replaces an unapplied older
/// one. Only atomic loads and stores are used, so the handle also works on
/// cores without compare-and-swap. It can live in a `static`.
#[derive(Debug)]
pub struct EngineControl {
    status: AtomicU8,
    request: AtomicU8,
}

impl EngineControl {
    pub const fn new() -> Self {
        Self {
            status: AtomicU8::new(EngineStatus::Idle.as_u8()),
            request: AtomicU8::new(NO_REQUEST),
        }
    }

    /// Queues `action` for the engine's next check point.
    pub fn request(&self, action: EngineAction) {
        self.request.store(action.as_u8(), Ordering::Release);
    }

    pub fn pause(&self) {
        self.request(EngineAction::Pause);
    }

    pub fn resume(&self) {
        self.request(EngineAction::Resume);
    }

    pub fn stop(&self) {
        self.request(EngineAction::Stop);
    }

    /// Returns the request waiting to be applied, if any.
    pub fn pending(&self) -> Option<EngineAction> {
        EngineAction::from_u8(self.request.load(Ordering::Acquire))
    }

    /// Status last published by the engine.
    pub fn status(&self) -> EngineStatus {
        EngineStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn take_request(&self) -> Option<EngineAction> {
        let action = self.pending()?;
        self.request.store(NO_REQUEST, Ordering::Release);
        Some(action)
    }

    pub(crate) fn publish(&self, status: EngineStatus) {
        self.status.store(status.as_u8(), Ordering::Release);
    }
}

impl Default for EngineControl {
    fn default() -> Self {
        Self::new()
    }
}
