//! Cancelable countdowns.
//!
//! `Countdown` is a deadline plus a generation token. The popup controller
//! polls it from `update(now_ms)`, so firing is deterministic; the
//! generation exists for hosts that additionally schedule their own wakeups
//! and need to discard callbacks from a superseded schedule.

use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct Countdown {
    deadline_ms: Option<u64>,
    generation: u64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the countdown. Supersedes any previous schedule in the same call:
    /// the returned generation is the only one `fire_if_current` will honor.
    pub fn schedule(&mut self, now_ms: u64, duration_ms: u32) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.deadline_ms = Some(now_ms + u64::from(duration_ms));
        trace!(
            deadline_ms = self.deadline_ms,
            generation = self.generation,
            "countdown scheduled"
        );
        self.generation
    }

    /// Disarm. A canceled countdown never fires, even if its deadline had
    /// already passed when `cancel` was called.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.deadline_ms = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms.map(|d| d.saturating_sub(now_ms))
    }

    /// Poll for expiry. Returns `true` at most once per schedule.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Poll for expiry on behalf of an externally scheduled wakeup. Fires
    /// only if `generation` still identifies the live schedule.
    pub fn fire_if_current(&mut self, now_ms: u64, generation: u64) -> bool {
        if generation != self.generation {
            trace!(generation, current = self.generation, "stale countdown wakeup");
            return false;
        }
        self.fire(now_ms)
    }
}
