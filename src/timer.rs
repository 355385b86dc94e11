use std::time::{Duration, Instant};

use crate::TimerState;

/// An intermediate and a final deadline, as engines expect from a
/// retransmission timer.
///
/// Building block for [`Transport::set_timer`](crate::Transport::set_timer)
/// and [`Transport::get_timer`](crate::Transport::get_timer).
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayTimer {
    deadlines: Option<(Instant, Instant)>,
}

impl DelayTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm relative to now. `final_ms == 0` cancels.
    pub fn set(&mut self, intermediate_ms: u32, final_ms: u32) {
        self.set_at(Instant::now(), intermediate_ms, final_ms);
    }

    /// Arm relative to `now`. `final_ms == 0` cancels.
    pub fn set_at(&mut self, now: Instant, intermediate_ms: u32, final_ms: u32) {
        self.deadlines = (final_ms > 0).then(|| {
            (
                now + Duration::from_millis(intermediate_ms.into()),
                now + Duration::from_millis(final_ms.into()),
            )
        });
    }

    pub fn state(&self) -> TimerState {
        self.state_at(Instant::now())
    }

    pub fn state_at(&self, now: Instant) -> TimerState {
        let Some((intermediate, last)) = self.deadlines else {
            return TimerState::Cancelled;
        };

        if now >= last {
            TimerState::FinalExpired
        } else if now >= intermediate {
            TimerState::IntermediateExpired
        } else {
            TimerState::Running
        }
    }

    /// Time left until the final deadline, if armed.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        self.deadlines
            .map(|(_, last)| last.saturating_duration_since(now))
    }
}
