//! Scheduled wake-ups for tick-driven state machines.
//!
//! A wake becomes due once simulation time reaches its deadline, and never on
//! the tick it was scheduled in: a zero delay means "next tick".

use rampart_core::types::SimTime;

/// Slack for accumulated floating-point error in `elapsed_secs`.
const DEADLINE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wake {
    pub at_secs: f64,
    /// The tick the wake was scheduled on.
    pub scheduled_tick: u64,
}

impl Wake {
    pub fn is_due(&self, time: &SimTime) -> bool {
        time.tick > self.scheduled_tick && time.elapsed_secs + DEADLINE_EPSILON >= self.at_secs
    }
}

/// Pending wakes, earliest deadline first.
#[derive(Debug, Clone, Default)]
pub struct WakeList {
    pending: Vec<Wake>,
}

impl WakeList {
    /// Schedule a wake `delay_secs` from now.
    pub fn schedule(&mut self, time: &SimTime, delay_secs: f64) {
        let wake = Wake {
            at_secs: time.elapsed_secs + delay_secs.max(0.0),
            scheduled_tick: time.tick,
        };
        let index = self.pending.partition_point(|w| w.at_secs <= wake.at_secs);
        self.pending.insert(index, wake);
    }

    /// Remove and return the earliest wake if it is due.
    pub fn pop_due(&mut self, time: &SimTime) -> Option<Wake> {
        if self.pending.first()?.is_due(time) {
            Some(self.pending.remove(0))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
