//! Deferred calls back into the engine.
//!
//! The engine decides *when* the computer should act; a host supplies a
//! [`Scheduler`] that decides *how* to wait. When a call fires, the host hands
//! it back through [`GameEngine::fire`](crate::engine::GameEngine::fire) on the
//! same serialized context as every other engine call.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// A call the engine wants made later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledCall {
    /// The computer plays a card (or plays through a snap)
    ComputerPlay,
    /// Start the next round
    NextRound,
}

/// Capability to run a call after a delay
pub trait Scheduler {
    fn schedule_after(&mut self, delay: Duration, call: ScheduledCall);
}

/// A scheduled call and the delay it was requested with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCall {
    pub delay_ms: u64,
    pub call: ScheduledCall,
}

/// Scheduler that only records requests; the owner fires them by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: VecDeque<PendingCall>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet taken, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &PendingCall> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take the oldest request
    pub fn pop_next(&mut self) -> Option<PendingCall> {
        self.pending.pop_front()
    }

    /// Take every request
    pub fn drain(&mut self) -> Vec<PendingCall> {
        self.pending.drain(..).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&mut self, delay: Duration, call: ScheduledCall) {
        self.pending.push_back(PendingCall {
            delay_ms: delay.as_millis() as u64,
            call,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_keeps_order() {
        let mut scheduler = ManualScheduler::new();
        scheduler.schedule_after(Duration::from_millis(500), ScheduledCall::ComputerPlay);
        scheduler.schedule_after(Duration::from_secs(3), ScheduledCall::NextRound);

        assert_eq!(scheduler.len(), 2);
        assert_eq!(
            scheduler.pop_next(),
            Some(PendingCall {
                delay_ms: 500,
                call: ScheduledCall::ComputerPlay
            })
        );
        assert_eq!(
            scheduler.drain(),
            vec![PendingCall {
                delay_ms: 3000,
                call: ScheduledCall::NextRound
            }]
        );
        assert!(scheduler.is_empty());
    }
}
