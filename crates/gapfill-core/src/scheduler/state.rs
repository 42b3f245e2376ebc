//! Scheduler state machine: phase, next trigger instant, and run epoch.

use chrono::{DateTime, Duration, Utc};

use crate::pattern::hour_start;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stopped,
    Running,
}

/// What the tick loop should do after one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// The scheduler was stopped (or restarted under a newer epoch).
    Exit,
    Idle,
    RunCycle,
}

/// Next hour boundary plus `offset_minutes`; one hour later if that is not after `now`.
/// Offsets above 59 are clamped to 59.
pub fn next_trigger_after(now: DateTime<Utc>, offset_minutes: u32) -> DateTime<Utc> {
    let offset = Duration::minutes(i64::from(offset_minutes.min(59)));
    let candidate = hour_start(now) + Duration::hours(1) + offset;
    if candidate > now {
        candidate
    } else {
        candidate + Duration::hours(1)
    }
}

/// Guarded by the scheduler's mutex; every transition goes through these methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerState {
    phase: Phase,
    next_trigger: Option<DateTime<Utc>>,
    /// Bumped on every start so a loop from an earlier run exits even if the
    /// scheduler was restarted before it observed the stop.
    epoch: u64,
    offset_minutes: u32,
}

impl SchedulerState {
    pub fn new(offset_minutes: u32) -> Self {
        Self {
            phase: Phase::Stopped,
            next_trigger: None,
            epoch: 0,
            offset_minutes,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn next_trigger(&self) -> Option<DateTime<Utc>> {
        self.next_trigger
    }

    /// stopped → running. Returns the new epoch, or `None` if already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<u64> {
        if self.phase == Phase::Running {
            return None;
        }
        self.phase = Phase::Running;
        self.epoch += 1;
        self.next_trigger = Some(next_trigger_after(now, self.offset_minutes));
        Some(self.epoch)
    }

    /// running → stopped. Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        if self.phase == Phase::Stopped {
            return false;
        }
        self.phase = Phase::Stopped;
        self.next_trigger = None;
        true
    }

    /// One tick of the loop started under `epoch`.
    pub fn poll(&mut self, epoch: u64, now: DateTime<Utc>) -> TickAction {
        if self.phase != Phase::Running || epoch != self.epoch {
            return TickAction::Exit;
        }
        match self.next_trigger {
            Some(at) if now >= at => {
                self.next_trigger = Some(next_trigger_after(now, self.offset_minutes));
                TickAction::RunCycle
            }
            _ => TickAction::Idle,
        }
    }
}
