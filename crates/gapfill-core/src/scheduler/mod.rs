//! Periodic scan-and-download scheduler.
//!
//! A tokio task ticks every `tick` and asks the shared [`SchedulerState`]
//! whether the next trigger has been reached. Cycles themselves block on the
//! network, so they run on the blocking pool through the [`Monitor`], whose
//! cycle guard also covers manual triggers.

mod state;

pub use state::{next_trigger_after, Phase, SchedulerState, TickAction};

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::ScheduleConfig;
use crate::monitor::{CycleOutcome, Monitor};

struct Inner {
    state: Mutex<SchedulerState>,
    monitor: Arc<Monitor>,
    tick: Duration,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to the scheduler. Cheap to clone; all clones drive the same state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(monitor: Arc<Monitor>, schedule: ScheduleConfig) -> Self {
        Self::with_tick(monitor, schedule.offset_minutes, schedule.tick())
    }

    /// Explicit check interval; sub-second ticks are only useful in tests.
    pub fn with_tick(monitor: Arc<Monitor>, offset_minutes: u32, tick: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SchedulerState::new(offset_minutes)),
                monitor,
                tick,
            }),
        }
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.inner.monitor
    }

    pub fn is_running(&self) -> bool {
        self.inner.state().phase() == Phase::Running
    }

    pub fn next_trigger(&self) -> Option<DateTime<Utc>> {
        self.inner.state().next_trigger()
    }

    /// stopped → running: run one cycle right away, then tick until stopped.
    /// Returns the tick loop's handle, or `None` if already running.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let epoch = self.inner.state().start(Utc::now())?;
        tracing::info!(
            epoch,
            next = ?self.next_trigger(),
            "scheduler started"
        );
        spawn_cycle(&self.inner.monitor);
        Some(tokio::spawn(tick_loop(Arc::clone(&self.inner), epoch)))
    }

    /// running → stopped. The tick loop exits on its next tick; a cycle already
    /// in flight runs to completion.
    pub fn stop(&self) -> bool {
        let stopped = self.inner.state().stop();
        if stopped {
            tracing::info!("scheduler stopped");
        }
        stopped
    }

    /// Manual trigger: one scan-and-auto-download cycle on the blocking pool.
    pub fn trigger_now(&self) -> JoinHandle<CycleOutcome> {
        spawn_cycle(&self.inner.monitor)
    }
}

fn spawn_cycle(monitor: &Arc<Monitor>) -> JoinHandle<CycleOutcome> {
    let monitor = Arc::clone(monitor);
    tokio::task::spawn_blocking(move || {
        let outcome = monitor.run_cycle(true, None);
        match outcome {
            CycleOutcome::Completed {
                downloads: Some(d), ..
            } => tracing::info!(
                attempted = d.attempted,
                succeeded = d.succeeded,
                failed = d.failed,
                "scheduled cycle done"
            ),
            CycleOutcome::Completed { .. } => tracing::info!("scheduled cycle done"),
            CycleOutcome::Skipped => tracing::debug!("scheduled cycle skipped"),
        }
        outcome
    })
}

async fn tick_loop(inner: Arc<Inner>, epoch: u64) {
    let mut ticker = tokio::time::interval(inner.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let action = inner.state().poll(epoch, Utc::now());
        match action {
            TickAction::Exit => break,
            TickAction::Idle => {}
            TickAction::RunCycle => {
                tracing::info!(next = ?inner.state().next_trigger(), "trigger reached");
                spawn_cycle(&inner.monitor);
            }
        }
    }
    tracing::debug!(epoch, "tick loop exited");
}
