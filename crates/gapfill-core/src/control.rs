//! Cycle control: at most one scan-and-download cycle at a time.
//!
//! Every trigger source (scheduler tick, startup cycle, manual command) must
//! acquire the guard first. A trigger that finds a cycle already running is
//! skipped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "cycle in progress" flag.
#[derive(Debug, Default, Clone)]
pub struct CycleGuard {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of a cycle; releases the guard on drop (also on panic).
#[derive(Debug)]
pub struct CycleToken {
    busy: Arc<AtomicBool>,
}

impl Drop for CycleToken {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard. `None` if another cycle holds it.
    pub fn try_begin(&self) -> Option<CycleToken> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleToken {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
