use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::{Condvar, Mutex};

const WAKEUP_INTERVAL: Duration = Duration::from_millis(50);

/// Shared, cloneable counter used to report how far along a long running
/// operation is. Workers call [`Progress::add_complete`] and any number of
/// observers can poll or [`Progress::wait`] on it.
#[derive(Clone)]
pub struct Progress(Arc<ProgressInner>);

struct ProgressInner {
    complete: AtomicU64,
    total: AtomicU64,

    notify: Condvar,
    last_complete: Mutex<u64>,
}

impl Progress {
    pub fn new() -> Self {
        Self(Arc::new(ProgressInner {
            complete: AtomicU64::new(0),
            total: AtomicU64::new(0),

            notify: Condvar::new(),
            last_complete: Mutex::new(0),
        }))
    }

    pub fn progress(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        self.completed() as f32 / total as f32
    }

    pub fn complete(&self) -> bool {
        let total = self.total();
        if total == 0 {
            return false;
        }

        self.completed() >= total
    }

    pub fn completed(&self) -> u64 {
        self.0.complete.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.0.total.load(Ordering::Relaxed)
    }

    pub fn set_total(&self, total: u64) {
        self.0.total.store(total, Ordering::Relaxed);
    }

    /// Resets the completed count, used when a progress handle is reused for
    /// another stage of an operation.
    pub fn set_complete(&self, complete: u64) {
        self.0.complete.store(complete, Ordering::Relaxed);
        self.0.notify.notify_all();
    }

    pub fn add_complete(&self, count: u64) {
        self.0.complete.fetch_add(count, Ordering::Relaxed);
        self.0.notify.notify_all();
    }

    pub fn set_finished(&self) {
        let total = self.total();
        self.0.complete.store(total, Ordering::Relaxed);
        self.0.notify.notify_all();
    }

    /// Blocks until the completed count moves past the last value observed
    /// by any waiter, returning the new count. Returns immediately once the
    /// operation is complete or if there is nothing to wait for.
    pub fn wait(&self) -> u64 {
        let mut last = self.0.last_complete.lock();
        // Workers notify without holding the lock, so a wakeup can slip in
        // between the check and the wait. The timeout bounds that case.
        while self.total() > 0 && !self.complete() && self.completed() <= *last {
            self.0.notify.wait_for(&mut last, WAKEUP_INTERVAL);
        }

        let current = self.completed();
        *last = (*last).max(current);
        current
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}
