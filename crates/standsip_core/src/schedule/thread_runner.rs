//! In-process delayed-task runner backed by one ticking thread.
//!
//! Due payloads are delivered over an `mpsc` channel, so the host consumes
//! fires from a single ordered queue and hands them to the scheduler. Timers
//! live in memory only; the host re-arms everything on start.

use crate::model::category::Category;
use crate::schedule::runner::{DelayedTaskRunner, ReminderPayload, SchedulingFailure, TimerHandle};
use log::{debug, error, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const DEFAULT_MINUTE: Duration = Duration::from_secs(60);
const DEFAULT_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    handle: TimerHandle,
    tag: &'static str,
    due: Instant,
    payload: ReminderPayload,
}

struct Shared {
    timers: Mutex<Vec<ArmedTimer>>,
    running: AtomicBool,
    minute: Duration,
}

impl Shared {
    fn timers(&self) -> MutexGuard<'_, Vec<ArmedTimer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runner that fires timers from a background thread.
pub struct ThreadTimerRunner {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadTimerRunner {
    /// Starts a runner with real minutes and a one second tick.
    pub fn start(fired: Sender<ReminderPayload>) -> Self {
        Self::start_scaled(fired, DEFAULT_MINUTE, DEFAULT_TICK)
    }

    /// Starts a runner where one scheduling minute lasts `minute`.
    pub fn start_scaled(fired: Sender<ReminderPayload>, minute: Duration, tick: Duration) -> Self {
        let shared = Arc::new(Shared {
            timers: Mutex::new(Vec::new()),
            running: AtomicBool::new(true),
            minute,
        });

        let loop_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || {
            while loop_shared.running.load(Ordering::Acquire) {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    deliver_due(&loop_shared, &fired, Instant::now())
                }));
                match outcome {
                    Ok(true) => {}
                    Ok(false) => {
                        warn!("event=runner_stop module=schedule status=receiver_closed");
                        loop_shared.running.store(false, Ordering::Release);
                    }
                    Err(_) => {
                        error!("event=runner_tick module=schedule status=panic; loop continues");
                    }
                }
                thread::sleep(tick);
            }
        });

        Self {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Number of armed timers carrying `tag`.
    pub fn pending_for_tag(&self, tag: &str) -> usize {
        self.shared
            .timers()
            .iter()
            .filter(|timer| timer.tag == tag)
            .count()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Stops the worker thread and drops all armed timers.
    pub fn shutdown(&self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.timers().clear();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                error!("event=runner_stop module=schedule status=error error=worker_panicked");
            }
        }
    }
}

impl Drop for ThreadTimerRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl DelayedTaskRunner for ThreadTimerRunner {
    fn arm(
        &self,
        category: Category,
        delay_minutes: u32,
        payload: ReminderPayload,
    ) -> Result<TimerHandle, SchedulingFailure> {
        if !self.is_running() {
            return Err(SchedulingFailure::new(category, "runner is stopped"));
        }

        let delay = self.shared.minute.saturating_mul(delay_minutes);
        let handle = TimerHandle::new();
        self.shared.timers().push(ArmedTimer {
            handle,
            tag: category.tag(),
            due: Instant::now() + delay,
            payload,
        });
        debug!(
            "event=runner_arm module=schedule status=ok tag={} handle={handle} delay_ms={}",
            category.tag(),
            delay.as_millis()
        );
        Ok(handle)
    }

    fn cancel_by_tag(&self, tag: &str) {
        self.shared.timers().retain(|timer| timer.tag != tag);
    }
}

/// Sends every due payload; returns `false` once the receiver is gone.
fn deliver_due(shared: &Shared, fired: &Sender<ReminderPayload>, now: Instant) -> bool {
    let due = {
        let mut timers = shared.timers();
        let (due, pending): (Vec<_>, Vec<_>) = timers.drain(..).partition(|timer| timer.due <= now);
        *timers = pending;
        due
    };

    due.into_iter().all(|timer| {
        debug!(
            "event=runner_fire module=schedule status=ok tag={} handle={}",
            timer.tag, timer.handle
        );
        fired.send(timer.payload).is_ok()
    })
}
