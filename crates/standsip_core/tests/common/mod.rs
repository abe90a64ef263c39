#![allow(dead_code)]

use standsip_core::{
    Category, DelayedTaskRunner, FixedClock, Notifier, ReminderPayload, SchedulerService,
    SchedulingFailure, TimerHandle,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy)]
pub struct LiveTimer {
    pub handle: TimerHandle,
    pub delay_minutes: u32,
    pub payload: ReminderPayload,
}

#[derive(Default)]
struct RunnerLog {
    live: Vec<LiveTimer>,
    arm_calls: usize,
    failing: HashSet<Category>,
}

/// Runner double that keeps the set of live timers per tag.
#[derive(Default)]
pub struct RecordingRunner {
    log: Mutex<RunnerLog>,
}

impl RecordingRunner {
    pub fn fail_for(&self, category: Category) {
        self.log.lock().unwrap().failing.insert(category);
    }

    pub fn recover(&self, category: Category) {
        self.log.lock().unwrap().failing.remove(&category);
    }

    pub fn live_count(&self, category: Category) -> usize {
        self.log
            .lock()
            .unwrap()
            .live
            .iter()
            .filter(|timer| timer.payload.category == category)
            .count()
    }

    pub fn live(&self, category: Category) -> Option<LiveTimer> {
        self.log
            .lock()
            .unwrap()
            .live
            .iter()
            .find(|timer| timer.payload.category == category)
            .copied()
    }

    pub fn arm_calls(&self) -> usize {
        self.log.lock().unwrap().arm_calls
    }
}

impl DelayedTaskRunner for RecordingRunner {
    fn arm(
        &self,
        category: Category,
        delay_minutes: u32,
        payload: ReminderPayload,
    ) -> Result<TimerHandle, SchedulingFailure> {
        let mut log = self.log.lock().unwrap();
        log.arm_calls += 1;
        if log.failing.contains(&category) {
            return Err(SchedulingFailure::new(category, "resource exhausted"));
        }
        let handle = TimerHandle::new();
        log.live.push(LiveTimer {
            handle,
            delay_minutes,
            payload,
        });
        Ok(handle)
    }

    fn cancel_by_tag(&self, tag: &str) {
        self.log
            .lock()
            .unwrap()
            .live
            .retain(|timer| timer.payload.category.tag() != tag);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shown {
    pub category: Category,
    pub title: String,
    pub body: String,
}

/// Notifier double that records every prompt and dismissal.
#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Shown>>,
    dismissed: Mutex<Vec<Category>>,
}

impl RecordingNotifier {
    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    pub fn dismissed(&self) -> Vec<Category> {
        self.dismissed.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, category: Category, title: &str, body: &str) {
        self.shown.lock().unwrap().push(Shown {
            category,
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    fn dismiss(&self, category: Category) {
        self.dismissed.lock().unwrap().push(category);
    }
}

pub struct Harness {
    pub runner: Arc<RecordingRunner>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<FixedClock>,
    pub scheduler: SchedulerService,
}

/// Scheduler wired to doubles, with the clock at 2026-06-15 `hour:minute`.
pub fn harness_at(hour: u32, minute: u32) -> Harness {
    let runner = Arc::new(RecordingRunner::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(FixedClock::at(2026, 6, 15, hour, minute).unwrap());
    let scheduler = SchedulerService::new(runner.clone(), notifier.clone(), clock.clone());
    Harness {
        runner,
        notifier,
        clock,
        scheduler,
    }
}
