use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::video::{ElementId, ToastPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKey {
    RestoreProgress(ElementId),
    RecordProgress(ElementId),
    Toast(ToastPhase),
}

pub trait WallClock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Delayed callbacks keyed by purpose. Time only moves when the host says so.
#[derive(Debug, Default)]
pub struct Timers {
    now: Duration,
    sequence: u64,
    pending: HashMap<TaskKey, (Duration, u64)>,
}

impl Timers {
    const MIN_DELAY: Duration = Duration::from_millis(1);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arms `key`, replacing any pending instance of it.
    pub fn schedule(&mut self, key: TaskKey, delay: Duration) {
        self.sequence += 1;
        let due = self.now + delay.max(Self::MIN_DELAY);
        self.pending.insert(key, (due, self.sequence));
    }

    pub fn cancel(&mut self, key: TaskKey) -> bool {
        self.pending.remove(&key).is_some()
    }

    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&TaskKey) -> bool) {
        self.pending.retain(|key, _| !predicate(key));
    }

    pub fn is_pending(&self, key: TaskKey) -> bool {
        self.pending.contains_key(&key)
    }

    /// Pops the earliest task due at or before `until`, moving the clock to it.
    pub fn next_due(&mut self, until: Duration) -> Option<TaskKey> {
        let key = self
            .pending
            .iter()
            .filter(|(_, (due, _))| *due <= until)
            .min_by_key(|(_, (due, sequence))| (*due, *sequence))
            .map(|(key, _)| *key)?;

        if let Some((due, _)) = self.pending.remove(&key) {
            self.now = self.now.max(due);
        }
        Some(key)
    }

    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: TaskKey = TaskKey::RecordProgress(ElementId(1));
    const B: TaskKey = TaskKey::RestoreProgress(ElementId(1));

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut timers = Timers::new();
        timers.schedule(A, Duration::from_millis(200));
        timers.schedule(B, Duration::from_millis(100));

        let until = Duration::from_millis(500);
        assert_eq!(timers.next_due(until), Some(B));
        assert_eq!(timers.now(), Duration::from_millis(100));
        assert_eq!(timers.next_due(until), Some(A));
        assert_eq!(timers.next_due(until), None);
    }

    #[test]
    fn test_rescheduling_replaces_pending_task() {
        let mut timers = Timers::new();
        timers.schedule(A, Duration::from_millis(100));
        timers.schedule(A, Duration::from_millis(300));

        assert_eq!(timers.next_due(Duration::from_millis(200)), None);
        assert_eq!(timers.next_due(Duration::from_millis(300)), Some(A));
        assert!(!timers.is_pending(A));
    }

    #[test]
    fn test_cancel() {
        let mut timers = Timers::new();
        timers.schedule(A, Duration::from_millis(100));
        assert!(timers.cancel(A));
        assert!(!timers.cancel(A));
        assert_eq!(timers.next_due(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_not_due_yet() {
        let mut timers = Timers::new();
        timers.schedule(A, Duration::from_millis(100));
        assert_eq!(timers.next_due(Duration::from_millis(99)), None);
        timers.settle(Duration::from_millis(99));
        assert!(timers.is_pending(A));
        assert_eq!(timers.next_due(Duration::from_millis(100)), Some(A));
    }
}
