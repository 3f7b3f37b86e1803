//! Time-ordered event queue and driver loop.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use thiserror::Error;

use crate::event::Event;
use crate::executor::ActionHandler;
use crate::types::{is_valid_delay, SimTime};

/// Rejected scheduling requests.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ScheduleError {
    #[error("invalid delay {0}: must be finite and non-negative")]
    InvalidDelay(SimTime),

    #[error("due time overflows: {now} + {delay}")]
    TimeOverflow { now: SimTime, delay: SimTime },
}

/// Counters collected by the queue.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Events accepted by `schedule`
    pub events_scheduled: u64,
    /// Events popped and triggered
    pub events_processed: u64,
    /// Largest number of simultaneously pending events
    pub peak_queue_size: usize,
}

/// A priority queue of pending events plus the simulation clock.
///
/// The clock only moves inside [`pop_due`](Self::pop_due), to the time of the
/// event being removed, so it never decreases.
pub struct EventQueue<A> {
    /// Pending events, earliest first
    heap: BinaryHeap<Reverse<Event<A>>>,
    /// Current simulated time
    now: SimTime,
    /// Sequence number handed to the next scheduled event
    next_seq: u64,
    /// Statistics
    stats: QueueStats,
}

impl<A> EventQueue<A> {
    /// Creates an empty queue at time zero.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            now: 0.0,
            next_seq: 0,
            stats: QueueStats::default(),
        }
    }

    /// Returns the current simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Returns the number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the due time of the earliest pending event.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(e)| e.time)
    }

    /// Returns the absolute time an event scheduled `delay` from now would
    /// get, or why it cannot be scheduled.
    pub fn due_time(&self, delay: SimTime) -> Result<SimTime, ScheduleError> {
        if !is_valid_delay(delay) {
            return Err(ScheduleError::InvalidDelay(delay));
        }
        let time = self.now + delay;
        if !time.is_finite() {
            return Err(ScheduleError::TimeOverflow {
                now: self.now,
                delay,
            });
        }
        Ok(time)
    }

    /// Schedules `action` to fire `delay` time units from now.
    ///
    /// Returns the absolute due time. Negative, NaN and infinite delays are
    /// rejected and nothing is enqueued.
    pub fn schedule(&mut self, delay: SimTime, action: A) -> Result<SimTime, ScheduleError> {
        let time = self.due_time(delay)?;

        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Event::new(time, seq, action)));

        self.stats.events_scheduled += 1;
        self.stats.peak_queue_size = self.stats.peak_queue_size.max(self.heap.len());
        Ok(time)
    }

    /// Removes the earliest event and advances the clock to its time.
    pub fn pop_due(&mut self) -> Option<Event<A>> {
        let Reverse(event) = self.heap.pop()?;
        debug_assert!(event.time >= self.now);
        self.now = event.time;
        self.stats.events_processed += 1;
        Some(event)
    }

    /// Triggers the earliest pending event, if any.
    ///
    /// Returns false when the queue was empty.
    pub fn step<H: ActionHandler<A>>(&mut self, handler: &mut H) -> bool {
        match self.pop_due() {
            Some(event) => {
                tracing::trace!(time = event.time, seq = event.seq, "trigger");
                handler.trigger(event, self);
                true
            }
            None => false,
        }
    }

    /// Runs until no events remain.
    ///
    /// A circuit with a zero-delay feedback loop never drains; bounding such
    /// runs is up to the caller (see [`run_until`](Self::run_until)).
    pub fn run_to_completion<H: ActionHandler<A>>(&mut self, handler: &mut H) {
        while self.step(handler) {}
    }

    /// Triggers every event due at or before `limit`.
    ///
    /// Later events stay queued. Returns true if the queue drained.
    pub fn run_until<H: ActionHandler<A>>(&mut self, handler: &mut H, limit: SimTime) -> bool {
        while let Some(time) = self.peek_time() {
            if time > limit {
                return false;
            }
            self.step(handler);
        }
        true
    }

    /// Drops all pending events and rewinds the clock to zero.
    pub fn reset(&mut self) {
        self.heap.clear();
        self.now = 0.0;
        self.next_seq = 0;
        self.stats = QueueStats::default();
    }

    /// Returns the queue statistics.
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Exports statistics as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "current_time": self.now,
            "pending_events": self.heap.len(),
            "events_scheduled": self.stats.events_scheduled,
            "events_processed": self.stats.events_processed,
            "peak_queue_size": self.stats.peak_queue_size,
        })
    }
}

impl<A> Default for EventQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for EventQueue<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("now", &self.now)
            .field("pending", &self.heap.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        seen: Vec<(SimTime, &'static str)>,
    }

    impl ActionHandler<&'static str> for Recorder {
        fn trigger(&mut self, event: Event<&'static str>, queue: &mut EventQueue<&'static str>) {
            self.seen.push((queue.now(), event.action));
        }
    }

    #[test]
    fn test_schedule_rejects_bad_delays() {
        let mut queue: EventQueue<()> = EventQueue::new();

        assert_eq!(queue.schedule(-1.0, ()), Err(ScheduleError::InvalidDelay(-1.0)));
        assert!(matches!(
            queue.schedule(f32::NAN, ()),
            Err(ScheduleError::InvalidDelay(_))
        ));
        assert!(queue.schedule(f32::INFINITY, ()).is_err());
        assert!(queue.is_empty());
        assert_eq!(queue.stats().events_scheduled, 0);
    }

    #[test]
    fn test_schedule_returns_due_time() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.schedule(4.5, ()), Ok(4.5));
        assert_eq!(queue.peek_time(), Some(4.5));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_due_time_does_not_enqueue() {
        let mut queue = EventQueue::new();
        queue.schedule(f32::MAX, "late").unwrap();
        assert_eq!(queue.due_time(2.0), Ok(2.0));
        assert!(queue.due_time(-0.5).is_err());

        let mut recorder = Recorder { seen: Vec::new() };
        queue.run_to_completion(&mut recorder);
        assert!(matches!(
            queue.due_time(f32::MAX),
            Err(ScheduleError::TimeOverflow { .. })
        ));
        assert!(queue.is_empty());
        assert_eq!(queue.stats().events_scheduled, 1);
    }

    #[test]
    fn test_pop_advances_clock() {
        let mut queue = EventQueue::new();
        queue.schedule(3.0, "b").unwrap();
        queue.schedule(1.0, "a").unwrap();

        let first = queue.pop_due().unwrap();
        assert_eq!(first.action, "a");
        assert_eq!(queue.now(), 1.0);

        let second = queue.pop_due().unwrap();
        assert_eq!(second.action, "b");
        assert_eq!(queue.now(), 3.0);

        assert!(queue.pop_due().is_none());
        assert_eq!(queue.now(), 3.0);
    }

    #[test]
    fn test_equal_times_fire_in_schedule_order() {
        let mut queue = EventQueue::new();
        let mut recorder = Recorder { seen: Vec::new() };

        for label in ["first", "second", "third"] {
            queue.schedule(2.0, label).unwrap();
        }
        queue.run_to_completion(&mut recorder);

        let labels: Vec<_> = recorder.seen.iter().map(|(_, l)| *l).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_run_until_leaves_later_events() {
        let mut queue = EventQueue::new();
        let mut recorder = Recorder { seen: Vec::new() };

        queue.schedule(1.0, "a").unwrap();
        queue.schedule(5.0, "b").unwrap();
        queue.schedule(10.0, "c").unwrap();

        assert!(!queue.run_until(&mut recorder, 5.0));
        assert_eq!(recorder.seen, vec![(1.0, "a"), (5.0, "b")]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.now(), 5.0);

        assert!(queue.run_until(&mut recorder, 100.0));
        assert_eq!(queue.now(), 10.0);
    }

    #[test]
    fn test_stats_and_reset() {
        let mut queue = EventQueue::new();
        for i in 0..4 {
            queue.schedule(i as SimTime, i).unwrap();
        }
        queue.pop_due();

        let stats = queue.export_stats();
        assert_eq!(stats["events_scheduled"], 4);
        assert_eq!(stats["events_processed"], 1);
        assert_eq!(stats["peak_queue_size"], 4);
        assert_eq!(stats["pending_events"], 3);

        queue.reset();
        assert!(queue.is_empty());
        assert_eq!(queue.now(), 0.0);
        assert_eq!(queue.stats(), &QueueStats::default());
    }
}
