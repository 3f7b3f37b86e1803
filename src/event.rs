//! Event definitions for the simulation engine.
//!
//! An event pairs an absolute due time with an action. Actions are plain
//! values (usually an enum naming the gate or wire to act on and the signal
//! to apply), which keeps the queue inspectable and serializable.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::SimTime;

/// A scheduled action.
///
/// Events are ordered by `time`, then by `seq`, the order in which they were
/// scheduled. Equal-time events therefore fire first-in first-out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event<A> {
    /// The simulated time at which this event fires
    pub time: SimTime,
    /// Scheduling sequence number, unique per queue
    pub seq: u64,
    /// What to do when the event fires
    pub action: A,
}

impl<A> Event<A> {
    /// Creates a new event.
    pub fn new(time: SimTime, seq: u64, action: A) -> Self {
        Self { time, seq, action }
    }
}

impl<A> PartialEq for Event<A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A> Eq for Event<A> {}

impl<A> PartialOrd for Event<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Event<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Times are validated finite before they get here.
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}
