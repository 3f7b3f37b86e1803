//! Counting semaphore for synchronizing logical processes.
//!
//! A logical process is a chain of events where each one causes the next,
//! either by scheduling it directly or by waiting on a semaphore that will
//! schedule it later. Nothing ever blocks: a wait that cannot be granted is
//! parked as a `(delay, action)` pair and scheduled when a signal arrives.
//!
//! # Example
//!
//! ```
//! use logicsim::executor::EventQueue;
//! use logicsim::semaphore::Semaphore;
//!
//! let mut queue = EventQueue::new();
//! let mut sem = Semaphore::new(1).unwrap();
//!
//! sem.acquire(&mut queue, 2.0, "first").unwrap();  // granted, scheduled at 2.0
//! sem.acquire(&mut queue, 5.0, "second").unwrap(); // parked
//! assert_eq!(queue.len(), 1);
//! assert_eq!(sem.waiting(), 1);
//!
//! sem.release(&mut queue).unwrap();                // schedules "second" at 5.0
//! assert_eq!(queue.len(), 2);
//! assert_eq!(sem.count(), 0);
//! ```

use std::collections::VecDeque;
use thiserror::Error;

use crate::executor::{EventQueue, ScheduleError};
use crate::types::{is_valid_delay, SimTime};

/// Errors raised by semaphore construction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemaphoreError {
    #[error("semaphore must not be created with a negative count ({0})")]
    NegativeCount(i64),

    #[error("semaphore count {0} does not fit in u32")]
    CountTooLarge(i64),
}

/// A counting semaphore whose waiters are scheduled actions.
///
/// Invariant: `count > 0` only while no request is waiting, and requests only
/// wait while `count == 0`.
#[derive(Debug)]
pub struct Semaphore<A> {
    count: u32,
    queue: VecDeque<(SimTime, A)>,
}

impl<A> Semaphore<A> {
    /// Creates a semaphore with the given initial count.
    pub fn new(initial: i64) -> Result<Self, SemaphoreError> {
        if initial < 0 {
            return Err(SemaphoreError::NegativeCount(initial));
        }
        let count = u32::try_from(initial).map_err(|_| SemaphoreError::CountTooLarge(initial))?;
        Ok(Self {
            count,
            queue: VecDeque::new(),
        })
    }

    /// Returns the number of available permits.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns the number of parked requests.
    pub fn waiting(&self) -> usize {
        self.queue.len()
    }

    /// Claims a permit and schedules `action` after `delay` once granted.
    ///
    /// With a permit available the action is scheduled immediately. Otherwise
    /// the request waits for a later [`release`](Self::release). The delay is
    /// validated up front either way.
    pub fn acquire(
        &mut self,
        queue: &mut EventQueue<A>,
        delay: SimTime,
        action: A,
    ) -> Result<(), ScheduleError> {
        if !is_valid_delay(delay) {
            return Err(ScheduleError::InvalidDelay(delay));
        }
        if self.count > 0 {
            queue.schedule(delay, action)?;
            self.count -= 1;
        } else {
            self.queue.push_back((delay, action));
        }
        Ok(())
    }

    /// Returns a permit, handing it to the oldest waiter if there is one.
    ///
    /// A released waiter is scheduled with the delay it recorded at
    /// `acquire` time, counted from now. If scheduling fails the waiter stays
    /// at the head of the wait queue and the permit is not handed out.
    pub fn release(&mut self, queue: &mut EventQueue<A>) -> Result<(), ScheduleError> {
        let Some(&(delay, _)) = self.queue.front() else {
            self.count += 1;
            return Ok(());
        };
        queue.due_time(delay)?;
        if let Some((delay, action)) = self.queue.pop_front() {
            queue.schedule(delay, action)?;
        }
        Ok(())
    }
}
