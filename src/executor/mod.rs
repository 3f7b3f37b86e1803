//! The discrete-event driver.
//!
//! [`EventQueue`] owns simulated time and the set of pending events. Anything
//! that reacts to events implements [`ActionHandler`]; the queue's driver loop
//! pops due events one at a time and hands each to the handler together with
//! the queue itself, so the handler can schedule follow-up work.
//!
//! # Implementation Notes
//!
//! - `run_to_completion()`: pop the earliest event, advance time, trigger it,
//!   repeat until nothing is pending
//! - Zero-delay events scheduled from inside a trigger are visible to the very
//!   next iteration
//! - Equal-time events fire in the order they were scheduled

pub mod event;

use crate::event::Event;

pub use event::{EventQueue, QueueStats, ScheduleError};

/// The seam between the engine and whatever it simulates.
///
/// The queue calls `trigger` once per event, after setting its clock to the
/// event's time. Implementations may schedule further events on `queue`.
pub trait ActionHandler<A> {
    /// React to a due event.
    fn trigger(&mut self, event: Event<A>, queue: &mut EventQueue<A>);
}
