//! Integration tests for semaphores driving logical processes.

use logicsim::executor::{ActionHandler, EventQueue};
use logicsim::semaphore::{Semaphore, SemaphoreError};
use logicsim::types::SimTime;
use logicsim::Event;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    /// Process `id` wants the resource
    Request(u32),
    /// Process `id` holds the resource and starts working
    Enter(u32),
    /// Process `id` is done and hands the resource back
    Leave(u32),
}

/// Processes sharing one resource guarded by a semaphore.
struct Shared {
    sem: Semaphore<Step>,
    hold: SimTime,
    log: Vec<(SimTime, Step)>,
}

impl ActionHandler<Step> for Shared {
    fn trigger(&mut self, event: Event<Step>, queue: &mut EventQueue<Step>) {
        self.log.push((event.time, event.action));
        match event.action {
            Step::Request(id) => self.sem.acquire(queue, 0.0, Step::Enter(id)).unwrap(),
            Step::Enter(id) => {
                queue.schedule(self.hold, Step::Leave(id)).unwrap();
            }
            Step::Leave(_) => self.sem.release(queue).unwrap(),
        }
    }
}

fn entries(log: &[(SimTime, Step)]) -> Vec<(SimTime, u32)> {
    log.iter()
        .filter_map(|(t, s)| match s {
            Step::Enter(id) => Some((*t, *id)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_mutual_exclusion() {
    let mut queue = EventQueue::new();
    for id in 0..3 {
        queue.schedule(1.0, Step::Request(id)).unwrap();
    }
    let mut shared = Shared {
        sem: Semaphore::new(1).unwrap(),
        hold: 4.0,
        log: Vec::new(),
    };
    queue.run_to_completion(&mut shared);

    // Each process enters when the previous one leaves, in request order.
    assert_eq!(entries(&shared.log), vec![(1.0, 0), (5.0, 1), (9.0, 2)]);
    assert_eq!(shared.sem.count(), 1);
    assert_eq!(shared.sem.waiting(), 0);
}

#[test]
fn test_counting_permits() {
    let mut queue = EventQueue::new();
    for id in 0..4 {
        queue.schedule(0.0, Step::Request(id)).unwrap();
    }
    let mut shared = Shared {
        sem: Semaphore::new(2).unwrap(),
        hold: 10.0,
        log: Vec::new(),
    };
    queue.run_to_completion(&mut shared);

    assert_eq!(
        entries(&shared.log),
        vec![(0.0, 0), (0.0, 1), (10.0, 2), (10.0, 3)]
    );
    assert_eq!(shared.sem.count(), 2);
}

#[test]
fn test_count_and_waiters_never_coexist() {
    let mut queue: EventQueue<u32> = EventQueue::new();
    let mut sem = Semaphore::new(1).unwrap();

    for i in 0..5 {
        sem.acquire(&mut queue, 1.0, i).unwrap();
        assert!(sem.count() == 0 || sem.waiting() == 0);
    }
    for _ in 0..5 {
        sem.release(&mut queue).unwrap();
        assert!(sem.count() == 0 || sem.waiting() == 0);
    }
    assert_eq!(sem.count(), 1);
    assert_eq!(queue.len(), 5);
}

#[test]
fn test_negative_initial_count_is_fatal() {
    let err = Semaphore::<()>::new(-3).unwrap_err();
    assert_eq!(err, SemaphoreError::NegativeCount(-3));
    assert!(err.to_string().contains("negative"));
}
