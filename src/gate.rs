//! Gates and their logic.
//!
//! A gate is a local state machine. It is told when one of its inputs
//! changes, and answers with what (if anything) should be scheduled. It never
//! touches the event queue itself; [`Simulation`](crate::simulation::Simulation)
//! turns the answers into events.
//!
//! Gates whose output depends only on how many inputs are at 1 (XOR,
//! threshold) share [`InputCounter`], which also implements pulse
//! suppression.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnostics::Warning;
use crate::types::{format_float, is_valid_delay, SimTime, Signal, WireId};

/// The kind of a gate and its construction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GateKind {
    /// Drives the circuit with a scripted sequence of toggles
    Input {
        /// Output value at time zero
        initial: Signal,
        /// Time between successive toggles
        delay: SimTime,
        /// Number of toggles after the initial value
        changes: u32,
    },
    /// End of a signal path
    Output,
    /// Exclusive or over its inputs
    Xor {
        /// Propagation delay
        delay: SimTime,
    },
    /// Outputs 1 while at least `threshold` inputs are 1
    Threshold {
        /// Number of inputs that must be 1
        threshold: u32,
        /// Propagation delay
        delay: SimTime,
    },
}

impl GateKind {
    /// Returns the keyword used for this kind in circuit descriptions.
    pub fn keyword(&self) -> &'static str {
        match self {
            GateKind::Input { .. } => "input",
            GateKind::Output => "output",
            GateKind::Xor { .. } => "xor",
            GateKind::Threshold { .. } => "threshold",
        }
    }

    /// Returns the gate's delay, if it has one.
    pub fn delay(&self) -> Option<SimTime> {
        match self {
            GateKind::Input { delay, .. }
            | GateKind::Xor { delay }
            | GateKind::Threshold { delay, .. } => Some(*delay),
            GateKind::Output => None,
        }
    }

    /// Returns true if the delay (when present) is finite and non-negative.
    pub fn has_valid_delay(&self) -> bool {
        self.delay().map_or(true, is_valid_delay)
    }

    /// Returns true for kinds whose output is a function of the one-count.
    pub fn is_counting(&self) -> bool {
        matches!(self, GateKind::Xor { .. } | GateKind::Threshold { .. })
    }

    /// Computes the output for a given number of inputs at 1.
    ///
    /// Returns `None` for kinds that are not driven by their inputs.
    pub fn logic_rule(&self, ones: i64) -> Option<Signal> {
        match self {
            GateKind::Xor { .. } => Some(Signal::from(ones.rem_euclid(2) == 1)),
            GateKind::Threshold { threshold, .. } => {
                Some(Signal::from(ones >= i64::from(*threshold)))
            }
            GateKind::Input { .. } | GateKind::Output => None,
        }
    }
}

/// One-count tracking and pulse suppression for counting gates.
///
/// `committed` is the value the gate last decided to move to; `delivered` is
/// the value it last actually emitted. A scheduled output change is applied
/// only if no newer decision superseded it and it changes the delivered value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputCounter {
    ones: i64,
    committed: Signal,
    delivered: Signal,
}

impl InputCounter {
    /// Creates a counter with every input at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of inputs currently at 1.
    pub fn ones(&self) -> i64 {
        self.ones
    }

    /// Returns the last committed output.
    pub fn committed(&self) -> Signal {
        self.committed
    }

    /// Returns the last delivered output.
    pub fn delivered(&self) -> Signal {
        self.delivered
    }

    /// Records an input change.
    ///
    /// Returns the value to schedule when the rule's verdict differs from the
    /// committed value; the commitment is updated immediately.
    pub fn input_change<F>(&mut self, value: Signal, rule: F) -> Option<Signal>
    where
        F: Fn(i64) -> Signal,
    {
        if value.is_high() {
            self.ones += 1;
        } else {
            self.ones -= 1;
        }

        let candidate = rule(self.ones);
        if candidate == self.committed {
            return None;
        }
        self.committed = candidate;
        Some(candidate)
    }

    /// Decides whether a scheduled output change may be emitted.
    ///
    /// Superseded values and no-op changes are rejected. On acceptance the
    /// delivered value is updated.
    pub fn accept_output(&mut self, value: Signal) -> bool {
        if value != self.committed || value == self.delivered {
            return false;
        }
        self.delivered = value;
        true
    }
}

/// Mutable per-run state of a gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateState {
    /// Input gates count down their scripted toggles
    Source {
        /// Toggles still to come
        remaining: u32,
    },
    /// Output gates keep nothing
    Sink,
    /// XOR and threshold gates
    Counting(InputCounter),
}

impl GateState {
    fn initial(kind: &GateKind) -> Self {
        match kind {
            GateKind::Input { changes, .. } => GateState::Source {
                remaining: *changes,
            },
            GateKind::Output => GateState::Sink,
            GateKind::Xor { .. } | GateKind::Threshold { .. } => {
                GateState::Counting(InputCounter::new())
            }
        }
    }
}

/// What a gate wants done after one of its inputs changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputResponse {
    /// Nothing to schedule
    Quiet,
    /// Schedule an output change to `value` after `delay`
    Schedule {
        /// Gate propagation delay
        delay: SimTime,
        /// Value to move to
        value: Signal,
    },
    /// The gate has no inputs; the change is a wiring inconsistency
    Impossible,
}

/// A gate in the circuit graph.
#[derive(Clone, Debug)]
pub struct Gate {
    name: String,
    kind: GateKind,
    in_count: usize,
    outgoing: Vec<WireId>,
    state: GateState,
}

impl Gate {
    /// Creates an unconnected gate.
    pub fn new(name: impl Into<String>, kind: GateKind) -> Self {
        let state = GateState::initial(&kind);
        Self {
            name: name.into(),
            kind,
            in_count: 0,
            outgoing: Vec::new(),
            state,
        }
    }

    /// Returns the gate's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the gate kind.
    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    /// Returns the number of wires feeding this gate.
    pub fn in_count(&self) -> usize {
        self.in_count
    }

    /// Returns the wires driven by this gate, in connection order.
    pub fn outgoing(&self) -> &[WireId] {
        &self.outgoing
    }

    /// Returns the runtime state.
    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub(crate) fn connect_input(&mut self) {
        self.in_count += 1;
    }

    pub(crate) fn connect_output(&mut self, wire: WireId) {
        self.outgoing.push(wire);
    }

    /// Restores the runtime state to its pre-simulation value.
    pub fn reset(&mut self) {
        self.state = GateState::initial(&self.kind);
    }

    /// Checks the gate's connectivity against its kind.
    ///
    /// Pure: repeated calls return the same warnings.
    pub fn sanity_check(&self) -> Vec<Warning> {
        let problem = match &self.kind {
            GateKind::Input { .. } if self.in_count != 0 => Some("has unexpected input wires"),
            GateKind::Output if !self.outgoing.is_empty() => Some("has outgoing wires"),
            GateKind::Xor { .. } if self.in_count != 2 => Some("input wire count must be two"),
            GateKind::Threshold { threshold, .. } if *threshold as usize > self.in_count => {
                Some("has threshold > input wires")
            }
            _ => None,
        };
        problem
            .map(|p| vec![Warning::new(format!("{}: {}", self, p))])
            .unwrap_or_default()
    }

    /// Handles a change on one of the gate's inputs.
    pub fn input_change(&mut self, value: Signal) -> InputResponse {
        let kind = &self.kind;
        match &mut self.state {
            GateState::Source { .. } => InputResponse::Impossible,
            GateState::Sink => InputResponse::Quiet,
            GateState::Counting(counter) => {
                let rule = |ones| kind.logic_rule(ones).unwrap_or_default();
                match (counter.input_change(value, rule), kind.delay()) {
                    (Some(value), Some(delay)) => InputResponse::Schedule { delay, value },
                    _ => InputResponse::Quiet,
                }
            }
        }
    }

    /// Decides whether a scheduled output change to `value` is emitted.
    ///
    /// Only counting gates ever refuse.
    pub fn accept_output(&mut self, value: Signal) -> bool {
        match &mut self.state {
            GateState::Counting(counter) => counter.accept_output(value),
            GateState::Source { .. } | GateState::Sink => true,
        }
    }

    /// Consumes one scripted toggle of an input gate.
    ///
    /// Returns the delay before the next toggle when more remain.
    pub fn take_toggle(&mut self) -> Option<SimTime> {
        match (&mut self.state, &self.kind) {
            (GateState::Source { remaining }, GateKind::Input { delay, .. }) => {
                *remaining = remaining.saturating_sub(1);
                (*remaining > 0).then_some(*delay)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gate {}", self.name)?;
        match (&self.kind, &self.state) {
            (GateKind::Input { initial, delay, changes }, state) => {
                let remaining = match state {
                    GateState::Source { remaining } => *remaining,
                    _ => *changes,
                };
                write!(f, " input {} {} {}", initial, format_float(*delay), remaining)
            }
            (GateKind::Output, _) => write!(f, " output"),
            (GateKind::Xor { delay }, _) => write!(f, " xor {}", format_float(*delay)),
            (GateKind::Threshold { threshold, delay }, _) => {
                write!(f, " threshold {} {}", threshold, format_float(*delay))
            }
        }
    }
}
