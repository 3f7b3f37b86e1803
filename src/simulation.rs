//! The simulation driver.
//!
//! [`Simulation`] owns a built [`Circuit`], the event queue and a trace sink.
//! It launches the input gates, then drains the queue. Every event is a
//! [`CircuitAction`] naming the gate or wire to act on, so the queue never
//! holds closures or references into the circuit.
//!
//! # Example
//!
//! ```
//! use logicsim::circuit::CircuitBuilder;
//! use logicsim::gate::GateKind;
//! use logicsim::simulation::Simulation;
//! use logicsim::trace::TraceRecord;
//! use logicsim::types::Signal;
//!
//! let mut builder = CircuitBuilder::new();
//! builder
//!     .add_gate("a", GateKind::Input { initial: Signal::High, delay: 5.0, changes: 1 })
//!     .unwrap();
//! builder.add_gate("b", GateKind::Output).unwrap();
//! builder.add_wire("a", 3.0, "b").unwrap();
//!
//! let mut sim = Simulation::new(builder.build(), Vec::<TraceRecord>::new());
//! sim.run().unwrap();
//!
//! let lines: Vec<String> = sim.sink().iter().map(|r| r.to_string()).collect();
//! assert_eq!(lines, vec![
//!     "time 0.0 0->1 Gate a input 1 5.0 1",
//!     "time 3.0 0->1 Wire a 3.0 b",
//!     "time 5.0 1->0 Gate a input 1 5.0 0",
//!     "time 8.0 1->0 Wire a 3.0 b",
//! ]);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::circuit::Circuit;
use crate::diagnostics::{Diagnostics, Warning};
use crate::event::Event;
use crate::executor::{ActionHandler, EventQueue, ScheduleError};
use crate::gate::{GateKind, InputResponse};
use crate::stats::RunStats;
use crate::trace::{TraceRecord, TraceSink};
use crate::types::{format_float, is_valid_delay, GateId, SimTime, Signal, WireId};

/// Errors from driving a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("simulation already started; call reset() first")]
    AlreadyStarted,

    #[error("scheduling failed: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("invalid time limit {}: must be finite and non-negative", format_float(*.0))]
    InvalidLimit(SimTime),
}

/// A pending operation on the circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CircuitAction {
    /// An input gate performs its next scripted toggle
    SourceToggle { gate: GateId, value: Signal },
    /// A counting gate applies a previously decided output change
    GateOutput { gate: GateId, value: Signal },
    /// A wire delivers a value to its destination
    WireDelivery { wire: WireId, value: Signal },
}

/// Circuit state plus the outputs of a run; reacts to events.
struct Model<S> {
    circuit: Circuit,
    sink: S,
    diagnostics: Diagnostics,
    trace_records: u64,
    suppressed_outputs: u64,
}

impl<S: TraceSink> Model<S> {
    fn emit(&mut self, time: SimTime, value: Signal, entity: String) {
        self.trace_records += 1;
        self.sink.record(TraceRecord::new(time, value, entity));
    }

    fn schedule(
        &mut self,
        queue: &mut EventQueue<CircuitAction>,
        delay: SimTime,
        action: CircuitAction,
    ) {
        if let Err(err) = queue.schedule(delay, action) {
            self.diagnostics
                .warn(format!("time {}: {:?} dropped: {}", queue.now(), action, err));
        }
    }

    /// Emits the gate's transition and notifies every outgoing wire.
    fn output_change(
        &mut self,
        queue: &mut EventQueue<CircuitAction>,
        gate: GateId,
        value: Signal,
    ) {
        let Some(g) = self.circuit.gate(gate) else {
            return;
        };
        let entity = g.to_string();
        let outgoing = g.outgoing().to_vec();
        self.emit(queue.now(), value, entity);

        for wire in outgoing {
            if let Some(delay) = self.circuit.wire(wire).map(|w| w.delay()) {
                self.schedule(queue, delay, CircuitAction::WireDelivery { wire, value });
            }
        }
    }

    fn source_toggle(
        &mut self,
        queue: &mut EventQueue<CircuitAction>,
        gate: GateId,
        value: Signal,
    ) {
        let next = match self.circuit.gate_mut(gate) {
            Some(g) => g.take_toggle(),
            None => return,
        };
        self.output_change(queue, gate, value);
        if let Some(delay) = next {
            self.schedule(queue, delay, CircuitAction::SourceToggle { gate, value: !value });
        }
    }

    fn gate_output(&mut self, queue: &mut EventQueue<CircuitAction>, gate: GateId, value: Signal) {
        let accepted = match self.circuit.gate_mut(gate) {
            Some(g) => g.accept_output(value),
            None => return,
        };
        if accepted {
            self.output_change(queue, gate, value);
        } else {
            self.suppressed_outputs += 1;
            tracing::trace!(gate, value = value.as_u8(), "output suppressed");
        }
    }

    fn wire_delivery(
        &mut self,
        queue: &mut EventQueue<CircuitAction>,
        wire: WireId,
        value: Signal,
    ) {
        let Some(w) = self.circuit.wire(wire) else {
            return;
        };
        let destination = w.destination();
        let entity = w.to_string();
        self.emit(queue.now(), value, entity);

        let Some(dst) = self.circuit.gate_mut(destination) else {
            return;
        };
        match dst.input_change(value) {
            InputResponse::Schedule { delay, value } => {
                self.schedule(queue, delay, CircuitAction::GateOutput { gate: destination, value });
            }
            InputResponse::Impossible => {
                let message = format!("{}: impossible input change", dst);
                self.diagnostics.warn(message);
            }
            InputResponse::Quiet => {}
        }
    }
}

impl<S: TraceSink> ActionHandler<CircuitAction> for Model<S> {
    fn trigger(&mut self, event: Event<CircuitAction>, queue: &mut EventQueue<CircuitAction>) {
        match event.action {
            CircuitAction::SourceToggle { gate, value } => self.source_toggle(queue, gate, value),
            CircuitAction::GateOutput { gate, value } => self.gate_output(queue, gate, value),
            CircuitAction::WireDelivery { wire, value } => self.wire_delivery(queue, wire, value),
        }
    }
}

/// Runs a circuit, reporting transitions to a [`TraceSink`].
///
/// Sanity checking is separate from launching: [`sanity_check`](Self::sanity_check)
/// is pure, and [`start`](Self::start) performs the initial output changes
/// and schedules the first toggles of every input gate.
pub struct Simulation<S: TraceSink> {
    queue: EventQueue<CircuitAction>,
    model: Model<S>,
    started: bool,
}

impl<S: TraceSink> Simulation<S> {
    /// Creates a simulation at time zero.
    pub fn new(circuit: Circuit, sink: S) -> Self {
        Self {
            queue: EventQueue::new(),
            model: Model {
                circuit,
                sink,
                diagnostics: Diagnostics::new(),
                trace_records: 0,
                suppressed_outputs: 0,
            },
            started: false,
        }
    }

    /// Returns the circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.model.circuit
    }

    /// Returns the trace sink.
    pub fn sink(&self) -> &S {
        &self.model.sink
    }

    /// Consumes the simulation and returns the trace sink.
    pub fn into_sink(self) -> S {
        self.model.sink
    }

    /// Returns the event queue.
    pub fn queue(&self) -> &EventQueue<CircuitAction> {
        &self.queue
    }

    /// Returns the current simulated time.
    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    /// Returns warnings raised while running.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.model.diagnostics
    }

    /// Returns true once input gates have been launched.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Checks every gate's connectivity. Does not change any state.
    pub fn sanity_check(&self) -> Vec<Warning> {
        self.model.circuit.sanity_check()
    }

    /// Launches every input gate, in declaration order.
    ///
    /// A gate whose initial value is 1 changes its output at time zero right
    /// away; a gate with scripted changes gets its first toggle scheduled.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        if self.started {
            return Err(SimulationError::AlreadyStarted);
        }
        self.started = true;

        for id in 0..self.model.circuit.gate_count() {
            let Some(GateKind::Input { initial, delay, changes }) =
                self.model.circuit.gate(id).map(|g| g.kind().clone())
            else {
                continue;
            };
            if initial.is_high() {
                self.model.output_change(&mut self.queue, id, Signal::High);
            }
            if changes > 0 {
                self.queue
                    .schedule(delay, CircuitAction::SourceToggle { gate: id, value: !initial })?;
            }
        }

        tracing::info!(
            gates = self.model.circuit.gate_count(),
            wires = self.model.circuit.wire_count(),
            pending = self.queue.len(),
            "simulation started"
        );
        Ok(())
    }

    /// Triggers the next event. Returns false when nothing is pending.
    pub fn step(&mut self) -> bool {
        self.queue.step(&mut self.model)
    }

    /// Starts the simulation if needed, then runs until the queue drains.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        if !self.started {
            self.start()?;
        }
        self.queue.run_to_completion(&mut self.model);
        tracing::info!(time = self.queue.now(), "simulation finished");
        Ok(())
    }

    /// Starts the simulation if needed, then triggers events due at or before
    /// `limit`. Returns true if the queue drained.
    ///
    /// A negative, NaN or infinite limit is rejected before anything runs.
    pub fn run_until(&mut self, limit: SimTime) -> Result<bool, SimulationError> {
        if !is_valid_delay(limit) {
            return Err(SimulationError::InvalidLimit(limit));
        }
        if !self.started {
            self.start()?;
        }
        let drained = self.queue.run_until(&mut self.model, limit);
        if drained {
            tracing::info!(time = self.queue.now(), "simulation finished");
        } else {
            tracing::info!(
                time = self.queue.now(),
                pending = self.queue.len(),
                limit,
                "simulation stopped at time limit"
            );
        }
        Ok(drained)
    }

    /// Returns the circuit to its pre-run state. The trace sink is kept.
    pub fn reset(&mut self) {
        self.queue.reset();
        self.model.circuit.reset();
        self.model.diagnostics = Diagnostics::new();
        self.model.trace_records = 0;
        self.model.suppressed_outputs = 0;
        self.started = false;
    }

    /// Summarizes the run so far.
    pub fn stats(&self) -> RunStats {
        let queue = self.queue.stats();
        RunStats {
            final_time: self.queue.now(),
            events_scheduled: queue.events_scheduled,
            events_processed: queue.events_processed,
            events_pending: self.queue.len(),
            peak_queue_size: queue.peak_queue_size,
            trace_records: self.model.trace_records,
            suppressed_outputs: self.model.suppressed_outputs,
            gate_count: self.model.circuit.gate_count(),
            wire_count: self.model.circuit.wire_count(),
            runtime_warnings: self.model.diagnostics.count(),
            wall_time_ms: None,
        }
    }
}
