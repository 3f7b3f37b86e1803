//! Wires connect gates.
//!
//! A wire carries its source's output to one input of its destination after
//! a fixed delay. Endpoints are arena indices; the names are kept alongside
//! so a wire can describe itself without access to the circuit.

use std::fmt;

use crate::types::{format_float, GateId, SimTime};

/// A delayed, directed connection between two gates.
#[derive(Clone, Debug, PartialEq)]
pub struct Wire {
    source: GateId,
    destination: GateId,
    delay: SimTime,
    source_name: String,
    destination_name: String,
}

impl Wire {
    pub(crate) fn new(
        source: (GateId, &str),
        destination: (GateId, &str),
        delay: SimTime,
    ) -> Self {
        Self {
            source: source.0,
            destination: destination.0,
            delay,
            source_name: source.1.to_string(),
            destination_name: destination.1.to_string(),
        }
    }

    /// Returns the driving gate.
    pub fn source(&self) -> GateId {
        self.source
    }

    /// Returns the driven gate.
    pub fn destination(&self) -> GateId {
        self.destination
    }

    /// Returns the propagation delay.
    pub fn delay(&self) -> SimTime {
        self.delay
    }

    /// Returns the name of the driving gate.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Returns the name of the driven gate.
    pub fn destination_name(&self) -> &str {
        &self.destination_name
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wire {} {} {}",
            self.source_name,
            format_float(self.delay),
            self.destination_name
        )
    }
}
