//! The circuit graph and its builder.
//!
//! Gates and wires live in arenas owned by [`Circuit`]; wires refer to gates
//! by index, and a name index maps gate names to those indices. A circuit is
//! assembled with [`CircuitBuilder`], after which its structure is frozen.
//!
//! # Example
//!
//! ```
//! use logicsim::circuit::CircuitBuilder;
//! use logicsim::gate::GateKind;
//! use logicsim::types::Signal;
//!
//! let mut builder = CircuitBuilder::new();
//! builder
//!     .add_gate("a", GateKind::Input { initial: Signal::High, delay: 5.0, changes: 1 })
//!     .unwrap();
//! builder.add_gate("b", GateKind::Output).unwrap();
//! builder.add_wire("a", 3.0, "b").unwrap();
//!
//! let circuit = builder.build();
//! assert_eq!(circuit.gate_count(), 2);
//! assert!(circuit.sanity_check().is_empty());
//! ```

use std::collections::HashMap;
use std::io::{self, Write};
use thiserror::Error;

use crate::diagnostics::Warning;
use crate::gate::{Gate, GateKind};
use crate::types::{format_float, is_valid_delay, GateId, SimTime, WireId};
use crate::wire::Wire;

/// Structural errors detected while building a circuit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Gate {0}: name reused")]
    DuplicateName(String),

    #[error("gate name {0:?} is not a valid name")]
    InvalidName(String),

    #[error("{0}: undefined gate")]
    UnknownGate(String),

    #[error("Gate {name}: invalid delay {}", format_float(*.delay))]
    InvalidGateDelay { name: String, delay: SimTime },

    #[error("Wire {src} {} {dst}: invalid delay", format_float(*.delay))]
    InvalidWireDelay {
        src: String,
        delay: SimTime,
        dst: String,
    },
}

/// Incrementally assembles a [`Circuit`].
///
/// The builder is the only place names are resolved; lookups go through a
/// hash map from name to arena index.
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    gates: Vec<Gate>,
    wires: Vec<Wire>,
    index: HashMap<String, GateId>,
}

impl CircuitBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a gate by name.
    pub fn lookup(&self, name: &str) -> Option<GateId> {
        self.index.get(name).copied()
    }

    /// Returns a gate by index.
    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(id)
    }

    /// Returns the number of gates added so far.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Returns the number of wires added so far.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Adds a gate.
    ///
    /// Names must be unique, non-empty and free of whitespace; the gate's
    /// delay, if any, must be finite and non-negative.
    pub fn add_gate(
        &mut self,
        name: impl Into<String>,
        kind: GateKind,
    ) -> Result<GateId, BuildError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(BuildError::InvalidName(name));
        }
        if self.index.contains_key(&name) {
            return Err(BuildError::DuplicateName(name));
        }
        if let Some(delay) = kind.delay().filter(|d| !is_valid_delay(*d)) {
            return Err(BuildError::InvalidGateDelay { name, delay });
        }

        let id = self.gates.len();
        tracing::debug!(gate = %name, kind = kind.keyword(), id, "gate added");
        self.index.insert(name.clone(), id);
        self.gates.push(Gate::new(name, kind));
        Ok(id)
    }

    /// Adds a wire between two named gates.
    pub fn add_wire(&mut self, src: &str, delay: SimTime, dst: &str) -> Result<WireId, BuildError> {
        let source = self
            .lookup(src)
            .ok_or_else(|| BuildError::UnknownGate(src.to_string()))?;
        let destination = self
            .lookup(dst)
            .ok_or_else(|| BuildError::UnknownGate(dst.to_string()))?;
        self.connect(source, delay, destination)
    }

    /// Adds a wire between two gates given by index.
    pub fn connect(
        &mut self,
        source: GateId,
        delay: SimTime,
        destination: GateId,
    ) -> Result<WireId, BuildError> {
        let src_name = self.name_of(source)?.to_string();
        let dst_name = self.name_of(destination)?.to_string();
        if !is_valid_delay(delay) {
            return Err(BuildError::InvalidWireDelay {
                src: src_name,
                delay,
                dst: dst_name,
            });
        }

        let id = self.wires.len();
        self.wires
            .push(Wire::new((source, src_name.as_str()), (destination, dst_name.as_str()), delay));
        self.gates[source].connect_output(id);
        self.gates[destination].connect_input();
        tracing::debug!(src = %src_name, dst = %dst_name, delay, id, "wire added");
        Ok(id)
    }

    fn name_of(&self, id: GateId) -> Result<&str, BuildError> {
        self.gates
            .get(id)
            .map(Gate::name)
            .ok_or_else(|| BuildError::UnknownGate(format!("#{}", id)))
    }

    /// Freezes the structure.
    pub fn build(self) -> Circuit {
        Circuit {
            gates: self.gates,
            wires: self.wires,
            index: self.index,
        }
    }
}

/// A built circuit: gates, wires and the name index.
#[derive(Debug, Clone)]
pub struct Circuit {
    gates: Vec<Gate>,
    wires: Vec<Wire>,
    index: HashMap<String, GateId>,
}

impl Circuit {
    /// Looks up a gate by name.
    pub fn lookup(&self, name: &str) -> Option<GateId> {
        self.index.get(name).copied()
    }

    /// Returns a gate by index.
    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(id)
    }

    /// Returns a wire by index.
    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(id)
    }

    pub(crate) fn gate_mut(&mut self, id: GateId) -> Option<&mut Gate> {
        self.gates.get_mut(id)
    }

    /// Returns all gates in declaration order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Returns all wires in declaration order.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Returns the number of gates.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Returns the number of wires.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Runs every gate's sanity check, in declaration order.
    pub fn sanity_check(&self) -> Vec<Warning> {
        self.gates.iter().flat_map(Gate::sanity_check).collect()
    }

    /// Restores every gate's runtime state.
    pub fn reset(&mut self) {
        for gate in &mut self.gates {
            gate.reset();
        }
    }

    /// Writes the circuit listing: one line per gate, then one per wire.
    pub fn write_listing<W: Write>(&self, mut w: W) -> io::Result<()> {
        for gate in &self.gates {
            writeln!(w, "{}", gate)?;
        }
        for wire in &self.wires {
            writeln!(w, "{}", wire)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Signal;

    fn input() -> GateKind {
        GateKind::Input {
            initial: Signal::Low,
            delay: 1.0,
            changes: 1,
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut builder = CircuitBuilder::new();
        builder.add_gate("a", input()).unwrap();
        assert_eq!(
            builder.add_gate("a", GateKind::Output),
            Err(BuildError::DuplicateName("a".to_string()))
        );
        assert_eq!(builder.gate_count(), 1);
    }

    #[test]
    fn test_invalid_names_and_delays() {
        let mut builder = CircuitBuilder::new();
        assert!(matches!(builder.add_gate("", GateKind::Output), Err(BuildError::InvalidName(_))));
        assert!(matches!(
            builder.add_gate("x", GateKind::Xor { delay: f32::NAN }),
            Err(BuildError::InvalidGateDelay { .. })
        ));

        builder.add_gate("a", input()).unwrap();
        builder.add_gate("b", GateKind::Output).unwrap();
        let err = builder.add_wire("a", -2.0, "b").unwrap_err();
        assert_eq!(err.to_string(), "Wire a -2.0 b: invalid delay");
        assert_eq!(builder.wire_count(), 0);
    }

    #[test]
    fn test_unknown_endpoint() {
        let mut builder = CircuitBuilder::new();
        builder.add_gate("a", input()).unwrap();
        assert_eq!(
            builder.add_wire("a", 1.0, "zz"),
            Err(BuildError::UnknownGate("zz".to_string()))
        );
    }

    #[test]
    fn test_connectivity_recorded() {
        let mut builder = CircuitBuilder::new();
        let a = builder.add_gate("a", input()).unwrap();
        let b = builder.add_gate("b", input()).unwrap();
        let x = builder.add_gate("x", GateKind::Xor { delay: 2.0 }).unwrap();
        let w1 = builder.add_wire("a", 1.0, "x").unwrap();
        let w2 = builder.connect(b, 1.5, x).unwrap();

        let circuit = builder.build();
        assert_eq!(circuit.lookup("x"), Some(x));
        assert_eq!(circuit.gate(a).unwrap().outgoing(), &[w1]);
        assert_eq!(circuit.gate(b).unwrap().outgoing(), &[w2]);
        assert_eq!(circuit.gate(x).unwrap().in_count(), 2);
        assert_eq!(circuit.wire(w2).unwrap().to_string(), "Wire b 1.5 x");
        assert!(circuit.sanity_check().is_empty());
    }

    #[test]
    fn test_sanity_check_is_idempotent() {
        let mut builder = CircuitBuilder::new();
        builder.add_gate("x", GateKind::Xor { delay: 1.0 }).unwrap();
        builder.add_gate("o", GateKind::Output).unwrap();
        builder.add_wire("o", 1.0, "x").unwrap();
        let circuit = builder.build();

        let first = circuit.sanity_check();
        let second = circuit.sanity_check();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(circuit.wire_count(), 1);
    }

    #[test]
    fn test_listing() {
        let mut builder = CircuitBuilder::new();
        builder.add_gate("a", input()).unwrap();
        builder.add_gate("b", GateKind::Output).unwrap();
        builder.add_wire("a", 3.0, "b").unwrap();

        let mut out = Vec::new();
        builder.build().write_listing(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Gate a input 0 1.0 1\nGate b output\nWire a 3.0 b\n"
        );
    }
}
