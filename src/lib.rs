//! # Logicsim
//!
//! A discrete-event simulator for digital logic circuits.
//!
//! ## Design Principles
//!
//! - **Event-Driven**: Work happens only when something changes. Every change
//!   is an event on a single time-ordered queue; ties at equal times run in
//!   the order they were scheduled.
//! - **Local Gates**: Each gate is a small state machine that only sees its own
//!   inputs and answers with what to schedule. Wires add propagation delay.
//! - **Pulse Suppression**: A gate whose output would change and change back
//!   before the first change takes effect emits nothing.
//!
//! ## Quick Start
//!
//! ```rust
//! use logicsim::{parse_str, Simulation, TraceRecord};
//!
//! let parsed = parse_str("gate a input 1 5.0 1\ngate b output\nwire a 3.0 b\n");
//! assert!(parsed.diagnostics.is_empty());
//!
//! let mut sim = Simulation::new(parsed.circuit, Vec::<TraceRecord>::new());
//! assert!(sim.sanity_check().is_empty());
//! sim.run().unwrap();
//!
//! let lines: Vec<String> = sim.sink().iter().map(|r| r.to_string()).collect();
//! assert_eq!(lines[0], "time 0.0 0->1 Gate a input 1 5.0 1");
//! assert_eq!(lines[1], "time 3.0 0->1 Wire a 3.0 b");
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use logicsim::config::SimConfig;
//!
//! let config = SimConfig::from_yaml_file("circuit.yaml")?;
//! let circuit = config.build_circuit()?;
//! ```

pub mod types;
pub mod event;
pub mod executor;
pub mod semaphore;
pub mod gate;
pub mod wire;
pub mod circuit;
pub mod trace;
pub mod diagnostics;
pub mod simulation;
pub mod parser;
pub mod config;
pub mod stats;

// Re-export commonly used types
pub use types::{SimTime, Signal, GateId, WireId};
pub use event::Event;
pub use executor::{ActionHandler, EventQueue, QueueStats, ScheduleError};
pub use semaphore::{Semaphore, SemaphoreError};
pub use gate::{Gate, GateKind, GateState, InputCounter};
pub use wire::Wire;
pub use circuit::{BuildError, Circuit, CircuitBuilder};
pub use trace::{NullSink, TraceRecord, TraceSink, WriteSink};
pub use diagnostics::{Diagnostics, Warning};
pub use simulation::{CircuitAction, Simulation, SimulationError};
pub use parser::{parse_file, parse_str, ParseError, Parsed};
pub use config::{SimConfig, SimConfigBuilder, ConfigError};
pub use stats::{RunStats, Timer};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so they never mix with trace output. `RUST_LOG`, when
/// set, overrides `level`.
///
/// # Example
///
/// ```rust,ignore
/// logicsim::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
