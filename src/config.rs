//! Configuration files for circuits.
//!
//! Besides the text description language handled by
//! [`parser`](crate::parser), circuits can be described declaratively in YAML
//! or JSON, together with run parameters.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   log_level: info
//!   max_time: 100
//!   collect_stats: true
//!
//! gates:
//!   - name: a
//!     kind: input
//!     initial: 1
//!     delay: 5
//!     changes: 2
//!   - name: x
//!     kind: xor
//!     delay: 1.5
//!   - name: b
//!     kind: output
//!
//! wires:
//!   - src: a
//!     delay: 3
//!     dst: b
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::circuit::{BuildError, Circuit, CircuitBuilder};
use crate::gate::GateKind;
use crate::parser::is_name;
use crate::types::{format_float, is_valid_delay, SimTime};

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("Circuit error: {0}")]
    Build(#[from] BuildError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Run parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Stop once simulated time passes this value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<SimTime>,

    /// Whether to report run statistics
    #[serde(default)]
    pub collect_stats: bool,
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_time: None,
            collect_stats: false,
        }
    }
}

/// A gate declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Unique gate name
    pub name: String,

    /// Kind and parameters
    #[serde(flatten)]
    pub kind: GateKind,
}

/// A wire declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireConfig {
    /// Driving gate
    pub src: String,

    /// Propagation delay
    pub delay: SimTime,

    /// Driven gate
    pub dst: String,
}

/// Complete circuit configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Run parameters
    #[serde(default)]
    pub simulation: SimulationParams,

    /// Gates in declaration order
    #[serde(default)]
    pub gates: Vec<GateConfig>,

    /// Wires in declaration order
    #[serde(default)]
    pub wires: Vec<WireConfig>,
}

impl SimConfig {
    /// Creates a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Returns true if `path` names a file [`from_file`](Self::from_file) understands.
    pub fn is_config_path<P: AsRef<Path>>(path: P) -> bool {
        matches!(
            path.as_ref()
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .as_deref(),
            Some("yaml" | "yml" | "json")
        )
    }

    /// Validates the entire configuration.
    ///
    /// Checks names, delays and wire endpoints. Connectivity rules (input
    /// counts, thresholds) are left to the circuit's sanity check.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(max_time) = self.simulation.max_time {
            if !is_valid_delay(max_time) {
                return Err(ConfigError::Validation(format!(
                    "max_time {} must be a non-negative number",
                    format_float(max_time)
                )));
            }
        }

        let mut names = HashSet::new();
        for gate in &self.gates {
            if !is_name(&gate.name) {
                return Err(ConfigError::Validation(format!(
                    "Invalid gate name: {:?}",
                    gate.name
                )));
            }
            if !names.insert(gate.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate gate name: {}",
                    gate.name
                )));
            }
            if !gate.kind.has_valid_delay() {
                return Err(ConfigError::Validation(format!(
                    "Gate {} has an invalid delay",
                    gate.name
                )));
            }
        }

        for wire in &self.wires {
            if !names.contains(wire.src.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Wire references non-existent source gate: {}",
                    wire.src
                )));
            }
            if !names.contains(wire.dst.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Wire references non-existent destination gate: {}",
                    wire.dst
                )));
            }
            if !is_valid_delay(wire.delay) {
                return Err(ConfigError::Validation(format!(
                    "Wire {} {} {} has an invalid delay",
                    wire.src,
                    format_float(wire.delay),
                    wire.dst
                )));
            }
        }

        Ok(())
    }

    /// Builds the described circuit.
    pub fn build_circuit(&self) -> ConfigResult<Circuit> {
        let mut builder = CircuitBuilder::new();
        for gate in &self.gates {
            builder.add_gate(gate.name.as_str(), gate.kind.clone())?;
        }
        for wire in &self.wires {
            builder.add_wire(&wire.src, wire.delay, &wire.dst)?;
        }
        Ok(builder.build())
    }

    /// Describes an existing circuit, with default run parameters.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        Self {
            simulation: SimulationParams::default(),
            gates: circuit
                .gates()
                .iter()
                .map(|g| GateConfig {
                    name: g.name().to_string(),
                    kind: g.kind().clone(),
                })
                .collect(),
            wires: circuit
                .wires()
                .iter()
                .map(|w| WireConfig {
                    src: w.source_name().to_string(),
                    delay: w.delay(),
                    dst: w.destination_name().to_string(),
                })
                .collect(),
        }
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the number of gates.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Returns the number of wires.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Finds a gate declaration by name.
    pub fn find_gate(&self, name: &str) -> Option<&GateConfig> {
        self.gates.iter().find(|g| g.name == name)
    }
}

/// Builder for creating SimConfig programmatically.
#[derive(Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time limit.
    pub fn max_time(mut self, time: SimTime) -> Self {
        self.config.simulation.max_time = Some(time);
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Enables statistics collection.
    pub fn collect_stats(mut self, enable: bool) -> Self {
        self.config.simulation.collect_stats = enable;
        self
    }

    /// Adds a gate.
    pub fn gate(mut self, name: impl Into<String>, kind: GateKind) -> Self {
        self.config.gates.push(GateConfig {
            name: name.into(),
            kind,
        });
        self
    }

    /// Adds a wire.
    pub fn wire(mut self, src: impl Into<String>, delay: SimTime, dst: impl Into<String>) -> Self {
        self.config.wires.push(WireConfig {
            src: src.into(),
            delay,
            dst: dst.into(),
        });
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<SimConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
