//! Statistics collection and export.
//!
//! [`RunStats`] summarizes one simulation run; it can be exported as JSON or
//! CSV, or written as a human-readable summary.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::types::{format_float, SimTime};

/// Aggregate statistics for a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Simulated time of the last triggered event
    pub final_time: SimTime,
    /// Events accepted by the queue
    pub events_scheduled: u64,
    /// Events triggered
    pub events_processed: u64,
    /// Events still pending when the run stopped
    pub events_pending: usize,
    /// Largest number of simultaneously pending events
    pub peak_queue_size: usize,
    /// Trace lines emitted
    pub trace_records: u64,
    /// Scheduled gate outputs dropped by pulse suppression
    pub suppressed_outputs: u64,
    /// Number of gates
    pub gate_count: usize,
    /// Number of wires
    pub wire_count: usize,
    /// Warnings raised while the simulation ran
    pub runtime_warnings: usize,
    /// Wall-clock duration in milliseconds, if timed
    pub wall_time_ms: Option<f64>,
}

impl RunStats {
    /// Exports statistics to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports statistics to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Exports statistics to CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("metric,value\n");
        csv.push_str(&format!("final_time,{}\n", format_float(self.final_time)));
        csv.push_str(&format!("events_scheduled,{}\n", self.events_scheduled));
        csv.push_str(&format!("events_processed,{}\n", self.events_processed));
        csv.push_str(&format!("events_pending,{}\n", self.events_pending));
        csv.push_str(&format!("peak_queue_size,{}\n", self.peak_queue_size));
        csv.push_str(&format!("trace_records,{}\n", self.trace_records));
        csv.push_str(&format!("suppressed_outputs,{}\n", self.suppressed_outputs));
        csv.push_str(&format!("gate_count,{}\n", self.gate_count));
        csv.push_str(&format!("wire_count,{}\n", self.wire_count));
        csv.push_str(&format!("runtime_warnings,{}\n", self.runtime_warnings));
        if let Some(ms) = self.wall_time_ms {
            csv.push_str(&format!("wall_time_ms,{:.2}\n", ms));
        }

        csv
    }

    /// Writes a human-readable summary.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Simulation Statistics ===")?;
        writeln!(w, "Circuit: {} gates, {} wires", self.gate_count, self.wire_count)?;
        writeln!(w, "Final simulated time: {}", format_float(self.final_time))?;
        writeln!(
            w,
            "Events: {} scheduled, {} processed, {} pending (peak {})",
            self.events_scheduled, self.events_processed, self.events_pending, self.peak_queue_size
        )?;
        writeln!(w, "Trace records: {}", self.trace_records)?;
        writeln!(w, "Suppressed outputs: {}", self.suppressed_outputs)?;
        writeln!(w, "Runtime warnings: {}", self.runtime_warnings)?;
        if let Some(ms) = self.wall_time_ms {
            writeln!(w, "Wall time: {:.2} ms", ms)?;
        }
        Ok(())
    }

    /// Returns the summary as a string.
    pub fn summary(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_summary(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// A simple timer for measuring wall-clock time.
#[derive(Debug)]
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Starts a new timer.
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Returns elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}
