//! Signal transition trace.
//!
//! Every gate output change and every wire delivery produces one
//! [`TraceRecord`]. Rendered with `Display`, a record is one line of the
//! command-line trace:
//!
//! ```text
//! time 3.0 0->1 Wire a 3.0 b
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

use crate::types::{format_float, SimTime, Signal};

/// One observed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// When the transition happened
    pub time: SimTime,
    /// The new value; the old value is always its complement
    pub value: Signal,
    /// Description of the gate or wire that changed
    pub entity: String,
}

impl TraceRecord {
    /// Creates a new record.
    pub fn new(time: SimTime, value: Signal, entity: impl Into<String>) -> Self {
        Self {
            time,
            value,
            entity: entity.into(),
        }
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time {} {}->{} {}",
            format_float(self.time),
            !self.value,
            self.value,
            self.entity
        )
    }
}

/// Destination for trace records.
pub trait TraceSink {
    /// Accept one record.
    fn record(&mut self, record: TraceRecord);
}

impl TraceSink for Vec<TraceRecord> {
    fn record(&mut self, record: TraceRecord) {
        self.push(record);
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _record: TraceRecord) {}
}

/// Writes each record as a line to an [`io::Write`].
///
/// The first write error is kept and returned by [`finish`](Self::finish);
/// later records are dropped.
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    writer: W,
    lines: u64,
    error: Option<io::Error>,
}

impl<W: Write> WriteSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            lines: 0,
            error: None,
        }
    }

    /// Returns the number of lines written.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flushes the writer and reports the first error, if any.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> TraceSink for WriteSink<W> {
    fn record(&mut self, record: TraceRecord) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.writer, "{}", record) {
            Ok(()) => self.lines += 1,
            Err(err) => {
                tracing::error!(error = %err, "trace output failed");
                self.error = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_display() {
        let rec = TraceRecord::new(3.0, Signal::High, "Wire a 3.0 b");
        assert_eq!(rec.to_string(), "time 3.0 0->1 Wire a 3.0 b");

        let rec = TraceRecord::new(5.5, Signal::Low, "Gate x xor 1.0");
        assert_eq!(rec.to_string(), "time 5.5 1->0 Gate x xor 1.0");
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<TraceRecord> = Vec::new();
        sink.record(TraceRecord::new(0.0, Signal::High, "Gate a output"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_write_sink_lines() {
        let mut sink = WriteSink::new(Vec::new());
        sink.record(TraceRecord::new(0.0, Signal::High, "Gate a output"));
        sink.record(TraceRecord::new(1.0, Signal::Low, "Gate a output"));
        assert_eq!(sink.lines(), 2);

        let bytes = sink.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "time 0.0 0->1 Gate a output\ntime 1.0 1->0 Gate a output\n"
        );
    }
}
