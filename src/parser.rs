//! Text circuit descriptions.
//!
//! The description language is line oriented:
//!
//! ```text
//! -- a half adder fragment
//! gate a input 1 5.0 2      -- initial value, toggle delay, toggle count
//! gate b input 0 7.0 1
//! gate x xor 1.5
//! gate t threshold 2 1.0
//! gate s output
//! wire a 1.0 x 1.0 t        -- one source, any number of delay/destination pairs
//! wire b 1.0 x 2.0 t
//! wire x 0.5 s
//! ```
//!
//! Every problem is a warning: parsing always runs to the end of the input so
//! that all problems are reported at once. Missing numbers default to zero.
//! When a command has to be abandoned the rest of its line is discarded.
//! Callers are expected to refuse to simulate when any warning was raised.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::circuit::{Circuit, CircuitBuilder};
use crate::diagnostics::Diagnostics;
use crate::gate::GateKind;
use crate::types::{format_float, SimTime, Signal};

/// Errors that stop parsing altogether.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("can't open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A parsed circuit and the warnings raised while reading it.
#[derive(Debug)]
pub struct Parsed {
    /// The gates and wires that could be built
    pub circuit: Circuit,
    /// Problems found in the description
    pub diagnostics: Diagnostics,
}

/// Parses a circuit description from a string.
pub fn parse_str(text: &str) -> Parsed {
    let mut parser = Parser::default();
    for line in text.lines() {
        parser.line(line);
    }
    Parsed {
        circuit: parser.builder.build(),
        diagnostics: parser.diagnostics,
    }
}

/// Parses a circuit description file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Parsed, ParseError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_str(&text))
}

/// Returns true if `token` is a legal gate name.
///
/// A name is any run of letters followed by one letter or digit.
pub fn is_name(token: &str) -> bool {
    let mut chars = token.chars().rev();
    match chars.next() {
        Some(last) if last.is_ascii_alphanumeric() => chars.all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// A cursor over the whitespace-separated tokens of one line.
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn peek(&self) -> Option<&'a str> {
        self.rest.split_whitespace().next()
    }

    fn next(&mut self) -> Option<&'a str> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            self.rest = trimmed;
            return None;
        }
        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (token, rest) = trimmed.split_at(end);
        self.rest = rest;
        Some(token)
    }

    fn remainder(&self) -> &'a str {
        self.rest.trim()
    }
}

fn parse_float(token: &str) -> Option<SimTime> {
    token.parse::<SimTime>().ok().filter(|v| v.is_finite())
}

#[derive(Default)]
struct Parser {
    builder: CircuitBuilder,
    diagnostics: Diagnostics,
}

impl Parser {
    fn line(&mut self, line: &str) {
        let mut tokens = Tokens::new(line);
        let Some(command) = tokens.next() else {
            return;
        };
        match command {
            c if c.starts_with("--") => {}
            "gate" => self.gate(&mut tokens),
            "wire" => self.wire(&mut tokens),
            other => {
                self.diagnostics.warn(format!("Invalid command {}", other));
            }
        }
    }

    /// Complains about anything but blanks or a comment left on the line.
    fn finish_line(&mut self, tokens: &Tokens<'_>, context: &str) {
        let rest = tokens.remainder();
        if rest.is_empty() || rest.starts_with("--") {
            return;
        }
        self.diagnostics
            .warn(format!("{}: followed by {}", context, rest));
    }

    fn scan_name<'a>(
        &mut self,
        tokens: &mut Tokens<'a>,
        missing: impl FnOnce() -> String,
    ) -> Option<&'a str> {
        match tokens.peek() {
            Some(token) if is_name(token) => tokens.next(),
            _ => {
                self.diagnostics.warn(missing());
                None
            }
        }
    }

    fn scan_int(&mut self, tokens: &mut Tokens<'_>, context: &str) -> u32 {
        let Some(value) = tokens.peek().and_then(|t| t.parse::<i64>().ok()) else {
            self.diagnostics
                .warn(format!("{}: integer value expected", context));
            return 0;
        };
        tokens.next();
        match u32::try_from(value) {
            Ok(v) => v,
            Err(_) if value < 0 => {
                self.diagnostics
                    .warn(format!("{} {}: must be positive", context, value));
                0
            }
            Err(_) => {
                self.diagnostics
                    .warn(format!("{} {}: value too large", context, value));
                0
            }
        }
    }

    fn scan_float(&mut self, tokens: &mut Tokens<'_>, context: &str) -> SimTime {
        let Some(value) = tokens.peek().and_then(parse_float) else {
            self.diagnostics
                .warn(format!("{}: float value expected", context));
            return 0.0;
        };
        tokens.next();
        if value < 0.0 {
            self.diagnostics.warn(format!(
                "{} {}: must be positive",
                context,
                format_float(value)
            ));
            return 0.0;
        }
        value
    }

    fn gate(&mut self, tokens: &mut Tokens<'_>) {
        let Some(name) = self.scan_name(tokens, || "Gate has missing name".to_string()) else {
            return;
        };
        if self.builder.lookup(name).is_some() {
            self.diagnostics.warn(format!("Gate {}: name reused", name));
            return;
        }
        let Some(kind) = self.scan_name(tokens, || format!("Gate {}: kind missing", name)) else {
            return;
        };

        let context = format!("Gate {} {}", name, kind);
        let kind = match kind {
            "input" => {
                let initial = self.scan_int(tokens, &context);
                let delay = self.scan_float(tokens, &context);
                let changes = self.scan_int(tokens, &context);
                if initial > 1 {
                    self.diagnostics.warn(format!(
                        "{} {} {} {}: initial value > 1",
                        context,
                        initial,
                        format_float(delay),
                        changes
                    ));
                }
                GateKind::Input {
                    initial: Signal::from(initial != 0),
                    delay,
                    changes,
                }
            }
            "output" => GateKind::Output,
            "xor" => GateKind::Xor {
                delay: self.scan_float(tokens, &context),
            },
            "threshold" => {
                let threshold = self.scan_int(tokens, &context);
                let delay = self.scan_float(tokens, &context);
                GateKind::Threshold { threshold, delay }
            }
            _ => {
                self.diagnostics
                    .warn(format!("{}: kind unknown", context));
                return;
            }
        };

        match self.builder.add_gate(name, kind) {
            Ok(id) => {
                let described = self
                    .builder
                    .gate(id)
                    .map(|g| g.to_string())
                    .unwrap_or(context);
                self.finish_line(tokens, &described);
            }
            Err(err) => {
                self.diagnostics.warn(err.to_string());
                self.finish_line(tokens, &context);
            }
        }
    }

    fn wire(&mut self, tokens: &mut Tokens<'_>) {
        let Some(src) = self.scan_name(tokens, || "Wire has no source".to_string()) else {
            return;
        };
        if self.builder.lookup(src).is_none() {
            self.diagnostics
                .warn(format!("Wire {}: undefined source", src));
            return;
        }

        self.wire_segment(tokens, src);
        while tokens.peek().and_then(parse_float).is_some() {
            self.wire_segment(tokens, src);
        }
        self.finish_line(tokens, &format!("Wire {}", src));
    }

    /// Scans one `delay destination` pair and builds the wire.
    fn wire_segment(&mut self, tokens: &mut Tokens<'_>, src: &str) {
        let delay = self.scan_float(tokens, &format!("Wire {}", src));
        let shown = format_float(delay);
        let Some(dst) = self.scan_name(tokens, || {
            format!("Wire {} {}: destination missing", src, shown)
        }) else {
            return;
        };
        if self.builder.lookup(dst).is_none() {
            self.diagnostics.warn(format!(
                "Wire {} {} {}: undefined destination",
                src, shown, dst
            ));
            return;
        }
        if let Err(err) = self.builder.add_wire(src, delay, dst) {
            self.diagnostics.warn(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_pattern() {
        assert!(is_name("a"));
        assert!(is_name("abc"));
        assert!(is_name("ab1"));
        assert!(is_name("7"));
        assert!(!is_name("a12"));
        assert!(!is_name("a_b"));
        assert!(!is_name("1a"));
        assert!(!is_name(""));
    }

    #[test]
    fn test_tokens_cursor() {
        let mut tokens = Tokens::new("  gate a   input -- note");
        assert_eq!(tokens.peek(), Some("gate"));
        assert_eq!(tokens.next(), Some("gate"));
        assert_eq!(tokens.next(), Some("a"));
        assert_eq!(tokens.next(), Some("input"));
        assert_eq!(tokens.remainder(), "-- note");
        tokens.next();
        tokens.next();
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_parse_simple_circuit() {
        let parsed = parse_str(
            "-- comment line\n\
             gate a input 1 5.0 2 -- trailing comment\n\
             gate b output\n\
             \n\
             wire a 3 b\n",
        );
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);

        let circuit = parsed.circuit;
        assert_eq!(circuit.gate_count(), 2);
        assert_eq!(circuit.wire_count(), 1);
        assert_eq!(circuit.wires()[0].to_string(), "Wire a 3.0 b");
        assert_eq!(circuit.gates()[0].to_string(), "Gate a input 1 5.0 2");
    }

    #[test]
    fn test_wire_fanout_on_one_line() {
        let parsed = parse_str(
            "gate a input 0 1 1\n\
             gate b output\n\
             gate c output\n\
             wire a 1.0 b 2.5 c\n",
        );
        assert!(parsed.diagnostics.is_empty());
        let a = parsed.circuit.lookup("a").unwrap();
        assert_eq!(parsed.circuit.gate(a).unwrap().outgoing().len(), 2);
        assert_eq!(parsed.circuit.wires()[1].to_string(), "Wire a 2.5 c");
    }

    #[test]
    fn test_gate_warnings() {
        let parsed = parse_str(
            "gate\n\
             gate a input 2 1.0 1\n\
             gate a output\n\
             gate b\n\
             gate c nand 1.0\n\
             gate d xor\n\
             gate e threshold -1 2.0\n\
             gate f output extra\n",
        );
        let messages: Vec<String> = parsed.diagnostics.iter().map(|w| w.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Gate has missing name",
                "Gate a input 2 1.0 1: initial value > 1",
                "Gate a: name reused",
                "Gate b: kind missing",
                "Gate c nand: kind unknown",
                "Gate d xor: float value expected",
                "Gate e threshold -1: must be positive",
                "Gate f output: followed by extra",
            ]
        );
        // a, d, e and f were still built.
        assert_eq!(parsed.circuit.gate_count(), 4);
    }

    #[test]
    fn test_wire_warnings() {
        let parsed = parse_str(
            "gate a input 0 1.0 1\n\
             gate b output\n\
             wire\n\
             wire zz 1.0 b\n\
             wire a 1.0 nowhere\n\
             wire a 2.0\n\
             wire a -1.0 b\n\
             frob a\n",
        );
        let messages: Vec<String> = parsed.diagnostics.iter().map(|w| w.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Wire has no source",
                "Wire zz: undefined source",
                "Wire a 1.0 nowhere: undefined destination",
                "Wire a 2.0: destination missing",
                "Wire a -1.0: must be positive",
                "Invalid command frob",
            ]
        );
        // The negative delay is replaced by zero after the warning.
        assert_eq!(parsed.circuit.wire_count(), 1);
        assert_eq!(parsed.circuit.wires()[0].to_string(), "Wire a 0.0 b");
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("/definitely/not/here.logic").unwrap_err();
        assert!(err.to_string().starts_with("can't open /definitely/not/here.logic"));
    }
}
