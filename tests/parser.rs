//! Integration tests for the circuit description parser.

use logicsim::gate::GateKind;
use logicsim::{parse_file, parse_str, Signal};

fn messages(text: &str) -> Vec<String> {
    parse_str(text)
        .diagnostics
        .iter()
        .map(|w| w.to_string())
        .collect()
}

#[test]
fn test_all_gate_kinds() {
    let parsed = parse_str(
        "gate a input 1 2.5 3
         gate o output
         gate x xor 1e-4
         gate t threshold 3 12
        ",
    );
    assert!(parsed.diagnostics.is_empty());

    let kinds: Vec<&GateKind> = parsed.circuit.gates().iter().map(|g| g.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            &GateKind::Input { initial: Signal::High, delay: 2.5, changes: 3 },
            &GateKind::Output,
            &GateKind::Xor { delay: 1e-4 },
            &GateKind::Threshold { threshold: 3, delay: 12.0 },
        ]
    );
    assert_eq!(parsed.circuit.gates()[2].to_string(), "Gate x xor 1.0E-4");
}

#[test]
fn test_comments_and_blank_lines_are_ignored() {
    let parsed = parse_str(
        "-- header

         --indented comment
         gate a output    -- trailing
        ",
    );
    assert!(parsed.diagnostics.is_empty());
    assert_eq!(parsed.circuit.gate_count(), 1);
}

#[test]
fn test_trailing_garbage_is_reported() {
    assert_eq!(
        messages("gate a input 0 1.0 1 2\ngate b output\nwire a 1.0 b junk here\n"),
        vec![
            "Gate a input 0 1.0 1: followed by 2",
            "Wire a: followed by junk here",
        ]
    );
}

#[test]
fn test_missing_numbers_default_to_zero() {
    let parsed = parse_str("gate a input\ngate t threshold x 1.0\n");
    let warnings: Vec<String> = parsed.diagnostics.iter().map(|w| w.to_string()).collect();
    assert_eq!(
        warnings,
        vec![
            "Gate a input: integer value expected",
            "Gate a input: float value expected",
            "Gate a input: integer value expected",
            "Gate t threshold: integer value expected",
            "Gate t threshold: float value expected",
            "Gate t threshold 0 0.0: followed by x 1.0",
        ]
    );
    assert_eq!(
        parsed.circuit.gates()[0].kind(),
        &GateKind::Input { initial: Signal::Low, delay: 0.0, changes: 0 }
    );
}

#[test]
fn test_non_finite_numbers_are_not_floats() {
    assert_eq!(
        messages("gate x xor NaN\n"),
        vec!["Gate x xor: float value expected", "Gate x xor 0.0: followed by NaN"]
    );
}

#[test]
fn test_wire_to_later_gate_is_undefined() {
    assert_eq!(
        messages("gate a input 0 1 1\nwire a 1 b\ngate b output\n"),
        vec!["Wire a 1.0 b: undefined destination"]
    );
}

#[test]
fn test_parse_file_reads_from_disk() {
    let path = std::env::temp_dir().join(format!("logicsim-parser-{}.txt", std::process::id()));
    std::fs::write(&path, "gate a input 1 1.0 1\ngate b output\nwire a 1.0 b\n").unwrap();

    let parsed = parse_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(parsed.diagnostics.is_empty());
    assert_eq!(parsed.circuit.wire_count(), 1);
}
