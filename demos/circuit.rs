//! Half adder example.
//!
//! Two toggling inputs feed an XOR gate (the sum bit) and a threshold-2 gate
//! (the carry bit). The circuit is written in the text description language,
//! checked, and run to completion with its trace printed on stdout.

use std::io;

use logicsim::{parse_str, Simulation, WriteSink};

const HALF_ADDER: &str = "\
-- inputs: initial value, toggle period, number of toggles
gate a input 0 4.0 3
gate b input 0 6.0 2

-- sum and carry
gate s xor 1.0
gate c threshold 2 1.5
gate sum output
gate carry output

wire a 0.5 s
wire b 0.5 s
wire a 0.5 c
wire b 0.5 c
wire s 0.25 sum
wire c 0.25 carry
";

// -----------------------------------------------------------------------------
// Main simulation
// -----------------------------------------------------------------------------

fn main() {
    println!("==== Half adder example ====\n");

    let parsed = parse_str(HALF_ADDER);
    let mut problems = parsed.diagnostics.iter().map(|w| w.to_string()).collect::<Vec<_>>();

    let mut sim = Simulation::new(parsed.circuit, WriteSink::new(io::stdout().lock()));
    problems.extend(sim.sanity_check().iter().map(|w| w.to_string()));
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("Logicsim: {problem}");
        }
        std::process::exit(1);
    }

    if let Err(err) = sim.run() {
        eprintln!("Logicsim: {err}");
        std::process::exit(1);
    }

    let stats = sim.stats();
    if let Err(err) = sim.into_sink().finish() {
        eprintln!("Logicsim: {err}");
        std::process::exit(1);
    }
    println!("\n{}", stats.summary());
}

#[cfg(test)]
mod tests {
    use super::*;
    use logicsim::TraceRecord;

    #[test]
    fn half_adder_is_clean_and_settles() {
        let parsed = parse_str(HALF_ADDER);
        assert!(parsed.diagnostics.is_empty());

        let mut sim = Simulation::new(parsed.circuit, Vec::<TraceRecord>::new());
        assert!(sim.sanity_check().is_empty());
        sim.run().unwrap();

        // a is high on [4, 8) and [12, inf); b is high on [6, 12).
        // Both are high on [6, 8), so the carry rises once and falls once.
        let carry: Vec<String> = sim
            .sink()
            .iter()
            .map(|r| r.to_string())
            .filter(|line| line.ends_with("Wire c 0.25 carry"))
            .collect();
        assert_eq!(
            carry,
            vec![
                "time 8.25 0->1 Wire c 0.25 carry",
                "time 10.25 1->0 Wire c 0.25 carry",
            ]
        );
        assert!(sim.diagnostics().is_empty());
    }
}
