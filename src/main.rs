//! Logicsim CLI
//!
//! Reads a circuit description, checks it, and prints the signal trace of
//! the simulation to stdout.

use clap::{Parser, ValueEnum};
use logicsim::config::{SimConfig, SimulationParams};
use logicsim::{parse_file, Circuit, Diagnostics, Simulation, SimTime, Timer, WriteSink};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "logicsim")]
#[command(about = "Discrete-event logic circuit simulator")]
#[command(version)]
struct Cli {
    /// Circuit description file
    file: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Stop once simulated time passes this value
    #[arg(long)]
    max_time: Option<SimTime>,

    /// Print run statistics as JSON to stderr
    #[arg(long)]
    stats: bool,

    /// Input format; guessed from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<InputFormat>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    Text,
    Yaml,
    Json,
}

/// A loaded circuit with the parameters and warnings that came with it.
struct Loaded {
    circuit: Circuit,
    params: SimulationParams,
    diagnostics: Diagnostics,
}

fn load(path: &Path, format: Option<InputFormat>) -> Result<Loaded, Box<dyn std::error::Error>> {
    let config = match format {
        Some(InputFormat::Yaml) => SimConfig::from_yaml_file(path)?,
        Some(InputFormat::Json) => SimConfig::from_json_file(path)?,
        None if SimConfig::is_config_path(path) => SimConfig::from_file(path)?,
        Some(InputFormat::Text) | None => {
            let parsed = parse_file(path)?;
            return Ok(Loaded {
                circuit: parsed.circuit,
                params: SimulationParams::default(),
                diagnostics: parsed.diagnostics,
            });
        }
    };
    Ok(Loaded {
        circuit: config.build_circuit()?,
        params: config.simulation,
        diagnostics: Diagnostics::new(),
    })
}

fn report(diagnostics: &Diagnostics) {
    for warning in diagnostics.iter() {
        eprintln!("Logicsim: {}", warning);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = match load(&cli.file, cli.format) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("Logicsim: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(&loaded.params.log_level);
    logicsim::init_logging(level);

    let Loaded {
        circuit,
        params,
        mut diagnostics,
    } = loaded;
    let max_time = cli.max_time.or(params.max_time);
    let collect_stats = cli.stats || params.collect_stats;

    diagnostics.extend(circuit.sanity_check());
    if !diagnostics.is_empty() {
        report(&diagnostics);
        let stdout = std::io::stdout();
        if let Err(err) = circuit.write_listing(stdout.lock()) {
            eprintln!("Logicsim: {}", err);
        }
        return ExitCode::FAILURE;
    }

    let timer = Timer::start();
    let stdout = std::io::stdout();
    let mut sim = Simulation::new(circuit, WriteSink::new(stdout.lock()));
    let outcome = match max_time {
        Some(limit) => sim.run_until(limit).map(|_| ()),
        None => sim.run(),
    };
    if let Err(err) = outcome {
        eprintln!("Logicsim: {}", err);
        return ExitCode::FAILURE;
    }

    let mut stats = sim.stats();
    stats.wall_time_ms = Some(timer.elapsed_ms());
    report(sim.diagnostics());
    let runtime_warnings = sim.diagnostics().count();

    if let Err(err) = sim.into_sink().finish() {
        eprintln!("Logicsim: {}", err);
        return ExitCode::FAILURE;
    }

    if collect_stats {
        match stats.to_json() {
            Ok(json) => eprintln!("{}", json),
            Err(err) => eprintln!("Logicsim: {}", err),
        }
    }

    if runtime_warnings > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
