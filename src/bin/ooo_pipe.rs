// bin/ooo_pipe.rs
//
// CLI front-end for the out-of-order pipeline simulator.
//   ooo_pipe <ROB_SIZE> <IQ_SIZE> <WIDTH> <tracefile>

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use archsim::errors::SimError;
use archsim::ooo::{Engine, EngineConfig};
use archsim::report::{self, OooFooterArgs};
use archsim::trace::OooTraceReader;
use archsim::utils::logger;

#[derive(Parser)]
#[command(name = "ooo_pipe", about = "Cycle-accurate out-of-order pipeline simulator")]
struct Cli {
    rob_size: usize,
    iq_size: usize,
    width: usize,
    tracefile: String,

    /// Emit the simulation summary as JSON in addition to the trace report.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonSummary {
    rob_size: usize,
    iq_size: usize,
    width: usize,
    dynamic_instruction_count: usize,
    cycles: i64,
    ipc: f64,
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let trace = OooTraceReader::open(&cli.tracefile)?;
    let engine = Engine::new(
        EngineConfig { rob_size: cli.rob_size, iq_size: cli.iq_size, width: cli.width },
        trace,
    );
    let (completed, cycles) = engine.run();

    for inst in &completed {
        println!("{}", report::ooo_instruction_line(inst));
    }
    print!(
        "{}",
        report::ooo_footer(&OooFooterArgs {
            argv0: "ooo_pipe",
            rob_size: cli.rob_size,
            iq_size: cli.iq_size,
            width: cli.width,
            trace_file: &cli.tracefile,
            dynamic_instruction_count: completed.len(),
            cycles,
        })
    );

    if cli.json {
        let ipc = if cycles > 0 { completed.len() as f64 / cycles as f64 } else { 0.0 };
        let summary = JsonSummary {
            rob_size: cli.rob_size,
            iq_size: cli.iq_size,
            width: cli.width,
            dynamic_instruction_count: completed.len(),
            cycles,
            ipc,
        };
        println!("{}", serde_json::to_string(&summary).map_err(|e| SimError::Usage(e.to_string()))?);
    }

    Ok(())
}

fn main() -> ExitCode {
    logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
