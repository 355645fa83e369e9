// bin/bp.rs
//
// CLI front-end for the branch predictor simulator.
//   bp bimodal <M2> <trace>
//   bp gshare <M1> <N> <trace>
//   bp hybrid <K> <M1> <N> <M2> <trace>

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use archsim::bp::{BpStats, Predictor};
use archsim::errors::SimError;
use archsim::report;
use archsim::trace::BpTraceReader;
use archsim::utils::logger;

#[derive(Parser)]
#[command(name = "bp", about = "Branch predictor simulator")]
struct Cli {
    #[command(subcommand)]
    predictor: PredictorArgs,

    /// Emit the prediction summary as JSON in addition to the trace report.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum PredictorArgs {
    Bimodal { m2: u32, trace: String },
    Gshare { m1: u32, n: u32, trace: String },
    Hybrid { k: u32, m1: u32, n: u32, m2: u32, trace: String },
}

impl PredictorArgs {
    fn trace_path(&self) -> &str {
        match self {
            Self::Bimodal { trace, .. } => trace,
            Self::Gshare { trace, .. } => trace,
            Self::Hybrid { trace, .. } => trace,
        }
    }

    fn build(&self) -> Predictor {
        match self {
            Self::Bimodal { m2, .. } => Predictor::bimodal(*m2),
            Self::Gshare { m1, n, .. } => Predictor::gshare(*m1, *n),
            Self::Hybrid { k, m1, n, m2, .. } => Predictor::hybrid(*k, *m1, *n, *m2),
        }
    }

    fn command_line(&self) -> Vec<String> {
        let mut argv = vec!["bp".to_string()];
        match self {
            Self::Bimodal { m2, trace } => {
                argv.extend(["bimodal".to_string(), m2.to_string(), trace.clone()]);
            }
            Self::Gshare { m1, n, trace } => {
                argv.extend(["gshare".to_string(), m1.to_string(), n.to_string(), trace.clone()]);
            }
            Self::Hybrid { k, m1, n, m2, trace } => {
                argv.extend([
                    "hybrid".to_string(),
                    k.to_string(),
                    m1.to_string(),
                    n.to_string(),
                    m2.to_string(),
                    trace.clone(),
                ]);
            }
        }
        argv
    }
}

#[derive(Serialize)]
struct JsonSummary {
    predictions: u64,
    mispredictions: u64,
    misprediction_rate_pct: f64,
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let argv = cli.predictor.command_line();
    let argv_refs: Vec<&str> = argv.iter().map(String::as_str).collect();
    print!("{}", report::bp_command(&argv_refs));

    let trace = BpTraceReader::open(cli.predictor.trace_path())?;
    let mut predictor = cli.predictor.build();
    let mut stats = BpStats::default();
    for rec in trace {
        let correct = predictor.observe(rec.addr as u32, rec.taken);
        stats.record(correct);
    }

    print!("{}", report::bp_output(&stats));
    print!("{}", report::bp_tables(&predictor));

    if cli.json {
        let summary = JsonSummary {
            predictions: stats.predictions,
            mispredictions: stats.mispredictions,
            misprediction_rate_pct: stats.misprediction_rate_pct(),
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
