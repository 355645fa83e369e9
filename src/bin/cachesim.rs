// bin/cachesim.rs
//
// CLI front-end for the two-level cache simulator.
//   cachesim <BLOCKSIZE> <L1_SIZE> <L1_ASSOC> <L2_SIZE> <L2_ASSOC> <PREF_N> <PREF_M> <trace_file>

use std::process::ExitCode;

use clap::Parser;

use archsim::cache::CacheHierarchy;
use archsim::errors::SimError;
use archsim::report::{self, CacheConfigArgs};
use archsim::trace::CacheTraceReader;
use archsim::utils::logger;

#[derive(Parser)]
#[command(name = "cachesim", about = "Two-level cache simulator with stream-buffer prefetching")]
struct Cli {
    block_size: u32,
    l1_size: usize,
    l1_assoc: usize,
    l2_size: usize,
    l2_assoc: usize,
    pref_n: usize,
    pref_m: usize,
    trace_file: String,

    /// Emit the measurements block as JSON in addition to the trace report.
    #[arg(long)]
    json: bool,
}

fn run(cli: &Cli) -> Result<(), SimError> {
    print!(
        "{}",
        report::cache_config(&CacheConfigArgs {
            block_size: cli.block_size,
            l1_size: cli.l1_size,
            l1_assoc: cli.l1_assoc,
            l2_size: cli.l2_size,
            l2_assoc: cli.l2_assoc,
            pref_n: cli.pref_n,
            pref_m: cli.pref_m,
            trace_file: &cli.trace_file,
        })
    );

    let trace = CacheTraceReader::open(&cli.trace_file)?;
    let mut hierarchy = CacheHierarchy::new(
        cli.block_size,
        cli.l1_size,
        cli.l1_assoc,
        cli.l2_size,
        cli.l2_assoc,
        cli.pref_n,
        cli.pref_m,
    );
    for rec in trace {
        hierarchy.request(rec.addr, rec.write);
    }

    print!("{}", report::cache_contents(&hierarchy));
    print!("{}", report::cache_measurements(&hierarchy.stats, hierarchy.has_l2()));

    if cli.json {
        println!(
            "{}",
            serde_json::to_string(&hierarchy.stats).map_err(|e| SimError::Usage(e.to_string()))?
        );
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
