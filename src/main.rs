use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;

use iptgen::orchestrator::{run_batch, CompileOptions, UnreachablePolicy};

/// Compile network scenarios into per-router iptables rule sets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing scenario files (<id>.json, <id>.yaml)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory; rule sets are written to <output>/<scenario id>/<router id>
    #[arg(short, long)]
    output: PathBuf,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// How to handle communications between disconnected subnets
    #[arg(long, value_enum, default_value_t = UnreachablePolicy::Abort)]
    on_unreachable: UnreachablePolicy,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    info!("Input directory: {:?}", args.input);
    info!("Output directory: {:?}", args.output);

    let options = CompileOptions {
        jobs: args.jobs,
        unreachable: args.on_unreachable,
    };

    let report = run_batch(&args.input, &args.output, &options)?;

    let rules: usize = report.succeeded.iter().map(|s| s.rules).sum();
    let skipped: usize = report.succeeded.iter().map(|s| s.skipped).sum();
    info!(
        "Compiled {} of {} scenarios ({} rules)",
        report.succeeded.len(),
        report.total(),
        rules
    );
    if skipped > 0 {
        warn!("{} unreachable communications were skipped", skipped);
    }

    if !report.is_success() {
        let ids: Vec<String> = report.failed.iter().map(|f| f.id.to_string()).collect();
        return Err(eyre!(
            "{} scenario(s) failed: {}",
            report.failed.len(),
            ids.join(", ")
        ));
    }

    Ok(())
}
