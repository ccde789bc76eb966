//! session-risk: batch front end for the scoring and routing pipeline.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use session_risk_lib::simulation::{read_json_records, score_lines};
use session_risk_lib::{run_simulation, write_report, InvalidRecordPolicy, SimulationConfig};

#[derive(Parser)]
#[command(name = "session-risk")]
#[command(about = "Score content sessions and suggest reversible, review-first actions", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a demo report from session and event CSV files
    Simulate(SimulateArgs),
    /// Score JSON-lines records and print one flat decision per line, tagged with its source line
    Score(ScoreArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// JSON configuration file
    #[arg(short, long, env = "SESSION_RISK_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the sessions CSV
    #[arg(long)]
    sessions: Option<PathBuf>,

    /// Path to the events CSV
    #[arg(long)]
    events: Option<PathBuf>,

    /// Output JSON path
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of sessions to include in the demo output
    #[arg(short, long)]
    n: Option<usize>,

    /// Sampling seed for demo selection
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for batch evaluation
    #[arg(long)]
    threads: Option<usize>,

    /// What to do with malformed rows (skip, halt)
    #[arg(long)]
    on_invalid: Option<InvalidRecordPolicy>,
}

#[derive(Args)]
struct ScoreArgs {
    /// JSON-lines input file; reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// What to do with malformed records (skip, halt)
    #[arg(long, default_value = "skip")]
    on_invalid: InvalidRecordPolicy,

    /// Worker threads for batch evaluation
    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Score(args) => score(args),
    }
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(path) = args.sessions {
        config.sessions_path = path;
    }
    if let Some(path) = args.events {
        config.events_path = path;
    }
    if let Some(path) = args.out {
        config.output_path = path;
    }
    if let Some(n) = args.n {
        config.demo_size = n;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(threads) = args.threads {
        config.max_parallel_cases = threads;
    }
    if let Some(policy) = args.on_invalid {
        config.on_invalid = policy;
    }

    info!(
        "Simulating {} sessions from {} (seed {}, on_invalid={})",
        config.demo_size,
        config.sessions_path.display(),
        config.seed,
        config.on_invalid
    );
    let report = run_simulation(&config).context("running simulation")?;
    write_report(&config.output_path, &report).context("writing report")?;
    println!("Wrote demo output: {}", config.output_path.display());
    Ok(())
}

fn score(args: ScoreArgs) -> Result<()> {
    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let records = read_json_records(reader, args.on_invalid).context("reading records")?;
    let scored = score_lines(&records, args.threads)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in &scored {
        serde_json::to_writer(&mut out, line)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    info!("Scored {} records", scored.len());
    Ok(())
}
