use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "folio", version)]
struct Cli {
    /// Log engine events to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a page scenario and print its snapshots as JSON.
    Simulate(SimulateArgs),
    /// Print the eased count-up trace of a single counter.
    Counter(CounterArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine config JSON; overrides the scenario's own config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a snapshot after every event instead of only the last one.
    #[arg(long, default_value_t = false)]
    trace: bool,
}

#[derive(Parser, Debug)]
struct CounterArgs {
    /// Final value.
    #[arg(long)]
    target: u64,

    #[arg(long, default_value_t = folio::COUNT_DURATION_MS)]
    duration_ms: u64,

    /// Frame spacing of the trace.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Counter(args) => cmd_counter(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let scenario = folio::PageScenario::from_path(&args.in_path)
        .with_context(|| format!("load scenario '{}'", args.in_path.display()))?;
    let config = args
        .config
        .as_ref()
        .map(|p| {
            folio::EngineConfig::from_path(p)
                .with_context(|| format!("load config '{}'", p.display()))
        })
        .transpose()?;

    let snapshots = scenario.run(config, args.trace)?;
    let out = if args.trace {
        serde_json::to_string_pretty(&snapshots)
    } else {
        serde_json::to_string_pretty(&snapshots.last())
    }
    .context("serialize snapshots")?;
    println!("{out}");

    eprintln!(
        "played {} events from {}",
        scenario.events.len(),
        args.in_path.display()
    );
    Ok(())
}

fn cmd_counter(args: CounterArgs) -> anyhow::Result<()> {
    let points = folio::counter_trace(args.target, args.duration_ms, args.frame_ms)?;
    let out = serde_json::to_string_pretty(&points).context("serialize counter trace")?;
    println!("{out}");
    Ok(())
}
