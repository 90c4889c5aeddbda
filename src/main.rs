use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tick_sched::sim::{RandomWorkload, workload};
use tick_sched::{Scheduler, SchedulerKind, Sim};
use tracing_subscriber::EnvFilter;

/// Simulate tick-by-tick CPU scheduling with shared resources.
#[derive(Parser)]
#[command(name = "tick_sched")]
struct Cli {
    /// Path to a JSON workload (array of jobs).
    workload: Option<PathBuf>,

    /// Scheduler: fifo, sjf, srtf, rr, prio, pa, pcp, pip.
    #[arg(short, long, default_value = "fifo")]
    scheduler: SchedulerKind,

    /// Generate N random jobs instead of reading a workload file.
    #[arg(long, value_name = "N", conflicts_with = "workload")]
    random: Option<usize>,

    /// PRNG seed for --random.
    #[arg(long, env = "TICK_SCHED_SEED", default_value_t = 0)]
    seed: u64,

    /// Longest lifespan for --random jobs.
    #[arg(long, default_value_t = 10)]
    max_lifespan: u64,

    /// Highest priority for --random jobs.
    #[arg(long, default_value_t = 20)]
    max_priority: u32,

    /// Do not print per-tick events.
    #[arg(short, long)]
    quiet: bool,

    /// Log scheduler decisions (same as RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let jobs = match (&cli.workload, cli.random) {
        (Some(path), _) => workload::load(path)
            .with_context(|| format!("failed to load workload {}", path.display()))?,
        (None, random) => RandomWorkload {
            jobs: random.unwrap_or(RandomWorkload::default().jobs),
            max_lifespan: cli.max_lifespan,
            max_priority: cli.max_priority,
            ..RandomWorkload::default()
        }
        .generate(cli.seed),
    };

    let mut sim = Sim::new(Scheduler::new(cli.scheduler), jobs)?;
    let quiet = cli.quiet;
    let report = sim.run_with(|now, events| {
        if quiet {
            return;
        }
        for event in events {
            println!("t={} {:?}", now, event);
        }
    })?;

    println!("{report}");
    Ok(())
}
