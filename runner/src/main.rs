use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use mlfq_scheduler::metrics::Summary;
use mlfq_scheduler::recorder::{RunLog, Timeline};
use mlfq_scheduler::{
    build_processes, fcfs, mlfq, round_robin, MlfqScheduler, Schedule, Scheduler, Timestamp,
    Workload,
};

mod report;

#[derive(Parser)]
#[command(name = "mlfq")]
#[command(version)]
#[command(about = "Multilevel feedback queue scheduling simulator")]
struct Cli {
    #[command(subcommand)]
    command: SubCmd,

    /// Enable verbose output, including the engine's state transitions.
    /// Specify multiple times to increase verbosity.
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum SubCmd {
    /// Simulate a workload and print the Gantt chart, queue log and metrics
    Run(RunArgs),

    /// Print the built-in sample workload as JSON
    Sample,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Mlfq,
    Rr,
    Fcfs,
}

impl Algorithm {
    fn scheduler(self, workload: &Workload, args: &RunArgs) -> Result<Box<dyn Scheduler>> {
        let scheduler: Box<dyn Scheduler> = match self {
            Algorithm::Mlfq => {
                let config = workload.config.clone();
                match args.levels {
                    Some(levels) => Box::new(MlfqScheduler::with_levels(levels, config)?),
                    None => Box::new(mlfq(config)?),
                }
            }
            Algorithm::Rr => Box::new(round_robin(args.quantum)),
            Algorithm::Fcfs => Box::new(fcfs()),
        };
        Ok(scheduler)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
struct RunArgs {
    /// Scheduling policy to simulate
    #[arg(long, value_enum, default_value_t = Algorithm::Mlfq)]
    algorithm: Algorithm,

    /// Workload JSON file, see `mlfq sample` for the format
    #[arg(long, conflicts_with = "workload_json")]
    workload: Option<PathBuf>,

    /// Workload given inline as JSON
    #[arg(long)]
    workload_json: Option<String>,

    /// Time quantum of the round robin baseline
    #[arg(long, default_value = "2")]
    quantum: NonZeroUsize,

    /// Number of MLFQ levels the quanta must describe
    #[arg(long)]
    levels: Option<usize>,

    /// Per-level quanta, lowest level first (overrides the workload)
    #[arg(long, value_delimiter = ',')]
    quanta: Option<Vec<usize>>,

    /// Aging threshold in ticks (overrides the workload)
    #[arg(long)]
    aging_threshold: Option<usize>,

    /// Stop the simulation at this tick (overrides the workload)
    #[arg(long)]
    time_ceiling: Option<usize>,

    /// Number of CPU portions a burst is split into by I/O (overrides the
    /// workload)
    #[arg(long)]
    io_portions: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    algorithm: &'a str,
    timeline: &'a Timeline,
    log: &'a RunLog,
    finished_at: Timestamp,
    truncated: bool,
    metrics: &'a Summary,
}

fn init_logging(verbose: u8) -> Result<()> {
    let llv = match verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

fn load_workload(args: &RunArgs) -> Result<Workload> {
    let mut workload = if let Some(path) = &args.workload {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read workload {}", path.display()))?;
        Workload::parse(&content)
            .with_context(|| format!("Failed to parse workload {}", path.display()))?
    } else if let Some(json) = &args.workload_json {
        Workload::parse(json).context("Failed to parse inline workload")?
    } else {
        info!("No workload given, using the built-in sample");
        Workload::sample()
    };

    if let Some(quanta) = &args.quanta {
        workload.config.level_quanta = quanta.clone();
    }
    if let Some(aging_threshold) = args.aging_threshold {
        workload.config.aging_threshold = aging_threshold;
    }
    if let Some(time_ceiling) = args.time_ceiling {
        workload.config.time_ceiling = time_ceiling;
    }
    if let Some(io_portions) = args.io_portions {
        workload.config.io_portions = io_portions;
    }

    Ok(workload)
}

fn run(args: RunArgs) -> Result<()> {
    let workload = load_workload(&args)?;
    let mut scheduler = args.algorithm.scheduler(&workload, &args)?;
    let mut procs = build_processes(&workload.processes);

    let schedule: Schedule = scheduler
        .schedule(&mut procs)
        .with_context(|| format!("{} simulation failed", scheduler.name()))?;
    let summary = Summary::collect(&procs);

    match args.format {
        Format::Text => {
            // baselines have no ceiling, show the whole run
            let horizon = match args.algorithm {
                Algorithm::Mlfq => workload.config.time_ceiling,
                _ => schedule.finished_at.get(),
            };
            print!(
                "{}",
                report::render(scheduler.name(), &schedule, &summary, horizon)
            );
        }
        Format::Json => {
            let report = JsonReport {
                algorithm: scheduler.name(),
                timeline: &schedule.timeline,
                log: &schedule.log,
                finished_at: schedule.finished_at,
                truncated: schedule.truncated,
                metrics: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        SubCmd::Run(args) => run(args),
        SubCmd::Sample => {
            println!("{}", serde_json::to_string_pretty(&Workload::sample())?);
            Ok(())
        }
    }
}
