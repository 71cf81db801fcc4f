//! mcsim — synthesize a mixed-criticality task set and simulate it under
//! EDF+SRP scheduling.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mcsim::{synthesize, Config, Rng, SimParams, Simulator};

/// Synthesize a mixed-criticality task set and simulate EDF+SRP scheduling.
#[derive(Parser)]
#[command(name = "mcsim")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// PRNG seed override (defaults to the seed in the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Output path for the schedule artifact.
    #[arg(long, value_name = "PATH", default_value = "schedule.json")]
    output: PathBuf,

    /// Print the full event trace to stderr.
    #[arg(long)]
    dump_trace: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(&cli.config)?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut rng = Rng::new(config.seed);
    let (tasks, resources) = synthesize(&config, &mut rng)?;

    info!(seed = config.seed, tasks = tasks.len(), resources = resources.len(), "synthesized");
    for task in &tasks {
        info!(
            task = task.id.0,
            criticality = ?task.criticality,
            period = task.period,
            wcet1 = task.wcet1,
            wcet2 = task.wcet2,
            utilization = task.utilization(),
            priority = task.priority,
            preemption_level = task.preemption_level,
            sections = task.critical_sections.len(),
            "task"
        );
    }
    for resource in &resources {
        info!(
            resource = resource.id.0,
            ceiling = resource.ceiling,
            tasks = ?resource.tasks,
            "resource"
        );
    }

    let params = SimParams {
        sim_time: config.simulation_time,
        dt: config.time_step,
        seed: config.seed,
    };
    let result = Simulator::new(tasks, params).run();

    if cli.dump_trace {
        result.trace.dump();
    }
    println!("{}", result.trace.summary());

    let file = File::create(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    result
        .schedule
        .write_json(file)
        .context("failed to write schedule artifact")?;
    info!(path = %cli.output.display(), "wrote schedule");

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
