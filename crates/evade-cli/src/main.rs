//! Evade CLI - headless evasion scanner runs.
//!
//! - `evade run` - simulate a scenario and report where the agent went
//! - `evade check` - validate a scenario file
//! - `evade sample` - dump a blue-noise sample set

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};
use evade_core::PoissonDiscSampler;
use tracing_subscriber::{fmt, EnvFilter};

mod scenario;
mod sim;

use scenario::Scenario;
use sim::{Simulation, Summary};

#[derive(Parser)]
#[command(name = "evade")]
#[command(about = "Cover-seeking evasion scanner", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a scenario
    Run {
        /// Scenario YAML file
        scenario: PathBuf,

        /// Override the scenario duration in seconds
        #[arg(long)]
        seconds: Option<f64>,

        /// Override the fixed step in seconds
        #[arg(long)]
        dt: Option<f32>,

        /// Override the sampler seed
        #[arg(long)]
        seed: Option<u64>,

        /// Record scan trace lines
        #[arg(long)]
        trace: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a scenario file
    Check {
        /// Scenario YAML file
        scenario: PathBuf,
    },

    /// Print one blue-noise sample set
    Sample {
        #[arg(long, default_value_t = 20.0)]
        width: f32,

        #[arg(long, default_value_t = 20.0)]
        height: f32,

        #[arg(long, default_value_t = 1.5)]
        spacing: f32,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Print the points as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            seconds,
            dt,
            seed,
            trace,
            json,
        } => run_scenario(&scenario, seconds, dt, seed, trace, json),
        Commands::Check { scenario } => check_scenario(&scenario),
        Commands::Sample {
            width,
            height,
            spacing,
            seed,
            json,
        } => print_samples(width, height, spacing, seed, json),
    }
}

fn run_scenario(
    path: &PathBuf,
    seconds: Option<f64>,
    dt: Option<f32>,
    seed: Option<u64>,
    trace: bool,
    json: bool,
) -> Result<()> {
    let mut scenario = Scenario::load(path)?;
    if let Some(dt) = dt {
        scenario.dt = dt;
    }
    if let Some(seed) = seed {
        scenario.seed = seed;
    }
    let duration = seconds.unwrap_or(scenario.duration);

    tracing::info!(
        scenario = scenario.display_name(),
        seed = scenario.seed,
        duration,
        "Starting simulation"
    );

    let mut sim = Simulation::new(&scenario)?;
    if trace {
        sim = sim.with_trace();
    }
    let summary = sim.run_for(duration);
    if let Some(log) = sim.last_trace() {
        tracing::debug!(t = log.time, lines = log.lines.len(), "last scan trace");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!("Scenario: {} (seed {})", summary.scenario, summary.seed);
    println!("Frames:   {}", summary.frames);
    println!("Scans:    {}", summary.scans);
    println!("Repaths:  {}", summary.dispatches.len());
    for d in &summary.dispatches {
        println!(
            "  t={:>6.2}  ({:>6.2}, {:>6.2}, {:>6.2})  score {:>8.1}{}",
            d.time,
            d.destination.x,
            d.destination.y,
            d.destination.z,
            d.score,
            if d.cover { "  cover" } else { "" }
        );
    }
    println!(
        "Agent:    ({:.2}, {:.2}, {:.2})",
        summary.agent.x, summary.agent.y, summary.agent.z
    );
    if let Some(threat) = summary.threat {
        println!(
            "Threat:   ({:.2}, {:.2}, {:.2})",
            threat.x, threat.y, threat.z
        );
    }
    if summary.trace_lines > 0 {
        println!("Trace:    {} lines", summary.trace_lines);
    }
    println!(
        "Covered:  {:.0}% of frames{}",
        summary.covered_ratio * 100.0,
        if summary.covered_at_end {
            ", in cover at end"
        } else {
            ""
        }
    );
}

fn check_scenario(path: &PathBuf) -> Result<()> {
    let scenario = Scenario::load(path)?;
    scenario.validate()?;
    println!(
        "{}: ok ({} obstacles, {} floor rects, threat: {})",
        scenario.display_name(),
        scenario.obstacles.len(),
        scenario.floor.len(),
        if scenario.threat.is_some() { "yes" } else { "no" }
    );
    Ok(())
}

fn print_samples(width: f32, height: f32, spacing: f32, seed: u64, json: bool) -> Result<()> {
    ensure!(
        spacing.is_finite() && spacing > 0.0,
        "spacing must be positive, got {spacing}"
    );
    let points = PoissonDiscSampler::new(seed).samples(width, height, spacing);
    tracing::debug!(count = points.len(), "sampled");

    if json {
        println!("{}", serde_json::to_string(&points)?);
    } else {
        for p in &points {
            println!("{:.3} {:.3}", p.x, p.y);
        }
    }
    Ok(())
}
