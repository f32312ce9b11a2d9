//! Temporal Imprint CLI
//!
//! Runs, inspects and compares imprint scenarios.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use console::style;
use imprint_replay::{Anchor, EffectIntent};
use imprint_sim::{RunComparison, Scenario, SimHarness, SimRecord};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imprint")]
#[command(about = "Temporal imprint engine - record, replay and invert combat timelines", long_about = None)]
struct Cli {
    /// Log engine lifecycle events (overridden by RUST_LOG)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print every pipeline call
    Run {
        /// Path to scenario file
        #[arg(short, long)]
        scenario: PathBuf,
        /// Emit the full record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a scenario and summarise it
    Inspect {
        /// Path to scenario file
        #[arg(short, long)]
        scenario: PathBuf,
    },
    /// Compare two records written by `run --json`
    Diff {
        /// Expected record
        #[arg(long)]
        left: PathBuf,
        /// Actual record
        #[arg(long)]
        right: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Run { scenario, json } => run(&scenario, json),
        Commands::Inspect { scenario } => inspect(&scenario),
        Commands::Diff { left, right } => diff(&left, &right),
    }
}

fn init_tracing(verbose: u8, format: LogFormat) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    Scenario::load(path).wrap_err_with(|| format!("could not load scenario {}", path.display()))
}

fn run(path: &Path, json: bool) -> Result<()> {
    let scenario = load_scenario(path)?;
    let result = SimHarness::run(&scenario)?;
    tracing::info!(
        scenario = %scenario.name,
        ticks = result.ticks_executed,
        calls = result.record.call_count(),
        "run finished"
    );

    if json {
        println!("{}", result.record.to_json_pretty());
        return Ok(());
    }

    for line in render_record(&result.record) {
        println!("{line}");
    }
    println!();
    println!(
        "{} ticks, {} calls, {} echoes spawned, {} destroyed, {} commands refused, {} skipped",
        result.ticks_executed,
        result.record.call_count(),
        result.echoes_spawned,
        result.echoes_destroyed,
        result.commands_refused,
        result.commands_skipped,
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let scenario = load_scenario(path)?;
    let name = if scenario.name.is_empty() { "(unnamed)" } else { scenario.name.as_str() };

    println!("{} {}", style("scenario").bold(), name);
    println!("  step      {}s x {} ticks ({}s)", scenario.dt, scenario.tick_count(), scenario.duration);
    println!("  actors    {}", scenario.actors.join(", "));
    match scenario.config.max_recursion_depth {
        Some(cap) => println!("  recursion capped at {cap}"),
        None => println!("  recursion uncapped"),
    }
    println!("  echo health default {}", scenario.config.echo_default_health);

    println!("{}", style("commands").bold());
    for (index, timed) in scenario.ordered_commands() {
        println!("  {:>8.3}s  #{index:<3} {}", timed.at, timed.command.op());
    }
    Ok(())
}

fn diff(left: &Path, right: &Path) -> Result<()> {
    let expected = read_record(left)?;
    let actual = read_record(right)?;
    let comparison = RunComparison::compare(&expected, &actual);
    print!("{}", comparison.report());
    if !comparison.identical {
        println!();
        bail!("records differ in {} places", comparison.delta_count());
    }
    println!();
    Ok(())
}

fn read_record(path: &Path) -> Result<SimRecord> {
    let json = std::fs::read_to_string(path).wrap_err_with(|| format!("could not read {}", path.display()))?;
    SimRecord::from_json(&json).wrap_err_with(|| format!("{} is not a run record", path.display()))
}

/// One line per call and per echo exit, in tick order
fn render_record(record: &SimRecord) -> Vec<String> {
    let mut lines = Vec::with_capacity(record.entries.len() + record.exits.len());
    let mut exits = record.exits.iter().peekable();

    for entry in &record.entries {
        while let Some(exit) = exits.next_if(|exit| exit.tick < entry.tick) {
            lines.push(render_exit(exit.tick, exit.time, &exit.echo, &exit.lifecycle.to_string()));
        }
        lines.push(format!(
            "[{:>5}] {:>8.3}s  {:<12} -> {:<10} {}",
            entry.tick,
            entry.time,
            format!("{:?}", entry.call.kind),
            entry.call.target,
            describe(&entry.call.intent)
        ));
    }
    for exit in exits {
        lines.push(render_exit(exit.tick, exit.time, &exit.echo, &exit.lifecycle.to_string()));
    }
    lines
}

fn render_exit(tick: u64, time: f64, echo: &str, lifecycle: &str) -> String {
    format!("[{tick:>5}] {time:>8.3}s  {} {echo} ({lifecycle})", style("echo gone").dim())
}

/// Payload summary for a call
fn describe(intent: &EffectIntent) -> String {
    match intent {
        EffectIntent::Damage { amount, school, .. } => format!("{amount} {school:?}"),
        EffectIntent::Heal { amount, .. } => amount.to_string(),
        EffectIntent::ApplyBuff { id, duration, .. } | EffectIntent::ApplyDebuff { id, duration, .. } => {
            format!("{} for {duration}s", id.as_str())
        }
        EffectIntent::Dot { effect, .. } | EffectIntent::Hot { effect, .. } => format!(
            "{} {}/{}s for {}s",
            effect.id.as_str(),
            effect.per_tick,
            effect.interval,
            effect.duration
        ),
        EffectIntent::SummonPet { summon, .. } => format!(
            "{} x{} within {} {}",
            summon.pet_id.as_str(),
            summon.count,
            summon.spawn_radius,
            describe_anchor(&summon.anchor)
        ),
        EffectIntent::Script { feature_id, anchor, .. } => {
            format!("{} {}", feature_id.as_str(), describe_anchor(anchor))
        }
    }
}

fn describe_anchor(anchor: &Anchor) -> String {
    match anchor {
        Anchor::Target => "at target".to_string(),
        Anchor::Recorded(p) => format!("at ({}, {}, {})", p.x, p.y, p.z),
    }
}
