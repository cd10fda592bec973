use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use trajdiff_dtw::{CostModel, PositionTerm};
use trajdiff_io::{ExperimentName, ReportWriter, SourceManifest, TraceReader, load_sources};
use trajdiff_metrics::{AnalysisConfig, ErrorReport, GridStrategy, ParamRange, PhaseSearchConfig};
use trajdiff_scenario::{Location, Replay, ReplayTrace, ScenarioDescription};

#[derive(Parser)]
#[command(name = "trajdiff")]
#[command(about = "Trajectory alignment and discrepancy scoring across co-simulation sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Alignment and phase search parameters.
#[derive(Args, Debug, Clone)]
struct AnalysisArgs {
    /// Local DTW cost: "derivative-mismatch" or "squared-difference"
    #[arg(long, default_value = "derivative-mismatch")]
    cost: String,

    /// Position term in the DTW cost: "index" (DP indices) or "time" (timestamps)
    #[arg(long, default_value = "index")]
    position_term: String,

    /// Common grid: "reference" (reference timestamps) or "sample-count"
    /// (each source stretched to the reference sample count)
    #[arg(long, default_value = "reference")]
    grid: String,

    /// First acceptable-offset candidate
    #[arg(long, default_value_t = 1.0)]
    c_start: f64,

    /// Last acceptable-offset candidate
    #[arg(long, default_value_t = 60.0)]
    c_end: f64,

    /// Number of acceptable-offset candidates
    #[arg(long, default_value_t = 100)]
    c_steps: usize,

    /// First sensitivity candidate
    #[arg(long, default_value_t = 1.0)]
    r_start: f64,

    /// Last sensitivity candidate
    #[arg(long, default_value_t = 60.0)]
    r_end: f64,

    /// Number of sensitivity candidates
    #[arg(long, default_value_t = 100)]
    r_steps: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Align every source of a manifest and score each quantity and pair
    Compare {
        /// Path to the JSON source manifest
        #[arg(long)]
        manifest: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Also write the aligned dataset
        #[arg(long, default_value_t = false)]
        fused: bool,

        /// Print a JSON summary instead of the report tables
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Print the U-turn scenario description
    Scenario {
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Replay a logged trace through the U-turn control schedule
    Replay {
        /// Path to a metrics log CSV (velocity and time_step columns)
        #[arg(long)]
        trace: PathBuf,

        /// Keep only rows whose actor_type equals this blueprint
        #[arg(long, default_value = "vehicle.mercedes.coupe_2020")]
        actor_type: String,

        /// Do not filter rows by actor_type
        #[arg(long, default_value_t = false)]
        all_rows: bool,

        /// Traffic light position "X,Y" in the simulator frame (repeatable)
        #[arg(long = "light", value_parser = parse_light)]
        lights: Vec<Location>,

        /// Write the replayed metrics log into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct CompareOutput {
    experiment: String,
    reference: String,
    sources: Vec<String>,
    comparisons: usize,
    failures: usize,
    artifacts: Vec<PathBuf>,
}

#[derive(Serialize)]
struct ReplayOutput {
    actor_type: String,
    ticks: usize,
    distance: f64,
    transitions: Vec<trajdiff_scenario::Transition>,
    light_changes: Vec<trajdiff_scenario::LightChange>,
    metrics_log: Option<PathBuf>,
}

fn parse_cost(s: &str) -> Result<CostModel> {
    match s {
        "derivative-mismatch" => Ok(CostModel::DerivativeMismatch),
        "squared-difference" => Ok(CostModel::SquaredDifference),
        other => anyhow::bail!(
            "unknown cost: {other} (expected derivative-mismatch or squared-difference)"
        ),
    }
}

fn parse_position_term(s: &str) -> Result<PositionTerm> {
    match s {
        "index" => Ok(PositionTerm::DpIndex),
        "time" => Ok(PositionTerm::Timestamp),
        other => anyhow::bail!("unknown position term: {other} (expected index or time)"),
    }
}

fn parse_grid(s: &str) -> Result<GridStrategy> {
    match s {
        "reference" => Ok(GridStrategy::ReferenceTimes),
        "sample-count" => Ok(GridStrategy::SampleCount),
        other => anyhow::bail!("unknown grid: {other} (expected reference or sample-count)"),
    }
}

fn parse_light(s: &str) -> Result<Location> {
    let Some((x, y)) = s.split_once(',') else {
        anyhow::bail!("invalid light: {s} (expected X,Y)");
    };
    let x: f64 = x.trim().parse().with_context(|| format!("invalid light x: {x}"))?;
    let y: f64 = y.trim().parse().with_context(|| format!("invalid light y: {y}"))?;
    Ok(Location::new(x, y, 0.0))
}

fn build_config(args: &AnalysisArgs) -> Result<AnalysisConfig> {
    let c_range = ParamRange::new(args.c_start, args.c_end, args.c_steps)
        .context("invalid acceptable-offset range")?;
    let r_range = ParamRange::new(args.r_start, args.r_end, args.r_steps)
        .context("invalid sensitivity range")?;
    let phase = PhaseSearchConfig::new(c_range, r_range)?;
    Ok(AnalysisConfig::default()
        .with_cost(parse_cost(&args.cost)?)
        .with_position_term(parse_position_term(&args.position_term)?)
        .with_grid_strategy(parse_grid(&args.grid)?)
        .with_phase_search(phase))
}

fn print_scenario(scenario: &ScenarioDescription) {
    println!(
        "{:<30} {:<8} {:>9} {:>9} {:>6} {:>7} {:>9} {:>9} {:>9} {:>7} {:<20}",
        "blueprint", "id", "x", "y", "z", "yaw", "throttle", "sumo_x", "sumo_y", "angle", "sumo_type"
    );
    for actor in scenario.actors() {
        let (sumo_x, sumo_y) = actor.traffic_position(&scenario.frame);
        println!(
            "{:<30} {:<8} {:>9.2} {:>9.2} {:>6.2} {:>7.1} {:>9.2} {:>9.2} {:>9.2} {:>7.1} {:<20}",
            actor.blueprint,
            actor.sumo_id,
            actor.spawn.x,
            actor.spawn.y,
            actor.spawn.z,
            actor.rotation.yaw,
            actor.initial_control.throttle,
            sumo_x,
            sumo_y,
            ScenarioDescription::traffic_heading(actor.rotation.yaw),
            actor.traffic_type(),
        );
    }
    println!();
    println!(
        "{} steps of {} s ({:.3} s)",
        scenario.steps,
        scenario.step_length,
        scenario.duration()
    );
    println!(
        "lights: yellow within {} m, green within {} m",
        scenario.lights.yellow_within(),
        scenario.lights.green_within()
    );
    println!("{:>10} {:>9} {:>7} {:>7}", "trigger_m", "throttle", "steer", "brake");
    for stage in scenario.schedule.stages() {
        println!(
            "{:>10.1} {:>9.2} {:>7.2} {:>7.2}",
            stage.trigger, stage.control.throttle, stage.control.steer, stage.control.brake
        );
    }
}

fn summarize(
    experiment: String,
    report: &ErrorReport,
    artifacts: Vec<PathBuf>,
) -> CompareOutput {
    CompareOutput {
        experiment,
        reference: report.reference().to_string(),
        sources: report.sources().iter().map(ToString::to_string).collect(),
        comparisons: report.rows().len(),
        failures: report.failure_count(),
        artifacts,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Compare {
            manifest,
            experiment,
            output_dir,
            fused,
            json,
            analysis,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let config = build_config(&analysis)?;

            // 1. Load every source
            let manifest = SourceManifest::from_path(&manifest)
                .with_context(|| format!("failed to read manifest {}", manifest.display()))?;
            let traces = load_sources(&manifest).context("failed to load sources")?;
            info!(n_sources = traces.len(), reference = %manifest.reference, "sources loaded");

            // 2. Align and score
            let aligned = config
                .align_sources(&manifest.reference, &traces)
                .context("failed to align sources")?;
            let report = config.compare(&aligned);
            info!(
                comparisons = report.rows().len(),
                failures = report.failure_count(),
                "comparison complete"
            );

            // 3. Write artifacts
            let writer = ReportWriter::new(&output_dir, experiment_name)?;
            let mut artifacts = vec![
                writer.write_report(&report, &config)?,
                writer.write_discrepancy_csv(&report)?,
                writer.write_phase_csv(&report)?,
            ];
            if fused {
                artifacts.push(writer.write_fused(&aligned)?);
            }

            // 4. Print summary
            if json {
                let output = summarize(experiment, &report, artifacts);
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{report}");
            }
        }

        Command::Scenario { json } => {
            let scenario = ScenarioDescription::u_turn();
            if json {
                println!("{}", serde_json::to_string_pretty(&scenario)?);
            } else {
                print_scenario(&scenario);
            }
        }

        Command::Replay {
            trace,
            actor_type,
            all_rows,
            lights,
            output_dir,
            json,
        } => {
            let table = TraceReader::new(&trace)
                .read()
                .with_context(|| format!("failed to read trace {}", trace.display()))?;
            let table = if all_rows {
                table
            } else {
                table.filter_eq("actor_type", &actor_type)?
            };
            info!(rows = table.len(), "trace loaded");

            let replay_trace = ReplayTrace::from_table(&table, actor_type.clone())
                .context("failed to build replay trace")?;
            let scenario = ScenarioDescription::u_turn();
            let outcome = Replay::new(&scenario.schedule)
                .with_traffic_lights(scenario.lights, lights)
                .run(&replay_trace);

            let ticks = outcome.log.len();
            let metrics_log = match output_dir {
                Some(dir) => Some(outcome.log.export(&dir)?),
                None => None,
            };

            if json {
                let output = ReplayOutput {
                    actor_type,
                    ticks,
                    distance: outcome.distance,
                    transitions: outcome.transitions,
                    light_changes: outcome.light_changes,
                    metrics_log,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{ticks} ticks, {:.3} m travelled", outcome.distance);
                println!("{:>6} {:>9} {:>10} {:>6} {:>9} {:>7} {:>7}", "step", "time_s", "distance_m", "stage", "throttle", "steer", "brake");
                for t in &outcome.transitions {
                    let stage = t.stage.map_or_else(|| "-".to_string(), |k| k.to_string());
                    println!(
                        "{:>6} {:>9.3} {:>10.3} {:>6} {:>9.2} {:>7.2} {:>7.2}",
                        t.step, t.time, t.distance, stage, t.control.throttle, t.control.steer, t.control.brake
                    );
                }
                if !outcome.light_changes.is_empty() {
                    println!();
                    println!("{:>6} {:>6} {:>10} {:>7}", "step", "light", "distance_m", "state");
                    for c in &outcome.light_changes {
                        println!("{:>6} {:>6} {:>10.3} {:>7}", c.step, c.light, c.distance, format!("{:?}", c.state));
                    }
                }
            }
        }
    }

    Ok(())
}
