use clap::{Parser, Subcommand};
use sc_app::{AppResult, Driver, RunLog, RunProgress, Simulation, SweepReport};
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sc-cli")]
#[command(about = "Solar car race-day energy simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file and its model pipeline
    Validate {
        /// Path to the scenario YAML file
        scenario: PathBuf,
    },
    /// Run one race day
    Run {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Parameters to log, overriding the scenario (comma separated)
        #[arg(long, value_delimiter = ',')]
        log: Vec<String>,
        /// Print every logged step, not just the summary
        #[arg(long)]
        steps: bool,
        /// Stop after this many steps
        #[arg(long)]
        max_steps: Option<u64>,
        /// Write the run log as YAML
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Grid search over parameter ranges
    Sweep {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Extra axis as name:start:stop:step:unit (repeatable)
        #[arg(long = "axis")]
        axes: Vec<String>,
        /// Ignore the sweep entries in the scenario file
        #[arg(long)]
        only_cli_axes: bool,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario } => cmd_validate(&scenario),
        Commands::Run {
            scenario,
            log,
            steps,
            max_steps,
            output,
        } => cmd_run(&scenario, log, steps, max_steps, output.as_deref()),
        Commands::Sweep {
            scenario,
            axes,
            only_cli_axes,
        } => cmd_sweep(&scenario, &axes, only_cli_axes),
    }
}

fn cmd_validate(path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", path.display());
    let scenario = sc_project::load_yaml(path)?;
    let sim = Simulation::from_scenario(&scenario)?;
    let steps = Driver::step_count(&sim.vehicle)?;
    println!("✓ Scenario '{}' is valid", sim.name);
    println!("  Pipeline: {}", sim.vehicle.model_names().join(" -> "));
    println!("  Start: {}", sim.driver.start());
    println!("  Steps: {}", steps);
    println!("  Weather: {}", if sim.driver.has_weather() { "yes" } else { "no" });
    if !sim.sweep.is_empty() {
        println!("  Sweep entries: {}", sim.sweep.len());
    }
    Ok(())
}

fn cmd_run(
    path: &Path,
    log: Vec<String>,
    steps: bool,
    max_steps: Option<u64>,
    output: Option<&Path>,
) -> AppResult<()> {
    let mut sim = Simulation::load(path)?;
    if !log.is_empty() {
        sim.set_log(log);
    }
    println!("Running scenario: {}", sim.name);

    let run_log = sim.run_with_progress(&mut |event| {
        render_progress(event);
        match max_steps {
            Some(max) if event.step >= max => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    })?;
    clear_progress_line();

    if steps {
        print_rows(&run_log);
    }
    print_summary(&run_log);

    if let Some(out) = output {
        run_log.save_yaml(out)?;
        tracing::debug!(path = %out.display(), rows = run_log.rows.len(), "run log written");
        println!("✓ Log written to {}", out.display());
    }
    Ok(())
}

fn cmd_sweep(path: &Path, axes: &[String], only_cli_axes: bool) -> AppResult<()> {
    let mut sim = Simulation::load(path)?;
    if only_cli_axes {
        sim.sweep.clear();
    }
    println!("Grid search for scenario: {}", sim.name);
    let report = sim.sweep(axes)?;
    print_sweep(&report);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_progress(event: &RunProgress) {
    let width = 28usize;
    let filled = ((event.fraction_complete() * width as f64).round() as usize).min(width);
    print!(
        "\r[{}{}] {:>6.2}%  {}  step={}/{}  energy={:.1} Wh",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled)),
        event.fraction_complete() * 100.0,
        event.time.format("%H:%M"),
        event.step,
        event.total_steps,
        event.total_energy_wh,
    );
    let _ = io::stdout().flush();
}

fn print_rows(log: &RunLog) {
    let header: Vec<String> = log
        .columns
        .iter()
        .zip(&log.units)
        .map(|(name, unit)| match unit {
            Some(u) => format!("{name} [{u}]"),
            None => name.clone(),
        })
        .collect();
    println!("{:>5}  {:<19}  {}", "step", "time", header.join("  "));
    for row in &log.rows {
        let cells: Vec<String> = row
            .values
            .iter()
            .zip(&header)
            .map(|(v, h)| match v {
                Some(v) => format!("{:>w$.3}", v, w = h.len()),
                None => format!("{:>w$}", "-", w = h.len()),
            })
            .collect();
        println!("{:>5}  {:<19}  {}", row.step, row.time.to_string(), cells.join("  "));
    }
}

fn print_summary(log: &RunLog) {
    let s = &log.summary;
    println!("✓ Run completed{}", if log.stopped_early { " (stopped early)" } else { "" });
    println!("  Steps: {}", s.steps);
    println!("  Final energy: {:.1} Wh", s.final_energy_wh);
    println!("  Min / max energy: {:.1} / {:.1} Wh", s.min_energy_wh, s.max_energy_wh);
    println!(
        "  Clamped: {} empty ({:.1} Wh unmet), {} full ({:.1} Wh clipped)",
        s.empty_clamps, s.unmet_demand_wh, s.full_clamps, s.clipped_surplus_wh
    );
    if !log.flagged.is_empty() {
        let names: Vec<&str> = log.flagged.iter().map(String::as_str).collect();
        println!("  Flagged parameters (not in store): {}", names.join(", "));
    }
}

fn print_sweep(report: &SweepReport) {
    println!(
        "{:<40}  {:>12}  {:>12}  {:>6}  {:>6}",
        "configuration", "final [Wh]", "min [Wh]", "empty", "full"
    );
    for outcome in &report.outcomes {
        let config = outcome.configuration.to_string();
        match &outcome.result {
            Ok(log) => {
                let s = &log.summary;
                println!(
                    "{:<40}  {:>12.1}  {:>12.1}  {:>6}  {:>6}",
                    config, s.final_energy_wh, s.min_energy_wh, s.empty_clamps, s.full_clamps
                );
            }
            Err(e) => println!("{:<40}  failed: {}", config, e),
        }
    }
    let failed = report.failed().count();
    println!(
        "✓ {} configurations, {} failed",
        report.outcomes.len(),
        failed
    );
}
