// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Command-Line Runner
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Runs the causal entropic forcing agent from a JSON configuration.
//!
//! ```text
//! entropic-agent --config config.json
//! entropic-agent --config config.json --steps 20 --seed 7 --no-plot
//! ```
//!
//! Prints the start macrostate and every tick's macrostate to stdout.
//! Exit status: 0 on success, 2 when the agent reaches an invalid
//! environment state, 1 on any other failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use entropic_core::Session;
use entropic_types::{AgentConfig, EntropicError, RunReport};

#[derive(Parser, Debug)]
#[command(version, about = "Causal entropic forcing agent", long_about = None)]
struct Args {
    /// JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Override the number of control ticks.
    #[arg(long)]
    steps: Option<usize>,

    /// Override the number of sampled walks per tick.
    #[arg(long)]
    num_sample_paths: Option<usize>,

    /// Override the master seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the environment's plot hooks.
    #[arg(long)]
    no_plot: bool,

    /// Sample walks on the control thread only.
    #[arg(long)]
    sequential: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(args: &Args) -> anyhow::Result<AgentConfig> {
    let mut config = AgentConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(n) = args.num_sample_paths {
        config.num_sample_paths = n;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_plot {
        config.plot = false;
    }
    if args.sequential {
        config.parallel = false;
    }
    config.validate().context("validating overrides")?;
    Ok(config)
}

fn print_path(report: &RunReport) {
    if let Some(start) = report.path.first() {
        println!("{start:?}");
    }
    for tick in report.ticks.iter().filter(|t| t.accepted) {
        println!("{:?}", tick.macrostate);
    }
}

/// Outcome of a session that got past initialization.
struct Finished {
    report: Option<RunReport>,
    error: Option<EntropicError>,
}

fn run(args: &Args) -> anyhow::Result<Finished> {
    let config = load_config(args)?;
    let env =
        entropic_envs::resolve_with(&config.environment, config.environment_params.as_ref())?;
    let mut session = Session::initialize(config, env)?;

    let error = session.run().err();
    Ok(Finished {
        report: session.shutdown(),
        error,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let finished = match run(&args) {
        Ok(finished) => finished,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::from(1);
        }
    };

    if let Some(report) = &finished.report {
        print_path(report);
    }
    match finished.error {
        None => {
            if let Some(report) = &finished.report {
                log::info!(
                    "completed {} ticks ({} rejected microstates)",
                    report.tick_count(),
                    report.total_rejections()
                );
            }
            ExitCode::SUCCESS
        }
        Some(EntropicError::InvalidMacrostate { state, .. }) => {
            println!("{state:?}");
            eprintln!("Error: Agent in invalid environment state, {state:?}");
            ExitCode::from(2)
        }
        Some(other) => {
            eprintln!("Error: {other}");
            ExitCode::from(1)
        }
    }
}
