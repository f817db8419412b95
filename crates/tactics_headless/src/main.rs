//! Headless tactics battle runner.
//!
//! Plays scenarios with both sides computer-controlled and reports the
//! result. Designed for CI and for eyeballing behaviors in a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Play the built-in demo, drawing the board after every turn
//! cargo run -p tactics_headless -- demo --ascii
//!
//! # Play a scenario with a turn limit and JSON output
//! cargo run -p tactics_headless -- run --scenario scenarios/skirmish.ron --max-turns 20 --json
//!
//! # Check a scenario file without playing it
//! cargo run -p tactics_headless -- validate --scenario scenarios/skirmish.ron
//! ```
//!
//! Boards and JSON go to stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::result::Result;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tactics_core::prelude::*;
use tactics_headless::{
    ascii::{render_ascii, AsciiConfig},
    runner::{BattleRunner, RunConfig},
    scenario::{self, ScenarioError},
};

#[derive(Parser)]
#[command(name = "tactics_headless")]
#[command(about = "Headless tactics battle runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct PlayArgs {
    /// Stop after this many faction turns
    #[arg(long, default_value = "60")]
    max_turns: u32,

    /// Ticks each committed move keeps the host busy
    #[arg(long, default_value = "1")]
    ticks_per_step: u32,

    /// Draw the board after every faction turn
    #[arg(long)]
    ascii: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario file
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        #[command(flatten)]
        play: PlayArgs,
    },

    /// Load and validate a scenario file without playing it
    Validate {
        /// Scenario file to check
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// Play the built-in demo scenario
    Demo {
        #[command(flatten)]
        play: PlayArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr (stdout is for boards and JSON)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Commands::Run {
            scenario: path,
            play,
        } => scenario::load(&path).and_then(|data| cmd_play(&data, play)),
        Commands::Validate { scenario: path } => cmd_validate(&path),
        Commands::Demo { play } => scenario::demo().and_then(|data| cmd_play(&data, play)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// Play a scenario to the end and report.
fn cmd_play(data: &ScenarioData, play: PlayArgs) -> Result<(), ScenarioError> {
    let level = data.build()?;
    tracing::info!(
        scenario = %data.name,
        units = level.units().count(),
        max_turns = play.max_turns,
        "Starting battle"
    );

    let config = RunConfig {
        max_turns: play.max_turns,
        ticks_per_step: play.ticks_per_step,
        ..RunConfig::default()
    };
    let ascii = AsciiConfig::default();
    let mut runner = BattleRunner::new(data.name.clone(), level, config);

    if play.ascii {
        println!("== {} ==", data.name);
        print!("{}", render_ascii(runner.level(), &ascii));
    }
    let summary = runner.run(|runner| {
        if play.ascii {
            println!("\n-- after turn {} --", runner.turns());
            print!("{}", render_ascii(runner.level(), &ascii));
        }
    });

    tracing::info!(
        result = ?summary.result,
        turns = summary.turns,
        actions = summary.actions,
        casualties = summary.casualties.len(),
        "Battle finished"
    );

    if play.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize summary"),
        }
    } else {
        println!(
            "{}: {:?} after {} turns ({} actions, {} attacks, {} casualties)",
            summary.scenario,
            summary.result,
            summary.turns,
            summary.actions,
            summary.attacks,
            summary.casualties.len()
        );
    }
    Ok(())
}

/// Load a scenario and report what it contains.
fn cmd_validate(path: &Path) -> Result<(), ScenarioError> {
    let (data, level) = scenario::load_level(path)?;
    println!(
        "{}: {}x{} map, {} allies, {} enemies{}",
        data.name,
        level.map().width(),
        level.map().height(),
        level.faction_units(Faction::Ally).count(),
        level.faction_units(Faction::Enemy).count(),
        if level.faction_units(Faction::Ally).any(|u| u.leader) {
            ""
        } else {
            " (no leader)"
        }
    );
    Ok(())
}
