//! Headless battle runner for scenario testing and CI verification.
//!
//! This crate plays the host role around the tactics core without any
//! graphics:
//!
//! - **Scenario loading**: RON files describing terrain and units
//! - **Combat**: a simple stat-based [`CombatResolver`](tactics_core::orchestrator::CombatResolver)
//! - **Turn management**: alternating computer-controlled turns with an
//!   optional animation delay
//! - **Output**: ASCII boards on stdout and a JSON summary
//!
//! # Example
//!
//! ```bash
//! # Play the built-in demo
//! cargo run -p tactics_headless -- demo --ascii
//!
//! # Play a scenario file and print a JSON summary
//! cargo run -p tactics_headless -- run --scenario scenarios/skirmish.ron --json
//! ```

pub mod ascii;
pub mod combat;
pub mod runner;
pub mod scenario;

pub use ascii::{render_ascii, AsciiConfig};
pub use combat::StatCombat;
pub use runner::{BattleResult, BattleRunner, RunConfig, RunSummary};
pub use scenario::ScenarioError;
