//! # Racer Runtime
//!
//! Entry point for the headless racing runner.
//!
//! Rolls out a policy on a track layout (a JSON file, or a generated ring
//! when none is given) and logs a summary per episode. When a configuration
//! file is given it is watched, and edits take effect between episodes.

mod app;
mod watcher;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which policy drives the vehicle
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Fixed key presses, see `--keys`
    Heuristic,
    /// Uniform random actions
    Random,
    /// Linear `tanh` policy loaded from `--weights`
    Linear,
}

/// Manual driving key held for the whole run
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
}

#[derive(Debug, Parser)]
#[command(name = "racer", version, about = "Headless checkpoint racing runner")]
pub struct Args {
    /// Number of episodes to run
    #[arg(short, long, default_value_t = 10)]
    pub episodes: usize,

    /// Step budget per episode before it is cut off by the runner
    #[arg(long, default_value_t = 2000)]
    pub max_steps: usize,

    /// Track layout JSON; a ring track is generated when omitted
    #[arg(short, long)]
    pub layout: Option<PathBuf>,

    /// Obstacles on the generated ring track
    #[arg(long, default_value_t = 10)]
    pub obstacles: usize,

    /// Track configuration JSON, watched for changes
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for placement, speed windows and the random policy
    #[arg(short, long)]
    pub seed: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = PolicyKind::Heuristic)]
    pub policy: PolicyKind,

    /// Keys held by the heuristic policy
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [Key::Up])]
    pub keys: Vec<Key>,

    /// Exported weights for the linear policy
    #[arg(short, long)]
    pub weights: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    app::run(&args)
}
