use crate::surface::DEFAULT_ZOOM;
use crate::terminal::parse_coords;
use crate::types::Coords;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "waymark",
    about = "Log running and cycling workouts against points on a map"
)]
pub struct Cli {
    /// Workout database.
    ///
    /// Default: ~/.waymark/waymark.db
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Position the session starts from, as LAT,LNG.
    ///
    /// Without it every location request fails.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true, value_parser = parse_coords)]
    pub at: Option<Coords>,

    /// Map zoom level used for the initial view and when moving to a workout.
    #[arg(long, default_value_t = DEFAULT_ZOOM)]
    pub zoom: u8,

    /// Location requests to make before giving up (at least 2).
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(2..))]
    pub max_location_attempts: u32,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Start an interactive session (default).
    Run,
    /// Print logged workouts in the order they were created.
    List,
    /// Delete every logged workout.
    Reset,
}
