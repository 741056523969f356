//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable tables
    Full,
    /// JSON output
    Json,
}

/// CLI arguments for calibration-room
#[derive(Parser, Debug)]
#[command(name = "calibration-room")]
#[command(author, version, about = "Calibration sessions - reconcile evaluation scores into one consensus")]
#[command(long_about = r#"
Calibration Room lets a group of evaluators reconcile divergent performance and
potential scores into one authoritative value, in real time, with every change
recorded in an audit trail.

Two entry modes share the same store:
1. Session mode: participants vote on a proposed score, discuss, and the
   facilitator resolves the consensus
2. Direct placement: an evaluator moves an employee on the nine-box grid,
   with a justification

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. ./calibration.toml    Project-level config
3. ~/.config/calibration-room/config.toml   Global config

Example:
  calibration-room demo
  calibration-room --roster team.json room --as dana
  calibration-room --roster team.json history 100 --output json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Roster file (users, employees, cycles, evaluations, positions)
    #[arg(long, global = true, value_name = "PATH")]
    pub roster: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a scripted calibration session end to end
    Demo,

    /// Enter the interactive calibration room as a roster user
    Room {
        /// User id or name to act as
        #[arg(long = "as", value_name = "USER")]
        user: String,

        /// Join this session right away
        #[arg(long, value_name = "SESSION")]
        session: Option<String>,
    },

    /// Print the audit trail of one employee
    History {
        /// Employee id
        employee: String,
    },

    /// Print the nine-box grid distribution and placement statistics
    Grid,
}

impl Cli {
    /// The subcommand to run; `demo` when none is given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Demo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_demo() {
        let cli = Cli::parse_from(["calibration-room"]);
        assert_eq!(cli.command(), Command::Demo);
        assert_eq!(cli.output, OutputFormat::Full);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_room_with_global_flags() {
        let cli = Cli::parse_from([
            "calibration-room",
            "room",
            "--as",
            "dana",
            "--session",
            "3",
            "--roster",
            "team.json",
            "-vv",
        ]);
        assert_eq!(
            cli.command(),
            Command::Room {
                user: "dana".to_string(),
                session: Some("3".to_string()),
            }
        );
        assert_eq!(cli.roster, Some(PathBuf::from("team.json")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_history_json() {
        let cli = Cli::parse_from(["calibration-room", "history", "100", "--output", "json"]);
        assert_eq!(
            cli.command(),
            Command::History {
                employee: "100".to_string()
            }
        );
        assert_eq!(cli.output, OutputFormat::Json);
    }
}
