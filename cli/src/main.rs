//! CLI entrypoint for Calibration Room
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod demo;

use anyhow::{Context, Result, anyhow};
use calibration_application::{
    CalibrationPolicy, ChatUseCase, ConsensusResolver, EventBroadcaster, PositionEngine,
    ReviewUseCase, SessionManager, VotingUseCase,
};
use calibration_domain::SessionId;
use calibration_infrastructure::{
    ChannelBroadcaster, ConfigLoader, FileConfig, HistoryJournal, MemoryStore, Roster,
};
use calibration_presentation::{
    CalibrationRoom, Cli, Command, ConsoleFormatter, OutputFormat, RoomConfig, RoomServices,
};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const SAMPLE_ROSTER: &str = include_str!("sample_roster.json");

/// Everything a command needs, wired once
pub struct App {
    pub roster: Arc<Roster>,
    pub store: Arc<MemoryStore>,
    pub services: RoomServices,
    pub formatter: ConsoleFormatter,
}

impl App {
    pub async fn build(roster: Roster, config: &FileConfig) -> Result<Self> {
        let store = match &config.storage.history_journal {
            Some(path) => {
                let (journal, replayed) = HistoryJournal::open(path)
                    .with_context(|| format!("opening history journal {}", path.display()))?;
                info!(
                    path = %path.display(),
                    entries = replayed.len(),
                    "History journal replayed"
                );
                Arc::new(MemoryStore::with_journal(journal, replayed))
            }
            None => Arc::new(MemoryStore::new()),
        };
        roster.seed(store.as_ref()).await?;

        let roster = Arc::new(roster);
        let broadcaster: Arc<dyn EventBroadcaster> =
            Arc::new(ChannelBroadcaster::new(config.realtime.channel_capacity));
        let policy: CalibrationPolicy = config.calibration.to_policy();

        let services = RoomServices {
            sessions: Arc::new(SessionManager::new(
                store.clone(),
                roster.clone(),
                policy.clone(),
            )),
            voting: Arc::new(VotingUseCase::new(
                store.clone(),
                store.clone(),
                store.clone(),
                broadcaster.clone(),
                policy.clone(),
            )),
            resolver: Arc::new(ConsensusResolver::new(
                store.clone(),
                store.clone(),
                broadcaster.clone(),
                policy.clone(),
            )),
            positions: Arc::new(PositionEngine::new(
                store.clone(),
                store.clone(),
                roster.clone(),
                broadcaster.clone(),
                policy.clone(),
            )),
            chat: Arc::new(ChatUseCase::new(
                store.clone(),
                store.clone(),
                broadcaster.clone(),
            )),
            review: Arc::new(ReviewUseCase::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                roster.clone(),
                policy,
            )),
            broadcaster,
        };

        let formatter = ConsoleFormatter::new()
            .with_users(roster.users.iter().map(|u| (u.id, u.name.clone())))
            .with_employees(roster.employees.iter().map(|e| (e.id, e.name.clone())));

        Ok(Self {
            roster,
            store,
            services,
            formatter,
        })
    }
}

fn init_logging(verbose: u8, directory: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "calibration-room.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };
    config.validate()?;
    Ok(config)
}

fn load_roster(cli: &Cli) -> Result<Roster> {
    match &cli.roster {
        Some(path) => Ok(Roster::load(path)?),
        None => Roster::from_json(SAMPLE_ROSTER).context("built-in sample roster"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = load_config(&cli)?;
    let _log_guard = init_logging(cli.verbose, config.logging.directory.as_deref());
    if !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting Calibration Room");

    let roster = load_roster(&cli)?;
    let app = App::build(roster, &config).await?;

    match cli.command() {
        Command::Demo => demo::run(&app, cli.output).await?,
        Command::Room { user, session } => {
            let user = app
                .roster
                .find_user(&user)
                .ok_or_else(|| anyhow!("Unknown user: {user}"))?;
            let mut room =
                CalibrationRoom::new(app.services.clone(), app.formatter.clone(), user.actor())
                    .with_config(RoomConfig::default());
            if let Some(session) = session {
                let session_id: SessionId = session.parse().map_err(|e: String| anyhow!(e))?;
                room = room.with_session(session_id);
            }
            room.run().await?;
        }
        Command::History { employee } => {
            let employee_id = app
                .formatter
                .find_employee(&employee)
                .ok_or_else(|| anyhow!("Unknown employee: {employee}"))?;
            let entries = app
                .services
                .review
                .history(employee_id)
                .await
                .map_err(|e| anyhow!(ConsoleFormatter::error(&e)))?;
            match cli.output {
                OutputFormat::Full => {
                    println!("{}", app.formatter.history(employee_id, &entries))
                }
                OutputFormat::Json => println!("{}", ConsoleFormatter::json(&entries)),
            }
        }
        Command::Grid => {
            let grid = app
                .services
                .review
                .grid_distribution()
                .await
                .map_err(|e| anyhow!(ConsoleFormatter::error(&e)))?;
            match cli.output {
                OutputFormat::Full => println!("{}", ConsoleFormatter::grid(&grid)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::json(&grid)),
            }
        }
    }

    Ok(())
}
