//! Interactive calibration room
//!
//! A readline loop acting as one roster user. Session and grid events are
//! printed by a background watcher as they arrive.

use super::command::{HELP, RoomCommand};
use crate::config::RoomConfig;
use crate::output::ConsoleFormatter;
use calibration_application::{
    CalibrationError, ChatUseCase, ConsensusResolver, CreateSessionInput, EventBroadcaster,
    PositionEngine, RepositionInput, ResolveInput, ReviewUseCase, SessionManager,
    SubmitVoteInput, VotingUseCase,
};
use calibration_domain::{
    Actor, CalibrationEvent, DomainError, EventChannel, EventKind, ParticipantRole, SessionFilter,
    SessionId, VoteTally,
};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Use cases the room drives
#[derive(Clone)]
pub struct RoomServices {
    pub sessions: Arc<SessionManager>,
    pub voting: Arc<VotingUseCase>,
    pub resolver: Arc<ConsensusResolver>,
    pub positions: Arc<PositionEngine>,
    pub chat: Arc<ChatUseCase>,
    pub review: Arc<ReviewUseCase>,
    pub broadcaster: Arc<dyn EventBroadcaster>,
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive calibration room REPL
pub struct CalibrationRoom {
    services: RoomServices,
    formatter: Arc<ConsoleFormatter>,
    actor: Actor,
    session: Option<SessionId>,
    config: RoomConfig,
    watcher: Option<CancellationToken>,
}

impl CalibrationRoom {
    pub fn new(services: RoomServices, formatter: ConsoleFormatter, actor: Actor) -> Self {
        Self {
            services,
            formatter: Arc::new(formatter),
            actor,
            session: None,
            config: RoomConfig::default(),
            watcher: None,
        }
    }

    pub fn with_config(mut self, config: RoomConfig) -> Self {
        self.config = config;
        self
    }

    /// Start inside an existing session
    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session = Some(session_id);
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();
        if let Some(session_id) = self.session {
            self.enter(session_id).await;
        }

        loop {
            let prompt = match self.session {
                Some(id) => format!("{}@{}> ", self.formatter.user(self.actor.id), id),
                None => format!("{}> ", self.formatter.user(self.actor.id)),
            };

            match rl.readline(&prompt) {
                Ok(line) => {
                    let Some(parsed) = RoomCommand::parse(&line) else {
                        continue;
                    };
                    let _ = rl.add_history_entry(line.trim());

                    let command = match parsed {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{}", e.to_string().yellow());
                            continue;
                        }
                    };
                    if command.needs_session() && self.session.is_none() {
                        println!(
                            "{}",
                            "No session selected. Use /sessions and /enter <session>.".yellow()
                        );
                        continue;
                    }

                    match self.execute(command).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => println!("{}", ConsoleFormatter::error(&e)),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        self.stop_watching();
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              Calibration Room               │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Signed in as {} ({})",
            self.formatter.user(self.actor.id).bold(),
            self.actor.role
        );
        println!("Type /help for commands. Plain text goes to the session discussion.");
        println!();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        for (usage, description) in HELP {
            println!("  {:<46} {}", usage, description.dimmed());
        }
        println!();
    }

    fn current(&self) -> Result<SessionId, CalibrationError> {
        self.session
            .ok_or_else(|| DomainError::validation("no session selected").into())
    }

    async fn enter(&mut self, session_id: SessionId) {
        match self.services.sessions.details(session_id).await {
            Ok(details) => {
                self.session = Some(session_id);
                println!("{}", self.formatter.session_details(&details));
                if self.config.show_events {
                    self.watch(session_id);
                }
            }
            Err(e) => {
                self.session = None;
                println!("{}", ConsoleFormatter::error(&e));
            }
        }
    }

    async fn execute(&mut self, command: RoomCommand) -> Result<Flow, CalibrationError> {
        let services = self.services.clone();
        let f = Arc::clone(&self.formatter);

        match command {
            RoomCommand::Quit => {
                println!("Bye!");
                return Ok(Flow::Quit);
            }
            RoomCommand::Help => Self::print_help(),
            RoomCommand::WhoAmI => println!(
                "{} ({}) {}",
                f.user(self.actor.id).bold(),
                self.actor.role,
                self.session
                    .map(|s| format!("in {s}"))
                    .unwrap_or_default()
            ),
            RoomCommand::Sessions => {
                let sessions = services.sessions.list(&SessionFilter::default()).await?;
                println!("{}", f.session_list(&sessions));
            }
            RoomCommand::Open {
                cycle_id,
                date,
                department_id,
            } => {
                let mut input = CreateSessionInput::new(cycle_id, date);
                if let Some(department_id) = department_id {
                    input = input.with_department(department_id);
                }
                let details = services.sessions.create_session(input, &self.actor).await?;
                let session_id = details.session.id;
                println!("{} {}", "Scheduled".green().bold(), session_id);
                self.enter(session_id).await;
            }
            RoomCommand::Enter(session_id) => self.enter(session_id).await,
            RoomCommand::Invite { user, facilitator } => {
                let user_id = f
                    .find_user(&user)
                    .ok_or_else(|| DomainError::not_found("user", &user))?;
                let role = if facilitator {
                    ParticipantRole::Facilitator
                } else {
                    ParticipantRole::Voter
                };
                let participant = services
                    .sessions
                    .add_participant(self.current()?, user_id, role, &self.actor)
                    .await?;
                println!(
                    "{} {} as {}",
                    "Invited".green(),
                    f.user(participant.user_id),
                    participant.role
                );
            }
            RoomCommand::Join => {
                let participant = services.sessions.join(self.current()?, &self.actor).await?;
                println!(
                    "{} as {}",
                    "You are online".green(),
                    participant.role
                );
            }
            RoomCommand::Leave => {
                services.sessions.leave(self.current()?, &self.actor).await?;
                println!("{}", "You are offline in this session".dimmed());
            }
            RoomCommand::Details => {
                let details = services.sessions.details(self.current()?).await?;
                println!("{}", f.session_details(&details));
            }
            RoomCommand::Evaluations => {
                let reviews = services
                    .review
                    .evaluations_for_session(self.current()?)
                    .await?;
                println!("{}", f.evaluation_reviews(&reviews));
            }
            RoomCommand::Vote {
                evaluation_id,
                score,
                vote_type,
                justification,
            } => {
                let vote = services
                    .voting
                    .submit_vote(
                        SubmitVoteInput {
                            session_id: self.current()?,
                            evaluation_id,
                            proposed_score: score,
                            justification,
                            vote_type,
                        },
                        &self.actor,
                    )
                    .await?;
                println!("{} {}", "Recorded".green(), vote.id);
            }
            RoomCommand::Votes(evaluation_id) => {
                let votes = services
                    .voting
                    .list_votes(self.current()?, evaluation_id)
                    .await?;
                println!("{}", f.votes(&votes, &VoteTally::from_votes(&votes)));
            }
            RoomCommand::Resolve {
                evaluation_id,
                score,
                justification,
            } => {
                let evaluation = services
                    .resolver
                    .resolve(
                        ResolveInput {
                            session_id: self.current()?,
                            evaluation_id,
                            consensus_score: score,
                            justification,
                        },
                        &self.actor,
                    )
                    .await?;
                println!(
                    "{} {} for {}",
                    "Consensus".green().bold(),
                    evaluation
                        .consensus_score()
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                    f.employee(evaluation.employee_id)
                );
            }
            RoomCommand::Move {
                employee,
                target,
                justification,
            } => {
                let employee_id = f
                    .find_employee(&employee)
                    .ok_or_else(|| DomainError::not_found("employee", &employee))?;
                let entry = services
                    .positions
                    .reposition(
                        RepositionInput {
                            employee_id,
                            target,
                            justification,
                            session_id: self.session,
                        },
                        &self.actor,
                    )
                    .await?;
                println!("{}", f.history_entry(&entry));
                if let Some(record) = services.positions.position(employee_id).await? {
                    println!("{}", f.position(&record));
                }
            }
            RoomCommand::History(Some(employee)) => {
                let employee_id = f
                    .find_employee(&employee)
                    .ok_or_else(|| DomainError::not_found("employee", &employee))?;
                let entries = services.review.history(employee_id).await?;
                println!("{}", f.history(employee_id, &entries));
            }
            RoomCommand::History(None) => {
                let session_id = self.current()?;
                let entries = services.review.session_history(session_id).await?;
                for entry in &entries {
                    println!("  {}", f.history_entry(entry));
                }
                if entries.is_empty() {
                    println!("{}", "No changes recorded in this session".dimmed());
                }
            }
            RoomCommand::Grid => {
                let grid = services.review.grid_distribution().await?;
                println!("{}", ConsoleFormatter::grid(&grid));
            }
            RoomCommand::Stats => {
                let stats = services.review.placement_stats().await?;
                println!("{}", ConsoleFormatter::placement_stats(&stats));
            }
            RoomCommand::Chat => {
                let messages = services.chat.list(self.current()?).await?;
                println!("{}", f.messages(&messages));
            }
            RoomCommand::Conclude(notes) => {
                let session = services
                    .sessions
                    .conclude(self.current()?, notes, &self.actor)
                    .await?;
                println!("{}", f.session_line(&session));
            }
            RoomCommand::Say(text) => {
                services.chat.post(self.current()?, text, &self.actor).await?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Print events of `session_id` and direct grid moves until replaced
    fn watch(&mut self, session_id: SessionId) {
        self.stop_watching();
        let token = CancellationToken::new();
        self.watcher = Some(token.clone());

        let mut session_events = self
            .services
            .broadcaster
            .subscribe(EventChannel::Session(session_id));
        let mut grid_events = self.services.broadcaster.subscribe(EventChannel::Grid);
        let services = self.services.clone();
        let formatter = Arc::clone(&self.formatter);

        tokio::spawn(async move {
            debug!(session = %session_id, "Watching calibration events");
            loop {
                let event = tokio::select! {
                    _ = token.cancelled() => break,
                    Some(event) = session_events.next() => event,
                    Some(event) = grid_events.next() => event,
                    else => break,
                };
                println!("{}", describe(&services, &formatter, &event).await);
            }
            debug!(session = %session_id, "Stopped watching calibration events");
        });
    }

    fn stop_watching(&mut self) {
        if let Some(token) = self.watcher.take() {
            token.cancel();
        }
    }
}

impl Drop for CalibrationRoom {
    fn drop(&mut self) {
        self.stop_watching();
    }
}

/// One line for an incoming event, re-reading the latest state where it helps
async fn describe(
    services: &RoomServices,
    formatter: &ConsoleFormatter,
    event: &CalibrationEvent,
) -> String {
    let line = formatter.event(event);
    let detail = match (event.kind, event.session_id) {
        (EventKind::NewMessage, Some(session_id)) => services
            .chat
            .list(session_id)
            .await
            .ok()
            .and_then(|messages| messages.last().map(|m| formatter.message(m))),
        (EventKind::PositionChanged, _) => match event.employee_id {
            Some(employee_id) => services
                .positions
                .position(employee_id)
                .await
                .ok()
                .flatten()
                .map(|record| formatter.position(&record)),
            None => None,
        },
        _ => None,
    };
    match detail {
        Some(detail) => format!("{line}\n  {detail}"),
        None => line,
    }
}
