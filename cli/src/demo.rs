//! Scripted calibration session on the built-in roster
//!
//! Walks one session end to end: scheduling, concurrent joins and votes,
//! a consensus race between two facilitator devices, grid moves inside and
//! outside the session, and the resulting audit trail.

use crate::App;
use anyhow::{Context, Result, anyhow};
use calibration_application::{
    CalibrationError, CreateSessionInput, EvaluationReview, RepositionInput, ResolveInput,
    SessionDetails, SubmitVoteInput,
};
use calibration_domain::{
    Actor, CalibrationEvent, ChatMessage, CycleId, EmployeeId, EventChannel, EvaluationId,
    GridDistribution, HistoryEntry, ParticipantRole, PlacementStats, Quadrant, Vote, VoteTally,
    VoteType,
};
use calibration_presentation::{ConsoleFormatter, OutputFormat};
use chrono::{TimeZone, Utc};
use colored::Colorize;
use futures::future::join_all;
use serde::Serialize;
use tracing::info;

const ANA: EmployeeId = EmployeeId::new(100);
const EVA: EmployeeId = EmployeeId::new(201);

/// Everything the demo produced, for `--output json`
#[derive(Serialize)]
struct DemoReport {
    session: SessionDetails,
    evaluations: Vec<EvaluationReview>,
    votes: Vec<Vote>,
    tally: VoteTally,
    outcomes: Vec<Outcome>,
    messages: Vec<ChatMessage>,
    events: Vec<CalibrationEvent>,
    history: Vec<HistoryEntry>,
    grid: GridDistribution,
    stats: PlacementStats,
}

/// Result of an attempted operation that may be refused
#[derive(Serialize)]
struct Outcome {
    action: String,
    accepted: bool,
    detail: String,
}

impl Outcome {
    fn from_result<T>(
        action: &str,
        result: &Result<T, CalibrationError>,
        ok: impl Fn(&T) -> String,
    ) -> Self {
        match result {
            Ok(value) => Self {
                action: action.to_string(),
                accepted: true,
                detail: ok(value),
            },
            Err(e) => Self {
                action: action.to_string(),
                accepted: false,
                detail: format!("[{}] {}", e.kind(), e),
            },
        }
    }

    fn line(&self) -> String {
        let mark = if self.accepted {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        format!("  {} {:<44} {}", mark, self.action, self.detail)
    }
}

struct Printer {
    enabled: bool,
}

impl Printer {
    fn step(&self, title: &str) {
        if self.enabled {
            println!("\n{} {}", "▶".cyan().bold(), title.bold());
        }
    }

    fn show(&self, text: impl AsRef<str>) {
        if self.enabled {
            println!("{}", text.as_ref());
        }
    }
}

fn actor(app: &App, name: &str) -> Result<Actor> {
    app.roster
        .find_user(name)
        .map(|u| u.actor())
        .ok_or_else(|| anyhow!("the demo needs roster user {name}; run it without --roster"))
}

pub async fn run(app: &App, output: OutputFormat) -> Result<()> {
    let services = &app.services;
    let f = &app.formatter;
    let out = Printer {
        enabled: output == OutputFormat::Full,
    };
    let mut outcomes = Vec::new();

    let dana = actor(app, "Dana")?;
    let marco = actor(app, "Marco")?;
    let priya = actor(app, "Priya")?;
    let lee = actor(app, "Lee")?;

    // Scheduling
    out.step("Dana (HR) schedules a calibration for the 2026 cycle");
    let scheduled_for = Utc
        .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .context("demo date")?;
    let details = services
        .sessions
        .create_session(
            CreateSessionInput::new(CycleId::new(1), scheduled_for)
                .with_participants([marco.id, priya.id, lee.id]),
            &dana,
        )
        .await?;
    let session_id = details.session.id;
    info!(session_id = %session_id, "Demo session scheduled");
    let mut feed = services
        .broadcaster
        .subscribe(EventChannel::Session(session_id));
    let mut grid_feed = services.broadcaster.subscribe(EventChannel::Grid);

    let second_facilitator = services
        .sessions
        .add_participant(
            session_id,
            marco.id,
            ParticipantRole::Facilitator,
            &dana,
        )
        .await;
    let refused = Outcome::from_result(
        "Promote Marco to a second facilitator",
        &second_facilitator,
        |p| format!("{} is now {}", f.user(p.user_id), p.role),
    );
    out.show(refused.line());
    outcomes.push(refused);

    // Everyone joins at once; the first join activates the session
    out.step("Participants join concurrently");
    let members = [dana, marco, priya, lee];
    for joined in join_all(members.iter().map(|a| services.sessions.join(session_id, a))).await {
        joined?;
    }
    let details = services.sessions.details(session_id).await?;
    out.show(f.session_details(&details));

    out.step("Evaluations under review");
    let evaluations = services.review.evaluations_for_session(session_id).await?;
    out.show(f.evaluation_reviews(&evaluations));
    let target: EvaluationId = evaluations
        .iter()
        .filter(|r| r.discrepancy.has_discrepancy)
        .max_by(|a, b| a.discrepancy.max_diff.total_cmp(&b.discrepancy.max_diff))
        .map(|r| r.evaluation.id)
        .context("no evaluation with a discrepancy in the roster")?;

    out.step("Discussion");
    services
        .chat
        .post(
            session_id,
            "Ana led the billing migration in Q4; the manager score predates it.",
            &priya,
        )
        .await?;
    services
        .chat
        .post(session_id, "Fair, but delivery slipped twice. I can live with 3.", &marco)
        .await?;
    let messages = services.chat.list(session_id).await?;
    out.show(f.messages(&messages));

    // Ballots land concurrently; the ledger keeps every one
    out.step(&format!("Everyone votes on {target}"));
    let ballots = [
        (marco, 3.0, VoteType::Approve, "Matches what I saw after the migration"),
        (priya, 3.5, VoteType::Approve, "Peers rated her above the manager"),
        (lee, 3.0, VoteType::Approve, "Consistent with the engineering bar"),
        (dana, 2.5, VoteType::Reject, "Missed deadlines should weigh more"),
    ];
    let cast = join_all(ballots.iter().map(|(voter, score, kind, why)| {
        services.voting.submit_vote(
            SubmitVoteInput {
                session_id,
                evaluation_id: target,
                proposed_score: *score,
                justification: why.to_string(),
                vote_type: *kind,
            },
            voter,
        )
    }))
    .await;
    for vote in cast {
        vote?;
    }
    let votes = services.voting.list_votes(session_id, target).await?;
    let tally = VoteTally::from_votes(&votes);
    out.show(f.votes(&votes, &tally));

    // Two devices of the facilitator submit at the same moment; one wins
    out.step("Consensus race: two resolutions submitted at once");
    let resolve = |score: f64, why: &str| ResolveInput {
        session_id,
        evaluation_id: target,
        consensus_score: score,
        justification: why.to_string(),
    };
    let (first, second) = tokio::join!(
        services
            .resolver
            .resolve(resolve(3.0, "Majority approved 3.0"), &dana),
        services
            .resolver
            .resolve(resolve(3.5, "Peer average rounds to 3.5"), &dana),
    );
    for (label, result) in [("Resolve at 3.0", &first), ("Resolve at 3.5", &second)] {
        let outcome = Outcome::from_result(label, result, |e| {
            format!(
                "consensus {} for {}",
                e.consensus_score().map(|s| s.to_string()).unwrap_or_default(),
                f.employee(e.employee_id)
            )
        });
        out.show(outcome.line());
        outcomes.push(outcome);
    }

    let forbidden = services
        .resolver
        .resolve(
            ResolveInput {
                session_id,
                evaluation_id: EvaluationId::new(502),
                consensus_score: 3.0,
                justification: "Splitting the difference".to_string(),
            },
            &marco,
        )
        .await;
    let forbidden = Outcome::from_result("Marco resolves evaluation#502", &forbidden, |_| {
        "resolved".to_string()
    });
    out.show(forbidden.line());
    outcomes.push(forbidden);

    // Grid moves
    out.step("Repositioning on the nine-box grid");
    let moved = services
        .positions
        .reposition(
            RepositionInput {
                employee_id: ANA,
                target: Quadrant::MediumHigh,
                justification: "Consensus 3.0 with strong growth signals".to_string(),
                session_id: Some(session_id),
            },
            &dana,
        )
        .await?;
    out.show(format!("  {}", f.history_entry(&moved)));
    let direct = services
        .positions
        .reposition(
            RepositionInput {
                employee_id: EVA,
                target: Quadrant::MediumMedium,
                justification: "First placement after her transfer".to_string(),
                session_id: None,
            },
            &lee,
        )
        .await?;
    out.show(format!("  {}", f.history_entry(&direct)));

    out.step("Dana concludes the session");
    let concluded = services
        .sessions
        .conclude(
            session_id,
            Some("Ana settled at 3.0; revisit Chen next quarter".to_string()),
            &dana,
        )
        .await?;
    out.show(f.session_line(&concluded));

    let late = services
        .voting
        .submit_vote(
            SubmitVoteInput {
                session_id,
                evaluation_id: EvaluationId::new(502),
                proposed_score: 3.0,
                justification: "Late ballot".to_string(),
                vote_type: VoteType::Approve,
            },
            &priya,
        )
        .await;
    let late = Outcome::from_result("Priya votes after the session closed", &late, |v| {
        v.id.to_string()
    });
    out.show(late.line());
    outcomes.push(late);

    out.step("Live event feed");
    let mut events = Vec::new();
    while let Some(event) = feed.try_next() {
        events.push(event);
    }
    while let Some(event) = grid_feed.try_next() {
        events.push(event);
    }
    for event in &events {
        out.show(format!("  {}", f.event(event)));
    }

    let history = services.review.history(ANA).await?;
    out.show(f.history(ANA, &history));
    let grid = services.review.grid_distribution().await?;
    out.show(ConsoleFormatter::grid(&grid));
    let stats = services.review.placement_stats().await?;
    out.show(ConsoleFormatter::placement_stats(&stats));

    if output == OutputFormat::Json {
        let report = DemoReport {
            session: services.sessions.details(session_id).await?,
            evaluations: services.review.evaluations_for_session(session_id).await?,
            votes,
            tally,
            outcomes,
            messages,
            events,
            history,
            grid,
            stats,
        };
        println!("{}", ConsoleFormatter::json(&report));
    }

    Ok(())
}
