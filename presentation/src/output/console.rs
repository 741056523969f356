//! Console output formatter for calibration results

use calibration_application::{CalibrationError, EvaluationReview, SessionDetails};
use calibration_domain::{
    CalibrationEvent, CalibrationSession, ChatMessage, EmployeeId, EventKind, GridDistribution,
    HistoryChange, HistoryEntry, PlacementStats, PositionRecord, Quadrant, SessionStatus, UserId,
    Vote, VoteTally, core::string::preview,
};
use colored::Colorize;
use serde::Serialize;
use std::collections::HashMap;

const WIDTH: usize = 72;

/// Formats calibration data for console display.
///
/// Knows the display names of users and employees; unknown ids fall back to
/// their `kind#n` form.
#[derive(Debug, Clone, Default)]
pub struct ConsoleFormatter {
    users: HashMap<UserId, String>,
    employees: HashMap<EmployeeId, String>,
}

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(mut self, users: impl IntoIterator<Item = (UserId, String)>) -> Self {
        self.users.extend(users);
        self
    }

    pub fn with_employees(
        mut self,
        employees: impl IntoIterator<Item = (EmployeeId, String)>,
    ) -> Self {
        self.employees.extend(employees);
        self
    }

    pub fn user(&self, id: UserId) -> String {
        self.users
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn employee(&self, id: EmployeeId) -> String {
        self.employees
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Resolve a user typed as a name (case-insensitive) or an id
    pub fn find_user(&self, query: &str) -> Option<UserId> {
        if let Ok(id) = query.parse::<UserId>() {
            return Some(id);
        }
        self.users
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(query))
            .map(|(id, _)| *id)
    }

    pub fn find_employee(&self, query: &str) -> Option<EmployeeId> {
        if let Ok(id) = query.parse::<EmployeeId>() {
            return Some(id);
        }
        self.employees
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(query))
            .map(|(id, _)| *id)
    }

    /// Format as JSON
    pub fn json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// `[KIND] message`
    pub fn error(error: &CalibrationError) -> String {
        format!("{} {}", format!("[{}]", error.kind()).red().bold(), error)
    }

    // ==================== Sessions ====================

    pub fn session_line(&self, session: &CalibrationSession) -> String {
        let status = match session.status {
            SessionStatus::Scheduled => session.status.as_str().yellow(),
            SessionStatus::Active => session.status.as_str().green().bold(),
            SessionStatus::Concluded => session.status.as_str().dimmed(),
        };
        format!(
            "{:<12} {} {:<10} facilitator {}",
            session.id.to_string().bold(),
            session.scheduled_for.format("%Y-%m-%d %H:%M"),
            status,
            self.user(session.facilitator_id)
        )
    }

    pub fn session_list(&self, sessions: &[CalibrationSession]) -> String {
        if sessions.is_empty() {
            return format!("{}\n", "No sessions".dimmed());
        }
        let mut output = Self::section_header("Sessions");
        for session in sessions {
            output.push_str(&format!("  {}\n", self.session_line(session)));
        }
        output
    }

    pub fn session_details(&self, details: &SessionDetails) -> String {
        let session = &details.session;
        let mut output = Self::header(&format!("Calibration {}", session.id));
        output.push('\n');
        output.push_str(&format!("{}\n", self.session_line(session)));
        if let Some(department) = session.department_id {
            output.push_str(&format!("{} {}\n", "Department:".cyan().bold(), department));
        }
        if let Some(notes) = &session.notes {
            output.push_str(&format!("{} {}\n", "Notes:".cyan().bold(), notes));
        }

        output.push_str(&Self::section_header(&format!(
            "Participants ({} online)",
            details.online_count()
        )));
        for participant in &details.participants {
            let presence = if participant.is_online {
                "●".green()
            } else {
                "○".dimmed()
            };
            output.push_str(&format!(
                "  {} {:<20} {}\n",
                presence,
                self.user(participant.user_id),
                participant.role
            ));
        }
        output
    }

    // ==================== Evaluations & votes ====================

    pub fn evaluation_reviews(&self, reviews: &[EvaluationReview]) -> String {
        let mut output = Self::section_header("Evaluations");
        if reviews.is_empty() {
            output.push_str(&format!("  {}\n", "Nothing to calibrate".dimmed()));
            return output;
        }
        for review in reviews {
            let evaluation = &review.evaluation;
            let name = review
                .employee
                .as_ref()
                .map(|e| e.name.clone())
                .unwrap_or_else(|| self.employee(evaluation.employee_id));
            let flag = if review.discrepancy.has_discrepancy {
                format!("Δ {:.1}", review.discrepancy.max_diff).red().bold()
            } else {
                format!("Δ {:.1}", review.discrepancy.max_diff).normal()
            };
            let state = match evaluation.consensus_score() {
                Some(score) => format!("consensus {score}").green(),
                None => "open".yellow(),
            };
            output.push_str(&format!(
                "  {:<16} {:<20} self {}  mgr {}  peers {}  {}  {}\n",
                evaluation.id.to_string(),
                name,
                Self::maybe_score(evaluation.self_score),
                Self::maybe_score(evaluation.manager_score),
                Self::maybe_score(review.discrepancy.peer_average),
                flag,
                state
            ));
        }
        output
    }

    pub fn votes(&self, votes: &[Vote], tally: &VoteTally) -> String {
        let mut output = Self::section_header(&format!(
            "Votes {} {}/{} approve",
            VoteTally::summary(votes),
            tally.approve_count,
            tally.total_votes
        ));
        for vote in votes {
            let kind = if vote.is_approval() {
                vote.vote_type.to_string().green()
            } else {
                vote.vote_type.to_string().red()
            };
            output.push_str(&format!(
                "  {} {:<16} {:<8} {}  {}\n",
                vote.created_at.format("%H:%M:%S").to_string().dimmed(),
                self.user(vote.voter_id),
                kind,
                vote.proposed_score.to_string().bold(),
                preview(vote.justification.as_str(), 60)
            ));
        }
        if let Some(mean) = tally.mean_proposed {
            output.push_str(&format!("  {} {:.2}\n", "Mean proposed:".cyan(), mean));
        }
        output
    }

    // ==================== History & grid ====================

    pub fn history_entry(&self, entry: &HistoryEntry) -> String {
        let origin = match entry.session_id {
            Some(session) => session.to_string(),
            None => "direct".to_string(),
        };
        let change = match &entry.change {
            HistoryChange::Position {
                old_quadrant,
                new_quadrant,
                new_performance,
                new_potential,
                ..
            } => format!(
                "{} → {} ({}/{})",
                old_quadrant.map_or("unplaced", |q| q.label()),
                new_quadrant.label().bold(),
                new_performance,
                new_potential
            ),
            HistoryChange::Consensus { new_score, .. } => {
                format!("consensus {}", new_score.to_string().bold())
            }
        };
        format!(
            "{} {:<12} {:<40} by {} · {}",
            entry.changed_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            origin,
            change,
            self.user(entry.changed_by),
            preview(entry.justification.as_str(), 50)
        )
    }

    pub fn history(&self, employee_id: EmployeeId, entries: &[HistoryEntry]) -> String {
        let mut output =
            Self::section_header(&format!("History of {}", self.employee(employee_id)));
        if entries.is_empty() {
            output.push_str(&format!("  {}\n", "No recorded changes".dimmed()));
        }
        for entry in entries {
            output.push_str(&format!("  {}\n", self.history_entry(entry)));
        }
        output
    }

    pub fn position(&self, record: &PositionRecord) -> String {
        let quadrant = record.quadrant();
        format!(
            "{} is {} ({}) at {}/{}: {}",
            self.employee(record.employee_id).bold(),
            quadrant.label().green().bold(),
            quadrant.id(),
            record.performance,
            record.potential,
            quadrant.recommended_action().dimmed()
        )
    }

    /// Nine-box grid: potential top to bottom, performance left to right
    pub fn grid(distribution: &GridDistribution) -> String {
        let mut output = Self::section_header(&format!(
            "Nine-box grid ({} placed)",
            distribution.total()
        ));
        let cells: Vec<(Quadrant, usize)> = distribution.iter().collect();
        for (row, potential) in ["high", "medium", "low"].iter().enumerate() {
            output.push_str(&format!("  {:>8} │", potential.dimmed()));
            for (quadrant, count) in &cells[row * 3..row * 3 + 3] {
                let cell = format!("{:<20} {:>3}", quadrant.label(), count);
                let cell = if *count > 0 { cell.bold() } else { cell.dimmed() };
                output.push_str(&format!(" {cell} │"));
            }
            output.push('\n');
        }
        output.push_str(&format!(
            "  {:>8}   {:^24}   {:^24}   {:^24}\n",
            "",
            "low".dimmed(),
            "medium".dimmed(),
            "high".dimmed()
        ));
        output
    }

    pub fn placement_stats(stats: &PlacementStats) -> String {
        let mut output = Self::section_header("Placement statistics");
        output.push_str(&format!("  Total changes:          {}\n", stats.total_changes));
        output.push_str(&format!("  Session moves:          {}\n", stats.session_moves));
        output.push_str(&format!("  Direct moves:           {}\n", stats.direct_moves));
        output.push_str(&format!(
            "  Consensus resolutions:  {}\n",
            stats.consensus_resolutions
        ));
        output
    }

    // ==================== Chat & events ====================

    pub fn message(&self, message: &ChatMessage) -> String {
        format!(
            "{} {}: {}",
            message.created_at.format("%H:%M:%S").to_string().dimmed(),
            self.user(message.sender_id).cyan().bold(),
            message.message
        )
    }

    pub fn messages(&self, messages: &[ChatMessage]) -> String {
        let mut output = Self::section_header("Discussion");
        for message in messages {
            output.push_str(&format!("  {}\n", self.message(message)));
        }
        output
    }

    pub fn event(&self, event: &CalibrationEvent) -> String {
        let kind = match event.kind {
            EventKind::NewVote => event.kind.as_str().blue(),
            EventKind::ConsensusReached => event.kind.as_str().green().bold(),
            EventKind::PositionChanged => event.kind.as_str().magenta(),
            EventKind::NewMessage => event.kind.as_str().cyan(),
        };
        let mut parts = vec![format!("⟳ {kind}")];
        if let Some(evaluation) = event.evaluation_id {
            parts.push(evaluation.to_string());
        }
        if let Some(employee) = event.employee_id {
            parts.push(self.employee(employee));
        }
        parts.join(" ")
    }

    fn maybe_score(score: Option<f64>) -> String {
        score.map_or_else(|| "-".to_string(), |s| format!("{s:.1}"))
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(WIDTH);
        format!("{}\n{:^WIDTH$}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
