//! Slash commands understood by the calibration room

use calibration_domain::{CycleId, DepartmentId, EvaluationId, Quadrant, SessionId, VoteType};
use chrono::{NaiveDate, NaiveTime};
use std::fmt;

/// A parsed room input line
#[derive(Debug, Clone, PartialEq)]
pub enum RoomCommand {
    Sessions,
    Open {
        cycle_id: CycleId,
        date: chrono::DateTime<chrono::Utc>,
        department_id: Option<DepartmentId>,
    },
    Invite {
        user: String,
        facilitator: bool,
    },
    Enter(SessionId),
    Join,
    Leave,
    Details,
    Evaluations,
    Vote {
        evaluation_id: EvaluationId,
        score: f64,
        vote_type: VoteType,
        justification: String,
    },
    Votes(EvaluationId),
    Resolve {
        evaluation_id: EvaluationId,
        score: f64,
        justification: String,
    },
    Move {
        employee: String,
        target: Quadrant,
        justification: String,
    },
    History(Option<String>),
    Grid,
    Stats,
    Chat,
    Conclude(Option<String>),
    WhoAmI,
    Help,
    Quit,
    /// Plain text is posted to the session discussion
    Say(String),
}

/// Why a line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub usage: &'static str,
    pub reason: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (usage: {})", self.reason, self.usage)
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &[(&str, &str)] = &[
    ("/sessions", "List calibration sessions"),
    ("/open <cycle> <YYYY-MM-DD> [dept]", "Schedule a session (HR and managers)"),
    ("/enter <session>", "Switch to a session"),
    ("/invite <user> [facilitator]", "Add a participant"),
    ("/join, /leave", "Go online or offline in the current session"),
    ("/who", "Show the session and its participants"),
    ("/evals", "Evaluations under review with discrepancies"),
    ("/vote <eval> <score> <approve|reject> <why>", "Cast a vote"),
    ("/votes <eval>", "Votes cast on an evaluation"),
    ("/resolve <eval> <score> <why>", "Fix the consensus score (facilitator)"),
    ("/move <employee> <quadrant> <why>", "Reposition on the nine-box grid"),
    ("/history [employee]", "Audit trail of an employee or of the session"),
    ("/grid, /stats", "Grid distribution and placement statistics"),
    ("/chat", "Show the session discussion"),
    ("/conclude [notes]", "Conclude the session (facilitator)"),
    ("/whoami, /help, /quit", ""),
];

fn err(usage: &'static str, reason: impl Into<String>) -> ParseError {
    ParseError {
        usage,
        reason: reason.into(),
    }
}

fn rest(parts: &[&str], from: usize) -> Option<String> {
    let text = parts.get(from..)?.join(" ");
    (!text.is_empty()).then_some(text)
}

fn score(raw: &str, usage: &'static str) -> Result<f64, ParseError> {
    raw.parse::<f64>()
        .map_err(|_| err(usage, format!("not a score: {raw}")))
}

fn evaluation(raw: &str, usage: &'static str) -> Result<EvaluationId, ParseError> {
    raw.parse().map_err(|e: String| err(usage, e))
}

impl RoomCommand {
    /// Parse one input line. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Result<Self, ParseError>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(stripped) = line.strip_prefix('/') else {
            return Some(Ok(RoomCommand::Say(line.to_string())));
        };
        let parts: Vec<&str> = stripped.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return Some(Err(err("/help", "empty command")));
        };
        Some(Self::parse_command(name, args))
    }

    fn parse_command(name: &str, args: &[&str]) -> Result<Self, ParseError> {
        match name {
            "sessions" | "ls" => Ok(RoomCommand::Sessions),
            "open" => {
                const USAGE: &str = "/open <cycle> <YYYY-MM-DD> [dept]";
                let (Some(cycle), Some(date)) = (args.first(), args.get(1)) else {
                    return Err(err(USAGE, "missing arguments"));
                };
                let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| err(USAGE, format!("not a date: {date}")))?;
                let department_id = args
                    .get(2)
                    .map(|d| d.parse::<DepartmentId>())
                    .transpose()
                    .map_err(|e| err(USAGE, e))?;
                Ok(RoomCommand::Open {
                    cycle_id: cycle.parse().map_err(|e: String| err(USAGE, e))?,
                    date: day.and_time(NaiveTime::MIN).and_utc(),
                    department_id,
                })
            }
            "enter" | "cd" => {
                const USAGE: &str = "/enter <session>";
                let raw = args.first().ok_or_else(|| err(USAGE, "missing session"))?;
                raw.parse()
                    .map(RoomCommand::Enter)
                    .map_err(|e: String| err(USAGE, e))
            }
            "invite" => {
                const USAGE: &str = "/invite <user> [facilitator]";
                let user = args.first().ok_or_else(|| err(USAGE, "missing user"))?;
                let facilitator = match args.get(1) {
                    None => false,
                    Some(&"facilitator") => true,
                    Some(other) => return Err(err(USAGE, format!("unknown role: {other}"))),
                };
                Ok(RoomCommand::Invite {
                    user: user.to_string(),
                    facilitator,
                })
            }
            "join" => Ok(RoomCommand::Join),
            "leave" => Ok(RoomCommand::Leave),
            "who" => Ok(RoomCommand::Details),
            "evals" | "evaluations" => Ok(RoomCommand::Evaluations),
            "vote" => {
                const USAGE: &str = "/vote <eval> <score> <approve|reject> <why>";
                let [eval, raw_score, kind, ..] = args else {
                    return Err(err(USAGE, "missing arguments"));
                };
                Ok(RoomCommand::Vote {
                    evaluation_id: evaluation(eval, USAGE)?,
                    score: score(raw_score, USAGE)?,
                    vote_type: kind.parse().map_err(|e: String| err(USAGE, e))?,
                    justification: rest(args, 3).unwrap_or_default(),
                })
            }
            "votes" => {
                const USAGE: &str = "/votes <eval>";
                let eval = args.first().ok_or_else(|| err(USAGE, "missing evaluation"))?;
                Ok(RoomCommand::Votes(evaluation(eval, USAGE)?))
            }
            "resolve" => {
                const USAGE: &str = "/resolve <eval> <score> <why>";
                let [eval, raw_score, ..] = args else {
                    return Err(err(USAGE, "missing arguments"));
                };
                Ok(RoomCommand::Resolve {
                    evaluation_id: evaluation(eval, USAGE)?,
                    score: score(raw_score, USAGE)?,
                    justification: rest(args, 2).unwrap_or_default(),
                })
            }
            "move" => {
                const USAGE: &str = "/move <employee> <quadrant> <why>";
                let [employee, quadrant, ..] = args else {
                    return Err(err(USAGE, "missing arguments"));
                };
                Ok(RoomCommand::Move {
                    employee: employee.to_string(),
                    target: quadrant.parse().map_err(|e: String| err(USAGE, e))?,
                    justification: rest(args, 2).unwrap_or_default(),
                })
            }
            "history" => Ok(RoomCommand::History(rest(args, 0))),
            "grid" => Ok(RoomCommand::Grid),
            "stats" => Ok(RoomCommand::Stats),
            "chat" => Ok(RoomCommand::Chat),
            "conclude" => Ok(RoomCommand::Conclude(rest(args, 0))),
            "whoami" => Ok(RoomCommand::WhoAmI),
            "help" | "h" | "?" => Ok(RoomCommand::Help),
            "quit" | "exit" | "q" => Ok(RoomCommand::Quit),
            other => Err(err("/help", format!("unknown command: /{other}"))),
        }
    }

    /// Commands that act on the current session
    pub fn needs_session(&self) -> bool {
        matches!(
            self,
            RoomCommand::Invite { .. }
                | RoomCommand::Join
                | RoomCommand::Leave
                | RoomCommand::Details
                | RoomCommand::Evaluations
                | RoomCommand::Vote { .. }
                | RoomCommand::Votes(_)
                | RoomCommand::Resolve { .. }
                | RoomCommand::Chat
                | RoomCommand::Conclude(_)
                | RoomCommand::Say(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> RoomCommand {
        RoomCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_plain_text() {
        assert!(RoomCommand::parse("   ").is_none());
        assert_eq!(parse("looks fair"), RoomCommand::Say("looks fair".into()));
    }

    #[test]
    fn test_parse_vote() {
        assert_eq!(
            parse("/vote 100 3.5 approve matches the quarter"),
            RoomCommand::Vote {
                evaluation_id: EvaluationId::new(100),
                score: 3.5,
                vote_type: VoteType::Approve,
                justification: "matches the quarter".into(),
            }
        );
    }

    #[test]
    fn test_vote_without_reason_leaves_justification_empty() {
        let RoomCommand::Vote { justification, .. } = parse("/vote evaluation#7 4 reject") else {
            panic!("expected vote");
        };
        assert!(justification.is_empty());
    }

    #[test]
    fn test_parse_move_and_open() {
        assert_eq!(
            parse("/move ana high_high led the migration"),
            RoomCommand::Move {
                employee: "ana".into(),
                target: Quadrant::HighHigh,
                justification: "led the migration".into(),
            }
        );
        let RoomCommand::Open {
            cycle_id,
            date,
            department_id,
        } = parse("/open cycle#1 2026-03-02 10")
        else {
            panic!("expected open");
        };
        assert_eq!(cycle_id, CycleId::new(1));
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2026-03-02");
        assert_eq!(department_id, Some(DepartmentId::new(10)));
    }

    #[test]
    fn test_bad_input_reports_usage() {
        let error = RoomCommand::parse("/vote 100 abc approve").unwrap().unwrap_err();
        assert_eq!(error.usage, "/vote <eval> <score> <approve|reject> <why>");
        assert!(RoomCommand::parse("/frobnicate").unwrap().is_err());
        assert!(RoomCommand::parse("/move ana sideways x").unwrap().is_err());
    }

    #[test]
    fn test_needs_session() {
        assert!(parse("/evals").needs_session());
        assert!(parse("hello").needs_session());
        assert!(!parse("/grid").needs_session());
        assert!(!parse("/history ana").needs_session());
    }
}
