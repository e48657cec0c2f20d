pub mod engine;
pub mod normalize;

use serde::{Deserialize, Serialize};

/// Canonical match status. Unknown provider values are carried through
/// verbatim so the widget still has something to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    NotStarted,
    Running,
    Finished,
    Canceled,
    Postponed,
    #[serde(untagged)]
    Other(String),
}

impl MatchStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "not_started" => MatchStatus::NotStarted,
            "running" => MatchStatus::Running,
            "finished" => MatchStatus::Finished,
            "canceled" => MatchStatus::Canceled,
            "postponed" => MatchStatus::Postponed,
            other => MatchStatus::Other(other.to_string()),
        }
    }

    /// Human label shown on the widget (French, matching the dashboard locale).
    pub fn label(&self) -> &str {
        match self {
            MatchStatus::NotStarted => "À venir",
            MatchStatus::Running => "En cours",
            MatchStatus::Finished => "Terminé",
            MatchStatus::Canceled => "Annulé",
            MatchStatus::Postponed => "Reporté",
            MatchStatus::Other(raw) => raw,
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            MatchStatus::NotStarted => "⏰",
            MatchStatus::Running => "🔴",
            MatchStatus::Finished => "✅",
            MatchStatus::Canceled => "❌",
            MatchStatus::Postponed => "⏸️",
            MatchStatus::Other(_) => "📅",
        }
    }
}

/// Best-of count; some match types come back as a string kind instead of a
/// game count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BestOf {
    Games(i64),
    Kind(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSlot {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub score: Option<i64>,
}

/// A match the tracker has chosen to display and poll, in display-ready form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedMatch {
    pub id: Option<i64>,
    pub tournament: Option<String>,
    pub teams: Vec<TeamSlot>,
    pub begin_at_utc: Option<String>,
    pub begin_at_local: Option<String>,
    pub begin_at_local_human: Option<String>,
    pub status: Option<MatchStatus>,
    pub status_label: Option<String>,
    pub best_of: Option<BestOf>,
    pub last_update: String,
}

/// The full tracked state: at most a handful of matches in refresh order,
/// plus the timestamp of the last refresh/update cycle. This is the unit of
/// persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedSet {
    #[serde(default)]
    pub matches: Vec<TrackedMatch>,
    #[serde(default)]
    pub last_refresh: Option<String>,
}

/// One-line display format for the compact widget endpoint:
/// `"{icon} {team1} {score-or-vs} {team2} • {local time} • {tournament}"`.
pub fn compact_line(m: &TrackedMatch) -> String {
    let team1 = m.teams.first();
    let team2 = m.teams.get(1);

    let name1 = team1.and_then(|t| t.name.as_deref()).unwrap_or("?");
    let name2 = team2.and_then(|t| t.name.as_deref()).unwrap_or("?");

    let score = match (
        team1.and_then(|t| t.score),
        team2.and_then(|t| t.score),
    ) {
        (Some(s1), Some(s2)) => format!("[{}-{}]", s1, s2),
        _ => "vs".to_string(),
    };

    let icon = m.status.as_ref().map(|s| s.icon()).unwrap_or("📅");

    // Only the league part of "League - Serie" fits on a widget line.
    let tournament_short = m
        .tournament
        .as_deref()
        .and_then(|t| t.split(" - ").next())
        .unwrap_or("");

    format!(
        "{} {} {} {} • {} • {}",
        icon,
        name1,
        score,
        name2,
        m.begin_at_local_human.as_deref().unwrap_or(""),
        tournament_short
    )
}
