use serde::Deserialize;

/// Raw PandaScore match record. Every field is optional: the API omits or
/// nulls fields freely depending on match state, and normalization must
/// degrade rather than fail.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMatch {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub league: Option<RawLeague>,
    #[serde(default)]
    pub serie: Option<RawSerie>,
    #[serde(default)]
    pub tournament: Option<RawTournament>,
    #[serde(default)]
    pub opponents: Vec<RawOpponentSlot>,
    #[serde(default)]
    pub results: Vec<RawResult>,
    #[serde(default)]
    pub begin_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub number_of_games: Option<i64>,
    #[serde(default)]
    pub match_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLeague {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSerie {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTournament {
    #[serde(default)]
    pub name: Option<String>,
}

/// Opponent list entries come in two shapes: `{"opponent": {...}, "type": "Team"}`
/// or the team object directly. `Wrapped` must be tried first since `RawTeam`
/// matches any object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawOpponentSlot {
    Wrapped { opponent: RawTeam },
    Bare(RawTeam),
}

impl RawOpponentSlot {
    pub fn team(&self) -> &RawTeam {
        match self {
            RawOpponentSlot::Wrapped { opponent } => opponent,
            RawOpponentSlot::Bare(team) => team,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Per-team score entry from the match's `results` list.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResult {
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub score: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_opponent() {
        let slot: RawOpponentSlot = serde_json::from_str(
            r#"{"type":"Team","opponent":{"id":7,"name":"G2 Esports","image_url":"https://x/g2.png"}}"#,
        )
        .unwrap();
        let team = slot.team();
        assert_eq!(team.id, Some(7));
        assert_eq!(team.name.as_deref(), Some("G2 Esports"));
    }

    #[test]
    fn test_bare_opponent() {
        let slot: RawOpponentSlot =
            serde_json::from_str(r#"{"id":12,"name":"Fnatic","logo":"https://x/fnc.png"}"#)
                .unwrap();
        let team = slot.team();
        assert_eq!(team.id, Some(12));
        assert_eq!(team.logo.as_deref(), Some("https://x/fnc.png"));
    }

    #[test]
    fn test_match_with_everything_missing() {
        let m: RawMatch = serde_json::from_str("{}").unwrap();
        assert!(m.id.is_none());
        assert!(m.opponents.is_empty());
        assert!(m.results.is_empty());
    }

    #[test]
    fn test_null_fields_tolerated() {
        let m: RawMatch = serde_json::from_str(
            r#"{"id":41,"league":null,"serie":null,"begin_at":null,"status":"running"}"#,
        )
        .unwrap();
        assert_eq!(m.id, Some(41));
        assert!(m.league.is_none());
        assert_eq!(m.status.as_deref(), Some("running"));
    }
}
