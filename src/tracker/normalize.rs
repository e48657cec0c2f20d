use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::pandascore::types::RawMatch;
use crate::tracker::{BestOf, MatchStatus, TeamSlot, TrackedMatch};

/// Turn a raw provider record into the canonical display record.
///
/// This is a total function: any missing or malformed field degrades to
/// `None` on the output, never an error. `last_update` is stamped on every
/// call so consumers can tell how fresh a record is.
pub fn normalize(raw: &RawMatch, tz: Tz) -> TrackedMatch {
    let tournament = derive_tournament(raw);

    // Map team_id -> score; entries missing either half are skipped.
    let scores: HashMap<i64, i64> = raw
        .results
        .iter()
        .filter_map(|r| Some((r.team_id?, r.score?)))
        .collect();

    let teams: Vec<TeamSlot> = raw
        .opponents
        .iter()
        .map(|slot| {
            let team = slot.team();
            TeamSlot {
                id: team.id,
                name: team.name.clone(),
                logo: team.image_url.clone().or_else(|| team.logo.clone()),
                score: team.id.and_then(|id| scores.get(&id).copied()),
            }
        })
        .collect();

    let (begin_at_local, begin_at_local_human) = raw
        .begin_at
        .as_deref()
        .and_then(|s| local_times(s, tz))
        .unzip();

    let status = raw.status.as_deref().map(MatchStatus::from_raw);
    let status_label = status.as_ref().map(|s| s.label().to_string());

    let best_of = raw
        .number_of_games
        .map(BestOf::Games)
        .or_else(|| raw.match_type.clone().map(BestOf::Kind));

    TrackedMatch {
        id: raw.id,
        tournament,
        teams,
        begin_at_utc: raw.begin_at.clone(),
        begin_at_local,
        begin_at_local_human,
        status,
        status_label,
        best_of,
        last_update: Utc::now().with_timezone(&tz).to_rfc3339(),
    }
}

/// Display name priority: league name, then serie full name (or season),
/// joined with " - "; tournament name only when both are absent.
fn derive_tournament(raw: &RawMatch) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(name) = raw.league.as_ref().and_then(|l| l.name.as_deref()) {
        if !name.is_empty() {
            parts.push(name);
        }
    }
    if let Some(serie) = raw.serie.as_ref() {
        if let Some(name) = serie
            .full_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| serie.season.as_deref().filter(|s| !s.is_empty()))
        {
            parts.push(name);
        }
    }
    if parts.is_empty() {
        if let Some(name) = raw.tournament.as_ref().and_then(|t| t.name.as_deref()) {
            if !name.is_empty() {
                parts.push(name);
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" - "))
    }
}

fn local_times(begin_at: &str, tz: Tz) -> Option<(String, String)> {
    let dt = DateTime::parse_from_rfc3339(begin_at).ok()?;
    let local = dt.with_timezone(&tz);
    Some((local.to_rfc3339(), local.format("%d/%m %H:%M").to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tz() -> Tz {
        "Europe/Zurich".parse().unwrap()
    }

    fn raw(json: &str) -> RawMatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_tournament_league_and_serie() {
        let m = raw(
            r#"{"league":{"name":"LFL"},"serie":{"full_name":"Summer 2024"},"tournament":{"name":"Playoffs"}}"#,
        );
        assert_eq!(
            normalize(&m, tz()).tournament.as_deref(),
            Some("LFL - Summer 2024")
        );
    }

    #[test]
    fn test_tournament_serie_season_fallback() {
        let m = raw(r#"{"league":{"name":"LEC"},"serie":{"season":"2024"}}"#);
        assert_eq!(normalize(&m, tz()).tournament.as_deref(), Some("LEC - 2024"));
    }

    #[test]
    fn test_tournament_name_only_when_rest_absent() {
        let m = raw(r#"{"tournament":{"name":"Worlds"}}"#);
        assert_eq!(normalize(&m, tz()).tournament.as_deref(), Some("Worlds"));
    }

    #[test]
    fn test_tournament_absent() {
        let m = raw("{}");
        assert_eq!(normalize(&m, tz()).tournament, None);
    }

    #[test]
    fn test_scores_attached_by_team_id() {
        let m = raw(
            r#"{
              "opponents":[
                {"opponent":{"id":1,"name":"G2","image_url":"g2.png"}},
                {"opponent":{"id":2,"name":"FNC","logo":"fnc.png"}}
              ],
              "results":[
                {"team_id":1,"score":2},
                {"team_id":2,"score":0},
                {"team_id":null,"score":9}
              ]
            }"#,
        );
        let t = normalize(&m, tz());
        assert_eq!(t.teams.len(), 2);
        assert_eq!(t.teams[0].score, Some(2));
        assert_eq!(t.teams[0].logo.as_deref(), Some("g2.png"));
        assert_eq!(t.teams[1].score, Some(0));
        assert_eq!(t.teams[1].logo.as_deref(), Some("fnc.png"));
    }

    #[test]
    fn test_score_missing_for_unmatched_team() {
        let m = raw(
            r#"{"opponents":[{"opponent":{"id":3,"name":"KC"}}],"results":[{"team_id":99,"score":1}]}"#,
        );
        let t = normalize(&m, tz());
        assert_eq!(t.teams[0].score, None);
    }

    #[test]
    fn test_time_conversion() {
        let m = raw(r#"{"begin_at":"2024-06-01T15:00:00Z"}"#);
        let t = normalize(&m, tz());
        assert_eq!(t.begin_at_utc.as_deref(), Some("2024-06-01T15:00:00Z"));
        // Europe/Zurich is UTC+2 in June
        assert_eq!(t.begin_at_local_human.as_deref(), Some("01/06 17:00"));
        assert!(t.begin_at_local.as_deref().unwrap().starts_with("2024-06-01T17:00:00"));
    }

    #[test]
    fn test_malformed_timestamp_keeps_raw_utc() {
        let m = raw(r#"{"begin_at":"not-a-date"}"#);
        let t = normalize(&m, tz());
        assert_eq!(t.begin_at_utc.as_deref(), Some("not-a-date"));
        assert_eq!(t.begin_at_local, None);
        assert_eq!(t.begin_at_local_human, None);
    }

    #[test]
    fn test_status_and_label() {
        let t = normalize(&raw(r#"{"status":"running"}"#), tz());
        assert_eq!(t.status, Some(MatchStatus::Running));
        assert_eq!(t.status_label.as_deref(), Some("En cours"));

        let t = normalize(&raw(r#"{"status":"forfeit"}"#), tz());
        assert_eq!(t.status, Some(MatchStatus::Other("forfeit".to_string())));
        assert_eq!(t.status_label.as_deref(), Some("forfeit"));
    }

    #[test]
    fn test_best_of_prefers_game_count() {
        let t = normalize(&raw(r#"{"number_of_games":5,"match_type":"best_of"}"#), tz());
        assert_eq!(t.best_of, Some(BestOf::Games(5)));
        let t = normalize(&raw(r#"{"match_type":"best_of"}"#), tz());
        assert_eq!(t.best_of, Some(BestOf::Kind("best_of".to_string())));
    }

    #[test]
    fn test_total_on_empty_input() {
        let t = normalize(&raw("{}"), tz());
        assert_eq!(t.id, None);
        assert!(t.teams.is_empty());
        assert_eq!(t.status, None);
        assert!(!t.last_update.is_empty());
    }
}
