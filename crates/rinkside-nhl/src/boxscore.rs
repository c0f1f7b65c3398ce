//! Boxscore → snapshot formatting.
//!
//! Two document layouts are understood:
//!
//! - legacy statsapi: `teams.{home,away}.players`, keyed entries with
//!   `person.{id,fullName}` and stats under `stats.skaterStats`,
//!   `stats.goalieStats` or `stats` itself;
//! - api-web gamecenter: `playerByGameStats.{homeTeam,awayTeam}.{forwards,defense,goalies}`,
//!   entries carrying `playerId`, `name.default` and stats inline.
//!
//! Anything structurally missing yields `Snapshot::NoEntry`.

use crate::json::{as_count, as_id, as_text};
use rinkside_core::{Boxscore, Goaltending, PlayerId, PlayerLine, Scoring, Snapshot};
use serde_json::{Map, Value};

const FALLBACK_NAME: &str = "Player";

struct Participant<'a> {
    name: Option<String>,
    stats: &'a Map<String, Value>,
}

/// Derive the display snapshot for `player` from a boxscore document.
pub fn format_snapshot(doc: &Boxscore, player: PlayerId) -> Snapshot {
    let value = doc.as_value();
    let found = find_legacy(value, player).or_else(|| find_gamecenter(value, player));
    match found {
        Some(p) => Snapshot::Entry(player_line(&p)),
        None => Snapshot::NoEntry,
    }
}

fn entries(players: &Value) -> Vec<&Value> {
    match players {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => Vec::new(),
    }
}

fn find_legacy(doc: &Value, player: PlayerId) -> Option<Participant<'_>> {
    let entry = ["home", "away"]
        .iter()
        .flat_map(move |side| entries(&doc["teams"][side]["players"]))
        .find(|p| as_id(&p["person"]["id"]) == Some(player.0))?;

    let stats = entry.get("stats")?;
    let block = stats
        .get("skaterStats")
        .and_then(Value::as_object)
        .or_else(|| stats.get("goalieStats").and_then(Value::as_object))
        .or_else(|| stats.as_object())?;

    Some(Participant {
        name: as_text(&entry["person"]["fullName"]),
        stats: block,
    })
}

fn find_gamecenter(doc: &Value, player: PlayerId) -> Option<Participant<'_>> {
    let by_game = doc.get("playerByGameStats")?;
    let entry = ["homeTeam", "awayTeam"]
        .iter()
        .flat_map(move |team| {
            ["forwards", "defense", "goalies"]
                .iter()
                .flat_map(move |group| entries(&by_game[team][group]))
        })
        .find(|p| as_id(&p["playerId"]) == Some(player.0))?;

    let name = as_text(&entry["name"]["default"]).or_else(|| as_text(&entry["name"]));
    Some(Participant {
        name,
        stats: entry.as_object()?,
    })
}

fn player_line(p: &Participant<'_>) -> PlayerLine {
    let stats = p.stats;
    let mut line = PlayerLine::new(p.name.clone().unwrap_or_else(|| FALLBACK_NAME.into()));

    if stats.contains_key("goals") {
        line.scoring = Some(Scoring {
            goals: as_count(stats.get("goals")),
            assists: as_count(stats.get("assists")),
        });
    }

    line.shots = stats
        .get("shots")
        .or_else(|| stats.get("sog"))
        .map(|v| as_count(Some(v)));

    line.time_on_ice = stats
        .get("timeOnIce")
        .or_else(|| stats.get("toi"))
        .and_then(as_text);

    let saves = stats.get("saves").map(|v| as_count(Some(v))).or_else(|| {
        // "25/27" = saves/shots against
        stats
            .get("saveShotsAgainst")
            .and_then(Value::as_str)
            .and_then(|s| s.split('/').next())
            .and_then(|s| s.trim().parse().ok())
    });
    if let Some(saves) = saves {
        line.goaltending = Some(Goaltending {
            saves,
            goals_against: as_count(stats.get("goalsAgainst")),
        });
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy(players: Value) -> Boxscore {
        Boxscore(json!({"teams": {"home": {"players": players}, "away": {"players": {}}}}))
    }

    #[test]
    fn legacy_skater_stats() {
        let doc = legacy(json!({
            "ID42": {
                "person": {"id": 42, "fullName": "Jane Doe"},
                "stats": {"skaterStats": {"goals": 1, "assists": 0, "shots": 3, "timeOnIce": "12:34"}}
            }
        }));
        let snap = format_snapshot(&doc, PlayerId(42));
        assert_eq!(
            snap.to_string(),
            "**Jane Doe**\nGoals: 1  Assists: 0  Points: 1\nShots: 3\nTOI: 12:34"
        );
    }

    #[test]
    fn legacy_goalie_stats_default_goals_against() {
        let doc = legacy(json!({
            "ID1": {"person": {"id": "1", "fullName": "G"}, "stats": {"goalieStats": {"saves": 12}}}
        }));
        assert_eq!(format_snapshot(&doc, PlayerId(1)).to_string(), "**G**\nSaves: 12  GA: 0");
    }

    #[test]
    fn assists_default_to_zero_inside_existing_block() {
        let doc = legacy(json!({
            "ID42": {"person": {"id": 42, "fullName": "Jane Doe"}, "stats": {"goals": 2}}
        }));
        let snap = format_snapshot(&doc, PlayerId(42));
        assert!(snap.to_string().contains("Goals: 2  Assists: 0  Points: 2"));
    }

    #[test]
    fn empty_stats_block_is_name_only() {
        let doc = legacy(json!({"ID42": {"person": {"id": 42}, "stats": {}}}));
        assert_eq!(format_snapshot(&doc, PlayerId(42)).to_string(), "**Player**");
    }

    #[test]
    fn missing_stats_block_is_no_entry() {
        let doc = legacy(json!({"ID42": {"person": {"id": 42, "fullName": "Jane Doe"}}}));
        assert_eq!(format_snapshot(&doc, PlayerId(42)), Snapshot::NoEntry);
    }

    #[test]
    fn absent_player_is_no_entry() {
        let doc = legacy(json!({"ID7": {"person": {"id": 7}, "stats": {"goals": 1}}}));
        assert_eq!(format_snapshot(&doc, PlayerId(42)), Snapshot::NoEntry);
    }

    #[test]
    fn malformed_documents_are_no_entry() {
        for doc in [
            json!(null),
            json!([]),
            json!("x"),
            json!({"teams": 5}),
            json!({"playerByGameStats": []}),
        ] {
            assert_eq!(format_snapshot(&Boxscore(doc), PlayerId(42)), Snapshot::NoEntry);
        }
    }

    #[test]
    fn gamecenter_layout() {
        let doc = Boxscore(json!({
            "playerByGameStats": {
                "homeTeam": {"forwards": [], "defense": [], "goalies": []},
                "awayTeam": {
                    "forwards": [{"playerId": 8478402, "name": {"default": "C. McDavid"},
                                  "goals": 0, "assists": 2, "sog": 4, "toi": "21:10"}],
                    "defense": [],
                    "goalies": [{"playerId": 8479973, "name": {"default": "S. Skinner"},
                                 "saveShotsAgainst": "25/27", "goalsAgainst": 2, "toi": "58:00"}]
                }
            }
        }));
        assert_eq!(
            format_snapshot(&doc, PlayerId(8478402)).to_string(),
            "**C. McDavid**\nGoals: 0  Assists: 2  Points: 2\nShots: 4\nTOI: 21:10"
        );
        assert_eq!(
            format_snapshot(&doc, PlayerId(8479973)).to_string(),
            "**S. Skinner**\nTOI: 58:00\nSaves: 25  GA: 2"
        );
    }
}
