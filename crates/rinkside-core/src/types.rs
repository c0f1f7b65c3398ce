//! Core types for Rinkside

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Text published when a boxscore has no entry for the tracked player.
pub const NO_ENTRY_TEXT: &str = "No stat entry yet.";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_CYCLES: u32 = 120;

/// Resolved NHL player identifier.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the live game a player is part of.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw boxscore document as fetched from the game feed.
#[derive(Clone, Debug, PartialEq)]
pub struct Boxscore(pub serde_json::Value);

impl Boxscore {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for Boxscore {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Result of one boxscore fetch. `Failed` means the source was unreachable,
/// which is distinct from a reachable document that lacks the player.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Document(Boxscore),
    Failed,
}

/// Scoring tally for a skater.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoring {
    pub goals: u32,
    pub assists: u32,
}

impl Scoring {
    pub fn points(&self) -> u32 {
        self.goals + self.assists
    }
}

/// Goaltending tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goaltending {
    pub saves: u32,
    pub goals_against: u32,
}

/// The stat lines for one player in one boxscore. Only fields present in the
/// document are populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLine {
    pub name: String,
    pub scoring: Option<Scoring>,
    pub shots: Option<u32>,
    pub time_on_ice: Option<String>,
    pub goaltending: Option<Goaltending>,
}

impl PlayerLine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scoring: None,
            shots: None,
            time_on_ice: None,
            goaltending: None,
        }
    }
}

impl std::fmt::Display for PlayerLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "**{}**", self.name)?;
        if let Some(s) = &self.scoring {
            write!(
                f,
                "\nGoals: {}  Assists: {}  Points: {}",
                s.goals,
                s.assists,
                s.points()
            )?;
        }
        if let Some(shots) = self.shots {
            write!(f, "\nShots: {}", shots)?;
        }
        if let Some(toi) = &self.time_on_ice {
            write!(f, "\nTOI: {}", toi)?;
        }
        if let Some(g) = &self.goaltending {
            write!(f, "\nSaves: {}  GA: {}", g.saves, g.goals_against)?;
        }
        Ok(())
    }
}

/// Display snapshot derived from a boxscore. Compared by value to decide
/// whether the published message needs an edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Snapshot {
    Entry(PlayerLine),
    NoEntry,
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry(line) => write!(f, "{}", line),
            Self::NoEntry => f.write_str(NO_ENTRY_TEXT),
        }
    }
}

/// Timing bounds for a poll session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_cycles: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

/// Session registry key - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct SessionKey(Arc<str>);

impl SessionKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Header and body of the message a session keeps up to date.
pub fn live_message(game: GameId, interval: Duration, snapshot: &Snapshot) -> String {
    format!(
        "Live stats (game {}), updating every {}s:\n\n{}",
        game,
        interval.as_secs(),
        snapshot
    )
}
