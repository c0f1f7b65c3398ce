//! Discord interaction payloads and the `/player` command surface.
//!
//! Only the fields the bot reads are modelled. Unknown fields are ignored.

use rinkside_core::SessionKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PING: u8 = 1;
pub const APPLICATION_COMMAND: u8 = 2;

pub const PONG: u8 = 1;
pub const CHANNEL_MESSAGE: u8 = 4;
pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;

/// Message flag that limits visibility to the invoking user.
pub const EPHEMERAL: u64 = 1 << 6;

pub const PLAYER_COMMAND: &str = "player";
pub const NAME_OPTION: &str = "name";

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub data: Option<CommandData>,
    /// Present for guild invocations.
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for DM invocations.
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
}

impl Interaction {
    pub fn user_id(&self) -> Option<&str> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.id.as_str())
    }

    /// Registry key: one running session per user per channel.
    pub fn session_key(&self) -> SessionKey {
        let channel = self.channel_id.as_deref().unwrap_or("dm");
        let user = self.user_id().unwrap_or("unknown");
        SessionKey::new(format!("{}:{}", channel, user))
    }
}

/// A recognised slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Player { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command.")]
    Unknown(String),
    #[error("Please provide a player name.")]
    MissingName,
}

/// Extract the command from an APPLICATION_COMMAND interaction.
pub fn parse_command(interaction: &Interaction) -> Result<Command, CommandError> {
    let data = interaction
        .data
        .as_ref()
        .ok_or_else(|| CommandError::Unknown(String::new()))?;

    match data.name.as_str() {
        PLAYER_COMMAND => {
            let name = data
                .options
                .iter()
                .find(|o| o.name == NAME_OPTION)
                .and_then(|o| o.value.as_ref())
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(CommandError::MissingName)?;
            Ok(Command::Player {
                name: name.to_string(),
            })
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseData {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self { kind: PONG, data: None }
    }

    /// Acknowledge now, edit the original response later.
    pub fn deferred() -> Self {
        Self {
            kind: DEFERRED_CHANNEL_MESSAGE,
            data: None,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE,
            data: Some(ResponseData {
                content: content.into(),
                flags: Some(EPHEMERAL),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn interaction(v: Value) -> Interaction {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn parses_player_command() {
        let i = interaction(json!({
            "type": 2,
            "data": {"name": "player", "options": [{"name": "name", "type": 3, "value": " Jane Doe "}]}
        }));
        assert_eq!(
            parse_command(&i),
            Ok(Command::Player { name: "Jane Doe".into() })
        );
    }

    #[test]
    fn missing_or_blank_name() {
        let i = interaction(json!({"type": 2, "data": {"name": "player"}}));
        assert_eq!(parse_command(&i), Err(CommandError::MissingName));
        let i = interaction(json!({
            "type": 2,
            "data": {"name": "player", "options": [{"name": "name", "value": "  "}]}
        }));
        assert_eq!(parse_command(&i), Err(CommandError::MissingName));
    }

    #[test]
    fn unknown_command() {
        let i = interaction(json!({"type": 2, "data": {"name": "team"}}));
        let err = parse_command(&i).unwrap_err();
        assert_eq!(err, CommandError::Unknown("team".into()));
        assert_eq!(err.to_string(), "Unknown command.");
    }

    #[test]
    fn session_key_prefers_member_user() {
        let i = interaction(json!({
            "type": 2, "channel_id": "c1",
            "member": {"user": {"id": "u1"}}, "user": {"id": "u2"}
        }));
        assert_eq!(i.session_key().as_str(), "c1:u1");
        let dm = interaction(json!({"type": 2, "user": {"id": "u2"}}));
        assert_eq!(dm.session_key().as_str(), "dm:u2");
    }

    #[test]
    fn response_shapes() {
        assert_eq!(
            serde_json::to_value(InteractionResponse::pong()).unwrap(),
            json!({"type": 1})
        );
        assert_eq!(
            serde_json::to_value(InteractionResponse::deferred()).unwrap(),
            json!({"type": 5})
        );
        assert_eq!(
            serde_json::to_value(InteractionResponse::ephemeral("hi")).unwrap(),
            json!({"type": 4, "data": {"content": "hi", "flags": 64}})
        );
    }
}
