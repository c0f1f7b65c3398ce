//! Error types for Rinkside

use crate::types::PlayerId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("toml error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to deliver a message through a session host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("host rejected message: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid message handle: {0}")]
    InvalidHandle(String),
}

impl HostError {
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }
}

/// Terminal outcomes of a tracking request. `Display` is the text shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    #[error("Please provide a player name.")]
    EmptyQuery,

    #[error("Could not find player **{query}**.")]
    PlayerNotFound { query: String },

    #[error("Player found but not in a live game.")]
    NotInLiveGame { player: PlayerId },

    #[error("could not publish to host: {0}")]
    Host(#[from] HostError),
}

impl TrackError {
    pub fn not_found(query: impl Into<String>) -> Self {
        Self::PlayerNotFound {
            query: query.into(),
        }
    }

    /// Whether the user should see this outcome as a reply.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Host(_))
    }
}
