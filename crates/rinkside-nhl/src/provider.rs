//! Collaborator traits for player lookup and game state.
//!
//! Implementations never surface errors to callers: every failure collapses
//! into the documented sentinel (`None` or `FetchOutcome::Failed`).

use rinkside_core::{FetchOutcome, GameId, PlayerId};

/// NHL client error types. Internal to implementations.
#[derive(Debug, thiserror::Error)]
pub enum NhlError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Resolves free-text names to player ids.
#[async_trait::async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// First-ranked match for `query`, or `None` when nothing matched or the
    /// search service could not be reached.
    async fn resolve(&self, query: &str) -> Option<PlayerId>;
}

/// Live game lookup and boxscore fetches.
#[async_trait::async_trait]
pub trait GameFeed: Send + Sync {
    /// The game the player is currently in, if any.
    async fn current_game(&self, player: PlayerId) -> Option<GameId>;

    async fn fetch_boxscore(&self, game: GameId) -> FetchOutcome;
}
