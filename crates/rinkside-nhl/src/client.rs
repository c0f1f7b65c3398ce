//! HTTP client for the public NHL search and api-web endpoints

use crate::json::as_id;
use crate::provider::{GameFeed, NhlError, PlayerDirectory};
use reqwest::Client;
use rinkside_core::config::NhlSettings;
use rinkside_core::{Boxscore, FetchOutcome, GameId, PlayerId};
use serde_json::Value;
use tracing::{debug, warn};

pub struct NhlClient {
    client: Client,
    search_url: String,
    api_url: String,
    search_limit: u32,
}

impl NhlClient {
    pub fn new(settings: &NhlSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {} - using defaults", e);
                Client::new()
            });
        Self {
            client,
            search_url: settings.search_url.clone(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            search_limit: settings.search_limit,
        }
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Value, NhlError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NhlError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| NhlError::InvalidResponse(e.to_string()))
    }

    /// Search for players matching `query` and return the first-ranked id.
    pub async fn search(&self, query: &str) -> Result<Option<PlayerId>, NhlError> {
        let limit = self.search_limit.to_string();
        let request = self.client.get(&self.search_url).query(&[
            ("culture", "en-us"),
            ("limit", limit.as_str()),
            ("q", query),
        ]);
        let json = self.get_json(request, &self.search_url).await?;
        Ok(first_candidate(&json))
    }

    pub async fn landing(&self, player: PlayerId) -> Result<Value, NhlError> {
        let url = format!("{}/v1/player/{}/landing", self.api_url, player);
        self.get_json(self.client.get(&url), &url).await
    }

    pub async fn boxscore(&self, game: GameId) -> Result<Value, NhlError> {
        let url = format!("{}/v1/gamecenter/{}/boxscore", self.api_url, game);
        self.get_json(self.client.get(&url), &url).await
    }
}

#[async_trait::async_trait]
impl PlayerDirectory for NhlClient {
    async fn resolve(&self, query: &str) -> Option<PlayerId> {
        match self.search(query).await {
            Ok(found) => {
                debug!("Search {:?} -> {:?}", query, found);
                found
            }
            Err(e) => {
                warn!("Player search for {:?} failed: {}", query, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl GameFeed for NhlClient {
    async fn current_game(&self, player: PlayerId) -> Option<GameId> {
        match self.landing(player).await {
            Ok(landing) => current_game_from_landing(&landing),
            Err(e) => {
                warn!("Landing fetch for player {} failed: {}", player, e);
                None
            }
        }
    }

    async fn fetch_boxscore(&self, game: GameId) -> FetchOutcome {
        match self.boxscore(game).await {
            Ok(Value::Null) => {
                warn!("Boxscore for game {} was null", game);
                FetchOutcome::Failed
            }
            Ok(doc) => FetchOutcome::Document(Boxscore(doc)),
            Err(e) => {
                warn!("Boxscore fetch for game {} failed: {}", game, e);
                FetchOutcome::Failed
            }
        }
    }
}

/// First candidate of a search response. The service has returned
/// `{"players": [...]}`, `{"data": [...]}` and bare arrays over time.
pub fn first_candidate(json: &Value) -> Option<PlayerId> {
    let players = json
        .get("players")
        .or_else(|| json.get("data"))
        .unwrap_or(json);
    let first = players.as_array()?.first()?;
    first
        .get("id")
        .and_then(as_id)
        .or_else(|| first.get("playerId").and_then(as_id))
        .map(PlayerId)
}

/// Current game id from a player landing document.
pub fn current_game_from_landing(landing: &Value) -> Option<GameId> {
    [
        &landing["player"]["currentGameId"],
        &landing["player"]["gameId"],
        &landing["liveGame"]["gamePk"],
        &landing["currentGameId"],
    ]
    .into_iter()
    .find_map(as_id)
    .map(GameId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn candidate_from_players_key() {
        let json = json!({"players": [{"id": 42}, {"id": 7}]});
        assert_eq!(first_candidate(&json), Some(PlayerId(42)));
    }

    #[test]
    fn candidate_from_data_key() {
        let json = json!({"data": [{"id": "8478402"}]});
        assert_eq!(first_candidate(&json), Some(PlayerId(8478402)));
    }

    #[test]
    fn candidate_from_bare_array_with_player_id() {
        let json = json!([{"playerId": "8471214", "name": "Alex Ovechkin"}]);
        assert_eq!(first_candidate(&json), Some(PlayerId(8471214)));
    }

    #[test]
    fn no_candidates() {
        assert_eq!(first_candidate(&json!([])), None);
        assert_eq!(first_candidate(&json!({"players": []})), None);
        assert_eq!(first_candidate(&json!({"message": "nope"})), None);
    }

    #[test]
    fn landing_game_id_fallbacks() {
        assert_eq!(
            current_game_from_landing(&json!({"player": {"currentGameId": 900}})),
            Some(GameId(900))
        );
        assert_eq!(
            current_game_from_landing(&json!({"player": {"gameId": "901"}})),
            Some(GameId(901))
        );
        assert_eq!(
            current_game_from_landing(&json!({"liveGame": {"gamePk": 902}})),
            Some(GameId(902))
        );
        assert_eq!(current_game_from_landing(&json!({"playerId": 42})), None);
    }
}
