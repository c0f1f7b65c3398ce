//! Tests for rinkside-nhl: NhlClient against an in-process mock of the NHL endpoints

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use rinkside_core::config::NhlSettings;
use rinkside_core::{FetchOutcome, GameId, PlayerId, Snapshot};
use rinkside_nhl::{format_snapshot, GameFeed, NhlClient, PlayerDirectory};
use serde_json::json;
use std::collections::HashMap;

async fn search(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    assert_eq!(params.get("culture").map(String::as_str), Some("en-us"));
    assert_eq!(params.get("limit").map(String::as_str), Some("5"));
    match params.get("q").map(String::as_str) {
        Some("Jane Doe") => Json(json!([{"playerId": "42", "name": "Jane Doe"}, {"playerId": "43"}])).into_response(),
        Some("broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Some("garbage") => "not json".into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn landing(Path(id): Path<u64>) -> impl IntoResponse {
    match id {
        42 => Json(json!({"playerId": 42, "player": {"currentGameId": 900}})).into_response(),
        43 => Json(json!({"playerId": 43})).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn boxscore(Path(id): Path<u64>) -> impl IntoResponse {
    match id {
        900 => Json(json!({
            "playerByGameStats": {
                "homeTeam": {"forwards": [{"playerId": 42, "name": {"default": "J. Doe"}, "goals": 1, "assists": 0}]},
                "awayTeam": {}
            }
        }))
        .into_response(),
        901 => Json(json!({"playerByGameStats": {}})).into_response(),
        902 => "null".into_response(),
        _ => StatusCode::BAD_GATEWAY.into_response(),
    }
}

async fn spawn_mock() -> String {
    let app = Router::new()
        .route("/search", get(search))
        .route("/v1/player/:id/landing", get(landing))
        .route("/v1/gamecenter/:id/boxscore", get(boxscore));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn client() -> NhlClient {
    let base = spawn_mock().await;
    NhlClient::new(&NhlSettings::default())
        .with_search_url(format!("{}/search", base))
        .with_api_url(base)
}

// ===========================================================================
// PlayerDirectory
// ===========================================================================

#[tokio::test]
async fn resolve_picks_first_ranked() {
    let nhl = client().await;
    assert_eq!(nhl.resolve("Jane Doe").await, Some(PlayerId(42)));
}

#[tokio::test]
async fn resolve_no_match_is_none() {
    let nhl = client().await;
    assert_eq!(nhl.resolve("Nobody").await, None);
}

#[tokio::test]
async fn resolve_failures_are_none() {
    let nhl = client().await;
    assert_eq!(nhl.resolve("broken").await, None);
    assert_eq!(nhl.resolve("garbage").await, None);
}

#[tokio::test]
async fn resolve_unreachable_is_none() {
    let nhl = NhlClient::new(&NhlSettings::default())
        .with_search_url("http://127.0.0.1:9/search");
    assert_eq!(nhl.resolve("Jane Doe").await, None);
}

// ===========================================================================
// GameFeed
// ===========================================================================

#[tokio::test]
async fn current_game_found() {
    let nhl = client().await;
    assert_eq!(nhl.current_game(PlayerId(42)).await, Some(GameId(900)));
}

#[tokio::test]
async fn current_game_absent_or_failed() {
    let nhl = client().await;
    assert_eq!(nhl.current_game(PlayerId(43)).await, None);
    assert_eq!(nhl.current_game(PlayerId(44)).await, None);
}

#[tokio::test]
async fn boxscore_document_formats() {
    let nhl = client().await;
    let FetchOutcome::Document(doc) = nhl.fetch_boxscore(GameId(900)).await else {
        panic!("expected document");
    };
    let snap = format_snapshot(&doc, PlayerId(42));
    assert_eq!(snap.to_string(), "**J. Doe**\nGoals: 1  Assists: 0  Points: 1");
}

#[tokio::test]
async fn boxscore_without_player_is_document_not_failure() {
    let nhl = client().await;
    let outcome = nhl.fetch_boxscore(GameId(901)).await;
    let FetchOutcome::Document(doc) = outcome else {
        panic!("empty document must not be a failure");
    };
    assert_eq!(format_snapshot(&doc, PlayerId(42)), Snapshot::NoEntry);
}

#[tokio::test]
async fn boxscore_failures() {
    let nhl = client().await;
    assert_eq!(nhl.fetch_boxscore(GameId(902)).await, FetchOutcome::Failed);
    assert_eq!(nhl.fetch_boxscore(GameId(999)).await, FetchOutcome::Failed);
}
