//! Gateway server: Discord interactions endpoint plus health and session views

use crate::discord::DiscordClient;
use crate::error::GatewayError;
use crate::interaction::{
    parse_command, Command, Interaction, InteractionResponse, APPLICATION_COMMAND, PING,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use rinkside_core::{RinksideConfig, SessionKey};
use rinkside_nhl::NhlClient;
use rinkside_tracker::{SessionInfo, Tracker};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub struct GatewayState {
    pub tracker: Arc<Tracker>,
    pub discord: DiscordClient,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(tracker: Arc<Tracker>, discord: DiscordClient) -> Self {
        Self {
            tracker,
            discord,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/interactions", post(interactions_handler))
        .route("/health", get(health_handler))
        .route("/sessions", get(sessions_handler))
        .route("/sessions/:key", delete(cancel_session_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C, then cancel every running session.
pub async fn start_gateway(config: RinksideConfig) -> anyhow::Result<()> {
    let nhl = Arc::new(NhlClient::new(&config.nhl));
    let tracker = Arc::new(Tracker::new(nhl.clone(), nhl, config.poll.to_poll_config()));
    let discord = DiscordClient::new(&config.discord);
    let state = Arc::new(GatewayState::new(tracker.clone(), discord));
    let app = build_router(state);

    let bind_addr: SocketAddr =
        format!("{}:{}", config.gateway.bind.to_addr(), config.gateway.port).parse()?;

    info!("Rinkside Gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Interactions: http://{}/interactions", bind_addr);
    info!(
        "  Polling every {}s for up to {} cycles",
        config.poll.interval_secs, config.poll.max_cycles
    );
    if config.discord.bot_token.is_some() {
        info!("  Updates: channel message edits (bot token)");
    } else {
        info!("  Updates: interaction webhook edits");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracker.registry().shutdown().await;
    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn interactions_handler(
    State(state): State<Arc<GatewayState>>,
    Json(interaction): Json<Interaction>,
) -> Result<Json<InteractionResponse>, GatewayError> {
    match interaction.kind {
        PING => Ok(Json(InteractionResponse::pong())),
        APPLICATION_COMMAND => handle_command(&state, interaction).map(Json),
        other => Err(GatewayError::UnsupportedInteraction(other)),
    }
}

/// Acknowledge the command right away and track in the background. The
/// tracker edits the deferred response with the outcome. The background work
/// runs on the registry so shutdown waits for it.
fn handle_command(
    state: &GatewayState,
    interaction: Interaction,
) -> Result<InteractionResponse, GatewayError> {
    let name = match parse_command(&interaction) {
        Ok(Command::Player { name }) => name,
        Err(e) => {
            debug!("Command rejected: {:?}", e);
            return Ok(InteractionResponse::ephemeral(e.to_string()));
        }
    };

    let token = interaction
        .token
        .clone()
        .ok_or_else(|| GatewayError::BadRequest("interaction token missing".into()))?;
    let application_id = interaction
        .application_id
        .clone()
        .or_else(|| state.discord.application_id().map(String::from))
        .ok_or_else(|| GatewayError::BadRequest("application id unknown".into()))?;

    let key = interaction.session_key();
    let host = Arc::new(state.discord.host(application_id, token));
    let tracker = state.tracker.clone();
    info!("/player {:?} requested by {}", name, key);

    state.tracker.registry().spawn(async move {
        match tracker.track(key, &name, host).await {
            Ok(tracked) => info!(
                "Session {} tracking player {} in game {}",
                tracked.info.id, tracked.info.player, tracked.info.game
            ),
            Err(e) if e.is_user_facing() => debug!("Tracking ended early: {}", e),
            Err(e) => warn!("Tracking request failed: {}", e),
        }
    });

    Ok(InteractionResponse::deferred())
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.tracker.registry().len(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}

async fn sessions_handler(State(state): State<Arc<GatewayState>>) -> Json<Vec<SessionInfo>> {
    Json(state.tracker.registry().list())
}

async fn cancel_session_handler(
    Path(key): Path<String>,
    State(state): State<Arc<GatewayState>>,
) -> Result<StatusCode, GatewayError> {
    if state.tracker.registry().cancel(&SessionKey::new(key.as_str())) {
        info!("Session {} cancelled via API", key);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(GatewayError::NotFound(format!("no session for {}", key)))
    }
}
