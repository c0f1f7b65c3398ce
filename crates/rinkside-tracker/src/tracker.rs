//! Tracking requests: resolve the player and game, publish the initial
//! snapshot, then hand a poll session to the registry.

use crate::host::SessionHost;
use crate::registry::{SessionRegistry, TrackedSession};
use crate::session::PollSession;
use rinkside_core::{live_message, FetchOutcome, PollConfig, SessionKey, Snapshot, TrackError};
use rinkside_nhl::{format_snapshot, GameFeed, PlayerDirectory};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Tracker {
    directory: Arc<dyn PlayerDirectory>,
    feed: Arc<dyn GameFeed>,
    registry: Arc<SessionRegistry>,
    config: PollConfig,
}

impl Tracker {
    pub fn new(
        directory: Arc<dyn PlayerDirectory>,
        feed: Arc<dyn GameFeed>,
        config: PollConfig,
    ) -> Self {
        Self {
            directory,
            feed,
            registry: Arc::new(SessionRegistry::new()),
            config,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Handle a tracking request end to end and start its session.
    pub async fn track(
        &self,
        key: SessionKey,
        query: &str,
        host: Arc<dyn SessionHost>,
    ) -> Result<TrackedSession, TrackError> {
        let session = self.prepare(query, host).await?;
        Ok(self.registry.start(key, session))
    }

    /// Resolve, publish the initial message and build the session without
    /// starting it. User-facing failures are published before returning.
    pub async fn prepare(
        &self,
        query: &str,
        host: Arc<dyn SessionHost>,
    ) -> Result<PollSession, TrackError> {
        let query = query.trim();
        if query.is_empty() {
            return reject(host.as_ref(), TrackError::EmptyQuery).await;
        }

        let Some(player) = self.directory.resolve(query).await else {
            return reject(host.as_ref(), TrackError::not_found(query)).await;
        };

        let Some(game) = self.feed.current_game(player).await else {
            return reject(host.as_ref(), TrackError::NotInLiveGame { player }).await;
        };

        let initial = match self.feed.fetch_boxscore(game).await {
            FetchOutcome::Document(doc) => format_snapshot(&doc, player),
            FetchOutcome::Failed => {
                warn!("Initial boxscore fetch for game {} failed; publishing placeholder", game);
                Snapshot::NoEntry
            }
        };

        let text = live_message(game, self.config.interval, &initial);
        let handle = host.publish_initial(&text).await?;
        info!("Player {:?} resolved to {} in game {}", query, player, game);

        Ok(PollSession::new(
            player,
            game,
            self.config,
            self.feed.clone(),
            host,
            handle,
            initial,
        ))
    }
}

async fn reject<T>(host: &dyn SessionHost, err: TrackError) -> Result<T, TrackError> {
    info!("Tracking request rejected: {}", err);
    if let Err(e) = host.publish_initial(&err.to_string()).await {
        warn!("Could not deliver rejection: {}", e);
    }
    Err(err)
}
