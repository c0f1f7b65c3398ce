//! Poll session: the live-update state machine for one (player, game) pair.
//!
//! A session is created after the initial message is published. Every
//! `interval` it fetches the boxscore, formats the player's snapshot and
//! edits the message when the snapshot changed. The next wait starts only
//! after the current cycle finishes, so cycles never overlap.
//!
//! Termination:
//! - `MaxCyclesReached`: the cycle counter passed `max_cycles` (no fetch).
//! - `FetchFailed`: the boxscore could not be fetched, or the cycle panicked.
//! - `Cancelled`: the cancellation token fired (shutdown, superseded).
//!
//! A document without the player is not terminal; it publishes the
//! placeholder text and keeps polling.

use crate::host::{MessageHandle, SessionHost};
use futures::FutureExt;
use rinkside_core::{live_message, FetchOutcome, GameId, PlayerId, PollConfig, Snapshot};
use rinkside_nhl::{format_snapshot, GameFeed};
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxCyclesReached,
    FetchFailed,
    /// Part of the closed set of reasons; an empty document never produces it.
    NoEntryTerminal,
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaxCyclesReached => write!(f, "max-cycles-reached"),
            Self::FetchFailed => write!(f, "fetch-failed"),
            Self::NoEntryTerminal => write!(f, "no-entry"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Stopped(StopReason),
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Snapshot equal to the published one; nothing sent.
    Unchanged,
    Published,
    /// The host refused the edit. The session stays active and retries on
    /// the next change check.
    PublishFailed,
    Stopped(StopReason),
}

pub struct PollSession {
    player: PlayerId,
    game: GameId,
    config: PollConfig,
    feed: Arc<dyn GameFeed>,
    host: Arc<dyn SessionHost>,
    handle: MessageHandle,
    last_published: Snapshot,
    cycle_count: u32,
    status: SessionStatus,
    cancel: CancellationToken,
}

impl PollSession {
    /// `initial` is the snapshot already shown in the message behind `handle`.
    pub fn new(
        player: PlayerId,
        game: GameId,
        config: PollConfig,
        feed: Arc<dyn GameFeed>,
        host: Arc<dyn SessionHost>,
        handle: MessageHandle,
        initial: Snapshot,
    ) -> Self {
        Self {
            player,
            game,
            config,
            feed,
            host,
            handle,
            last_published: initial,
            cycle_count: 0,
            status: SessionStatus::Active,
            cancel: CancellationToken::new(),
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn last_published(&self) -> &Snapshot {
        &self.last_published
    }

    /// Token that stops this session when cancelled. Cloned handles share state.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn stop(&mut self, reason: StopReason) -> CycleOutcome {
        if self.status == SessionStatus::Active {
            info!(
                "Session for player {} in game {} stopped: {} after {} cycles",
                self.player, self.game, reason, self.cycle_count
            );
            self.status = SessionStatus::Stopped(reason);
        }
        CycleOutcome::Stopped(reason)
    }

    /// Run one cycle immediately, without waiting for the interval.
    pub async fn step(&mut self) -> CycleOutcome {
        if let SessionStatus::Stopped(reason) = self.status {
            return CycleOutcome::Stopped(reason);
        }
        if self.cancel.is_cancelled() {
            return self.stop(StopReason::Cancelled);
        }

        self.cycle_count += 1;
        if self.cycle_count > self.config.max_cycles {
            return self.stop(StopReason::MaxCyclesReached);
        }

        let doc = match self.feed.fetch_boxscore(self.game).await {
            FetchOutcome::Document(doc) => doc,
            FetchOutcome::Failed => return self.stop(StopReason::FetchFailed),
        };

        let snapshot = format_snapshot(&doc, self.player);
        if snapshot == self.last_published {
            debug!("Cycle {} for game {}: unchanged", self.cycle_count, self.game);
            return CycleOutcome::Unchanged;
        }

        // The fetch may have outlived a cancellation request.
        if self.cancel.is_cancelled() {
            return self.stop(StopReason::Cancelled);
        }

        let text = live_message(self.game, self.config.interval, &snapshot);
        match self.host.publish_update(&self.handle, &text).await {
            Ok(()) => {
                debug!("Cycle {} for game {}: published", self.cycle_count, self.game);
                self.last_published = snapshot;
                CycleOutcome::Published
            }
            Err(e) => {
                warn!(
                    "Cycle {} for game {}: publish failed: {}",
                    self.cycle_count, self.game, e
                );
                CycleOutcome::PublishFailed
            }
        }
    }

    /// Drive cycles until the session stops. Returns why it stopped.
    pub async fn run(mut self) -> StopReason {
        info!(
            "Tracking player {} in game {} every {:?} for up to {} cycles",
            self.player, self.game, self.config.interval, self.config.max_cycles
        );

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.stop(StopReason::Cancelled);
                    return StopReason::Cancelled;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            let outcome = AssertUnwindSafe(self.step()).catch_unwind().await;
            match outcome {
                Ok(CycleOutcome::Stopped(reason)) => return reason,
                Ok(_) => {}
                Err(panic) => {
                    error!(
                        "Cycle {} for game {} panicked: {}",
                        self.cycle_count,
                        self.game,
                        panic_message(panic.as_ref())
                    );
                    self.stop(StopReason::FetchFailed);
                    return StopReason::FetchFailed;
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reason_display() {
        assert_eq!(StopReason::MaxCyclesReached.to_string(), "max-cycles-reached");
        assert_eq!(StopReason::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn panic_message_variants() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(s.as_ref()), "bang");
        let s: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }
}
