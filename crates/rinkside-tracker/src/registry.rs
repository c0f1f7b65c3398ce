//! Registry of running poll sessions, keyed by requester.
//!
//! Starting a session under a key that already has one supersedes it: the
//! previous session is cancelled. Finished sessions remove their own entry.

use crate::session::{PollSession, StopReason};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rinkside_core::{GameId, PlayerId, SessionKey};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;
use uuid::Uuid;

/// Read-only summary of a running session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub key: String,
    pub player: PlayerId,
    pub game: GameId,
    pub started_at: DateTime<Utc>,
}

struct SessionEntry {
    info: SessionInfo,
    cancel: CancellationToken,
}

/// Returned when a session starts. Awaiting `join` yields the stop reason.
#[derive(Debug)]
pub struct TrackedSession {
    pub info: SessionInfo,
    pub cancel: CancellationToken,
    pub join: JoinHandle<StopReason>,
}

pub struct SessionRegistry {
    sessions: Arc<DashMap<SessionKey, SessionEntry>>,
    tasks: TaskTracker,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            tasks: TaskTracker::new(),
        }
    }

    /// Spawn `session` under `key`, cancelling any session already there.
    /// After `shutdown` the session is cancelled before its first cycle.
    pub fn start(&self, key: SessionKey, session: PollSession) -> TrackedSession {
        let id = Uuid::new_v4();
        let cancel = session.cancel_token();
        let info = SessionInfo {
            id,
            key: key.as_str().to_string(),
            player: session.player(),
            game: session.game(),
            started_at: Utc::now(),
        };

        let previous = self.sessions.insert(
            key.clone(),
            SessionEntry {
                info: info.clone(),
                cancel: cancel.clone(),
            },
        );
        if let Some(prev) = previous {
            info!("Session {} superseded by {} for {}", prev.info.id, id, key);
            prev.cancel.cancel();
        }

        // Checked after the insert: `shutdown` closes before it cancels.
        if self.tasks.is_closed() {
            info!("Registry shut down; session {} for {} cancelled", id, key);
            cancel.cancel();
            self.sessions.remove_if(&key, |_, entry| entry.info.id == id);
        }

        let sessions = self.sessions.clone();
        let join = self.tasks.spawn(async move {
            let reason = session.run().await;
            sessions.remove_if(&key, |_, entry| entry.info.id == id);
            reason
        });

        TrackedSession { info, cancel, join }
    }

    /// Cancel the session under `key`. Returns whether one was running.
    pub fn cancel(&self, key: &SessionKey) -> bool {
        match self.sessions.remove(key) {
            Some((_, entry)) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &SessionKey) -> Option<SessionInfo> {
        self.sessions.get(key).map(|e| e.info.clone())
    }

    pub fn list(&self) -> Vec<SessionInfo> {
        self.sessions.iter().map(|e| e.info.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Run request work that may start a session. `shutdown` waits for it.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tasks.spawn(task)
    }

    /// Cancel every session and wait for their drivers to exit.
    pub async fn shutdown(&self) {
        self.tasks.close();
        let count = self.sessions.len();
        for entry in self.sessions.iter() {
            entry.cancel.cancel();
        }
        self.sessions.clear();
        self.tasks.wait().await;
        info!("Session registry shut down ({} sessions cancelled)", count);
    }
}
