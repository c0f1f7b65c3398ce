//! Rinkside Tracker - live-update poll sessions and their lifecycle

pub mod host;
pub mod registry;
pub mod session;
pub mod tracker;

pub use host::{MessageHandle, SessionHost};
pub use registry::{SessionInfo, SessionRegistry, TrackedSession};
pub use session::{CycleOutcome, PollSession, SessionStatus, StopReason};
pub use tokio_util::sync::CancellationToken;
pub use tracker::Tracker;
