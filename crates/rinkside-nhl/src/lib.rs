//! Rinkside NHL - player search, game feed and boxscore formatting

pub mod boxscore;
pub mod client;
mod json;
pub mod provider;

pub use boxscore::format_snapshot;
pub use client::NhlClient;
pub use provider::{GameFeed, NhlError, PlayerDirectory};
