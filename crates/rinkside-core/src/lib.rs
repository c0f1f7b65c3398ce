//! Rinkside Core - ids, snapshots, sentinels, errors and configuration

pub mod config;
pub mod error;
pub mod types;

pub use config::RinksideConfig;
pub use error::{Error, HostError, Result, TrackError};
pub use types::*;
