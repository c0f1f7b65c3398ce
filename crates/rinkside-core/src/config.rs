//! Rinkside configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file exists.

use crate::error::Error;
use crate::types::{PollConfig, DEFAULT_MAX_CYCLES, DEFAULT_POLL_INTERVAL_SECS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RinksideConfig {
    /// Poll session timing.
    pub poll: PollSettings,
    /// NHL endpoints.
    pub nhl: NhlSettings,
    /// Interactions HTTP server.
    pub gateway: GatewaySettings,
    /// Discord REST access.
    pub discord: DiscordSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Seconds between the end of one cycle and the start of the next.
    pub interval_secs: u64,
    /// Cycles after which tracking silently ends.
    pub max_cycles: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NhlSettings {
    /// Player search endpoint.
    pub search_url: String,
    /// Base URL for player landing and gamecenter endpoints.
    pub api_url: String,
    /// Number of candidates requested from search. Only the first is used.
    pub search_limit: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub port: u16,
    pub bind: BindMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSettings {
    pub api_base: String,
    pub application_id: Option<String>,
    /// Bot token. When set, updates edit the channel message directly instead
    /// of going through the short-lived interaction webhook.
    pub bot_token: Option<String>,
    /// Upper bound for each REST call, in seconds.
    pub request_timeout_secs: u64,
}

/// Bind mode for the gateway
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    Loopback,
    #[default]
    Lan,
}

impl BindMode {
    pub fn to_addr(&self) -> &str {
        match self {
            BindMode::Loopback => "127.0.0.1",
            BindMode::Lan => "0.0.0.0",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "loopback" | "localhost" | "127.0.0.1" => BindMode::Loopback,
            _ => BindMode::Lan,
        }
    }
}

// ============================================================
// Defaults
// ============================================================

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

impl Default for NhlSettings {
    fn default() -> Self {
        Self {
            search_url: "https://search.d3.nhle.com/api/v1/search/player".into(),
            api_url: "https://api-web.nhle.com".into(),
            search_limit: 5,
            request_timeout_secs: 10,
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            port: 18790,
            bind: BindMode::default(),
        }
    }
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            api_base: "https://discord.com/api/v10".into(),
            application_id: None,
            bot_token: None,
            request_timeout_secs: 10,
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl RinksideConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(Error::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {} - using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Read and parse a TOML file without falling back.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

impl PollSettings {
    pub fn to_poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.interval_secs),
            max_cycles: self.max_cycles,
        }
    }
}

impl DiscordSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl NhlSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
