//! Rinkside: live NHL player stats, kept fresh in Discord or the terminal

mod terminal;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rinkside_core::config::BindMode;
use rinkside_core::{RinksideConfig, SessionKey};
use rinkside_nhl::NhlClient;
use rinkside_tracker::Tracker;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terminal::TerminalHost;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "rinkside",
    version,
    about = "Live NHL player stats, kept fresh in Discord or the terminal"
)]
struct Cli {
    /// Config file (missing or invalid files fall back to defaults)
    #[arg(short, long, global = true, default_value = "rinkside.toml")]
    config: PathBuf,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Discord interactions endpoint
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        /// lan or loopback
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Track a player in this terminal until the session ends or Ctrl-C
    Track {
        /// Player name, e.g. Connor McDavid
        #[arg(required = true)]
        name: Vec<String>,
        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,
        #[arg(long)]
        max_cycles: Option<u32>,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.json_logs, cli.log_file.as_deref())?;

    let mut config = RinksideConfig::load(&cli.config);
    apply_env_overrides(&mut config);

    match cli.command {
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(bind) = bind {
                config.gateway.bind = BindMode::parse(&bind);
            }
            rinkside_gateway::start_gateway(config).await?;
        }

        Commands::Track {
            name,
            interval,
            max_cycles,
        } => {
            if let Some(secs) = interval {
                config.poll.interval_secs = secs;
            }
            if let Some(max) = max_cycles {
                config.poll.max_cycles = max;
            }
            track_in_terminal(config, &name.join(" ")).await?;
        }

        Commands::Config => {
            if config.discord.bot_token.is_some() {
                config.discord.bot_token = Some("<redacted>".into());
            }
            print!("{}", config.to_toml());
        }
    }

    Ok(())
}

async fn track_in_terminal(config: RinksideConfig, name: &str) -> anyhow::Result<()> {
    let nhl = Arc::new(NhlClient::new(&config.nhl));
    let tracker = Tracker::new(nhl.clone(), nhl, config.poll.to_poll_config());
    let host = Arc::new(TerminalHost::stdout());

    let tracked = match tracker.track(SessionKey::new("terminal"), name, host).await {
        Ok(tracked) => tracked,
        // Already printed by the host.
        Err(e) if e.is_user_facing() => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let cancel = tracked.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let reason = tracked.join.await.context("session task failed")?;
    info!("Stopped tracking {}: {}", name, reason);
    Ok(())
}

/// Secrets and deployment knobs can come from the environment.
fn apply_env_overrides(config: &mut RinksideConfig) {
    if let Some(token) = env_var("DISCORD_TOKEN") {
        config.discord.bot_token = Some(token);
    }
    if let Some(id) = env_var("DISCORD_APPLICATION_ID") {
        config.discord.application_id = Some(id);
    }
    if let Some(port) = env_var("RINKSIDE_PORT").and_then(|p| p.parse().ok()) {
        config.gateway.port = port;
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn init_tracing(json: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rinkside=info,tower_http=info".into());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    // Console logs go to stderr so `track` output stays clean on stdout.
    let (human, json) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(human)
        .with(json)
        .with(file_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_track_with_globals() {
        let cli = Cli::try_parse_from([
            "rinkside", "--json-logs", "track", "Connor", "McDavid", "--max-cycles", "3",
        ])
        .unwrap();
        assert!(cli.json_logs);
        assert_eq!(cli.config, PathBuf::from("rinkside.toml"));
        match cli.command {
            Commands::Track { name, max_cycles, .. } => {
                assert_eq!(name.join(" "), "Connor McDavid");
                assert_eq!(max_cycles, Some(3));
            }
            _ => panic!("expected track"),
        }
    }

    #[test]
    fn cli_parses_serve() {
        let cli =
            Cli::try_parse_from(["rinkside", "serve", "--port", "9000", "--bind", "loopback"])
                .unwrap();
        match cli.command {
            Commands::Serve { port, bind } => {
                assert_eq!(port, Some(9000));
                assert_eq!(bind.as_deref(), Some("loopback"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn track_requires_a_name() {
        assert!(Cli::try_parse_from(["rinkside", "track"]).is_err());
    }
}
