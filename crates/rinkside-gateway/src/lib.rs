//! Rinkside Gateway - Discord interactions endpoint and REST session host

pub mod discord;
pub mod error;
pub mod interaction;
pub mod server;

pub use discord::{DiscordClient, DiscordHost};
pub use error::GatewayError;
pub use interaction::{Command, CommandError, Interaction, InteractionResponse};
pub use server::{build_router, start_gateway, GatewayState};
