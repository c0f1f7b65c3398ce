//! Discord REST session host
//!
//! The initial message is the edited deferred interaction response. Updates
//! edit that same message, through the channel endpoint when a bot token is
//! configured (it outlives the 15-minute interaction token), otherwise
//! through the interaction webhook.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rinkside_core::config::DiscordSettings;
use rinkside_core::HostError;
use rinkside_tracker::{MessageHandle, SessionHost};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Shared REST configuration. Cloning shares the connection pool.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    api_base: String,
    application_id: Option<String>,
    bot_token: Option<String>,
}

impl DiscordClient {
    pub fn new(settings: &DiscordSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build Discord client with timeout: {} - using defaults", e);
                Client::new()
            });
        Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            application_id: settings.application_id.clone(),
            bot_token: settings.bot_token.clone(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    /// Host bound to one interaction's response.
    pub fn host(&self, application_id: impl Into<String>, token: impl Into<String>) -> DiscordHost {
        DiscordHost {
            discord: self.clone(),
            application_id: application_id.into(),
            token: token.into(),
        }
    }
}

pub struct DiscordHost {
    discord: DiscordClient,
    application_id: String,
    token: String,
}

impl DiscordHost {
    fn original_url(&self) -> String {
        format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.discord.api_base, self.application_id, self.token
        )
    }

    fn channel_message_url(&self, channel: &str, message: &str) -> String {
        format!("{}/channels/{}/messages/{}", self.discord.api_base, channel, message)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, HostError> {
        let response = request
            .send()
            .await
            .map_err(|e| HostError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HostError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(HostError::rejected(status.as_u16(), body));
        }
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

#[async_trait]
impl SessionHost for DiscordHost {
    async fn publish_initial(&self, text: &str) -> Result<MessageHandle, HostError> {
        let request = self
            .discord
            .client
            .patch(self.original_url())
            .json(&json!({ "content": text }));
        let message = self.send(request).await?;

        let id = message["id"]
            .as_str()
            .ok_or_else(|| HostError::InvalidHandle("response carried no message id".into()))?;
        let mut handle = MessageHandle::new(id);
        if let Some(channel) = message["channel_id"].as_str() {
            handle = handle.in_channel(channel);
        }
        debug!("Published initial message {}", handle.id);
        Ok(handle)
    }

    async fn publish_update(&self, handle: &MessageHandle, text: &str) -> Result<(), HostError> {
        let body = json!({ "content": text });
        let request = match (&self.discord.bot_token, &handle.channel_id) {
            (Some(bot_token), Some(channel)) => self
                .discord
                .client
                .patch(self.channel_message_url(channel, &handle.id))
                .header("Authorization", format!("Bot {}", bot_token))
                .json(&body),
            _ => self.discord.client.patch(self.original_url()).json(&body),
        };
        self.send(request).await?;
        Ok(())
    }
}
