//! Session host contract: where a session's message is published and edited.

use rinkside_core::HostError;

/// Reference to a published message, as returned by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageHandle {
    pub id: String,
    pub channel_id: Option<String>,
}

impl MessageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            channel_id: None,
        }
    }

    pub fn in_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }
}

#[async_trait::async_trait]
pub trait SessionHost: Send + Sync {
    /// Publish the first message of a request.
    async fn publish_initial(&self, text: &str) -> Result<MessageHandle, HostError>;

    /// Replace the content of a previously published message.
    async fn publish_update(&self, handle: &MessageHandle, text: &str) -> Result<(), HostError>;
}
