//! Session host that prints to a terminal instead of editing a chat message.

use async_trait::async_trait;
use rinkside_core::HostError;
use rinkside_tracker::{MessageHandle, SessionHost};
use std::io::Write;
use std::sync::Mutex;

pub struct TerminalHost {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalHost {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }

    fn print(&self, text: &str) -> Result<(), HostError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| HostError::Request("terminal writer poisoned".into()))?;
        writeln!(out, "{}\n", text)
            .and_then(|_| out.flush())
            .map_err(|e| HostError::Request(e.to_string()))
    }
}

#[async_trait]
impl SessionHost for TerminalHost {
    async fn publish_initial(&self, text: &str) -> Result<MessageHandle, HostError> {
        self.print(text)?;
        Ok(MessageHandle::new("terminal"))
    }

    async fn publish_update(&self, _handle: &MessageHandle, text: &str) -> Result<(), HostError> {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.print(&format!("[{}] {}", stamp, text))
    }
}
