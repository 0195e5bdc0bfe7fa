pub mod telegram;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error};

/// Something that can deliver a text message to a chat destination.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Platform identifier (e.g., "telegram")
    fn name(&self) -> &str;

    async fn deliver(&self, destination: &str, text: &str) -> Result<()>;
}

/// Sends notifications to a single destination.
/// Delivery failures are logged and never returned.
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn ChatTransport>,
    destination: String,
}

impl Notifier {
    pub fn new(transport: Arc<dyn ChatTransport>, destination: impl Into<String>) -> Self {
        Self {
            transport,
            destination: destination.into(),
        }
    }

    pub async fn notify(&self, text: &str) {
        debug!("Sending message via {}", self.transport.name());
        match self.transport.deliver(&self.destination, text).await {
            Ok(()) => debug!("Message delivered"),
            Err(e) => error!("Failed to deliver message via {}: {:#}", self.transport.name(), e),
        }
    }
}
