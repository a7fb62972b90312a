//! [`Notifier`] implementation backed by the Telegram client

use crate::client::TelegramClient;
use async_trait::async_trait;
use plwmonitor::{DeliveryError, Notifier};

/// Sends watcher notifications to one configured chat
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: TelegramClient,
    chat_id: String,
}

impl TelegramNotifier {
    /// Create a notifier delivering to the given chat
    pub fn new(client: TelegramClient, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            chat_id: chat_id.into(),
        }
    }

    /// The recipient chat id
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.client
            .send_message(&self.chat_id, text)
            .await
            .map_err(|e| DeliveryError::new(e.to_string()))
    }
}
