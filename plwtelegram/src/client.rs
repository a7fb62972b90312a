//! Minimal Telegram Bot API client
//!
//! Covers exactly the methods PlaylistWatch needs: `getMe` as a startup
//! credential probe, `sendMessage` for notifications and replies, and
//! `getUpdates` long polling for the command loop.
//!
//! # Example
//!
//! ```no_run
//! use plwtelegram::TelegramClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelegramClient::builder("123456:bot-token").build().await?;
//!
//!     let me = client.get_me().await?;
//!     println!("authorized as {:?}", me.username);
//!
//!     client.send_message("987654321", "hello").await?;
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::models::{ApiResponse, BotInfo, Update};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default Bot API base URL
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Default timeout for plain HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Telegram Bot API client
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
    timeout: Duration,
}

impl TelegramClient {
    /// Create a builder for the given bot token
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Check the credential and fetch the bot's own identity
    pub async fn get_me(&self) -> Result<BotInfo> {
        let response = self
            .client
            .post(self.method_url("getMe"))
            .timeout(self.timeout)
            .send()
            .await?;

        Self::unwrap_response(response.json::<ApiResponse<BotInfo>>().await?)
    }

    /// Send a text message to a chat.
    ///
    /// The API reports rejections with an HTTP error status *and* a JSON
    /// body carrying a description, so the body is read either way.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .timeout(self.timeout)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": text,
            }))
            .send()
            .await?;

        let api: ApiResponse<serde_json::Value> = response.json().await?;
        if !api.ok {
            return Err(Error::api(
                api.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        debug!(chat = %chat_id, "message sent");
        Ok(())
    }

    /// Long-poll for incoming updates.
    ///
    /// `offset` acknowledges everything below it; pass
    /// `last_update_id + 1` to avoid re-reading updates. The HTTP timeout
    /// is stretched past `poll_timeout` so the server-side wait never
    /// trips the client-side one.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<Update>> {
        let mut body = serde_json::json!({
            "timeout": poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = offset.into();
        }

        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(poll_timeout + self.timeout)
            .json(&body)
            .send()
            .await?;

        let api: ApiResponse<Vec<Update>> = response.json().await?;
        if !api.ok {
            return Err(Error::api(
                api.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(api.result.unwrap_or_default())
    }

    fn unwrap_response<T>(api: ApiResponse<T>) -> Result<T> {
        if !api.ok {
            return Err(Error::api(
                api.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        api.result
            .ok_or_else(|| Error::api("response carried no result"))
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }
}

/// Builder for [`TelegramClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    token: String,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder for the given bot token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL (useful for tests)
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set the request timeout for plain (non-long-poll) requests
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<TelegramClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder().timeout(self.timeout).build()?,
        };

        Ok(TelegramClient {
            client,
            api_base: self.api_base,
            token: self.token,
            timeout: self.timeout,
        })
    }
}
