//! Interactive command surface (`/start`, `/check`, `/help`)
//!
//! Long-polls `getUpdates` and drives on-demand check cycles through the
//! watcher handle. Because `check_now` funnels into the watcher's own
//! loop, an interactive check and a scheduled tick can never run
//! concurrently; a `/check` arriving mid-cycle simply queues behind it.

use crate::client::TelegramClient;
use crate::models::Update;
use plwmonitor::WatcherHandle;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Server-side long-poll wait for getUpdates
const POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause before retrying after a failed getUpdates call
const ERROR_RETRY_DELAY: Duration = Duration::from_secs(5);

const GREETING: &str = "Hi 👋\n\
    I watch a SoundCloud playlist for you.\n\
    Use /check to look for new tracks right now.";

const HELP: &str = "Available commands:\n\
    /start - what this bot does\n\
    /check - check the playlist now\n\
    /help - show this help";

/// Telegram command loop
///
/// Replies go to the chat the command came from; the per-track
/// notifications a `/check` may produce still go to the configured
/// recipient through the watcher's notifier.
pub struct CommandBot {
    client: TelegramClient,
    watcher: WatcherHandle,
}

impl CommandBot {
    /// Create a command bot over the given client and watcher handle
    pub fn new(client: TelegramClient, watcher: WatcherHandle) -> Self {
        Self { client, watcher }
    }

    /// Run the long-poll loop until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        info!("command bot started");
        let mut offset: Option<i64> = None;

        loop {
            let updates = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.client.get_updates(offset, POLL_TIMEOUT) => match result {
                    Ok(updates) => updates,
                    Err(e) => {
                        warn!(error = %e, "getUpdates failed");
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(ERROR_RETRY_DELAY) => {}
                        }
                        continue;
                    }
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                self.handle_update(update).await;
            }
        }

        info!("command bot stopped");
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let chat_id = message.chat.id.to_string();

        match parse_command(text) {
            Some("/start") => self.reply(&chat_id, GREETING).await,
            Some("/help") => self.reply(&chat_id, HELP).await,
            Some("/check") => self.run_check(&chat_id).await,
            _ => {}
        }
    }

    async fn run_check(&self, chat_id: &str) {
        info!(chat = %chat_id, "check command received");
        self.reply(chat_id, "🔍 Checking the playlist…").await;

        match self.watcher.check_now().await {
            Ok(report) => self.reply(chat_id, &report.to_string()).await,
            Err(e) => self.reply(chat_id, &format!("❌ Check failed: {e}")).await,
        }
    }

    async fn reply(&self, chat_id: &str, text: &str) {
        if let Err(e) = self.client.send_message(chat_id, text).await {
            warn!(chat = %chat_id, error = %e, "failed to send reply");
        }
    }
}

/// Extract the leading bot command from a message text.
///
/// Ignores arguments and strips the `@botname` suffix commands carry in
/// group chats.
fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    Some(first.split('@').next().unwrap_or(first))
}
