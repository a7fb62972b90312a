//! Telegram integration for PlaylistWatch
//!
//! This crate talks to the Telegram Bot API over plain HTTP and provides:
//!
//! - [`TelegramClient`]: a minimal Bot API client (`getMe`, `sendMessage`,
//!   `getUpdates` long polling)
//! - [`TelegramNotifier`]: the watcher's `Notifier`, delivering one
//!   message per newly detected track to the configured chat
//! - [`CommandBot`]: the interactive `/start` `/check` `/help` loop,
//!   running on-demand check cycles through the watcher handle
//!
//! # Example
//!
//! ```no_run
//! use plwtelegram::{TelegramClient, TelegramNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelegramClient::builder("123456:bot-token").build().await?;
//!     let notifier = TelegramNotifier::new(client.clone(), "987654321");
//!     # let _ = notifier;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod client;
pub mod error;
pub mod models;
pub mod notifier;

// Re-exports
pub use bot::CommandBot;
pub use client::{ClientBuilder, TelegramClient};
pub use error::{Error, Result};
pub use models::{BotInfo, Chat, Message, Update};
pub use notifier::TelegramNotifier;
