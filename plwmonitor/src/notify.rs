//! Notification seam consumed by the watcher

use crate::error::DeliveryError;
use async_trait::async_trait;

/// Delivers a text message to the configured recipient.
///
/// The watcher sends exactly one message per newly detected track, in
/// delta order. Delivery is best-effort: a failed send is reported through
/// [`DeliveryError`] and the watcher moves on to the next message.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a single text message
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}
