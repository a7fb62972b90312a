use anyhow::Context;
use plwconfig::Config;
use plwmonitor::{PlaylistWatcher, SnapshotStore};
use plwsoundcloud::SoundCloudClient;
use plwtelegram::{CommandBot, TelegramClient, TelegramNotifier};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration and logging ==========

    let config = Config::load("").context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!("🎧 PlaylistWatch starting");
    info!("Config directory: {}", config.config_dir().display());

    // ========== PHASE 2 : Wiring the watcher ==========

    let source = SoundCloudClient::builder(config.playlist_url())
        .build()
        .await
        .context("building SoundCloud client")?;

    let telegram = TelegramClient::builder(config.bot_token())
        .build()
        .await
        .context("building Telegram client")?;

    let me = telegram.get_me().await.context("verifying bot token")?;
    info!(
        "✅ Authenticated as @{}",
        me.username.as_deref().unwrap_or("<unnamed bot>")
    );

    let notifier = TelegramNotifier::new(telegram.clone(), config.chat_id());
    let store = SnapshotStore::new(config.state_file());

    let (watcher, handle) = PlaylistWatcher::new(
        Arc::new(source),
        Arc::new(notifier),
        store,
        config.playlist_url(),
        config.poll_interval(),
    );

    // ========== PHASE 3 : Running until shutdown ==========

    let cancel = CancellationToken::new();

    info!(
        "👀 Watching {} every {:?}",
        config.playlist_url(),
        config.poll_interval()
    );
    let watcher_task = tokio::spawn(watcher.run(cancel.clone()));

    let bot = CommandBot::new(telegram, handle);
    let bot_task = tokio::spawn({
        let cancel = cancel.clone();
        async move { bot.run(cancel).await }
    });

    info!("✅ PlaylistWatch is ready!");
    info!("Press Ctrl+C to stop...");
    tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;

    info!("🛑 Shutting down...");
    cancel.cancel();
    watcher_task.await.context("joining watcher task")?;
    bot_task.await.context("joining bot task")?;

    info!("Goodbye!");
    Ok(())
}
