//! FaucetChain demo
//!
//! Opens the faucet panel, claims the main faucet, lets the ticker run for a
//! few seconds and prints the panel before tearing it down.

use faucetchain::faucet::{ChannelSink, NotificationSink};
use faucetchain::{init_tracing, Config, FaucetPanel};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("FaucetChain v{}", env!("CARGO_PKG_VERSION"));

    // Toasts are printed as they arrive
    let (sink, mut toasts) = ChannelSink::channel();
    let toast_handle = tokio::spawn(async move {
        while let Some(toast) = toasts.recv().await {
            println!("{}", toast);
        }
    });

    let sink: Arc<dyn NotificationSink> = Arc::new(sink);
    let panel = FaucetPanel::from_config(&config, sink)?;

    println!("{}", panel.render().await);

    // Demo: claim every available faucet
    for record in panel.tracker().snapshot().await {
        if !record.is_available() {
            continue;
        }
        match panel.claim(&record.id).await {
            Ok(receipt) => tracing::info!("Claim confirmed: tx {}", receipt.tx_id),
            Err(e) => tracing::warn!("Claim for {} did not go through: {}", record.id, e),
        }
    }

    // Let the countdown run
    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("{}", panel.render().await);

    tracing::info!("Shutting down...");
    panel.close().await;

    // The panel owned the last sink handle, so the toast loop drains and exits
    let _ = toast_handle.await;

    tracing::info!("FaucetChain shutdown complete");
    Ok(())
}
