//! Faucet Panel
//!
//! The view that owns a [`CooldownTracker`]: it starts the 1 Hz ticker when
//! opened, routes claims, keeps per-token totals of what was claimed, renders
//! the faucet cards as text and stops the ticker when closed.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::faucet::{
    format_remaining, progress_bar, ClaimReceipt, CooldownTracker, FaucetRecord, FaucetResult,
    NotificationSink,
};
use crate::scheduler::PeriodicTask;

const PROGRESS_WIDTH: usize = 20;

/// A live faucet view
pub struct FaucetPanel {
    tracker: Arc<CooldownTracker>,
    ticker: Option<PeriodicTask>,
    claimed: RwLock<BTreeMap<String, f64>>,
}

impl FaucetPanel {
    /// Open the panel and start ticking every `tick_interval`
    pub fn open(tracker: Arc<CooldownTracker>, tick_interval: Duration) -> Self {
        let ticker = tracker.start_ticker(tick_interval);
        tracing::info!(tick_interval_ms = tick_interval.as_millis() as u64, "Faucet panel opened");

        Self {
            tracker,
            ticker: Some(ticker),
            claimed: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build the tracker from `config` and open the panel
    pub fn from_config(config: &Config, sink: Arc<dyn NotificationSink>) -> FaucetResult<Self> {
        let tracker = CooldownTracker::new(
            config.catalog(),
            Arc::new(config.submitter()),
            sink,
            config.tracker_config(),
        )?;
        Ok(Self::open(Arc::new(tracker), config.tick_interval()))
    }

    pub fn tracker(&self) -> &Arc<CooldownTracker> {
        &self.tracker
    }

    /// Whether the ticker is still running
    pub fn is_open(&self) -> bool {
        self.ticker.as_ref().map(|t| t.is_running()).unwrap_or(false)
    }

    /// Claim a faucet and add it to the claimed totals on success
    pub async fn claim(&self, id: &str) -> FaucetResult<ClaimReceipt> {
        let receipt = self.tracker.claim(id).await?;
        *self
            .claimed
            .write()
            .await
            .entry(receipt.token.clone())
            .or_insert(0.0) += receipt.amount;
        Ok(receipt)
    }

    /// Total claimed per token since the panel was opened
    pub async fn claimed_totals(&self) -> BTreeMap<String, f64> {
        self.claimed.read().await.clone()
    }

    /// Render the faucet cards as text
    pub async fn render(&self) -> String {
        let records = self.tracker.snapshot().await;
        let totals = self.claimed_totals().await;
        render_cards(&records, &totals, |id| self.tracker.is_claiming(id))
    }

    /// Stop the ticker. No tick mutates the tracker after this returns.
    pub async fn close(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop().await;
        }
        tracing::info!("Faucet panel closed");
    }
}

/// Render records the way the faucet panel shows them
pub fn render_cards(
    records: &[FaucetRecord],
    claimed: &BTreeMap<String, f64>,
    is_claiming: impl Fn(&str) -> bool,
) -> String {
    let available = records.iter().filter(|r| r.is_available()).count();
    let mut out = String::new();

    let _ = writeln!(out, "Faucet Layer ({} Available)", available);
    let _ = writeln!(out, "Claim your tokens and complete missions");

    for record in records {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} [{}]", record.name, record.status());
        let _ = writeln!(out, "  {} {} tokens", record.amount, record.token);

        if !record.requirements.is_empty() {
            let _ = writeln!(out, "  Requirements:");
            for req in &record.requirements {
                let _ = writeln!(out, "    ✓ {}", req);
            }
        }

        if record.remaining_ms() > 0 {
            let _ = writeln!(out, "  Cooldown {}", format_remaining(record.remaining_ms()));
            let _ = writeln!(
                out,
                "  {} {:.0}%",
                progress_bar(record.progress_percent(), PROGRESS_WIDTH),
                record.progress_percent()
            );
        } else if is_claiming(&record.id) {
            let _ = writeln!(out, "  [ Claiming... ]");
        } else {
            let _ = writeln!(out, "  [ Claim Now ]");
        }
    }

    if !claimed.is_empty() {
        let _ = writeln!(out);
        let totals: Vec<String> = claimed
            .iter()
            .map(|(token, amount)| format!("{} {}", amount, token))
            .collect();
        let _ = writeln!(out, "Claimed: {}", totals.join(", "));
    }

    out
}
