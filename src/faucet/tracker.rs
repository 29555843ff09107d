//! Faucet Cooldown Tracker
//!
//! Owns the faucet records and is the only thing allowed to mutate them:
//! - `tick`: advance every countdown by one step
//! - `claim`: submit a claim and re-arm the countdown on success
//!
//! Records sit behind a Tokio `RwLock`. Claims that are waiting on the
//! submitter are tracked in a separate in-flight set so that a second claim
//! on the same id is rejected instead of arming the cooldown twice.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use super::error::{FaucetError, FaucetResult};
use super::notify::{Notification, NotificationSink};
use super::submit::{ClaimReceipt, ClaimRequest, ClaimSubmitter, SubmitError};
use super::types::{FaucetRecord, SECOND_MS};
use crate::scheduler::PeriodicTask;

/// Message shown when a claim fails
pub const CLAIM_FAILED_MESSAGE: &str = "Failed to claim faucet. Please try again.";

/// Tuning for the tracker
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// How much each tick takes off the countdown (default: 1000 ms)
    pub tick_step_ms: u64,
    /// Upper bound on how long a claim may wait for the submitter
    pub claim_timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_step_ms: SECOND_MS,
            claim_timeout: Duration::from_secs(10),
        }
    }
}

/// Maintains faucet countdowns and gates claims
pub struct CooldownTracker {
    records: RwLock<Vec<FaucetRecord>>,
    in_flight: Mutex<HashSet<String>>,
    submitter: Arc<dyn ClaimSubmitter>,
    sink: Arc<dyn NotificationSink>,
    config: TrackerConfig,
}

/// Releases an in-flight claim id when dropped
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.id);
    }
}

impl CooldownTracker {
    /// Create a tracker seeded with `catalog`
    ///
    /// Every record is validated and ids must be unique.
    pub fn new(
        catalog: Vec<FaucetRecord>,
        submitter: Arc<dyn ClaimSubmitter>,
        sink: Arc<dyn NotificationSink>,
        config: TrackerConfig,
    ) -> FaucetResult<Self> {
        let mut seen = HashSet::new();
        for record in &catalog {
            record.validate()?;
            if !seen.insert(record.id.as_str()) {
                return Err(FaucetError::DuplicateId(record.id.clone()));
            }
        }

        if config.tick_step_ms == 0 {
            tracing::warn!("Tick step is 0 ms; countdowns will never advance");
        }

        tracing::debug!(faucets = catalog.len(), "Cooldown tracker seeded");

        Ok(Self {
            records: RwLock::new(catalog),
            in_flight: Mutex::new(HashSet::new()),
            submitter,
            sink,
            config,
        })
    }

    /// Advance every countdown by one step, floored at zero.
    ///
    /// Returns the ids that became available on this tick.
    pub async fn tick(&self) -> Vec<String> {
        let step = self.config.tick_step_ms;
        let mut records = self.records.write().await;

        let became_available: Vec<String> = records
            .iter_mut()
            .filter_map(|record| record.advance(step).then(|| record.id.clone()))
            .collect();

        for id in &became_available {
            tracing::info!(faucet_id = %id, "Faucet available");
        }

        became_available
    }

    /// Claim a faucet.
    ///
    /// Unknown ids, records on cooldown and ids with a claim already in
    /// flight are rejected without touching state or notifying the user.
    /// A submitter error or timeout leaves state unchanged, notifies the user
    /// and returns [`FaucetError::ClaimFailed`]; the claim may be retried.
    pub async fn claim(&self, id: &str) -> FaucetResult<ClaimReceipt> {
        let (request, _guard) = match self.begin_claim(id).await {
            Ok(started) => started,
            Err(e) => {
                tracing::debug!(faucet_id = %id, error = %e, "Claim rejected");
                return Err(e);
            }
        };

        tracing::info!(faucet_id = %id, "Claiming faucet");

        let timeout_ms = self.config.claim_timeout.as_millis() as u64;
        let outcome = match tokio::time::timeout(
            self.config.claim_timeout,
            self.submitter.submit(&request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SubmitError::Timeout(timeout_ms)),
        };

        match outcome {
            Ok(tx_id) => {
                let receipt = self.commit_claim(request, tx_id).await?;
                self.sink.notify(Notification::success(format!(
                    "Successfully claimed {} {}!",
                    receipt.amount, receipt.token
                )));
                tracing::info!(
                    faucet_id = %receipt.faucet_id,
                    tx_id = %receipt.tx_id,
                    "Faucet claimed"
                );
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!(faucet_id = %id, error = %e, "Faucet claim error");
                self.sink.notify(Notification::error(CLAIM_FAILED_MESSAGE));
                Err(FaucetError::ClaimFailed {
                    id: id.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Check preconditions and take the in-flight guard in one step.
    ///
    /// Both happen under the records read lock, so a commit (which needs the
    /// write lock) cannot land between the availability check and the guard.
    async fn begin_claim(&self, id: &str) -> FaucetResult<(ClaimRequest, InFlightGuard<'_>)> {
        let records = self.records.read().await;
        let record = records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| FaucetError::NotFound(id.to_string()))?;

        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if in_flight.contains(id) {
            return Err(FaucetError::ClaimInFlight(id.to_string()));
        }
        if !record.is_available() {
            return Err(FaucetError::OnCooldown {
                id: id.to_string(),
                remaining_ms: record.remaining_ms(),
            });
        }
        in_flight.insert(id.to_string());

        let request = ClaimRequest {
            faucet_id: record.id.clone(),
            token: record.token.clone(),
            amount: record.amount,
        };
        let guard = InFlightGuard {
            set: &self.in_flight,
            id: id.to_string(),
        };
        Ok((request, guard))
    }

    async fn commit_claim(&self, request: ClaimRequest, tx_id: String) -> FaucetResult<ClaimReceipt> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == request.faucet_id)
            .ok_or_else(|| FaucetError::NotFound(request.faucet_id.clone()))?;

        record.arm();

        Ok(ClaimReceipt {
            faucet_id: request.faucet_id,
            token: request.token,
            amount: request.amount,
            tx_id,
            claimed_at: Utc::now(),
        })
    }

    /// Copy of every record in catalog order
    pub async fn snapshot(&self) -> Vec<FaucetRecord> {
        self.records.read().await.clone()
    }

    /// Copy of one record
    pub async fn get(&self, id: &str) -> Option<FaucetRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Number of records claimable right now
    pub async fn available_count(&self) -> usize {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.is_available())
            .count()
    }

    /// Whether a claim on `id` is waiting on the submitter
    pub fn is_claiming(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    /// Start ticking every `period` until the returned task is stopped
    pub fn start_ticker(self: &Arc<Self>, period: Duration) -> PeriodicTask {
        let tracker = Arc::clone(self);
        PeriodicTask::spawn("cooldown-ticker", period, move || {
            let tracker = Arc::clone(&tracker);
            async move {
                tracker.tick().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faucet::notify::ChannelSink;
    use crate::faucet::submit::{FailureMode, SimulatedSubmitter};
    use crate::faucet::types::{default_catalog, FaucetStatus, HOUR_MS};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn create_test_tracker(
        catalog: Vec<FaucetRecord>,
        submitter: SimulatedSubmitter,
    ) -> (Arc<CooldownTracker>, UnboundedReceiver<Notification>) {
        let (sink, rx) = ChannelSink::channel();
        let tracker = CooldownTracker::new(
            catalog,
            Arc::new(submitter),
            Arc::new(sink),
            TrackerConfig::default(),
        )
        .unwrap();
        (Arc::new(tracker), rx)
    }

    fn short_catalog() -> Vec<FaucetRecord> {
        vec![
            FaucetRecord::new("a", "FAUCET", 100.0, 3 * SECOND_MS),
            FaucetRecord::new("b", "DRIP", 10.0, 5 * SECOND_MS).remaining(2500),
        ]
    }

    async fn assert_invariants(tracker: &CooldownTracker) {
        for record in tracker.snapshot().await {
            assert!(record.remaining_ms() <= record.cooldown_ms);
            assert_eq!(
                record.status() == FaucetStatus::Available,
                record.remaining_ms() == 0
            );
        }
    }

    #[tokio::test]
    async fn test_rejects_duplicate_ids() {
        let catalog = vec![
            FaucetRecord::new("a", "T", 1.0, 1000),
            FaucetRecord::new("a", "T", 1.0, 1000),
        ];
        let (sink, _rx) = ChannelSink::channel();
        let result = CooldownTracker::new(
            catalog,
            Arc::new(SimulatedSubmitter::instant()),
            Arc::new(sink),
            TrackerConfig::default(),
        );
        assert!(matches!(result, Err(FaucetError::DuplicateId(id)) if id == "a"));
    }

    #[tokio::test]
    async fn test_rejects_invalid_record() {
        let catalog = vec![FaucetRecord::new("a", "T", 1.0, 1000).remaining(5000)];
        let (sink, _rx) = ChannelSink::channel();
        let result = CooldownTracker::new(
            catalog,
            Arc::new(SimulatedSubmitter::instant()),
            Arc::new(sink),
            TrackerConfig::default(),
        );
        assert!(matches!(result, Err(FaucetError::InvalidRecord { .. })));
    }

    #[tokio::test]
    async fn test_tick_floors_at_zero() {
        let (tracker, _rx) = create_test_tracker(short_catalog(), SimulatedSubmitter::instant());

        assert!(tracker.tick().await.is_empty());
        assert_eq!(tracker.get("b").await.unwrap().remaining_ms(), 1500);

        assert!(tracker.tick().await.is_empty());
        assert_eq!(tracker.get("b").await.unwrap().remaining_ms(), 500);

        assert_eq!(tracker.tick().await, vec!["b".to_string()]);
        assert_eq!(tracker.get("b").await.unwrap().remaining_ms(), 0);
        assert_eq!(tracker.get("a").await.unwrap().remaining_ms(), 0);

        assert!(tracker.tick().await.is_empty());
        assert_invariants(&tracker).await;
    }

    #[tokio::test]
    async fn test_claim_arms_cooldown() {
        let (tracker, mut rx) = create_test_tracker(short_catalog(), SimulatedSubmitter::instant());

        let receipt = tracker.claim("a").await.unwrap();
        assert_eq!(receipt.faucet_id, "a");
        assert_eq!(receipt.token, "FAUCET");

        let record = tracker.get("a").await.unwrap();
        assert_eq!(record.remaining_ms(), record.cooldown_ms);
        assert_eq!(record.status(), FaucetStatus::Cooldown);
        assert!(!tracker.is_claiming("a"));

        let note = rx.try_recv().unwrap();
        assert_eq!(note, Notification::success("Successfully claimed 100 FAUCET!"));
        assert_invariants(&tracker).await;
    }

    #[tokio::test]
    async fn test_claim_on_cooldown_is_noop() {
        let (tracker, mut rx) = create_test_tracker(short_catalog(), SimulatedSubmitter::instant());
        let before = tracker.snapshot().await;

        let err = tracker.claim("b").await.unwrap_err();
        assert_eq!(
            err,
            FaucetError::OnCooldown {
                id: "b".to_string(),
                remaining_ms: 2500
            }
        );
        assert_eq!(tracker.snapshot().await, before);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_claim_unknown_id() {
        let (tracker, mut rx) = create_test_tracker(short_catalog(), SimulatedSubmitter::instant());
        let err = tracker.claim("missing").await.unwrap_err();
        assert!(matches!(err, FaucetError::NotFound(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_claim_leaves_state_and_allows_retry() {
        let submitter = SimulatedSubmitter::new(Duration::ZERO, FailureMode::EveryNth(1));
        let (tracker, mut rx) = create_test_tracker(short_catalog(), submitter);
        let before = tracker.snapshot().await;

        let err = tracker.claim("a").await.unwrap_err();
        assert!(matches!(err, FaucetError::ClaimFailed { .. }));
        assert_eq!(tracker.snapshot().await, before);
        assert!(!tracker.is_claiming("a"));
        assert_eq!(rx.try_recv().unwrap(), Notification::error(CLAIM_FAILED_MESSAGE));

        // Second attempt fails again (every attempt), guard still released
        assert!(tracker.claim("a").await.is_err());
        assert!(!tracker.is_claiming("a"));
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let submitter = SimulatedSubmitter::new(Duration::ZERO, FailureMode::EveryNth(2));
        let (tracker, _rx) = create_test_tracker(short_catalog(), submitter);

        // Attempt 1 succeeds on "a", attempt 2 fails on "b" once it is available
        tracker.claim("a").await.unwrap();
        for _ in 0..3 {
            tracker.tick().await;
        }
        assert!(tracker.claim("b").await.is_err());
        assert!(tracker.get("b").await.unwrap().is_available());
        assert!(tracker.claim("b").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_claims_arm_once() {
        let submitter = SimulatedSubmitter::new(Duration::from_secs(2), FailureMode::Never);
        let (tracker, mut rx) = create_test_tracker(short_catalog(), submitter);

        let (first, second) = tokio::join!(tracker.claim("a"), tracker.claim("a"));

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), FaucetError::ClaimInFlight("a".to_string()));

        let record = tracker.get("a").await.unwrap();
        assert_eq!(record.remaining_ms(), record.cooldown_ms);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_during_pending_claim() {
        let submitter = SimulatedSubmitter::new(Duration::from_millis(2500), FailureMode::Never);
        let (tracker, _rx) = create_test_tracker(short_catalog(), submitter);

        let pending = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.claim("a").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(tracker.is_claiming("a"));

        tracker.tick().await;
        tracker.tick().await;
        let record = tracker.get("a").await.unwrap();
        assert_eq!(record.remaining_ms(), 0);

        pending.await.unwrap().unwrap();
        let record = tracker.get("a").await.unwrap();
        assert_eq!(record.remaining_ms(), record.cooldown_ms);
        assert!(!tracker.is_claiming("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_timeout_releases_guard() {
        let submitter = SimulatedSubmitter::new(Duration::from_secs(60), FailureMode::Never);
        let (tracker, mut rx) = create_test_tracker(short_catalog(), submitter);

        let err = tracker.claim("a").await.unwrap_err();
        match err {
            FaucetError::ClaimFailed { reason, .. } => assert!(reason.contains("timed out")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(tracker.get("a").await.unwrap().is_available());
        assert!(!tracker.is_claiming("a"));
        assert!(rx.try_recv().unwrap().is_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_claim_releases_guard() {
        let submitter = SimulatedSubmitter::new(Duration::from_secs(2), FailureMode::Never);
        let (tracker, mut rx) = create_test_tracker(short_catalog(), submitter);

        let pending = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.claim("a").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(tracker.is_claiming("a"));

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        assert!(!tracker.is_claiming("a"));
        assert!(tracker.get("a").await.unwrap().is_available());
        assert!(rx.try_recv().is_err());

        tracker.claim("a").await.unwrap();
        let record = tracker.get("a").await.unwrap();
        assert_eq!(record.remaining_ms(), record.cooldown_ms);
    }

    #[tokio::test]
    async fn test_claimed_record_returns_after_cooldown_ticks() {
        let (tracker, _rx) = create_test_tracker(short_catalog(), SimulatedSubmitter::instant());
        tracker.claim("a").await.unwrap();

        let cooldown = tracker.get("a").await.unwrap().cooldown_ms;
        for _ in 1..cooldown / SECOND_MS {
            tracker.tick().await;
            assert!(!tracker.get("a").await.unwrap().is_available());
            assert_invariants(&tracker).await;
        }
        assert!(tracker.tick().await.contains(&"a".to_string()));
        assert!(tracker.get("a").await.unwrap().is_available());
    }

    #[tokio::test]
    async fn test_available_count_default_catalog() {
        let (tracker, _rx) = create_test_tracker(default_catalog(), SimulatedSubmitter::instant());
        assert_eq!(tracker.available_count().await, 2);

        tracker.claim("main-faucet").await.unwrap();
        assert_eq!(tracker.available_count().await, 1);

        let record = tracker.get("main-faucet").await.unwrap();
        assert_eq!(record.remaining_ms(), 24 * HOUR_MS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_drives_countdown_and_stops() {
        let (tracker, _rx) = create_test_tracker(short_catalog(), SimulatedSubmitter::instant());
        let ticker = tracker.start_ticker(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(tracker.get("b").await.unwrap().remaining_ms(), 500);

        ticker.stop().await;
        let frozen = tracker.snapshot().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(tracker.snapshot().await, frozen);
    }
}
