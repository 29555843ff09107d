//! Claim submission
//!
//! A claim is confirmed by an asynchronous [`ClaimSubmitter`]. The tracker
//! never knows whether that is a real chain client or the simulated one
//! below, so tests can decide latency and outcome themselves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// What is being claimed
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRequest {
    pub faucet_id: String,
    pub token: String,
    pub amount: f64,
}

/// Proof of a successful claim
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClaimReceipt {
    pub faucet_id: String,
    pub token: String,
    pub amount: f64,
    /// Transaction id reported by the submitter
    pub tx_id: String,
    pub claimed_at: DateTime<Utc>,
}

/// Errors reported by a submitter
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("transaction timed out after {0} ms")]
    Timeout(u64),
}

/// Confirms claims asynchronously
#[async_trait]
pub trait ClaimSubmitter: Send + Sync {
    /// Submit the claim and return a transaction id
    async fn submit(&self, request: &ClaimRequest) -> Result<String, SubmitError>;
}

/// When the simulated submitter fails
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Every claim succeeds
    #[default]
    Never,
    /// Every claim fails
    Always,
    /// Every n-th submission fails (1-based); n = 0 behaves like `Never`
    EveryNth(u64),
}

/// Stand-in for a blockchain transaction: waits, then succeeds or fails
#[derive(Debug)]
pub struct SimulatedSubmitter {
    latency: Duration,
    failure: FailureMode,
    submissions: AtomicU64,
}

impl SimulatedSubmitter {
    pub fn new(latency: Duration, failure: FailureMode) -> Self {
        Self {
            latency,
            failure,
            submissions: AtomicU64::new(0),
        }
    }

    /// Succeeds immediately
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, FailureMode::Never)
    }

    /// Number of submissions seen so far
    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }

    fn should_fail(&self, attempt: u64) -> bool {
        match self.failure {
            FailureMode::Never => false,
            FailureMode::Always => true,
            FailureMode::EveryNth(0) => false,
            FailureMode::EveryNth(n) => attempt % n == 0,
        }
    }
}

#[async_trait]
impl ClaimSubmitter for SimulatedSubmitter {
    async fn submit(&self, request: &ClaimRequest) -> Result<String, SubmitError> {
        let attempt = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.should_fail(attempt) {
            tracing::debug!(faucet_id = %request.faucet_id, attempt, "Simulated claim failure");
            return Err(SubmitError::Rejected("simulated network error".to_string()));
        }

        Ok(Uuid::new_v4().to_string())
    }
}
