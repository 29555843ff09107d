//! Core data types for the faucet cooldown tracker
//!
//! - `FaucetRecord`: one faucet and its countdown
//! - `FaucetStatus`: availability, always derived from the countdown
//! - `FaucetKind`: display classification carried over from the catalog
//! - `default_catalog`: the records seeded at startup

use serde::{Deserialize, Serialize};

use super::error::{FaucetError, FaucetResult};
use super::format::format_remaining;

/// One second in milliseconds
pub const SECOND_MS: u64 = 1000;
/// One hour in milliseconds
pub const HOUR_MS: u64 = 60 * 60 * SECOND_MS;

/// Whether a faucet can be claimed right now
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FaucetStatus {
    Available,
    Cooldown,
}

impl std::fmt::Display for FaucetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaucetStatus::Available => write!(f, "available"),
            FaucetStatus::Cooldown => write!(f, "cooldown"),
        }
    }
}

/// Kind of faucet, used for display only
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FaucetKind {
    /// Plain periodic drip
    #[default]
    Basic,
    /// Gated on social activity
    Social,
    /// Gated on mission progress
    Mission,
}

impl std::fmt::Display for FaucetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaucetKind::Basic => write!(f, "basic"),
            FaucetKind::Social => write!(f, "social"),
            FaucetKind::Mission => write!(f, "mission"),
        }
    }
}

/// A faucet and its cooldown countdown
///
/// Only `remaining_ms` ever changes after seeding, and only through the
/// tracker. Status is computed from it on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct FaucetRecord {
    /// Unique identifier
    pub id: String,
    /// Human-readable title
    pub name: String,
    /// Symbol of the reward asset
    pub token: String,
    /// Quantity granted per claim
    pub amount: f64,
    /// Wait after a claim before the faucet is claimable again
    pub cooldown_ms: u64,
    /// Display classification
    pub kind: FaucetKind,
    /// Requirement strings shown on the card (never enforced)
    pub requirements: Vec<String>,
    remaining_ms: u64,
}

impl FaucetRecord {
    /// Create an available record with required fields
    pub fn new(
        id: impl Into<String>,
        token: impl Into<String>,
        amount: f64,
        cooldown_ms: u64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            token: token.into(),
            amount,
            cooldown_ms,
            kind: FaucetKind::Basic,
            requirements: Vec::new(),
            remaining_ms: 0,
        }
    }

    /// Builder method: set display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method: set kind
    pub fn kind(mut self, kind: FaucetKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder method: add a requirement line
    pub fn requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    /// Builder method: start partway through a cooldown
    ///
    /// Not clamped; [`FaucetRecord::validate`] rejects values above the
    /// cooldown duration.
    pub fn remaining(mut self, remaining_ms: u64) -> Self {
        self.remaining_ms = remaining_ms;
        self
    }

    /// Time left before the faucet is claimable again
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Derived availability
    pub fn status(&self) -> FaucetStatus {
        if self.remaining_ms == 0 {
            FaucetStatus::Available
        } else {
            FaucetStatus::Cooldown
        }
    }

    pub fn is_available(&self) -> bool {
        self.status() == FaucetStatus::Available
    }

    /// Share of the cooldown already elapsed, 0.0 to 100.0
    pub fn progress_percent(&self) -> f64 {
        if self.cooldown_ms == 0 {
            return 100.0;
        }
        let elapsed = self.cooldown_ms - self.remaining_ms.min(self.cooldown_ms);
        elapsed as f64 / self.cooldown_ms as f64 * 100.0
    }

    /// Check the record invariants
    pub fn validate(&self) -> FaucetResult<()> {
        let invalid = |reason: &str| FaucetError::InvalidRecord {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.cooldown_ms == 0 {
            return Err(invalid("cooldown must be positive"));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(invalid("amount must be a non-negative number"));
        }
        if self.remaining_ms > self.cooldown_ms {
            return Err(invalid("remaining time exceeds the cooldown"));
        }
        Ok(())
    }

    /// Advance the countdown by `step_ms`, floored at zero.
    ///
    /// Returns true when this step made the record available.
    pub(crate) fn advance(&mut self, step_ms: u64) -> bool {
        if self.remaining_ms == 0 {
            return false;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(step_ms);
        self.remaining_ms == 0
    }

    /// Re-arm the full cooldown after a successful claim
    pub(crate) fn arm(&mut self) {
        self.remaining_ms = self.cooldown_ms;
    }

    /// Serializable view including derived fields
    pub fn summary(&self) -> FaucetSummary {
        FaucetSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            token: self.token.clone(),
            amount: self.amount,
            kind: self.kind,
            status: self.status(),
            cooldown_ms: self.cooldown_ms,
            remaining_ms: self.remaining_ms,
            remaining: format_remaining(self.remaining_ms),
            progress_percent: self.progress_percent(),
            requirements: self.requirements.clone(),
        }
    }
}

/// Snapshot of a record for JSON output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaucetSummary {
    pub id: String,
    pub name: String,
    pub token: String,
    pub amount: f64,
    pub kind: FaucetKind,
    pub status: FaucetStatus,
    pub cooldown_ms: u64,
    pub remaining_ms: u64,
    pub remaining: String,
    pub progress_percent: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
}

/// The records seeded when no catalog is configured
pub fn default_catalog() -> Vec<FaucetRecord> {
    vec![
        FaucetRecord::new("main-faucet", "FAUCET", 100.0, 24 * HOUR_MS)
            .name("Main FAUCET Faucet")
            .kind(FaucetKind::Basic),
        FaucetRecord::new("social-drip", "DRIP", 10.0, 4 * HOUR_MS)
            .name("Social DRIP Faucet")
            .kind(FaucetKind::Social)
            .remaining(2 * HOUR_MS)
            .requirement("Follow @FaucetChain")
            .requirement("Like recent post"),
        FaucetRecord::new("mission-bonus", "FAUCET", 50.0, 24 * HOUR_MS)
            .name("Daily Mission Bonus")
            .kind(FaucetKind::Mission)
            .requirement("Complete 3 social interactions")
            .requirement("Hold 1 NFT"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_derived() {
        let record = FaucetRecord::new("f", "TOK", 1.0, 5000);
        assert_eq!(record.status(), FaucetStatus::Available);

        let record = record.remaining(1);
        assert_eq!(record.status(), FaucetStatus::Cooldown);
    }

    #[test]
    fn test_advance_floors_at_zero() {
        let mut record = FaucetRecord::new("f", "TOK", 1.0, 5000).remaining(1500);

        assert!(!record.advance(1000));
        assert_eq!(record.remaining_ms(), 500);

        assert!(record.advance(1000));
        assert_eq!(record.remaining_ms(), 0);

        // Already available: stays at zero and reports no transition
        assert!(!record.advance(1000));
        assert_eq!(record.remaining_ms(), 0);
    }

    #[test]
    fn test_arm_resets_full_cooldown() {
        let mut record = FaucetRecord::new("f", "TOK", 1.0, 5000);
        record.arm();
        assert_eq!(record.remaining_ms(), 5000);
        assert_eq!(record.status(), FaucetStatus::Cooldown);
    }

    #[test]
    fn test_progress_percent() {
        let record = FaucetRecord::new("f", "TOK", 1.0, 4 * HOUR_MS).remaining(2 * HOUR_MS);
        assert!((record.progress_percent() - 50.0).abs() < f64::EPSILON);

        let record = FaucetRecord::new("f", "TOK", 1.0, 1000);
        assert!((record.progress_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate() {
        assert!(FaucetRecord::new("f", "TOK", 1.0, 1000).validate().is_ok());

        let err = FaucetRecord::new("f", "TOK", 1.0, 0).validate().unwrap_err();
        assert!(matches!(err, FaucetError::InvalidRecord { .. }));

        let err = FaucetRecord::new("f", "TOK", -1.0, 1000).validate().unwrap_err();
        assert!(matches!(err, FaucetError::InvalidRecord { .. }));

        let err = FaucetRecord::new("f", "TOK", 1.0, 1000)
            .remaining(2000)
            .validate()
            .unwrap_err();
        assert!(matches!(err, FaucetError::InvalidRecord { .. }));

        let err = FaucetRecord::new(" ", "TOK", 1.0, 1000).validate().unwrap_err();
        assert!(matches!(err, FaucetError::InvalidRecord { .. }));
    }

    #[test]
    fn test_default_catalog() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.iter().all(|r| r.validate().is_ok()));

        let social = catalog.iter().find(|r| r.id == "social-drip").unwrap();
        assert_eq!(social.status(), FaucetStatus::Cooldown);
        assert_eq!(social.remaining_ms(), 2 * HOUR_MS);
        assert_eq!(social.requirements.len(), 2);
    }

    #[test]
    fn test_summary_serializes_status() {
        let summary = FaucetRecord::new("f", "TOK", 1.0, 1000).summary();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["remaining"], "0h 0m 0s");
        assert!(json.get("requirements").is_none());
    }
}
