//! Faucet error types
//!
//! Defines all errors that can occur while tracking or claiming faucets.

use thiserror::Error;

/// Errors that can occur in the cooldown tracker
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FaucetError {
    /// No record with this id exists in the catalog
    #[error("Faucet not found: {0}")]
    NotFound(String),

    /// The record is still cooling down
    #[error("Faucet {id} is on cooldown ({remaining_ms} ms remaining)")]
    OnCooldown { id: String, remaining_ms: u64 },

    /// Another claim for the same id has not resolved yet
    #[error("A claim for faucet {0} is already in progress")]
    ClaimInFlight(String),

    /// The submitter rejected or timed out the claim
    #[error("Failed to claim faucet {id}: {reason}")]
    ClaimFailed { id: String, reason: String },

    /// A catalog entry breaks a record invariant
    #[error("Invalid faucet record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// Two catalog entries share an id
    #[error("Duplicate faucet id: {0}")]
    DuplicateId(String),
}

impl FaucetError {
    /// Whether this error is a rejected no-op rather than a failed claim.
    ///
    /// Rejections never reach the notification sink.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FaucetError::NotFound(_) | FaucetError::OnCooldown { .. } | FaucetError::ClaimInFlight(_)
        )
    }
}

/// Result type alias for faucet operations
pub type FaucetResult<T> = Result<T, FaucetError>;
