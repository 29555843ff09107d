//! Faucet Cooldown Tracking
//!
//! - **types**: `FaucetRecord`, derived `FaucetStatus`, the default catalog
//! - **format**: countdown and progress formatting
//! - **submit**: the async claim submitter seam and its simulated version
//! - **notify**: user-visible notification sinks
//! - **tracker**: `CooldownTracker`, the only owner of record mutation
//! - **error**: error types
//!
//! # State machine
//!
//! ```text
//!   available --claim ok--> cooldown
//!   cooldown  --tick to 0--> available
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use faucetchain::faucet::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tracker = Arc::new(CooldownTracker::new(
//!         default_catalog(),
//!         Arc::new(SimulatedSubmitter::instant()),
//!         Arc::new(LogSink),
//!         TrackerConfig::default(),
//!     )?);
//!
//!     tracker.claim("main-faucet").await?;
//!     tracker.tick().await;
//!
//!     let record = tracker.get("main-faucet").await.unwrap();
//!     println!("{}", format_remaining(record.remaining_ms()));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod format;
pub mod notify;
pub mod submit;
pub mod tracker;
pub mod types;

pub use error::{FaucetError, FaucetResult};
pub use format::{format_remaining, progress_bar};
pub use notify::{ChannelSink, LogSink, Notification, NotificationLevel, NotificationSink};
pub use submit::{ClaimReceipt, ClaimRequest, ClaimSubmitter, FailureMode, SimulatedSubmitter, SubmitError};
pub use tracker::{CooldownTracker, TrackerConfig, CLAIM_FAILED_MESSAGE};
pub use types::{default_catalog, FaucetKind, FaucetRecord, FaucetStatus, FaucetSummary, HOUR_MS, SECOND_MS};
