//! # FaucetChain
//!
//! Faucet cooldown tracking for the FaucetChain dashboard.
//!
//! ## Features
//!
//! - **Cooldown tracking**: per-faucet countdowns advanced on a 1 Hz tick
//! - **Guarded claims**: one in-flight claim per faucet, no double arming
//! - **Injected collaborators**: claim submitter and notification sink are traits
//! - **Cancellable ticker**: background tick task that stops cleanly
//!
//! ## Modules
//!
//! - [`faucet`]: records, tracker, submitter and notifications
//! - [`scheduler`]: cancellable periodic task
//! - [`panel`]: the faucet view that owns a tracker
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use faucetchain::{Config, FaucetPanel, LogSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let panel = FaucetPanel::from_config(&config, Arc::new(LogSink))?;
//!
//!     panel.claim("main-faucet").await?;
//!     println!("{}", panel.render().await);
//!
//!     panel.close().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod faucet;
pub mod panel;
pub mod scheduler;

// Re-export top-level types for convenience
pub use faucet::{
    default_catalog, format_remaining, ChannelSink, ClaimReceipt, ClaimSubmitter, CooldownTracker,
    FailureMode, FaucetError, FaucetKind, FaucetRecord, FaucetResult, FaucetStatus, LogSink,
    Notification, NotificationSink, SimulatedSubmitter, TrackerConfig,
};

pub use config::{generate_default_config, init_tracing, Config, ConfigError, LoggingConfig};

pub use panel::FaucetPanel;

pub use scheduler::PeriodicTask;
