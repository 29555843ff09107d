//! User-visible notifications
//!
//! The tracker reports claim outcomes through a [`NotificationSink`]. The
//! sink is owned by whoever renders the messages (a terminal, a log, a
//! test harness).

use serde::Serialize;
use tokio::sync::mpsc;

/// Severity of a notification
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A message meant for the user
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Error => "✕",
        };
        write!(f, "{} {}", icon, self.message)
    }
}

/// Destination for user-visible notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!(target: "faucetchain::toast", "{}", notification.message),
            NotificationLevel::Error => tracing::error!(target: "faucetchain::toast", "{}", notification.message),
        }
    }
}

/// Forwards notifications over an unbounded channel
///
/// A closed receiver is not an error; the notification is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::UnboundedSender<Notification>) -> Self {
        Self { sender }
    }

    /// Create a sink together with its receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::trace!("Notification receiver closed");
        }
    }
}
