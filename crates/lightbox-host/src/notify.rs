//! Notification surfaces

use lightbox_transfer::Notifier;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Bottom-anchored, dismisses itself
    Toast,
    /// Blocking, dismissed by the user
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub title: Option<String>,
    pub message: String,
    /// Only set for toasts
    pub visible_for_ms: Option<u64>,
}

/// Writes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn toast(&self, message: &str) {
        tracing::info!(text = message, "Toast");
    }

    fn alert(&self, title: &str, message: &str) {
        tracing::warn!(title, text = message, "Alert");
    }
}

/// Forwards notices to the UI over a channel
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
    toast_visibility: Duration,
}

impl ChannelNotifier {
    pub fn new(toast_visibility: Duration) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                toast_visibility,
            },
            rx,
        )
    }

    fn send(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice dropped, UI receiver is gone");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn toast(&self, message: &str) {
        self.send(Notice {
            severity: Severity::Toast,
            title: None,
            message: message.to_string(),
            visible_for_ms: Some(self.toast_visibility.as_millis() as u64),
        });
    }

    fn alert(&self, title: &str, message: &str) {
        self.send(Notice {
            severity: Severity::Alert,
            title: Some(title.to_string()),
            message: message.to_string(),
            visible_for_ms: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_keeps_severities_apart() {
        let (notifier, mut rx) = ChannelNotifier::new(Duration::from_millis(2_500));

        notifier.toast("Image downloaded");
        notifier.alert("Image", "HTTP 500 Internal Server Error");

        let toast = rx.try_recv().unwrap();
        assert_eq!(toast.severity, Severity::Toast);
        assert_eq!(toast.message, "Image downloaded");
        assert_eq!(toast.visible_for_ms, Some(2_500));

        let alert = rx.try_recv().unwrap();
        assert_eq!(alert.severity, Severity::Alert);
        assert_eq!(alert.title.as_deref(), Some("Image"));
        assert_eq!(alert.visible_for_ms, None);
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (notifier, rx) = ChannelNotifier::new(Duration::from_millis(2_500));
        drop(rx);
        notifier.toast("Link copied");
    }
}
