//! Transfer status state machine
//!
//! ```text
//! Loading ──image painted──▶ Idle
//! Idle | Loading ──download──▶ Downloading ──done──▶ Idle
//! Idle | Loading ──share─────▶ Sharing ─────done──▶ Idle
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Nothing in flight
    Idle,
    /// Initial image fetch for display
    Loading,
    /// Persisting to permanent storage
    Downloading,
    /// Persisting to a temporary location for hand-off
    Sharing,
}

impl TransferStatus {
    /// Check if transition to another status is valid
    pub fn can_transition_to(&self, target: TransferStatus) -> bool {
        match (self, target) {
            (TransferStatus::Loading, TransferStatus::Idle) => true,
            // A transfer may start while the preview is still loading
            (TransferStatus::Idle | TransferStatus::Loading, TransferStatus::Downloading) => true,
            (TransferStatus::Idle | TransferStatus::Loading, TransferStatus::Sharing) => true,
            (TransferStatus::Downloading | TransferStatus::Sharing, TransferStatus::Idle) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    /// Returns true while a download or share owns the status slot
    pub fn is_busy(&self) -> bool {
        matches!(self, TransferStatus::Downloading | TransferStatus::Sharing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Idle => "idle",
            TransferStatus::Loading => "loading",
            TransferStatus::Downloading => "downloading",
            TransferStatus::Sharing => "sharing",
        }
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(TransferStatus::Idle),
            "loading" => Ok(TransferStatus::Loading),
            "downloading" => Ok(TransferStatus::Downloading),
            "sharing" => Ok(TransferStatus::Sharing),
            _ => Err(format!("Unknown transfer status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(TransferStatus::Loading.can_transition_to(TransferStatus::Idle));
        assert!(TransferStatus::Idle.can_transition_to(TransferStatus::Downloading));
        assert!(TransferStatus::Idle.can_transition_to(TransferStatus::Sharing));
        assert!(TransferStatus::Loading.can_transition_to(TransferStatus::Downloading));
        assert!(TransferStatus::Downloading.can_transition_to(TransferStatus::Idle));
        assert!(TransferStatus::Sharing.can_transition_to(TransferStatus::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        // Overlapping transfers are rejected
        assert!(!TransferStatus::Downloading.can_transition_to(TransferStatus::Sharing));
        assert!(!TransferStatus::Sharing.can_transition_to(TransferStatus::Downloading));
        // Loading is only entered once, when the screen opens
        assert!(!TransferStatus::Idle.can_transition_to(TransferStatus::Loading));
        assert!(!TransferStatus::Sharing.can_transition_to(TransferStatus::Loading));
    }

    #[test]
    fn test_parse_and_display() {
        for status in [
            TransferStatus::Idle,
            TransferStatus::Loading,
            TransferStatus::Downloading,
            TransferStatus::Sharing,
        ] {
            assert_eq!(status.to_string().parse::<TransferStatus>(), Ok(status));
        }
        assert_eq!("SHARING".parse::<TransferStatus>(), Ok(TransferStatus::Sharing));
        assert!("paused".parse::<TransferStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&TransferStatus::Downloading).unwrap(),
            "\"downloading\""
        );
    }
}
