use serde::{Deserialize, Serialize};
use std::fmt;

/// Moderation state shared by items and referent accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ApprovalStatus {
    #[default]
    #[serde(rename = "on hold")]
    OnHold,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApprovalStatus {
    /// Convert from database string representation
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "on hold" => Some(Self::OnHold),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnHold => "on hold",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for status in [
            ApprovalStatus::OnHold,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert_eq!(ApprovalStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_default_is_on_hold() {
        assert_eq!(ApprovalStatus::default().as_str(), "on hold");
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(ApprovalStatus::from_str("pending"), None);
    }
}
