use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses items, rates them, keeps a wishlist
    #[default]
    Customer,
    /// Lists items on behalf of a zone
    Referent,
    /// Moderates everything
    Sysadmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Role {
    /// Convert from database string representation
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "referent" => Some(Self::Referent),
            "sysadmin" => Some(Self::Sysadmin),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Referent => "referent",
            Self::Sysadmin => "sysadmin",
        }
    }
}
