use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three islands a zone can belong to.
///
/// Older clients still send `anjouan` and `moheli`/`mohéli`; those are
/// accepted on input and mapped to the canonical name, which is the only
/// spelling ever written to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Island {
    Ndzuwani,
    Ngazidja,
    Mwali,
}

impl fmt::Display for Island {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Island {
    /// Parse an island name, accepting legacy spellings.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ndzuwani" | "anjouan" => Some(Self::Ndzuwani),
            "ngazidja" => Some(Self::Ngazidja),
            "mwali" | "moheli" | "mohéli" => Some(Self::Mwali),
            _ => None,
        }
    }

    /// Canonical database representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ndzuwani => "ndzuwani",
            Self::Ngazidja => "ngazidja",
            Self::Mwali => "mwali",
        }
    }
}
