use std::fmt;

use serde::{Deserialize, Serialize};

/// Closure-reason code (spec.md glossary). The canonical values are closed,
/// but the ERP can hand back codes this system never assigns itself, so an
/// `Other` escape hatch keeps round-tripping data the domain doesn't own.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RootCauseCode {
    /// Unjustified.
    L00,
    /// Payment agreement.
    L01,
    /// Credit note issued.
    L06,
    /// Charge-off.
    L08,
    /// Under threshold.
    L14,
    Other(String),
}

impl RootCauseCode {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "L00" => RootCauseCode::L00,
            "L01" => RootCauseCode::L01,
            "L06" => RootCauseCode::L06,
            "L08" => RootCauseCode::L08,
            "L14" => RootCauseCode::L14,
            other => RootCauseCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RootCauseCode::L00 => "L00",
            RootCauseCode::L01 => "L01",
            RootCauseCode::L06 => "L06",
            RootCauseCode::L08 => "L08",
            RootCauseCode::L14 => "L14",
            RootCauseCode::Other(s) => s,
        }
    }
}

impl fmt::Display for RootCauseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
