use serde::{Deserialize, Serialize};

/// Whether a document is a debit note (claim against the customer) or a
/// credit note (refund already issued). Credit notes carry no category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Debit,
    Credit,
}

impl Kind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debit" => Some(Kind::Debit),
            "credit" => Some(Kind::Credit),
            _ => None,
        }
    }
}
