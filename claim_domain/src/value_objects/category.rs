use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed category set a debit note collapses to (spec.md §4.1, §4.3).
/// Credit notes have no category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Bonus,
    Delivery,
    Finance,
    Invoice,
    PenaltyGeneral,
    PenaltyDelay,
    PenaltyQuote,
    Price,
    Promo,
    Quality,
    Rebuild,
    Return,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Bonus,
        Category::Delivery,
        Category::Finance,
        Category::Invoice,
        Category::PenaltyGeneral,
        Category::PenaltyDelay,
        Category::PenaltyQuote,
        Category::Price,
        Category::Promo,
        Category::Quality,
        Category::Rebuild,
        Category::Return,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bonus => "bonus",
            Category::Delivery => "delivery",
            Category::Finance => "finance",
            Category::Invoice => "invoice",
            Category::PenaltyGeneral => "penalty_general",
            Category::PenaltyDelay => "penalty_delay",
            Category::PenaltyQuote => "penalty_quote",
            Category::Price => "price",
            Category::Promo => "promo",
            Category::Quality => "quality",
            Category::Rebuild => "rebuild",
            Category::Return => "return",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
    }

    #[test]
    fn rejects_unknown_category() {
        assert_eq!(Category::parse("not_a_category"), None);
    }
}
