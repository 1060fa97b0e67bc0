use serde::{Deserialize, Serialize};

use crate::value_objects::{Category, Kind};

/// Which ERP transaction family a claim is compiled into (spec.md §4.5).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TransactionTag {
    /// Generic quality notification.
    Qm,
    /// Customized variant for bonus/promo/quality debits.
    Zqm,
    /// Dispute Management System path for credit notes.
    Dms,
}

impl TransactionTag {
    /// Selects the tag the way the compiler does: debit categories route to
    /// QM or ZQM, any credit note routes to DMS.
    pub fn select(kind: Kind, category: Option<Category>) -> Self {
        match kind {
            Kind::Credit => TransactionTag::Dms,
            Kind::Debit => match category {
                Some(Category::Bonus | Category::Promo | Category::Quality) => TransactionTag::Zqm,
                _ => TransactionTag::Qm,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_always_dms() {
        assert_eq!(TransactionTag::select(Kind::Credit, None), TransactionTag::Dms);
        assert_eq!(
            TransactionTag::select(Kind::Credit, Some(Category::Quality)),
            TransactionTag::Dms
        );
    }

    #[test]
    fn bonus_promo_quality_route_zqm() {
        for c in [Category::Bonus, Category::Promo, Category::Quality] {
            assert_eq!(TransactionTag::select(Kind::Debit, Some(c)), TransactionTag::Zqm);
        }
    }

    #[test]
    fn other_debit_categories_route_qm() {
        for c in [Category::Delivery, Category::Invoice, Category::Return] {
            assert_eq!(TransactionTag::select(Kind::Debit, Some(c)), TransactionTag::Qm);
        }
    }
}
