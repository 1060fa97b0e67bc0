use std::collections::HashMap;

use claim_domain::entities::LineItem;
use claim_domain::services::extraction_service::LineItemReconciler;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Registry of per-template line-item arithmetic strategies, keyed by
/// `template_id` (spec.md §9: "interchangeable strategies keyed by
/// template_id in a registry rather than inheritance").
pub struct LineItemReconcilerRegistry {
    reconcilers: HashMap<String, Box<dyn LineItemReconciler>>,
}

impl LineItemReconcilerRegistry {
    pub fn new() -> Self {
        Self { reconcilers: HashMap::new() }
    }

    pub fn register(&mut self, template_id: impl Into<String>, reconciler: Box<dyn LineItemReconciler>) {
        self.reconcilers.insert(template_id.into(), reconciler);
    }

    pub fn get(&self, template_id: &str) -> Option<&dyn LineItemReconciler> {
        self.reconcilers.get(template_id).map(|b| b.as_ref())
    }
}

impl Default for LineItemReconcilerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_amount(rows: &[LineItem]) -> Decimal {
    rows.iter().map(|r| r.amount).sum()
}

/// `Σ item_amounts ≈ document_total` within a 1% relative tolerance (spec.md
/// §4.2, §8), shared by every variant's final check.
fn within_document_tolerance(rows: &[LineItem], doc_total: Decimal) -> bool {
    let total = sum_amount(rows);
    let tolerance = (doc_total.abs() * dec!(0.01)).max(dec!(0.01));
    (total - doc_total).abs() <= tolerance
}

/// Per line, the delta between what the customer received and what the
/// ledger expected: `(unit-price Δ × pieces)` when pieces match, `(Δ-pieces
/// × unit-price)` when prices match, or a combination of both when neither
/// side matches (spec.md §4.2's Delivery-loss variant; grounded on the
/// original's `_parse_bgl_debit`, which computes this same piecewise delta
/// per row before checking `Σ doc_diff + Σ calc_diff == amount × 2`).
pub struct DeliveryLossReconciler;

impl DeliveryLossReconciler {
    /// Reproduces `_parse_bgl_debit`'s `calc_diff` piecewise selection, in
    /// the original's exact branch order.
    fn row_delta(row: &LineItem) -> Decimal {
        let no_pieces = row.ledger_pieces == dec!(0) && row.customer_pieces == dec!(0);
        let no_prices = row.ledger_price == dec!(0) && row.customer_price == dec!(0);

        let delta = if no_pieces && no_prices {
            row.amount
        } else if no_pieces {
            row.customer_price - row.ledger_price
        } else if no_prices {
            row.amount
        } else if row.ledger_pieces == row.customer_pieces {
            (row.customer_price - row.ledger_price) * row.ledger_pieces
        } else if row.ledger_price == row.customer_price {
            (row.ledger_pieces - row.customer_pieces) * row.ledger_price
        } else {
            (row.ledger_pieces - row.customer_pieces) * (row.customer_price - row.ledger_price)
        };
        delta.abs().round_dp(2)
    }
}

impl LineItemReconciler for DeliveryLossReconciler {
    fn reconcile(&self, rows: &[LineItem], doc_total: Decimal) -> Option<Vec<LineItem>> {
        let doc_items_amount: Decimal = rows.iter().map(|r| r.amount).sum::<Decimal>().round_dp(2);
        let calc_items_amount: Decimal = rows.iter().map(Self::row_delta).sum::<Decimal>().round_dp(2);

        // The original checks this with a strict `!=`, not a relative
        // tolerance — delivery-loss documents carry exact per-row diffs.
        if doc_items_amount + calc_items_amount != (doc_total * dec!(2)).round_dp(2) {
            return None;
        }
        Some(rows.to_vec())
    }
}

/// Each line's amount must be one of the expected rates of the document
/// total (2% or 25%); anything else drops the items (spec.md §4.2).
pub struct PenaltyReconciler;

const PENALTY_RATES: [Decimal; 2] = [dec!(0.02), dec!(0.25)];

impl LineItemReconciler for PenaltyReconciler {
    fn reconcile(&self, rows: &[LineItem], doc_total: Decimal) -> Option<Vec<LineItem>> {
        for row in rows {
            let matches_a_rate = PENALTY_RATES.iter().any(|rate| {
                let expected = (doc_total * *rate).round_dp(2);
                (expected - row.amount).abs() <= dec!(0.01)
            });
            if !matches_a_rate {
                return None;
            }
        }
        Some(rows.to_vec())
    }
}

/// `total = unit_price × pieces × (1 ± discount/100)`. Return documents
/// carry a single recorded quantity/price per row rather than a
/// customer/ledger pair, so this reads the `customer_*` side only.
pub struct ReturnWithDiscountReconciler {
    pub discount_percent: Decimal,
}

impl LineItemReconciler for ReturnWithDiscountReconciler {
    fn reconcile(&self, rows: &[LineItem], doc_total: Decimal) -> Option<Vec<LineItem>> {
        let factor_up = Decimal::ONE + self.discount_percent / dec!(100);
        let factor_down = Decimal::ONE - self.discount_percent / dec!(100);
        for row in rows {
            let base = row.customer_price * row.customer_pieces;
            let candidates = [base * factor_up, base * factor_down];
            let matches = candidates.iter().any(|expected| {
                let tolerance = (expected.abs() * dec!(0.01)).max(dec!(0.01));
                (*expected - row.amount).abs() <= tolerance
            });
            if !matches {
                return None;
            }
        }
        within_document_tolerance(rows, doc_total).then(|| rows.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::too_many_arguments)]
    fn delivery_row(customer_pieces: Decimal, ledger_pieces: Decimal, customer_price: Decimal, ledger_price: Decimal, amount: Decimal) -> LineItem {
        LineItem {
            description: "x".into(),
            customer_pieces,
            ledger_pieces,
            customer_price,
            ledger_price,
            amount,
        }
    }

    fn row(amount: Decimal) -> LineItem {
        delivery_row(dec!(0), dec!(0), dec!(0), dec!(0), amount)
    }

    #[test]
    fn delivery_loss_accepts_a_price_mismatch_whose_delta_matches_the_recorded_amount() {
        // pieces agree (5 == 5); price delta (8 - 10) * 5 = -10, |.| = 10.
        let rows = vec![delivery_row(dec!(5), dec!(5), dec!(8), dec!(10), dec!(10))];
        assert!(DeliveryLossReconciler.reconcile(&rows, dec!(10)).is_some());
    }

    #[test]
    fn delivery_loss_rejects_when_recorded_amount_does_not_match_the_computed_delta() {
        let rows = vec![delivery_row(dec!(5), dec!(5), dec!(8), dec!(10), dec!(5))];
        assert!(DeliveryLossReconciler.reconcile(&rows, dec!(10)).is_none());
    }

    #[test]
    fn delivery_loss_accepts_a_pieces_shortfall() {
        // customer received 3, ledger expected 5; delta = (5-3)*10 = 20.
        let rows = vec![delivery_row(dec!(3), dec!(5), dec!(10), dec!(10), dec!(20))];
        assert!(DeliveryLossReconciler.reconcile(&rows, dec!(20)).is_some());
    }

    #[test]
    fn penalty_accepts_known_rate() {
        let rows = vec![row(dec!(20))];
        assert!(PenaltyReconciler.reconcile(&rows, dec!(1000)).is_some());
    }

    #[test]
    fn penalty_rejects_unknown_rate() {
        let rows = vec![row(dec!(130))];
        assert!(PenaltyReconciler.reconcile(&rows, dec!(1000)).is_none());
    }
}
