use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One reconciled line item row (spec.md §4.2's Line-Item Reconciler output).
///
/// Carries both sides of the delivery-loss/price comparison: what the
/// customer actually received (`customer_pieces`/`customer_price`) against
/// what the ledger expected (`ledger_pieces`/`ledger_price`), mirroring the
/// original's per-row `(pcs_ordered, pcs_delivered, price_ordered,
/// price_delivered)` tuple. `amount` is the line's own recorded total, used
/// for the document-level Σ check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub customer_pieces: Decimal,
    pub ledger_pieces: Decimal,
    pub customer_price: Decimal,
    pub ledger_price: Decimal,
    pub amount: Decimal,
}

/// A typed field value after coercion (spec.md §4.2 step 5). Fields in
/// [`crate::entities::template::UNIQUE_VALUE_FIELDS`] resolve to `Text`,
/// `Integer`, `Decimal`, or a single-element collapse of `List`; `items` is
/// the only field that is ever `Items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    List(Vec<FieldValue>),
    Items(Vec<LineItem>),
}

impl FieldValue {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Decimal(d) => Some(*d),
            FieldValue::Integer(i) => Some(Decimal::from(*i)),
            FieldValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[LineItem]> {
        match self {
            FieldValue::Items(items) => Some(items),
            _ => None,
        }
    }
}

/// Output of the Extraction Engine: a typed data record keyed by field name
/// (spec.md §3, §4.2). `items` is dropped (not set) rather than present-but-
/// empty when the Line-Item Reconciler can't make the arithmetic balance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedData {
    pub fields: BTreeMap<String, FieldValue>,
}

impl ExtractedData {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.get("amount").and_then(FieldValue::as_decimal)
    }

    pub fn items(&self) -> Option<&[LineItem]> {
        self.get("items").and_then(FieldValue::as_items)
    }

    pub fn reason(&self) -> Option<&str> {
        self.get("reason").and_then(FieldValue::as_text)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) {
        self.fields.remove(field);
    }
}
