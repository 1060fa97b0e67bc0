use serde::{Deserialize, Serialize};

/// Candidate business keys that can link a new QM notification to preceding
/// accounting documents (spec.md §4.5, glossary entry "Reference (by)").
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceField {
    InvoiceNumber,
    DeliveryNumber,
    AccountNumber,
    HeadOfficeNumber,
    PurchaseOrderNumber,
}

impl ReferenceField {
    pub const ALL: [ReferenceField; 5] = [
        ReferenceField::InvoiceNumber,
        ReferenceField::DeliveryNumber,
        ReferenceField::AccountNumber,
        ReferenceField::HeadOfficeNumber,
        ReferenceField::PurchaseOrderNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceField::InvoiceNumber => "invoice_number",
            ReferenceField::DeliveryNumber => "delivery_number",
            ReferenceField::AccountNumber => "account_number",
            ReferenceField::HeadOfficeNumber => "head_office_number",
            ReferenceField::PurchaseOrderNumber => "purchase_order_number",
        }
    }
}

/// A rule's ordered preference list of [`ReferenceField`]s (spec.md §4.5);
/// the compiler picks the first whose extracted value is non-null.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBy(pub Vec<ReferenceField>);

impl ReferenceBy {
    pub fn candidates(&self) -> &[ReferenceField] {
        &self.0
    }
}
