use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;
use crate::value_objects::{Category, CompanyCode, Kind, ReferenceField, TemplateId, Threshold, Tolerance, TransactionTag};

/// `header` section of a compiled claim (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimHeader {
    pub issuer: String,
    pub kind: Kind,
    pub category: Option<Category>,
    pub template_id: TemplateId,
    pub transaction: TransactionTag,
    pub company_code: CompanyCode,
    pub threshold: Threshold,
    pub tolerance: Tolerance,
}

/// `case.search` section: how the reconciler looks for an existing dispute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSearch {
    pub title: String,
    pub customer_disputed_amount: Option<Decimal>,
}

/// `case.update` section, populated for credit notes only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseUpdate {
    pub status_sales_append: String,
    pub attachment_name: String,
    pub amount: Decimal,
    pub processor: Option<String>,
    pub coordinator: Option<String>,
    pub responsible: Option<String>,
}

/// `notification.create` section, populated for new debits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreate {
    pub reference_field: ReferenceField,
    pub reference_value: String,
    pub description: String,
    pub processor: String,
    pub coordinator: String,
    pub responsible: Option<String>,
    pub attachment_name: String,
    pub status_ac: Option<String>,
    /// Account number resolved from the Account Map (spec.md §4.4), not
    /// the Extraction Engine — the ERP write ("overwrite attributes to
    /// force ... customer account", spec.md §4.6 step 5) needs this even
    /// when the chosen `reference_field` is something else entirely.
    pub account_number: Option<u64>,
    /// Raw `delivery_number` from the extracted data, carried alongside
    /// whichever field was actually chosen as the reference, since the ERP
    /// Reconciler derives the notification's shipping point from it
    /// (spec.md §4.6) regardless of `reference_field`.
    pub delivery_number: Option<String>,
}

/// `notification.extend` section, populated when a debit adds a case to an
/// existing notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationExtend {
    pub description: String,
    pub processor: String,
    pub coordinator: String,
    pub responsible: Option<String>,
    pub attachment_name: String,
}

/// The fully-specified claim context the compiler produces (spec.md §3,
/// §4.5). Construction is private to the compiler module: there is no public
/// constructor here, so an unvalidated `ClaimContext` cannot exist. External
/// code builds one only by calling the claim compiler service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimContext {
    pub header: ClaimHeader,
    pub case_search: CaseSearch,
    pub case_update: Option<CaseUpdate>,
    pub notification_create: Option<NotificationCreate>,
    pub notification_extend: Option<NotificationExtend>,
}

impl ClaimContext {
    /// Assembles and validates a context in one step; only the compiler
    /// service calls this (it is `pub(crate)` to the domain crate, the
    /// compiler itself lives in the engine crate and goes through the
    /// [`crate::services::ClaimCompilerService`] trait instead).
    pub fn assemble(
        header: ClaimHeader,
        case_search: CaseSearch,
        case_update: Option<CaseUpdate>,
        notification_create: Option<NotificationCreate>,
        notification_extend: Option<NotificationExtend>,
    ) -> Result<Self, ClaimError> {
        let ctx = Self {
            header,
            case_search,
            case_update,
            notification_create,
            notification_extend,
        };
        ctx.validate()?;
        Ok(ctx)
    }

    /// Post-compile invariants (spec.md §4.5, §3).
    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.case_search.title.trim().is_empty() {
            return Err(ClaimError::InvalidClaimContext {
                detail: "case search title must be non-empty".into(),
            });
        }

        let transaction_is_dms = matches!(self.header.transaction, TransactionTag::Dms);
        let kind_is_credit = matches!(self.header.kind, Kind::Credit);
        if kind_is_credit != transaction_is_dms {
            return Err(ClaimError::InvalidClaimContext {
                detail: "kind=credit must imply transaction=DMS and vice versa".into(),
            });
        }

        if transaction_is_dms {
            if self.notification_create.is_some() || self.notification_extend.is_some() {
                return Err(ClaimError::InvalidClaimContext {
                    detail: "DMS path must omit notification sections".into(),
                });
            }
        } else if self.notification_create.is_none() && self.notification_extend.is_none() {
            return Err(ClaimError::InvalidClaimContext {
                detail: "QM/ZQM claims require at least one non-null reference field".into(),
            });
        }

        for description in [
            self.notification_create.as_ref().map(|n| &n.description),
            self.notification_extend.as_ref().map(|n| &n.description),
        ]
        .into_iter()
        .flatten()
        {
            if description.trim().is_empty() {
                return Err(ClaimError::InvalidClaimContext {
                    detail: "description must be non-empty".into(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn header(kind: Kind, transaction: TransactionTag) -> ClaimHeader {
        ClaimHeader {
            issuer: "OBI_DE".into(),
            kind,
            category: Some(Category::Return),
            template_id: TemplateId::parse("OBI_DE_0001").unwrap(),
            transaction,
            company_code: CompanyCode::new(1001).unwrap(),
            threshold: Threshold::new(dec!(500)).unwrap(),
            tolerance: Tolerance::new(dec!(0.01)).unwrap(),
        }
    }

    fn notification() -> NotificationCreate {
        NotificationCreate {
            reference_field: ReferenceField::InvoiceNumber,
            reference_value: "109876543".into(),
            description: "Retoure 123.45".into(),
            processor: "P1".into(),
            coordinator: "C1".into(),
            responsible: None,
            attachment_name: "claim.pdf".into(),
            status_ac: Some("AB".into()),
            account_number: None,
            delivery_number: None,
        }
    }

    #[test]
    fn qm_requires_a_notification_section() {
        let result = ClaimContext::assemble(
            header(Kind::Debit, TransactionTag::Qm),
            CaseSearch { title: "t".into(), customer_disputed_amount: None },
            None,
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn dms_forbids_notification_sections() {
        let result = ClaimContext::assemble(
            header(Kind::Credit, TransactionTag::Dms),
            CaseSearch { title: "t".into(), customer_disputed_amount: Some(dec!(1500)) },
            Some(CaseUpdate {
                status_sales_append: "1.500,00".into(),
                attachment_name: "claim.pdf".into(),
                amount: dec!(1500),
                processor: None,
                coordinator: None,
                responsible: None,
            }),
            Some(notification()),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn valid_qm_context_passes() {
        let result = ClaimContext::assemble(
            header(Kind::Debit, TransactionTag::Qm),
            CaseSearch { title: "t".into(), customer_disputed_amount: None },
            None,
            Some(notification()),
            None,
        );
        assert!(result.is_ok());
    }
}
