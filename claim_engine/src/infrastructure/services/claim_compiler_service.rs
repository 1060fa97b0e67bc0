use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use claim_domain::aggregates::{CaseSearch, CaseUpdate, ClaimContext, ClaimHeader, NotificationCreate, NotificationExtend};
use claim_domain::entities::account_map::AccountMapKeying;
use claim_domain::entities::template::Template;
use claim_domain::entities::{AccountMap, ExtractedData, FieldValue, ProcessingRule};
use claim_domain::error::ClaimError;
use claim_domain::services::claim_compiler_service::ClaimCompilerService;
use claim_domain::value_objects::{Category, Money, ReferenceField, TransactionTag};
use rust_decimal::Decimal;

use crate::infrastructure::adapters::ErpClient;
use crate::infrastructure::services::description_dsl;

/// Per-company tax-rate → Status-AC code table (spec.md §4.5). Loaded at
/// construction; e.g. company `1001`: 19% → `AB`, 16% → `AA`.
pub type TaxCodeTable = HashMap<u16, Vec<(Decimal, String)>>;

/// Default [`ClaimCompilerService`]: description templating, Status-Sales/
/// Status-AC templating, reference selection, and accounting-document
/// resolution (spec.md §4.5).
pub struct DefaultClaimCompilerService {
    erp: Arc<dyn ErpClient>,
    tax_codes: TaxCodeTable,
    account_keying: HashMap<String, AccountMapKeying>,
}

impl DefaultClaimCompilerService {
    pub fn new(erp: Arc<dyn ErpClient>, tax_codes: TaxCodeTable, account_keying: HashMap<String, AccountMapKeying>) -> Self {
        Self { erp, tax_codes, account_keying }
    }

    fn status_ac(&self, company_code: u16, data: &ExtractedData) -> Option<String> {
        let tax_rate = data.get("tax").and_then(|v| match v {
            FieldValue::Decimal(d) => Some(*d),
            FieldValue::List(values) => values.first().and_then(FieldValue::as_decimal),
            _ => None,
        })?;
        self.tax_codes
            .get(&company_code)?
            .iter()
            .find(|(rate, _)| *rate == tax_rate)
            .map(|(_, code)| code.clone())
    }

    fn description_values(data: &ExtractedData) -> HashMap<String, Option<String>> {
        data.fields
            .iter()
            .map(|(name, value)| (name.clone(), Some(field_to_string(value))))
            .collect()
    }

    /// Candidate value for a single [`ReferenceField`] (spec.md §4.5):
    /// `AccountNumber`/`HeadOfficeNumber` come from the Account Map (the
    /// Extraction Engine never produces an `account_number` field, spec.md
    /// §4.2's field list), every other field comes from `ExtractedData`.
    fn reference_candidate(&self, template: &Template, field: ReferenceField, data: &ExtractedData, account_map: Option<&AccountMap>) -> Option<String> {
        match field {
            ReferenceField::AccountNumber => self.account_for(template, data, account_map).map(|a| a.to_string()),
            ReferenceField::HeadOfficeNumber => self.head_office_account_for(data, account_map).map(|a| a.to_string()),
            other => data.get(other.as_str()).map(field_to_string),
        }
    }

    /// Selects the first bound candidate from `reference_by`, else
    /// distinguishes a misconfigured rule from genuinely absent data
    /// (spec.md §4.5).
    fn select_reference(
        &self,
        template: &Template,
        rule: &ProcessingRule,
        data: &ExtractedData,
        account_map: Option<&AccountMap>,
    ) -> Result<(ReferenceField, String), ClaimError> {
        let candidates = rule
            .claim_create
            .reference_by
            .as_ref()
            .map(|r| r.candidates())
            .unwrap_or(&[]);

        for field in candidates {
            if let Some(value) = self.reference_candidate(template, *field, data, account_map) {
                return Ok((*field, value));
            }
        }

        let candidate_names: Vec<String> = candidates.iter().map(|f| f.as_str().to_string()).collect();
        let any_reference_field_present = ReferenceField::ALL
            .iter()
            .any(|f| self.reference_candidate(template, *f, data, account_map).is_some());
        if any_reference_field_present {
            Err(ClaimError::MisconfiguredReferenceRule { candidates: candidate_names })
        } else {
            Err(ClaimError::NoReferenceableData { candidates: candidate_names })
        }
    }

    /// Accounting-document resolution (spec.md §4.5): accepts when invoice
    /// and delivery are both present; resolves a missing one from the ERP
    /// when a purchase order or the other document is present. Tolerates
    /// "not found" and fails hard only on an unfiltered multi-match.
    async fn resolve_accounting_documents(&self, data: &ExtractedData) -> Result<(), ClaimError> {
        let invoice = data.get("invoice_number").map(field_to_string);
        let delivery = data.get("delivery_number").map(field_to_string);
        let purchase_order = data.get("purchase_order_number").map(field_to_string);

        if invoice.is_some() && delivery.is_some() {
            return Ok(());
        }

        let reference = purchase_order
            .as_deref()
            .or(invoice.as_deref())
            .or(delivery.as_deref());

        if let Some(reference) = reference {
            let account = data.get("account_number").map(field_to_string);
            let docs = self.erp.find_accounting_documents(reference, account.as_deref()).await?;
            if docs.len() > 1 && account.is_none() {
                return Err(ClaimError::AmbiguousAccountingDocument);
            }
        }

        Ok(())
    }

    fn account_for(&self, template: &Template, data: &ExtractedData, account_map: Option<&AccountMap>) -> Option<u64> {
        let account_map = account_map?;
        let keying = self
            .account_keying
            .get(&template.issuer_upper())
            .copied()
            .unwrap_or(AccountMapKeying::SupplierOnly);
        let supplier = data.get("supplier").map(field_to_string);
        let business_unit = data.get("business_unit").map(field_to_string);
        account_map.get_account(keying, supplier.as_deref(), business_unit.as_deref())
    }

    /// Head-office account lookup: always keyed by supplier against the
    /// literal `business_unit = "head_office"` row (spec.md §4.4's
    /// `AccountMapRow` convention), regardless of the issuer's configured
    /// keying strategy, since a head-office account is a distinct row
    /// identity rather than a business-unit variant.
    fn head_office_account_for(&self, data: &ExtractedData, account_map: Option<&AccountMap>) -> Option<u64> {
        let account_map = account_map?;
        let supplier = data.get("supplier").map(field_to_string);
        account_map.get_account(AccountMapKeying::SupplierAndBusinessUnit, supplier.as_deref(), Some("head_office"))
    }
}

fn field_to_string(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Decimal(d) => d.to_string(),
        FieldValue::List(values) => values.first().map(field_to_string).unwrap_or_default(),
        FieldValue::Items(_) => String::new(),
    }
}

fn case_title(template: &Template, category: Option<Category>) -> String {
    match category {
        Some(category) => format!("{} {}", template.issuer_upper(), category.as_str()),
        None => format!("{} credit", template.issuer_upper()),
    }
}

#[async_trait]
impl ClaimCompilerService for DefaultClaimCompilerService {
    async fn compile(
        &self,
        template: &Template,
        category: Option<Category>,
        data: &ExtractedData,
        rule: &ProcessingRule,
        account_map: Option<&AccountMap>,
    ) -> Result<ClaimContext, ClaimError> {
        let transaction = TransactionTag::select(template.kind, category);
        let amount = data.amount().map(Money::of);

        let header = ClaimHeader {
            issuer: template.issuer.clone(),
            kind: template.kind,
            category,
            template_id: template.template_id.clone(),
            transaction,
            company_code: rule.company_code,
            threshold: rule.threshold,
            tolerance: rule.tolerance,
        };

        let case_search = CaseSearch {
            title: case_title(template, category),
            customer_disputed_amount: amount.map(Money::value),
        };

        if matches!(transaction, TransactionTag::Dms) {
            let case_update_rule = rule.case_update.as_ref().ok_or_else(|| ClaimError::InvalidClaimContext {
                detail: "credit note template has no case_update ruleset".into(),
            })?;
            let amount_value = amount.ok_or_else(|| ClaimError::InvalidClaimContext {
                detail: "credit note is missing the amount field".into(),
            })?;

            let description_values = Self::description_values(data);
            let attachment_name = description_dsl::render(&case_update_rule.attachment_name, &description_values)?;

            let case_update = CaseUpdate {
                status_sales_append: amount_value.format_german(),
                attachment_name,
                amount: amount_value.value(),
                processor: Some(case_update_rule.processor.clone()),
                coordinator: Some(case_update_rule.coordinator.clone()),
                responsible: case_update_rule.responsible.clone(),
            };

            return ClaimContext::assemble(header, case_search, Some(case_update), None, None);
        }

        self.resolve_accounting_documents(data).await?;

        let description_values = Self::description_values(data);
        let create_rule = &rule.claim_create;

        let notification_create = {
            let (reference_field, reference_value) = self.select_reference(template, rule, data, account_map)?;
            let description = description_dsl::render(&create_rule.description, &description_values)?;
            let attachment_name = description_dsl::render(&create_rule.attachment_name, &description_values)?;
            let status_ac = self.status_ac(rule.company_code.value(), data);
            let account_number = self.account_for(template, data, account_map);
            let delivery_number = data.get("delivery_number").map(field_to_string);

            Some(NotificationCreate {
                reference_field,
                reference_value,
                description,
                processor: create_rule.processor.clone(),
                coordinator: create_rule.coordinator.clone(),
                responsible: create_rule.responsible.clone(),
                attachment_name,
                status_ac,
                account_number,
                delivery_number,
            })
        };

        let notification_extend = match &rule.case_add {
            Some(case_add_rule) if !rule.case_add_forbidden_for(category) => {
                let description = description_dsl::render(&case_add_rule.description, &description_values)?;
                let attachment_name = description_dsl::render(&case_add_rule.attachment_name, &description_values)?;
                Some(NotificationExtend {
                    description,
                    processor: case_add_rule.processor.clone(),
                    coordinator: case_add_rule.coordinator.clone(),
                    responsible: case_add_rule.responsible.clone(),
                    attachment_name,
                })
            }
            _ => None,
        };

        ClaimContext::assemble(header, case_search, None, notification_create, notification_extend)
    }
}
