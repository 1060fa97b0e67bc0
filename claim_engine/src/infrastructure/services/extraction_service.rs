use std::sync::Arc;

use async_trait::async_trait;
use claim_domain::entities::document_record::DocumentRecord;
use claim_domain::entities::template::{FieldPattern, Template, UNIQUE_VALUE_FIELDS};
use claim_domain::entities::{ExtractedData, FieldValue, LineItem};
use claim_domain::error::ClaimError;
use claim_domain::repositories::TemplateRegistry;
use claim_domain::services::extraction_service::{ExtractionOutcome, ExtractionService};
use claim_domain::services::numeric_parser::{NumericParser, NumericTarget, NumericValue};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{instrument, warn};

use crate::infrastructure::adapters::OcrClient;
use crate::infrastructure::services::line_item_reconcilers::LineItemReconcilerRegistry;

/// Default [`ExtractionService`]: OCR + template selection + normalization +
/// field extraction + type coercion + line-item reconciliation (spec.md
/// §4.2).
pub struct DefaultExtractionService {
    ocr: Arc<dyn OcrClient>,
    templates: Arc<dyn TemplateRegistry>,
    numeric: Arc<dyn NumericParser>,
    reconcilers: Arc<LineItemReconcilerRegistry>,
    ocr_route: String,
}

impl DefaultExtractionService {
    pub fn new(
        ocr: Arc<dyn OcrClient>,
        templates: Arc<dyn TemplateRegistry>,
        numeric: Arc<dyn NumericParser>,
        reconcilers: Arc<LineItemReconcilerRegistry>,
        ocr_route: String,
    ) -> Self {
        Self { ocr, templates, numeric, reconcilers, ocr_route }
    }

    async fn raw_text(&self, record: &DocumentRecord, force_reextract: bool) -> Result<String, ClaimError> {
        if !force_reextract {
            if let Some(text) = &record.raw_text {
                return Ok(text.clone());
            }
        }
        let bytes = tokio::fs::read(&record.file_location).await?;
        self.ocr.extract_text(&bytes, &self.ocr_route).await
    }

    fn select_template<'a>(&self, issuer: &'a str, raw_text: &str) -> Result<(&Template, String), ClaimError> {
        let candidates = self.templates.candidates(issuer);
        if candidates.is_empty() {
            return Err(ClaimError::TemplateNotFound { issuer: issuer.to_string() });
        }

        let mut matches = Vec::new();
        for template in candidates {
            let normalized = match template.options.normalize(raw_text) {
                Ok(n) => n,
                Err(_) => continue,
            };
            if template_matches(template, &normalized)? {
                matches.push((template, normalized));
            }
        }

        match matches.len() {
            0 => Err(ClaimError::PatternMatch {
                issuer: issuer.to_string(),
                detail: "no template's keyword set matched".into(),
            }),
            1 => Ok(matches.into_iter().next().unwrap()),
            _ => Err(ClaimError::AmbiguousTemplate {
                issuer: issuer.to_string(),
                candidates: matches.iter().map(|(t, _)| t.template_id.to_string()).collect(),
            }),
        }
    }

    fn extract_field(&self, template: &Template, field_name: &str, pattern: &FieldPattern, text: &str) -> Result<Vec<String>, ClaimError> {
        for raw_pattern in pattern.patterns() {
            let re = Regex::new(raw_pattern)
                .map_err(|e| ClaimError::TemplateLoad { path: template.template_id.to_string(), detail: e.to_string() })?;
            let values: Vec<String> = re
                .captures_iter(text)
                .map(|c| c.get(1).or_else(|| c.get(0)).unwrap().as_str().to_string())
                .collect();
            if !values.is_empty() {
                return Ok(values);
            }
        }
        let _ = field_name;
        Ok(Vec::new())
    }

    fn coerce(&self, field_name: &str, values: Vec<String>, required: bool) -> Result<Option<FieldValue>, ClaimError> {
        if values.is_empty() {
            if required {
                return Err(ClaimError::PatternMatch {
                    issuer: String::new(),
                    detail: format!("required field '{field_name}' did not match"),
                });
            }
            return Ok(None);
        }

        if UNIQUE_VALUE_FIELDS.contains(&field_name) {
            let distinct: std::collections::HashSet<&String> = values.iter().collect();
            if distinct.len() > 1 {
                return Err(ClaimError::PatternMatch {
                    issuer: String::new(),
                    detail: format!("field '{field_name}' matched more than one distinct value"),
                });
            }
        }

        let single = values[0].clone();
        let value = match field_name {
            "amount" => {
                let parsed = self.parse_decimal(&single, field_name)?;
                if parsed <= Decimal::ZERO {
                    return Err(ClaimError::PatternMatch {
                        issuer: String::new(),
                        detail: "amount must be > 0".into(),
                    });
                }
                FieldValue::Decimal(parsed)
            }
            "zip" | "archive_number" | "branch" => {
                let parsed = self.parse_int(&single, field_name)?;
                if parsed < 0 {
                    return Err(ClaimError::PatternMatch { issuer: String::new(), detail: format!("'{field_name}' must be non-negative") });
                }
                FieldValue::Integer(parsed)
            }
            "supplier" | "document_number" | "identifier" | "backreference_number" => {
                match self.numeric.parse(&single, NumericTarget::Int, false)? {
                    NumericValue::Int(i) => FieldValue::Integer(i),
                    _ => FieldValue::Text(single),
                }
            }
            "tax" => FieldValue::List(values.into_iter().map(|v| self.parse_decimal(&v, "tax").map(FieldValue::Decimal)).collect::<Result<_, _>>()?),
            "subtotals" => FieldValue::List(values.into_iter().map(|v| self.parse_decimal(&v, "subtotals").map(FieldValue::Decimal)).collect::<Result<_, _>>()?),
            "delivery_number" => {
                validate_shape(field_name, &single, |s| s.len() == 9 && s.starts_with("31"))?;
                FieldValue::Text(single)
            }
            "invoice_number" => {
                validate_shape(field_name, &single, |s| s.len() == 9 && !s.starts_with('0'))?;
                FieldValue::Text(single)
            }
            "purchase_order_number" => {
                validate_shape(field_name, &single, |s| (5..=7).contains(&s.len()) && !s.starts_with('0'))?;
                FieldValue::Text(single)
            }
            "return_number" => {
                validate_shape(field_name, &single, |s| (6..=7).contains(&s.len()))?;
                FieldValue::Text(single)
            }
            "agreement_number" => {
                validate_shape(field_name, &single, |s| s.len() == 10)?;
                FieldValue::Text(single)
            }
            "email" => FieldValue::Text(single.split_whitespace().collect::<Vec<_>>().join(" ")),
            "reason" => {
                if values.len() == 1 {
                    FieldValue::Text(single.trim().to_string())
                } else {
                    FieldValue::List(values.into_iter().map(|v| FieldValue::Text(v.trim().to_string())).collect())
                }
            }
            _ => FieldValue::Text(single),
        };
        Ok(Some(value))
    }

    fn parse_decimal(&self, raw: &str, field_name: &str) -> Result<Decimal, ClaimError> {
        match self.numeric.parse(raw, NumericTarget::Float, true)? {
            NumericValue::Float(d) => Ok(d),
            _ => Err(ClaimError::PatternMatch { issuer: String::new(), detail: format!("'{field_name}' is not numeric") }),
        }
    }

    fn parse_int(&self, raw: &str, field_name: &str) -> Result<i64, ClaimError> {
        match self.numeric.parse(raw, NumericTarget::Int, true)? {
            NumericValue::Int(i) => Ok(i),
            _ => Err(ClaimError::PatternMatch { issuer: String::new(), detail: format!("'{field_name}' is not integral") }),
        }
    }
}

fn validate_shape(field_name: &str, value: &str, predicate: impl Fn(&str) -> bool) -> Result<(), ClaimError> {
    if predicate(value) {
        Ok(())
    } else {
        Err(ClaimError::PatternMatch {
            issuer: String::new(),
            detail: format!("'{field_name}' value '{value}' does not match the expected shape"),
        })
    }
}

fn template_matches(template: &Template, normalized_text: &str) -> Result<bool, ClaimError> {
    for pattern in &template.inclusive_keywords {
        let re = Regex::new(pattern).map_err(|e| ClaimError::TemplateLoad { path: template.template_id.to_string(), detail: e.to_string() })?;
        if !re.is_match(normalized_text) {
            return Ok(false);
        }
    }
    for pattern in &template.exclusive_keywords {
        let re = Regex::new(pattern).map_err(|e| ClaimError::TemplateLoad { path: template.template_id.to_string(), detail: e.to_string() })?;
        if re.is_match(normalized_text) {
            return Ok(false);
        }
    }
    Ok(true)
}

#[async_trait]
impl ExtractionService for DefaultExtractionService {
    #[instrument(skip(self, record), fields(record_id = record.id))]
    async fn extract(&self, record: &DocumentRecord, issuer: &str, force_reextract: bool) -> Result<ExtractionOutcome, ClaimError> {
        let raw_text = self.raw_text(record, force_reextract).await?;
        let (template, normalized_text) = self.select_template(issuer, &raw_text)?;

        let mut data = ExtractedData::default();
        for (field_name, pattern) in &template.fields {
            if field_name == "items" {
                continue;
            }
            let values = self.extract_field(template, field_name, pattern, &normalized_text)?;
            let required = !template.optional_fields.contains(field_name);
            if let Some(value) = self.coerce(field_name, values, required)? {
                data.set(field_name.clone(), value);
            }
        }

        if template.fields.contains_key("items") {
            if let Some(rows) = self.extract_line_items(&normalized_text)? {
                if let Some(reconciler) = self.reconcilers.get(template.template_id.as_str()) {
                    let doc_total = data.amount().unwrap_or_default();
                    match reconciler.reconcile(&rows, doc_total) {
                        Some(reconciled) => data.set("items", FieldValue::Items(reconciled)),
                        None => warn!(template_id = %template.template_id, "line items did not reconcile, dropping"),
                    }
                } else {
                    data.set("items", FieldValue::Items(rows));
                }
            }
        }

        for field_name in template.required_fields() {
            if data.get(field_name).is_none() {
                return Err(ClaimError::PatternMatch {
                    issuer: issuer.to_string(),
                    detail: format!("required field '{field_name}' is missing from extracted data"),
                });
            }
        }

        Ok(ExtractionOutcome { template_id: template.template_id.clone(), data })
    }
}

impl DefaultExtractionService {
    /// Row-shaped item extraction is template-specific; this default parses
    /// no rows and leaves the decision to a registered
    /// [`claim_domain::services::extraction_service::LineItemReconciler`].
    /// Concrete deployments override row extraction per template in the
    /// composition root.
    fn extract_line_items(&self, _normalized_text: &str) -> Result<Option<Vec<LineItem>>, ClaimError> {
        Ok(None)
    }
}
