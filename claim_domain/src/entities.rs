// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Entities: objects with identity that persists across state changes.

pub mod account_map;
pub mod document_record;
pub mod extracted_data;
pub mod processing_rule;
pub mod template;

pub use account_map::AccountMap;
pub use document_record::{DocumentRecord, DocumentStatus};
pub use extracted_data::{ExtractedData, FieldValue, LineItem};
pub use processing_rule::{ClaimCreateRule, ProcessingRule, RuleSet};
pub use template::{Template, TemplateOptions};
