// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Domain services: stateless operations that don't naturally belong to a
//! single entity or value object.

pub mod categorization_service;
pub mod claim_compiler_service;
pub mod erp_reconciler_service;
pub mod extraction_service;
pub mod numeric_parser;

pub use categorization_service::CategorizationService;
pub use claim_compiler_service::ClaimCompilerService;
pub use erp_reconciler_service::{ErpReconcilerService, ReconcileOutcome};
pub use extraction_service::{ExtractionOutcome, ExtractionService, LineItemReconciler};
pub use numeric_parser::{NumericParser, NumericTarget};
