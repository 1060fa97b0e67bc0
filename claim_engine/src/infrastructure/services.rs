pub mod categorization_service;
pub mod claim_compiler_service;
pub mod description_dsl;
pub mod erp_reconciler_service;
pub mod extraction_service;
pub mod line_item_reconcilers;
pub mod numeric_parser;

pub use categorization_service::DefaultCategorizationService;
pub use claim_compiler_service::DefaultClaimCompilerService;
pub use erp_reconciler_service::DefaultErpReconcilerService;
pub use extraction_service::DefaultExtractionService;
pub use numeric_parser::DefaultNumericParser;
