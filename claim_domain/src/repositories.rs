// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Repository traits: abstract persistence contracts the domain depends on
//! but does not implement. Infrastructure in `claim_engine` provides the
//! concrete SQLite/YAML-backed adapters.

pub mod document_repository;
pub mod template_registry;

pub use document_repository::DocumentRepository;
pub use template_registry::{AccountMapRegistry, ProcessingRuleRegistry, TemplateRegistry};
