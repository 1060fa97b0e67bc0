// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Claim Engine
//!
//! Application and infrastructure layer for the claim pipeline: the use
//! cases that drive a document through Download → Extract → Create →
//! Dispatch, the template-driven extraction engine, the categorizer, the
//! claim compiler, the ERP reconciler, and the adapters (OCR, mailbox, blob
//! store, ERP) those use cases depend on.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Presentation                    │  CLI stage entry points
//! ├─────────────────────────────────────────────┤
//! │              Application                     │  use cases, one per
//! │                                               │  pipeline stage operation
//! ├─────────────────────────────────────────────┤
//! │              Infrastructure                   │  registries, adapters,
//! │                                               │  concrete domain-service
//! │                                               │  implementations, config,
//! │                                               │  logging, metrics
//! ├─────────────────────────────────────────────┤
//! │         claim_domain (dependency)             │  entities, value objects,
//! │                                               │  service traits
//! └─────────────────────────────────────────────┘
//! ```

pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use claim_domain::{ClaimError, RetryableErpError};
