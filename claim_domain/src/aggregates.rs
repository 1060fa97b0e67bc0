// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Aggregates: clusters of entities and value objects with a single
//! consistency boundary.

pub mod claim_context;

pub use claim_context::{CaseSearch, CaseUpdate, ClaimContext, ClaimHeader, NotificationCreate, NotificationExtend};
