// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Domain events: immutable records of significant past occurrences,
//! enabling loose coupling between the pipeline controller and observers
//! (logging, metrics).

pub mod claim_events;

pub use claim_events::ClaimEvent;
