// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `entities` — entity inserts and versioned updates
//! - `decisions` — append-only decision records
//! - `audit` — append-only audit events
//! - `workflow` — transactional orchestration of core results

pub mod audit;
pub mod decisions;
pub mod entities;
pub mod workflow;

pub use audit::insert_audit_event;
pub use decisions::insert_decision;
pub use workflow::{
    PersistCreationResult, PersistTransitionResult, persist_creation, persist_transition,
};
