// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod capability;
mod entity;
mod error;
mod registry;
mod role;
mod validation;
mod workflow;

#[cfg(test)]
mod tests;

pub use capability::{CapabilitySet, ExportLevel};
pub use entity::{Budget, WorkflowEntity};
pub use error::DomainError;
pub use registry::{capabilities_for, capabilities_for_names};
pub use role::{Module, Role};
pub use validation::{
    MAX_CODE_LENGTH, validate_budget_for_kind, validate_entity_code, validate_institution,
    validate_justification, validate_name,
};
pub use workflow::{
    Decision, EntityKind, JustificationPolicy, TRANSITIONS, TransitionRule, WorkflowState,
    can_transition, find_rule, outgoing_rules, validate_transition,
};
