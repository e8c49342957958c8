// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use inst_plan_audit::{AuditEvent, DecisionRecord};
use inst_plan_domain::WorkflowEntity;

/// The result of creating an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationResult {
    /// The new draft, not yet stored.
    pub new_entity: WorkflowEntity,
    /// The audit event for the creation.
    pub audit_event: AuditEvent,
}

/// The result of a successful command against an existing entity.
///
/// The three parts must be stored together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The entity after the command, with its version incremented.
    pub new_entity: WorkflowEntity,
    /// The audit event for the command.
    pub audit_event: AuditEvent,
    /// The decision record, for approve and reject transitions.
    pub decision: Option<DecisionRecord>,
}

impl TransitionResult {
    /// Returns the version the entity had before the command.
    #[must_use]
    pub const fn expected_version(&self) -> i64 {
        self.new_entity.version - 1
    }
}
