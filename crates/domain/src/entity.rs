// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::workflow::{EntityKind, WorkflowState};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Budget figures for a project, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// The assigned amount.
    pub assigned: i64,
    /// The executed amount.
    pub executed: i64,
}

impl Budget {
    /// Creates a new budget.
    ///
    /// # Errors
    ///
    /// Returns an error if either amount is negative.
    pub fn new(assigned: i64, executed: i64) -> Result<Self, DomainError> {
        if assigned < 0 {
            return Err(DomainError::InvalidBudget(format!(
                "assigned amount must not be negative (got {assigned})"
            )));
        }
        if executed < 0 {
            return Err(DomainError::InvalidBudget(format!(
                "executed amount must not be negative (got {executed})"
            )));
        }
        Ok(Self { assigned, executed })
    }

    /// Creates a budget with nothing executed yet.
    ///
    /// # Errors
    ///
    /// Returns an error if `assigned` is negative.
    pub fn assigned(assigned: i64) -> Result<Self, DomainError> {
        Self::new(assigned, 0)
    }
}

/// An objective or project moving through its workflow.
///
/// The state field only changes through a transition rule. The version
/// starts at 1 and increases by one with every accepted command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEntity {
    /// Store-assigned identifier. `None` until persisted.
    pub entity_id: Option<i64>,
    /// Objective or project.
    pub kind: EntityKind,
    /// Code, unique per kind.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Owning institution.
    pub institution: String,
    /// The user who created the entity.
    pub owner_id: String,
    /// Current workflow state.
    pub state: WorkflowState,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Project budget.
    pub budget: Option<Budget>,
    /// Creation time (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification time (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl WorkflowEntity {
    /// Creates a new draft entity at version 1.
    ///
    /// Field validation is the caller's responsibility; see
    /// [`crate::validate_entity_code`] and friends.
    #[must_use]
    pub const fn new_draft(
        kind: EntityKind,
        code: String,
        name: String,
        institution: String,
        owner_id: String,
        budget: Option<Budget>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            entity_id: None,
            kind,
            code,
            name,
            institution,
            owner_id,
            state: WorkflowState::Draft,
            version: 1,
            budget,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if `user_id` created this entity.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Returns a short description used in audit snapshots.
    #[must_use]
    pub fn snapshot(&self) -> String {
        let budget: String = self.budget.map_or_else(
            || String::from("none"),
            |b| format!("{}/{}", b.executed, b.assigned),
        );
        format!(
            "kind={},code={},state={},version={},budget={}",
            self.kind, self.code, self.state, self.version, budget
        )
    }
}
