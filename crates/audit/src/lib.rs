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
    clippy::unwrap_used,
    clippy::expect_used
)]

mod compliance;
mod decision;

pub use compliance::{
    BudgetRow, ComplianceReport, ComplianceScope, TimeWindow, budget_variance, compliance_rate,
    count_decisions, count_decisions_in_window, pending_count,
};
pub use decision::DecisionRecord;

use inst_plan_domain::Role;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The user performing an action, with every role they held at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// Roles in the order supplied by the identity provider.
    pub roles: Vec<Role>,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `roles` - The roles held by the actor
    #[must_use]
    pub const fn new(id: String, roles: Vec<Role>) -> Self {
        Self { id, roles }
    }

    /// Returns the first role, used for display only.
    #[must_use]
    pub fn primary_role(&self) -> Option<Role> {
        self.roles.first().copied()
    }

    /// Returns true if the actor holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns the roles as a comma separated list.
    #[must_use]
    pub fn roles_label(&self) -> String {
        self.roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<&str>>()
            .join(",")
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`Submit`", "`Reject`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A textual snapshot of an entity before or after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// An immutable audit event representing one accepted command.
///
/// Every successful command produces exactly one audit event. Events are
/// never updated or deleted once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Store-assigned identifier. `None` until persisted.
    pub event_id: Option<i64>,
    /// The entity the command touched. `None` for an entity not yet stored.
    pub entity_id: Option<i64>,
    /// The actor who initiated this change.
    pub actor: Actor,
    /// The cause or reason for this change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The entity before the command.
    pub before: StateSnapshot,
    /// The entity after the command.
    pub after: StateSnapshot,
    /// When the command was accepted (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new `AuditEvent` that has not been persisted yet.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The entity before the command
    /// * `after` - The entity after the command
    /// * `entity_id` - The entity touched, if already stored
    /// * `occurred_at` - When the command was accepted
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        entity_id: Option<i64>,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            event_id: None,
            entity_id,
            actor,
            cause,
            action,
            before,
            after,
            occurred_at,
        }
    }
}
