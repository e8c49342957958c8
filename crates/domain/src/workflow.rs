// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Workflow states and the declarative transition table.
//!
//! Objectives move `Draft -> SentForValidation -> Validated | Rejected`.
//! Projects move `Draft -> SentForReview -> Approved | Rejected`.
//! A rejected entity may be sent back to `Draft` by its planner.
//!
//! The table below is the only source of legal edges. Commands that change
//! state look up their rule here and nothing bypasses it.

use crate::error::DomainError;
use crate::role::{Module, Role};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of entity flowing through a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A strategic objective, decided by a validator.
    Objective,
    /// An investment project, decided by a reviewer.
    Project,
}

impl EntityKind {
    /// Every entity kind.
    pub const ALL: [Self; 2] = [Self::Objective, Self::Project];

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Objective => "objective",
            Self::Project => "project",
        }
    }

    /// Returns the module that governs access to this kind.
    #[must_use]
    pub const fn module(&self) -> Module {
        match self {
            Self::Objective => Module::Objectives,
            Self::Project => Module::Projects,
        }
    }

    /// Returns the state an entity of this kind enters when submitted.
    #[must_use]
    pub const fn submitted_state(&self) -> WorkflowState {
        match self {
            Self::Objective => WorkflowState::SentForValidation,
            Self::Project => WorkflowState::SentForReview,
        }
    }

    /// Returns the terminal state reached by a favourable decision.
    #[must_use]
    pub const fn approved_state(&self) -> WorkflowState {
        match self {
            Self::Objective => WorkflowState::Validated,
            Self::Project => WorkflowState::Approved,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "objective" => Ok(Self::Objective),
            "project" => Ok(Self::Project),
            _ => Err(DomainError::InvalidEntityKind(s.to_string())),
        }
    }
}

/// A workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowState {
    /// Being authored; editable by the owner.
    Draft,
    /// Objective awaiting a validator's decision.
    SentForValidation,
    /// Project awaiting a reviewer's decision.
    SentForReview,
    /// Objective accepted by a validator.
    Validated,
    /// Project accepted by a reviewer.
    Approved,
    /// Decision was negative.
    Rejected,
}

impl WorkflowState {
    /// Every state.
    pub const ALL: [Self; 6] = [
        Self::Draft,
        Self::SentForValidation,
        Self::SentForReview,
        Self::Validated,
        Self::Approved,
        Self::Rejected,
    ];

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::SentForValidation => "SentForValidation",
            Self::SentForReview => "SentForReview",
            Self::Validated => "Validated",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Returns true if the state ends the decision cycle.
    ///
    /// `Rejected` is terminal even though a resubmission edge leaves it.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Validated | Self::Approved | Self::Rejected)
    }

    /// Returns true if the state belongs to the given kind's workflow.
    #[must_use]
    pub const fn applies_to(&self, kind: EntityKind) -> bool {
        match self {
            Self::Draft | Self::Rejected => true,
            Self::SentForValidation | Self::Validated => matches!(kind, EntityKind::Objective),
            Self::SentForReview | Self::Approved => matches!(kind, EntityKind::Project),
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkflowState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| DomainError::InvalidWorkflowState(s.to_string()))
    }
}

/// The outcome of a decision-bearing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Validated or approved.
    Approved,
    /// Rejected.
    Rejected,
}

impl Decision {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Decision {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidDecision(s.to_string())),
        }
    }
}

/// Whether a transition takes a justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustificationPolicy {
    /// The transition is not a decision; any text is ignored.
    NotApplicable,
    /// A justification may be recorded.
    Optional,
    /// A non-blank justification must be supplied.
    Required,
}

/// One legal edge of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Entity kind the edge applies to.
    pub kind: EntityKind,
    /// Source state.
    pub from: WorkflowState,
    /// Target state.
    pub to: WorkflowState,
    /// Roles that may trigger the edge.
    pub roles: &'static [Role],
    /// Justification requirement.
    pub justification: JustificationPolicy,
    /// The decision recorded when the edge is taken, if any.
    pub decision: Option<Decision>,
}

impl TransitionRule {
    /// Returns true if `role` may trigger this edge.
    #[must_use]
    pub fn permits(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns true if any of `roles` may trigger this edge.
    #[must_use]
    pub fn permits_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.permits(*role))
    }

    /// Returns true if the edge produces a decision record.
    #[must_use]
    pub const fn is_decision(&self) -> bool {
        self.decision.is_some()
    }

    /// Returns true if a planner triggering this edge must own the entity.
    ///
    /// Submission leaves `Draft` and resubmission returns to it.
    #[must_use]
    pub fn requires_ownership(&self) -> bool {
        self.from == WorkflowState::Draft || self.to == WorkflowState::Draft
    }
}

const AUTHORS: &[Role] = &[Role::Planner, Role::Admin];
const PLANNER_ONLY: &[Role] = &[Role::Planner];
const VALIDATORS: &[Role] = &[Role::Validator];
const REVIEWERS: &[Role] = &[Role::Reviewer];

/// The complete transition table.
pub const TRANSITIONS: [TransitionRule; 8] = [
    TransitionRule {
        kind: EntityKind::Objective,
        from: WorkflowState::Draft,
        to: WorkflowState::SentForValidation,
        roles: AUTHORS,
        justification: JustificationPolicy::NotApplicable,
        decision: None,
    },
    TransitionRule {
        kind: EntityKind::Objective,
        from: WorkflowState::SentForValidation,
        to: WorkflowState::Validated,
        roles: VALIDATORS,
        justification: JustificationPolicy::Optional,
        decision: Some(Decision::Approved),
    },
    TransitionRule {
        kind: EntityKind::Objective,
        from: WorkflowState::SentForValidation,
        to: WorkflowState::Rejected,
        roles: VALIDATORS,
        justification: JustificationPolicy::Required,
        decision: Some(Decision::Rejected),
    },
    TransitionRule {
        kind: EntityKind::Objective,
        from: WorkflowState::Rejected,
        to: WorkflowState::Draft,
        roles: PLANNER_ONLY,
        justification: JustificationPolicy::NotApplicable,
        decision: None,
    },
    TransitionRule {
        kind: EntityKind::Project,
        from: WorkflowState::Draft,
        to: WorkflowState::SentForReview,
        roles: AUTHORS,
        justification: JustificationPolicy::NotApplicable,
        decision: None,
    },
    TransitionRule {
        kind: EntityKind::Project,
        from: WorkflowState::SentForReview,
        to: WorkflowState::Approved,
        roles: REVIEWERS,
        justification: JustificationPolicy::Optional,
        decision: Some(Decision::Approved),
    },
    TransitionRule {
        kind: EntityKind::Project,
        from: WorkflowState::SentForReview,
        to: WorkflowState::Rejected,
        roles: REVIEWERS,
        justification: JustificationPolicy::Required,
        decision: Some(Decision::Rejected),
    },
    TransitionRule {
        kind: EntityKind::Project,
        from: WorkflowState::Rejected,
        to: WorkflowState::Draft,
        roles: PLANNER_ONLY,
        justification: JustificationPolicy::NotApplicable,
        decision: None,
    },
];

/// Finds the rule for an edge, if the edge exists.
#[must_use]
pub fn find_rule(
    kind: EntityKind,
    from: WorkflowState,
    to: WorkflowState,
) -> Option<&'static TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.kind == kind && rule.from == from && rule.to == to)
}

/// Returns every edge leaving `from` for the given kind.
pub fn outgoing_rules(
    kind: EntityKind,
    from: WorkflowState,
) -> impl Iterator<Item = &'static TransitionRule> {
    TRANSITIONS
        .iter()
        .filter(move |rule| rule.kind == kind && rule.from == from)
}

/// Returns true if `role` may move an entity of `kind` from `from` to `to`.
///
/// Ownership is not considered here; it depends on the entity instance.
#[must_use]
pub fn can_transition(
    kind: EntityKind,
    from: WorkflowState,
    to: WorkflowState,
    role: Role,
) -> bool {
    find_rule(kind, from, to).is_some_and(|rule| rule.permits(role))
}

/// Looks up the rule for an edge, failing if the edge is not in the table.
///
/// # Errors
///
/// Returns an error if:
/// - `from` or `to` does not belong to the kind's workflow
/// - No rule covers the edge
pub fn validate_transition(
    kind: EntityKind,
    from: WorkflowState,
    to: WorkflowState,
) -> Result<&'static TransitionRule, DomainError> {
    if !from.applies_to(kind) {
        return Err(DomainError::InvalidStateForKind { kind, state: from });
    }
    find_rule(kind, from, to).ok_or(DomainError::InvalidTransition { kind, from, to })
}
