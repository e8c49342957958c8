// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::workflow::{EntityKind, WorkflowState};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The requested state change is not an edge of the transition table.
    InvalidTransition {
        /// The entity kind.
        kind: EntityKind,
        /// The current state.
        from: WorkflowState,
        /// The requested state.
        to: WorkflowState,
    },
    /// The state does not belong to the entity kind's workflow.
    InvalidStateForKind {
        /// The entity kind.
        kind: EntityKind,
        /// The offending state.
        state: WorkflowState,
    },
    /// A justification is required but was missing or blank.
    MissingJustification,
    /// Entity code is empty or malformed.
    InvalidCode(String),
    /// Entity name is empty.
    InvalidName(String),
    /// Institution is empty.
    InvalidInstitution(String),
    /// Budget amount is invalid.
    InvalidBudget(String),
    /// A budget was supplied for a kind that does not carry one.
    BudgetNotAllowed {
        /// The entity kind.
        kind: EntityKind,
    },
    /// Entity details may only change in specific states.
    EditNotPermitted {
        /// The state the entity is currently in.
        state: WorkflowState,
    },
    /// A details update names neither a new name nor a new budget.
    EmptyUpdate,
    /// Unknown role name.
    InvalidRole(String),
    /// Unknown module name.
    InvalidModule(String),
    /// Unknown entity kind.
    InvalidEntityKind(String),
    /// Unknown workflow state.
    InvalidWorkflowState(String),
    /// Unknown decision value.
    InvalidDecision(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { kind, from, to } => {
                write!(f, "Invalid transition for {kind}: {from} -> {to}")
            }
            Self::InvalidStateForKind { kind, state } => {
                write!(f, "State {state} does not apply to {kind}")
            }
            Self::MissingJustification => {
                write!(f, "A non-empty justification is required")
            }
            Self::InvalidCode(msg) => write!(f, "Invalid code: {msg}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidInstitution(msg) => write!(f, "Invalid institution: {msg}"),
            Self::InvalidBudget(msg) => write!(f, "Invalid budget: {msg}"),
            Self::BudgetNotAllowed { kind } => {
                write!(f, "Budgets are not allowed for {kind} entities")
            }
            Self::EditNotPermitted { state } => {
                write!(f, "Entity details cannot be changed in state {state}")
            }
            Self::EmptyUpdate => {
                write!(f, "An update must change the name or the assigned budget")
            }
            Self::InvalidRole(value) => write!(f, "Unknown role: '{value}'"),
            Self::InvalidModule(value) => write!(f, "Unknown module: '{value}'"),
            Self::InvalidEntityKind(value) => write!(f, "Unknown entity kind: '{value}'"),
            Self::InvalidWorkflowState(value) => {
                write!(f, "Unknown workflow state: '{value}'")
            }
            Self::InvalidDecision(value) => write!(f, "Unknown decision: '{value}'"),
        }
    }
}

impl std::error::Error for DomainError {}
