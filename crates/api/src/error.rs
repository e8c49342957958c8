// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.
//!
//! Core and persistence errors never cross the API boundary directly. They
//! are translated here into the six outcomes a caller can act on.

use inst_plan::CoreError;
use inst_plan_domain::DomainError;
use inst_plan_persistence::PersistenceError;
use thiserror::Error;

/// API-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request carried no usable identity.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// Why the identity was refused.
        reason: String,
    },
    /// The actor's roles do not permit the action.
    #[error("Unauthorized: {action} ({reason})")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        reason: String,
    },
    /// The entity's current state does not allow the command.
    #[error("Invalid transition: {message}")]
    InvalidTransition {
        /// A human-readable description.
        message: String,
    },
    /// Input failed validation.
    #[error("Invalid input for field '{field}': {message}")]
    ValidationError {
        /// The offending field.
        field: String,
        /// A human-readable description.
        message: String,
    },
    /// Another writer changed the entity first. Reload and retry.
    #[error("Entity {entity_id} was modified concurrently (expected version {expected_version})")]
    ConcurrentModification {
        /// The entity that changed.
        entity_id: i64,
        /// The version the caller acted on.
        expected_version: i64,
    },
    /// A requested resource does not exist.
    #[error("{resource_type} not found: {message}")]
    NotFound {
        /// The kind of resource.
        resource_type: String,
        /// What was looked up.
        message: String,
    },
    /// The store failed.
    #[error("Storage failure: {message}")]
    StorageFailure {
        /// A description of the failure.
        message: String,
    },
}

impl ApiError {
    /// Shorthand for a validation error on one field.
    #[must_use]
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: String::from(field),
            message: message.into(),
        }
    }
}

/// Translates a domain error into an API error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidTransition { .. }
        | DomainError::InvalidStateForKind { .. }
        | DomainError::EditNotPermitted { .. } => ApiError::InvalidTransition {
            message: err.to_string(),
        },
        DomainError::MissingJustification => {
            ApiError::validation("justification", err.to_string())
        }
        DomainError::InvalidCode(msg) => ApiError::validation("code", msg),
        DomainError::InvalidName(msg) => ApiError::validation("name", msg),
        DomainError::InvalidInstitution(msg) => ApiError::validation("institution", msg),
        DomainError::InvalidBudget(msg) => ApiError::validation("budget", msg),
        DomainError::BudgetNotAllowed { .. } => ApiError::validation("budget", err.to_string()),
        DomainError::EmptyUpdate => ApiError::validation("details", err.to_string()),
        DomainError::InvalidRole(_) => ApiError::validation("role", err.to_string()),
        DomainError::InvalidModule(_) => ApiError::validation("module", err.to_string()),
        DomainError::InvalidEntityKind(_) => ApiError::validation("kind", err.to_string()),
        DomainError::InvalidWorkflowState(_) => ApiError::validation("state", err.to_string()),
        DomainError::InvalidDecision(_) => ApiError::validation("decision", err.to_string()),
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Unauthorized { action, reason } => ApiError::Unauthorized { action, reason },
        CoreError::UnsupportedCommand(name) => ApiError::InvalidTransition {
            message: format!("Command '{name}' cannot be applied here"),
        },
        CoreError::EntityNotStored => ApiError::NotFound {
            resource_type: String::from("Entity"),
            message: String::from("the entity has not been stored"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::EntityNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Entity"),
            message: format!("no entity with id {id}"),
        },
        PersistenceError::EventNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Audit event"),
            message: format!("no audit event with id {id}"),
        },
        PersistenceError::NotFound(msg) => ApiError::NotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        PersistenceError::DuplicateCode { .. } => ApiError::validation("code", err.to_string()),
        PersistenceError::ConcurrentModification {
            entity_id,
            expected_version,
        } => ApiError::ConcurrentModification {
            entity_id,
            expected_version,
        },
        PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::ReconstructionError(_)
        | PersistenceError::SerializationError(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled => ApiError::StorageFailure {
            message: err.to_string(),
        },
    }
}
