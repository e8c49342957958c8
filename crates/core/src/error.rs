// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use inst_plan_domain::DomainError;

/// Errors that can occur while applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// None of the actor's roles may perform the action.
    Unauthorized {
        /// The command that was refused.
        action: String,
        /// Why it was refused.
        reason: String,
    },
    /// The command cannot be applied through this entry point.
    UnsupportedCommand(&'static str),
    /// The entity has no store-assigned identifier.
    EntityNotStored,
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Unauthorized { action, reason } => {
                write!(f, "Unauthorized to {action}: {reason}")
            }
            Self::UnsupportedCommand(name) => {
                write!(f, "Command {name} is not supported here")
            }
            Self::EntityNotStored => write!(f, "Entity has not been stored yet"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
