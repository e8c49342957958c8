// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use inst_plan_domain::EntityKind;

/// A command represents user intent as data only.
///
/// Commands are the only way to request a change to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new draft objective or project.
    Create {
        /// Objective or project.
        kind: EntityKind,
        /// Code, unique per kind.
        code: String,
        /// Display name.
        name: String,
        /// Owning institution.
        institution: String,
        /// Assigned budget, projects only.
        budget_assigned: Option<i64>,
    },
    /// Send a draft to validation (objectives) or review (projects).
    Submit,
    /// Validate an objective or approve a project.
    Approve {
        /// Optional reasoning recorded with the decision.
        justification: Option<String>,
    },
    /// Reject a submitted entity.
    Reject {
        /// Mandatory reasoning recorded with the decision.
        justification: Option<String>,
    },
    /// Return a rejected entity to draft.
    Resubmit,
    /// Edit a draft's details.
    UpdateDetails {
        /// New display name.
        name: Option<String>,
        /// New assigned budget, projects only.
        budget_assigned: Option<i64>,
    },
    /// Record the executed amount of an approved project.
    RecordExecution {
        /// Executed amount in minor currency units.
        executed: i64,
    },
}

impl Command {
    /// Returns the command name used in audit actions.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "Create",
            Self::Submit => "Submit",
            Self::Approve { .. } => "Approve",
            Self::Reject { .. } => "Reject",
            Self::Resubmit => "Resubmit",
            Self::UpdateDetails { .. } => "UpdateDetails",
            Self::RecordExecution { .. } => "RecordExecution",
        }
    }
}
