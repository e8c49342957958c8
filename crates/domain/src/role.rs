// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Roles and application modules.
//!
//! Both sets are closed. Anything the identity provider sends that does not
//! parse into one of these variants is treated as absent, never as a grant.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A role held by a user.
///
/// A user may hold several roles at once. Authorization always considers
/// every held role; the first one is only used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// System administrator with structural authority.
    Admin,
    /// Planning technician who authors objectives and projects.
    Planner,
    /// Institutional reviewer who decides on projects.
    Reviewer,
    /// Validating authority who decides on objectives.
    Validator,
    /// Read-only auditor with full access to the audit module.
    Auditor,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::Planner,
        Self::Reviewer,
        Self::Validator,
        Self::Auditor,
    ];

    /// Returns the canonical string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Planner => "PLANNER",
            Self::Reviewer => "REVIEWER",
            Self::Validator => "VALIDATOR",
            Self::Auditor => "AUDITOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "PLANNER" => Ok(Self::Planner),
            "REVIEWER" => Ok(Self::Reviewer),
            "VALIDATOR" => Ok(Self::Validator),
            "AUDITOR" => Ok(Self::Auditor),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

/// A functional area of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Institutional configuration.
    Configuration,
    /// Strategic objectives.
    Objectives,
    /// Investment projects.
    Projects,
    /// Reporting and exports.
    Reports,
    /// User administration.
    Users,
    /// System audit.
    Audit,
}

impl Module {
    /// Every module, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Configuration,
        Self::Objectives,
        Self::Projects,
        Self::Reports,
        Self::Users,
        Self::Audit,
    ];

    /// Returns the canonical string representation of the module.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Objectives => "objectives",
            Self::Projects => "projects",
            Self::Reports => "reports",
            Self::Users => "users",
            Self::Audit => "audit",
        }
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Module {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "configuration" => Ok(Self::Configuration),
            "objectives" => Ok(Self::Objectives),
            "projects" => Ok(Self::Projects),
            "reports" => Ok(Self::Reports),
            "users" => Ok(Self::Users),
            "audit" => Ok(Self::Audit),
            _ => Err(DomainError::InvalidModule(s.to_string())),
        }
    }
}
