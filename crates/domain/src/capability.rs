// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// How much of a module's data may be exported.
///
/// Variants are ordered so that a union of two levels is their maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExportLevel {
    /// No export allowed.
    #[default]
    None,
    /// Aggregated figures only.
    Limited,
    /// Aggregated figures and per-entity detail.
    Full,
}

impl ExportLevel {
    const fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Limited => 1,
            Self::Full => 2,
        }
    }

    /// Returns the more permissive of two levels.
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    /// Returns true if any export is allowed.
    #[must_use]
    pub const fn allows_export(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// The capabilities one role set has over one module.
///
/// Capabilities are derived purely from roles and module; nothing here
/// depends on an individual record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct CapabilitySet {
    /// May read the module.
    pub can_view: bool,
    /// May create and edit records in the module.
    pub can_edit: bool,
    /// May approve or reject records in the module.
    pub can_approve: bool,
    /// Export level for the module.
    pub can_export: ExportLevel,
    /// May send objectives to validation.
    pub can_send_to_validation: bool,
    /// May send projects to review.
    pub can_send_to_review: bool,
    /// May manage user accounts.
    pub can_manage_users: bool,
    /// May inspect the system audit trail.
    pub can_audit_system: bool,
}

impl CapabilitySet {
    /// The all-false capability set.
    pub const NONE: Self = Self {
        can_view: false,
        can_edit: false,
        can_approve: false,
        can_export: ExportLevel::None,
        can_send_to_validation: false,
        can_send_to_review: false,
        can_manage_users: false,
        can_audit_system: false,
    };

    /// Combines two capability sets with logical OR on every flag.
    ///
    /// Union never removes a capability held by either side.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            can_view: self.can_view || other.can_view,
            can_edit: self.can_edit || other.can_edit,
            can_approve: self.can_approve || other.can_approve,
            can_export: self.can_export.max(other.can_export),
            can_send_to_validation: self.can_send_to_validation || other.can_send_to_validation,
            can_send_to_review: self.can_send_to_review || other.can_send_to_review,
            can_manage_users: self.can_manage_users || other.can_manage_users,
            can_audit_system: self.can_audit_system || other.can_audit_system,
        }
    }

    /// Returns true if every capability in `other` is also held here.
    #[must_use]
    pub const fn is_superset_of(&self, other: &Self) -> bool {
        (self.can_view || !other.can_view)
            && (self.can_edit || !other.can_edit)
            && (self.can_approve || !other.can_approve)
            && self.can_export.rank() >= other.can_export.rank()
            && (self.can_send_to_validation || !other.can_send_to_validation)
            && (self.can_send_to_review || !other.can_send_to_review)
            && (self.can_manage_users || !other.can_manage_users)
            && (self.can_audit_system || !other.can_audit_system)
    }

    /// Returns true if no capability is granted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.can_view
            && !self.can_edit
            && !self.can_approve
            && !self.can_export.allows_export()
            && !self.can_send_to_validation
            && !self.can_send_to_review
            && !self.can_manage_users
            && !self.can_audit_system
    }
}
