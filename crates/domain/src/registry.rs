// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The Role Registry.
//!
//! A single static table mapping `(role, module)` to a capability set.
//! Every authorization decision in the workspace consults this table and
//! nothing else.

use crate::capability::{CapabilitySet, ExportLevel};
use crate::role::{Module, Role};

const NONE: CapabilitySet = CapabilitySet::NONE;

const VIEW: CapabilitySet = CapabilitySet {
    can_view: true,
    ..NONE
};

const VIEW_EDIT: CapabilitySet = CapabilitySet {
    can_view: true,
    can_edit: true,
    ..NONE
};

const MANAGE: CapabilitySet = CapabilitySet {
    can_view: true,
    can_edit: true,
    can_manage_users: true,
    ..NONE
};

const EXPORT_FULL: CapabilitySet = CapabilitySet {
    can_view: true,
    can_export: ExportLevel::Full,
    ..NONE
};

const EXPORT_LIMITED: CapabilitySet = CapabilitySet {
    can_view: true,
    can_export: ExportLevel::Limited,
    ..NONE
};

const AUDIT_FULL: CapabilitySet = CapabilitySet {
    can_view: true,
    can_export: ExportLevel::Full,
    can_audit_system: true,
    ..NONE
};

/// Returns the static capability set for one role over one module.
///
/// # Arguments
///
/// * `role` - The role being looked up
/// * `module` - The module being accessed
#[must_use]
pub const fn capabilities_for(role: Role, module: Module) -> CapabilitySet {
    match (module, role) {
        (Module::Configuration | Module::Users, Role::Admin) => MANAGE,
        (Module::Configuration, Role::Planner) => VIEW,

        (Module::Objectives | Module::Projects, Role::Admin) => VIEW_EDIT,
        (Module::Objectives, Role::Planner) => CapabilitySet {
            can_send_to_validation: true,
            ..VIEW_EDIT
        },
        (Module::Objectives, Role::Validator) | (Module::Projects, Role::Reviewer) => {
            CapabilitySet {
                can_approve: true,
                ..VIEW
            }
        }
        (Module::Objectives | Module::Projects, Role::Auditor) => VIEW,

        (Module::Projects, Role::Planner) => CapabilitySet {
            can_send_to_review: true,
            ..VIEW_EDIT
        },

        (Module::Reports, Role::Admin | Role::Planner | Role::Auditor) => EXPORT_FULL,
        (Module::Reports, Role::Reviewer | Role::Validator) => EXPORT_LIMITED,

        (Module::Audit, Role::Auditor) => AUDIT_FULL,

        _ => NONE,
    }
}

/// Looks up capabilities from raw role and module names.
///
/// Unknown names resolve to the all-false set rather than an error.
#[must_use]
pub fn capabilities_for_names(role: &str, module: &str) -> CapabilitySet {
    match (role.parse::<Role>(), module.parse::<Module>()) {
        (Ok(role), Ok(module)) => capabilities_for(role, module),
        _ => NONE,
    }
}
