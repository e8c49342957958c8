// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity and module-level authorization.
//!
//! Identity is supplied by an external provider and trusted verbatim. Role
//! names the system does not know are dropped, so an unrecognized role can
//! never grant anything.

use inst_plan_audit::Actor;
use inst_plan_domain::{CapabilitySet, EntityKind, ExportLevel, Module, Role};
use tracing::debug;

use crate::capabilities::resolve;
use crate::error::ApiError;

/// An identified caller and the roles they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The identity provider's user id.
    pub id: String,
    /// Recognized roles, in the order supplied, without duplicates.
    pub roles: Vec<Role>,
}

impl AuthenticatedActor {
    /// Creates an actor from already-parsed roles.
    #[must_use]
    pub const fn new(id: String, roles: Vec<Role>) -> Self {
        Self { id, roles }
    }

    /// Builds an actor from the raw identity values.
    ///
    /// `roles` is a comma-separated list. Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` if the id is blank.
    pub fn from_identity(id: &str, roles: &str) -> Result<Self, ApiError> {
        let id: &str = id.trim();
        if id.is_empty() {
            return Err(ApiError::AuthenticationFailed {
                reason: String::from("no user id supplied"),
            });
        }

        let mut parsed: Vec<Role> = Vec::new();
        for name in roles.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name.parse::<Role>() {
                Ok(role) if !parsed.contains(&role) => parsed.push(role),
                Ok(_) => {}
                Err(_) => debug!(user_id = id, role = name, "Ignoring unknown role"),
            }
        }

        Ok(Self::new(String::from(id), parsed))
    }

    /// Converts this actor into the audit representation.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.roles.clone())
    }
}

/// Module-level checks made before any entity is touched.
///
/// Workflow permissions (who may approve what) are decided by the core
/// `apply`; these checks only gate reads and reports.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Requires view access to the module that holds `kind`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if no held role may view the module.
    pub fn authorize_view_kind(
        actor: &AuthenticatedActor,
        kind: EntityKind,
    ) -> Result<(), ApiError> {
        Self::authorize_view(actor, kind.module())
    }

    /// Requires view access to a module.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if no held role may view the module.
    pub fn authorize_view(actor: &AuthenticatedActor, module: Module) -> Result<(), ApiError> {
        if resolve(actor, module).can_view {
            Ok(())
        } else {
            Err(ApiError::Unauthorized {
                action: format!("view {module}"),
                reason: format!("roles [{}] may not view {module}", roles_label(actor)),
            })
        }
    }

    /// Requires some export level on the reports module and returns it.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if no held role may export reports.
    pub fn authorize_report_export(actor: &AuthenticatedActor) -> Result<ExportLevel, ApiError> {
        let caps: CapabilitySet = resolve(actor, Module::Reports);
        if caps.can_export.allows_export() {
            Ok(caps.can_export)
        } else {
            Err(ApiError::Unauthorized {
                action: String::from("export compliance report"),
                reason: format!("roles [{}] may not export reports", roles_label(actor)),
            })
        }
    }

    /// Requires access to the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` unless a held role may view the audit module.
    pub fn authorize_audit(actor: &AuthenticatedActor) -> Result<(), ApiError> {
        Self::authorize_view(actor, Module::Audit)
    }
}

fn roles_label(actor: &AuthenticatedActor) -> String {
    actor
        .roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<&str>>()
        .join(",")
}
