// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability resolution for multi-role actors.
//!
//! Capabilities are advisory for UI gating. The core `apply` enforces the
//! workflow rules independently.

use std::collections::BTreeMap;

use inst_plan_domain::{CapabilitySet, Module, capabilities_for};

use crate::auth::AuthenticatedActor;

/// Unions the registry entries of every held role for one module.
///
/// An actor without roles resolves to [`CapabilitySet::NONE`].
#[must_use]
pub fn resolve(actor: &AuthenticatedActor, module: Module) -> CapabilitySet {
    actor
        .roles
        .iter()
        .fold(CapabilitySet::NONE, |acc, role| {
            acc.union(capabilities_for(*role, module))
        })
}

/// Resolves one module given by name. Unknown names resolve to nothing.
#[must_use]
pub fn resolve_named(actor: &AuthenticatedActor, module: &str) -> CapabilitySet {
    module
        .parse::<Module>()
        .map_or(CapabilitySet::NONE, |module| resolve(actor, module))
}

/// Resolves every module.
#[must_use]
pub fn resolve_all(actor: &AuthenticatedActor) -> BTreeMap<Module, CapabilitySet> {
    Module::ALL
        .into_iter()
        .map(|module| (module, resolve(actor, module)))
        .collect()
}
