// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the institutional planning system.
//!
//! Translates requests into core commands, enforces module-level access,
//! and maps every lower-layer failure onto [`ApiError`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService};
pub use capabilities::{resolve, resolve_all, resolve_named};
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    WorkflowAction, audit_timeline, build_cause, commit_creation, commit_transition,
    compliance_report, create_entity, execute_command, get_capabilities, get_entity,
    get_module_capabilities, list_decisions, list_entities, load_entity, prepare_command,
    prepare_create, record_execution_command, update_details_command,
};
pub use request_response::{
    ApiEnvelope, AuditTimelineQuery, AuditTimelineResponse, CapabilitiesResponse,
    CommandResponse, ComplianceQuery, ComplianceReportResponse, CreateEntityRequest, EntityInfo,
    ListDecisionsResponse, ListEntitiesQuery, ListEntitiesResponse, ModuleCapabilitiesResponse,
    RecordExecutionRequest, TransitionRequest, UpdateDetailsRequest,
};
