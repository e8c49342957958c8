// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Enumerated inputs arrive as strings so that a bad value produces a
//! `ValidationError` in the normal envelope rather than a body rejection.

use std::collections::BTreeMap;

use inst_plan_audit::{AuditEvent, ComplianceReport, DecisionRecord, budget_variance};
use inst_plan_domain::{
    CapabilitySet, EntityKind, ExportLevel, Module, Role, WorkflowEntity, WorkflowState,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The JSON envelope every response uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// The payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// An error or informational message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// A successful envelope.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// A failed envelope carrying only a message.
    pub const fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Request to create an objective or project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntityRequest {
    /// `objective` or `project`.
    pub kind: String,
    pub code: String,
    pub name: String,
    pub institution: String,
    /// Assigned budget. Projects only.
    #[serde(default)]
    pub budget_assigned: Option<i64>,
    #[serde(default)]
    pub cause_description: Option<String>,
}

/// Body shared by submit, approve, reject and resubmit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// The version the caller last saw. Checked before anything else.
    #[serde(default)]
    pub expected_version: Option<i64>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub cause_description: Option<String>,
}

/// Request to change a draft's details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetailsRequest {
    #[serde(default)]
    pub expected_version: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub budget_assigned: Option<i64>,
    #[serde(default)]
    pub cause_description: Option<String>,
}

/// Request to record budget execution on an approved project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExecutionRequest {
    #[serde(default)]
    pub expected_version: Option<i64>,
    pub executed: i64,
    #[serde(default)]
    pub cause_description: Option<String>,
}

/// Query parameters for listing entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntitiesQuery {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Query parameters for the compliance report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceQuery {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Query parameters for the audit timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineQuery {
    #[serde(default)]
    pub entity_id: Option<i64>,
}

/// Entity information returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub entity_id: i64,
    pub kind: EntityKind,
    pub code: String,
    pub name: String,
    pub institution: String,
    pub owner_id: String,
    pub state: WorkflowState,
    pub version: i64,
    pub budget_assigned: Option<i64>,
    pub budget_executed: Option<i64>,
    /// Execution variance in percent, when a budget is assigned.
    pub variance_pct: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl EntityInfo {
    /// Builds the response view of a stored entity.
    ///
    /// Unstored entities report id 0.
    #[must_use]
    pub fn from_entity(entity: &WorkflowEntity) -> Self {
        Self {
            entity_id: entity.entity_id.unwrap_or_default(),
            kind: entity.kind,
            code: entity.code.clone(),
            name: entity.name.clone(),
            institution: entity.institution.clone(),
            owner_id: entity.owner_id.clone(),
            state: entity.state,
            version: entity.version,
            budget_assigned: entity.budget.map(|b| b.assigned),
            budget_executed: entity.budget.map(|b| b.executed),
            variance_pct: budget_variance(entity),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Response for any accepted command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The entity after the command.
    pub entity: EntityInfo,
    /// The audit event recorded for the command.
    pub event_id: i64,
    /// The decision record, for approvals and rejections.
    pub decision_record_id: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntitiesResponse {
    pub entities: Vec<EntityInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDecisionsResponse {
    pub entity_id: i64,
    pub decisions: Vec<DecisionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineResponse {
    pub entity_id: Option<i64>,
    pub events: Vec<AuditEvent>,
}

/// A compliance report and the export level it was produced under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReportResponse {
    pub export_level: ExportLevel,
    pub report: ComplianceReport,
}

/// Resolved capabilities for every module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    pub actor_id: String,
    pub roles: Vec<Role>,
    pub modules: BTreeMap<Module, CapabilitySet>,
}

/// Resolved capabilities for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCapabilitiesResponse {
    pub actor_id: String,
    pub module: String,
    pub capabilities: CapabilitySet,
}
