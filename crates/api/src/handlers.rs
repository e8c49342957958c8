// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions.
//!
//! State-changing operations come in two halves so a caller holding the
//! store behind a lock can release it while the command is evaluated:
//!
//! - `prepare_*` is pure. It authorizes and evaluates the command against
//!   an entity the caller already loaded.
//! - `commit_*` writes the result. The store's version check rejects the
//!   write if the entity changed in between.
//!
//! `create_entity` and `execute_command` run both halves in one call.

use inst_plan::{Command, CreationResult, TransitionResult, apply, apply_create};
use inst_plan_audit::{AuditEvent, Cause, ComplianceReport, ComplianceScope, DecisionRecord};
use inst_plan_domain::{
    EntityKind, ExportLevel, JustificationPolicy, WorkflowEntity, WorkflowState,
    validate_justification,
};
use inst_plan_persistence::{
    EntityFilter, PersistCreationResult, PersistTransitionResult, Persistence,
};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::capabilities::{resolve_all, resolve_named};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AuditTimelineQuery, AuditTimelineResponse, CapabilitiesResponse, CommandResponse,
    ComplianceQuery, ComplianceReportResponse, CreateEntityRequest, EntityInfo,
    ListDecisionsResponse, ListEntitiesQuery, ListEntitiesResponse, ModuleCapabilitiesResponse,
    RecordExecutionRequest, TransitionRequest, UpdateDetailsRequest,
};

/// The four workflow commands reachable through the transition endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Submit,
    Approve,
    Reject,
    Resubmit,
}

impl WorkflowAction {
    /// The command name used in causes and log lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Submit => "Submit",
            Self::Approve => "Approve",
            Self::Reject => "Reject",
            Self::Resubmit => "Resubmit",
        }
    }

    /// Builds the core command for this action.
    #[must_use]
    pub fn to_command(self, request: &TransitionRequest) -> Command {
        match self {
            Self::Submit => Command::Submit,
            Self::Approve => Command::Approve {
                justification: request.justification.clone(),
            },
            Self::Reject => Command::Reject {
                justification: request.justification.clone(),
            },
            Self::Resubmit => Command::Resubmit,
        }
    }
}

/// Builds the core command for a details update.
#[must_use]
pub fn update_details_command(request: &UpdateDetailsRequest) -> Command {
    Command::UpdateDetails {
        name: request.name.clone(),
        budget_assigned: request.budget_assigned,
    }
}

/// Builds the core command for recording execution.
#[must_use]
pub const fn record_execution_command(request: &RecordExecutionRequest) -> Command {
    Command::RecordExecution {
        executed: request.executed,
    }
}

/// Builds the cause recorded with a command.
#[must_use]
pub fn build_cause(request_id: &str, action: &str, description: Option<&str>) -> Cause {
    let description: String = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map_or_else(|| format!("{action} via API"), String::from);
    Cause::new(String::from(request_id), description)
}

fn parse_kind(value: &str) -> Result<EntityKind, ApiError> {
    value.parse::<EntityKind>().map_err(translate_domain_error)
}

fn parse_state(value: &str) -> Result<WorkflowState, ApiError> {
    value.parse::<WorkflowState>().map_err(translate_domain_error)
}

// ============================================================================
// Commands
// ============================================================================

/// Evaluates a creation request.
///
/// # Errors
///
/// Returns an error if the kind is unknown, no held role may edit the
/// kind's module, or a field fails validation.
pub fn prepare_create(
    request: &CreateEntityRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CreationResult, ApiError> {
    let kind: EntityKind = parse_kind(&request.kind)?;
    let command: Command = Command::Create {
        kind,
        code: request.code.clone(),
        name: request.name.clone(),
        institution: request.institution.clone(),
        budget_assigned: request.budget_assigned,
    };
    apply_create(command, actor.to_audit_actor(), cause, now).map_err(translate_core_error)
}

/// Stores an evaluated creation.
///
/// # Errors
///
/// Returns `ValidationError` if the code is already used for the kind, or
/// `StorageFailure`.
pub fn commit_creation(
    persistence: &mut Persistence,
    result: &CreationResult,
) -> Result<CommandResponse, ApiError> {
    let (entity, ids): (WorkflowEntity, PersistCreationResult) = persistence
        .persist_creation(result)
        .map_err(translate_persistence_error)?;

    info!(
        entity_id = ids.entity_id,
        kind = %entity.kind,
        code = %entity.code,
        owner = %entity.owner_id,
        "Created entity"
    );

    Ok(CommandResponse {
        message: format!("Created {} '{}'", entity.kind, entity.code),
        entity: EntityInfo::from_entity(&entity),
        event_id: ids.event_id,
        decision_record_id: None,
    })
}

/// Creates an objective or project owned by the actor.
///
/// # Errors
///
/// See [`prepare_create`] and [`commit_creation`].
pub fn create_entity(
    persistence: &mut Persistence,
    request: &CreateEntityRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CommandResponse, ApiError> {
    let result: CreationResult = prepare_create(request, actor, cause, now)?;
    commit_creation(persistence, &result)
}

/// Loads an entity for a command. No view check: the command's own
/// authorization decides.
///
/// # Errors
///
/// Returns `NotFound` if the entity does not exist.
pub fn load_entity(
    persistence: &mut Persistence,
    entity_id: i64,
) -> Result<WorkflowEntity, ApiError> {
    persistence
        .get_entity(entity_id)
        .map_err(translate_persistence_error)
}

/// Evaluates a command against an entity the caller loaded.
///
/// A rejection without a non-blank justification is refused before
/// anything else is looked at. A supplied `expected_version` that differs
/// from the loaded entity is reported as a concurrent modification.
///
/// # Errors
///
/// Returns `ValidationError`, `ConcurrentModification`,
/// `InvalidTransition` or `Unauthorized`.
pub fn prepare_command(
    entity: &WorkflowEntity,
    command: Command,
    expected_version: Option<i64>,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, ApiError> {
    if let Command::Reject { justification } = &command {
        validate_justification(justification.as_deref(), JustificationPolicy::Required)
            .map_err(translate_domain_error)?;
    }

    if let Some(expected) = expected_version
        && expected != entity.version
    {
        return Err(ApiError::ConcurrentModification {
            entity_id: entity.entity_id.unwrap_or_default(),
            expected_version: expected,
        });
    }

    apply(entity, command, actor.to_audit_actor(), cause, now).map_err(|err| {
        warn!(
            actor = %actor.id,
            entity = %entity.code,
            error = %err,
            "Command refused"
        );
        translate_core_error(err)
    })
}

/// Stores an evaluated command.
///
/// # Errors
///
/// Returns `ConcurrentModification` if the stored version moved on, or
/// `StorageFailure`. Nothing is written on error.
pub fn commit_transition(
    persistence: &mut Persistence,
    result: &TransitionResult,
) -> Result<CommandResponse, ApiError> {
    let ids: PersistTransitionResult = persistence
        .persist_transition(result)
        .map_err(translate_persistence_error)?;

    let entity: &WorkflowEntity = &result.new_entity;
    info!(
        entity_id = ?entity.entity_id,
        action = %result.audit_event.action.name,
        state = %entity.state,
        version = entity.version,
        "Applied command"
    );

    Ok(CommandResponse {
        message: format!(
            "{} applied to {} '{}'; now {}",
            result.audit_event.action.name, entity.kind, entity.code, entity.state
        ),
        entity: EntityInfo::from_entity(entity),
        event_id: ids.event_id,
        decision_record_id: ids.decision_record_id,
    })
}

/// Loads, evaluates and stores a command in one call.
///
/// # Errors
///
/// See [`load_entity`], [`prepare_command`] and [`commit_transition`].
pub fn execute_command(
    persistence: &mut Persistence,
    entity_id: i64,
    command: Command,
    expected_version: Option<i64>,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CommandResponse, ApiError> {
    let entity: WorkflowEntity = load_entity(persistence, entity_id)?;
    let result: TransitionResult =
        prepare_command(&entity, command, expected_version, actor, cause, now)?;
    commit_transition(persistence, &result)
}

// ============================================================================
// Queries
// ============================================================================

/// Fetches one entity the actor may view.
///
/// # Errors
///
/// Returns `NotFound` or `Unauthorized`.
pub fn get_entity(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    entity_id: i64,
) -> Result<EntityInfo, ApiError> {
    let entity: WorkflowEntity = load_entity(persistence, entity_id)?;
    AuthorizationService::authorize_view_kind(actor, entity.kind)?;
    Ok(EntityInfo::from_entity(&entity))
}

/// Lists entities the actor may view.
///
/// With a `kind` the actor must be able to view that kind. Without one,
/// kinds the actor cannot view are left out; an actor who can view
/// neither is refused.
///
/// # Errors
///
/// Returns `ValidationError` for unknown filter values, `Unauthorized`, or
/// `StorageFailure`.
pub fn list_entities(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    query: &ListEntitiesQuery,
) -> Result<ListEntitiesResponse, ApiError> {
    let kind: Option<EntityKind> = query.kind.as_deref().map(parse_kind).transpose()?;
    let state: Option<WorkflowState> = query.state.as_deref().map(parse_state).transpose()?;

    let viewable: Vec<EntityKind> = match kind {
        Some(kind) => {
            AuthorizationService::authorize_view_kind(actor, kind)?;
            vec![kind]
        }
        None => {
            let kinds: Vec<EntityKind> = EntityKind::ALL
                .into_iter()
                .filter(|k| AuthorizationService::authorize_view_kind(actor, *k).is_ok())
                .collect();
            if kinds.is_empty() {
                return Err(ApiError::Unauthorized {
                    action: String::from("list entities"),
                    reason: String::from("no held role may view objectives or projects"),
                });
            }
            kinds
        }
    };

    let filter: EntityFilter = EntityFilter {
        kind,
        institution: query.institution.clone(),
        state,
        limit: None,
    };
    let entities: Vec<EntityInfo> = persistence
        .list_entities(&filter)
        .map_err(translate_persistence_error)?
        .iter()
        .filter(|e| viewable.contains(&e.kind))
        .map(EntityInfo::from_entity)
        .collect();

    Ok(ListEntitiesResponse { entities })
}

/// Lists the decision history of one entity.
///
/// # Errors
///
/// Returns `NotFound`, `Unauthorized`, or `StorageFailure`.
pub fn list_decisions(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    entity_id: i64,
) -> Result<ListDecisionsResponse, ApiError> {
    let entity: WorkflowEntity = load_entity(persistence, entity_id)?;
    AuthorizationService::authorize_view_kind(actor, entity.kind)?;

    let decisions: Vec<DecisionRecord> = persistence
        .list_decisions(entity_id)
        .map_err(translate_persistence_error)?;

    Ok(ListDecisionsResponse {
        entity_id,
        decisions,
    })
}

/// Computes a compliance report for the requested scope.
///
/// Actors with only limited export receive the report without per-project
/// budget lines.
///
/// # Errors
///
/// Returns `Unauthorized` without report export, `ValidationError` for an
/// unknown kind, or `StorageFailure`.
pub fn compliance_report(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    query: &ComplianceQuery,
    now: OffsetDateTime,
) -> Result<ComplianceReportResponse, ApiError> {
    let export_level: ExportLevel = AuthorizationService::authorize_report_export(actor)?;
    let scope: ComplianceScope = ComplianceScope {
        institution: query.institution.clone(),
        kind: query.kind.as_deref().map(parse_kind).transpose()?,
    };

    let entities: Vec<WorkflowEntity> = persistence
        .list_entities(&EntityFilter::default())
        .map_err(translate_persistence_error)?;
    let records: Vec<DecisionRecord> = persistence
        .list_all_decisions()
        .map_err(translate_persistence_error)?;

    let report: ComplianceReport = ComplianceReport::build(&entities, &records, &scope, now);
    let report: ComplianceReport = match export_level {
        ExportLevel::Full => report,
        ExportLevel::Limited | ExportLevel::None => report.without_budget_rows(),
    };

    Ok(ComplianceReportResponse {
        export_level,
        report,
    })
}

/// Returns audit events, for one entity or for the whole system.
///
/// # Errors
///
/// Returns `Unauthorized` without audit access, or `StorageFailure`.
pub fn audit_timeline(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    query: AuditTimelineQuery,
) -> Result<AuditTimelineResponse, ApiError> {
    AuthorizationService::authorize_audit(actor)?;

    let events: Vec<AuditEvent> = persistence
        .get_audit_timeline(query.entity_id)
        .map_err(translate_persistence_error)?;

    Ok(AuditTimelineResponse {
        entity_id: query.entity_id,
        events,
    })
}

/// Resolved capabilities for every module.
#[must_use]
pub fn get_capabilities(actor: &AuthenticatedActor) -> CapabilitiesResponse {
    CapabilitiesResponse {
        actor_id: actor.id.clone(),
        roles: actor.roles.clone(),
        modules: resolve_all(actor),
    }
}

/// Resolved capabilities for one module, by name.
#[must_use]
pub fn get_module_capabilities(
    actor: &AuthenticatedActor,
    module: &str,
) -> ModuleCapabilitiesResponse {
    ModuleCapabilitiesResponse {
        actor_id: actor.id.clone(),
        module: String::from(module),
        capabilities: resolve_named(actor, module),
    }
}
