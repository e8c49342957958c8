// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod extract;
mod identity;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use inst_plan::{Command, CreationResult, TransitionResult};
use inst_plan_api::{
    ApiEnvelope, ApiError, AuditTimelineQuery, AuditTimelineResponse, CapabilitiesResponse,
    CommandResponse, ComplianceQuery, ComplianceReportResponse, CreateEntityRequest, EntityInfo,
    ListDecisionsResponse, ListEntitiesQuery, ListEntitiesResponse, ModuleCapabilitiesResponse,
    RecordExecutionRequest, TransitionRequest, UpdateDetailsRequest, WorkflowAction,
    audit_timeline, build_cause, commit_creation, commit_transition, compliance_report,
    get_capabilities, get_entity, get_module_capabilities, list_decisions, list_entities,
    load_entity, prepare_command, prepare_create, record_execution_command,
    update_details_command,
};
use inst_plan_audit::Cause;
use inst_plan_domain::WorkflowEntity;
use inst_plan_persistence::Persistence;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use extract::{EntityId, JsonBody, OptionalJsonBody, QueryParams};
use identity::Identity;

/// HTTP server for the institutional planning workflow engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses an in-memory database.
    #[arg(short, long, env = "INST_PLAN_DATABASE")]
    database: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(short, long, env = "INST_PLAN_PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, env = "INST_PLAN_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    bind: IpAddr,
}

/// Application state shared across handlers.
///
/// Handlers release the lock between loading an entity and storing the
/// command's result. The store's version check decides races.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ApiEnvelope<()>> = Json(ApiEnvelope::error(self.message));
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidTransition { .. } | ApiError::ConcurrentModification { .. } => {
                StatusCode::CONFLICT
            }
            ApiError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::StorageFailure { .. } => {
                error!(error = %err, "Storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

type ApiJson<T> = Json<ApiEnvelope<T>>;

// ============================================================================
// Capabilities
// ============================================================================

/// Handler for GET `/capabilities`.
async fn handle_get_capabilities(identity: Identity) -> ApiJson<CapabilitiesResponse> {
    Json(ApiEnvelope::ok(get_capabilities(&identity.actor)))
}

/// Handler for GET `/capabilities/{module}`.
async fn handle_get_module_capabilities(
    identity: Identity,
    Path(module): Path<String>,
) -> ApiJson<ModuleCapabilitiesResponse> {
    Json(ApiEnvelope::ok(get_module_capabilities(
        &identity.actor,
        &module,
    )))
}

// ============================================================================
// Entities
// ============================================================================

/// Handler for POST `/entities`.
///
/// The command is evaluated before the store is locked.
async fn handle_create_entity(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    JsonBody(req): JsonBody<CreateEntityRequest>,
) -> Result<(StatusCode, ApiJson<CommandResponse>), HttpError> {
    info!(
        actor_id = %identity.actor.id,
        kind = %req.kind,
        code = %req.code,
        "Handling create_entity request"
    );

    let cause: Cause = build_cause(
        &identity.request_id,
        "Create",
        req.cause_description.as_deref(),
    );
    let result: CreationResult =
        prepare_create(&req, &identity.actor, cause, OffsetDateTime::now_utc())?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CommandResponse = commit_creation(&mut persistence, &result)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(response))))
}

/// Handler for GET `/entities`.
async fn handle_list_entities(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    QueryParams(query): QueryParams<ListEntitiesQuery>,
) -> Result<ApiJson<ListEntitiesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListEntitiesResponse = list_entities(&mut persistence, &identity.actor, &query)?;
    drop(persistence);

    Ok(Json(ApiEnvelope::ok(response)))
}

/// Handler for GET `/entities/{id}`.
async fn handle_get_entity(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    EntityId(entity_id): EntityId,
) -> Result<ApiJson<EntityInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let entity: EntityInfo = get_entity(&mut persistence, &identity.actor, entity_id)?;
    drop(persistence);

    Ok(Json(ApiEnvelope::ok(entity)))
}

/// Handler for GET `/entities/{id}/decisions`.
async fn handle_list_decisions(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    EntityId(entity_id): EntityId,
) -> Result<ApiJson<ListDecisionsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListDecisionsResponse =
        list_decisions(&mut persistence, &identity.actor, entity_id)?;
    drop(persistence);

    Ok(Json(ApiEnvelope::ok(response)))
}

/// Loads the entity, evaluates the command unlocked, then stores the
/// result.
async fn run_command(
    app_state: &AppState,
    identity: &Identity,
    entity_id: i64,
    action: &str,
    command: Command,
    expected_version: Option<i64>,
    cause_description: Option<&str>,
) -> Result<ApiJson<CommandResponse>, HttpError> {
    info!(
        actor_id = %identity.actor.id,
        entity_id = entity_id,
        action = action,
        "Handling command request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let entity: WorkflowEntity = load_entity(&mut persistence, entity_id)?;
    drop(persistence);

    let cause: Cause = build_cause(&identity.request_id, action, cause_description);
    let result: TransitionResult = prepare_command(
        &entity,
        command,
        expected_version,
        &identity.actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CommandResponse = commit_transition(&mut persistence, &result)?;
    drop(persistence);

    Ok(Json(ApiEnvelope::ok(response)))
}

async fn handle_workflow(
    app_state: &AppState,
    identity: &Identity,
    entity_id: i64,
    action: WorkflowAction,
    req: &TransitionRequest,
) -> Result<ApiJson<CommandResponse>, HttpError> {
    run_command(
        app_state,
        identity,
        entity_id,
        action.name(),
        action.to_command(req),
        req.expected_version,
        req.cause_description.as_deref(),
    )
    .await
}

/// Handler for POST `/entities/{id}/submit`.
async fn handle_submit(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    EntityId(entity_id): EntityId,
    OptionalJsonBody(req): OptionalJsonBody<TransitionRequest>,
) -> Result<ApiJson<CommandResponse>, HttpError> {
    handle_workflow(&app_state, &identity, entity_id, WorkflowAction::Submit, &req).await
}

/// Handler for POST `/entities/{id}/approve`.
async fn handle_approve(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    EntityId(entity_id): EntityId,
    OptionalJsonBody(req): OptionalJsonBody<TransitionRequest>,
) -> Result<ApiJson<CommandResponse>, HttpError> {
    handle_workflow(&app_state, &identity, entity_id, WorkflowAction::Approve, &req).await
}

/// Handler for POST `/entities/{id}/reject`.
async fn handle_reject(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    EntityId(entity_id): EntityId,
    OptionalJsonBody(req): OptionalJsonBody<TransitionRequest>,
) -> Result<ApiJson<CommandResponse>, HttpError> {
    handle_workflow(&app_state, &identity, entity_id, WorkflowAction::Reject, &req).await
}

/// Handler for POST `/entities/{id}/resubmit`.
async fn handle_resubmit(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    EntityId(entity_id): EntityId,
    OptionalJsonBody(req): OptionalJsonBody<TransitionRequest>,
) -> Result<ApiJson<CommandResponse>, HttpError> {
    handle_workflow(&app_state, &identity, entity_id, WorkflowAction::Resubmit, &req).await
}

/// Handler for PATCH `/entities/{id}`.
async fn handle_update_details(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    EntityId(entity_id): EntityId,
    JsonBody(req): JsonBody<UpdateDetailsRequest>,
) -> Result<ApiJson<CommandResponse>, HttpError> {
    run_command(
        &app_state,
        &identity,
        entity_id,
        "UpdateDetails",
        update_details_command(&req),
        req.expected_version,
        req.cause_description.as_deref(),
    )
    .await
}

/// Handler for POST `/entities/{id}/execution`.
async fn handle_record_execution(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    EntityId(entity_id): EntityId,
    JsonBody(req): JsonBody<RecordExecutionRequest>,
) -> Result<ApiJson<CommandResponse>, HttpError> {
    run_command(
        &app_state,
        &identity,
        entity_id,
        "RecordExecution",
        record_execution_command(&req),
        req.expected_version,
        req.cause_description.as_deref(),
    )
    .await
}

// ============================================================================
// Reports and audit
// ============================================================================

/// Handler for GET `/reports/compliance`.
async fn handle_compliance_report(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    QueryParams(query): QueryParams<ComplianceQuery>,
) -> Result<ApiJson<ComplianceReportResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ComplianceReportResponse = compliance_report(
        &mut persistence,
        &identity.actor,
        &query,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(ApiEnvelope::ok(response)))
}

/// Handler for GET `/audit/timeline`.
async fn handle_audit_timeline(
    AxumState(app_state): AxumState<AppState>,
    identity: Identity,
    QueryParams(query): QueryParams<AuditTimelineQuery>,
) -> Result<ApiJson<AuditTimelineResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditTimelineResponse = audit_timeline(&mut persistence, &identity.actor, query)?;
    drop(persistence);

    Ok(Json(ApiEnvelope::ok(response)))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/capabilities", get(handle_get_capabilities))
        .route(
            "/capabilities/{module}",
            get(handle_get_module_capabilities),
        )
        .route(
            "/entities",
            post(handle_create_entity).get(handle_list_entities),
        )
        .route(
            "/entities/{id}",
            get(handle_get_entity).patch(handle_update_details),
        )
        .route("/entities/{id}/submit", post(handle_submit))
        .route("/entities/{id}/approve", post(handle_approve))
        .route("/entities/{id}/reject", post(handle_reject))
        .route("/entities/{id}/resubmit", post(handle_resubmit))
        .route("/entities/{id}/execution", post(handle_record_execution))
        .route("/entities/{id}/decisions", get(handle_list_decisions))
        .route("/reports/compliance", get(handle_compliance_report))
        .route("/audit/timeline", get(handle_audit_timeline))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing institutional planning server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!(path = %db_path.display(), "Using file-based database");
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };
    let app: Router = build_router(app_state);

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
