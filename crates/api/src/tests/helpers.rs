// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use inst_plan_audit::Cause;
use inst_plan_domain::Role;
use inst_plan_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AuthenticatedActor, CommandResponse, CreateEntityRequest, TransitionRequest, WorkflowAction,
    create_entity, execute_command,
};

pub fn actor(id: &str, roles: &[Role]) -> AuthenticatedActor {
    AuthenticatedActor::new(String::from(id), roles.to_vec())
}

pub fn create_test_planner() -> AuthenticatedActor {
    actor("planner-1", &[Role::Planner])
}

pub fn create_test_validator() -> AuthenticatedActor {
    actor("validator-1", &[Role::Validator])
}

pub fn create_test_reviewer() -> AuthenticatedActor {
    actor("reviewer-1", &[Role::Reviewer])
}

pub fn create_test_admin() -> AuthenticatedActor {
    actor("admin-1", &[Role::Admin])
}

pub fn create_test_auditor() -> AuthenticatedActor {
    actor("auditor-1", &[Role::Auditor])
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-05-04 10:30 UTC)
}

pub fn create_request(kind: &str, code: &str, budget: Option<i64>) -> CreateEntityRequest {
    CreateEntityRequest {
        kind: String::from(kind),
        code: String::from(code),
        name: format!("Entity {code}"),
        institution: String::from("Ministry of Planning"),
        budget_assigned: budget,
        cause_description: None,
    }
}

/// Creates an entity as the test planner and returns its id.
pub fn create_as_planner(
    persistence: &mut Persistence,
    kind: &str,
    code: &str,
    budget: Option<i64>,
) -> i64 {
    create_entity(
        persistence,
        &create_request(kind, code, budget),
        &create_test_planner(),
        create_test_cause(),
        test_now(),
    )
    .unwrap()
    .entity
    .entity_id
}

/// Runs a workflow action through the one-call path.
pub fn run(
    persistence: &mut Persistence,
    entity_id: i64,
    action: WorkflowAction,
    justification: Option<&str>,
    actor: &AuthenticatedActor,
) -> Result<CommandResponse, crate::ApiError> {
    let request: TransitionRequest = TransitionRequest {
        justification: justification.map(String::from),
        ..TransitionRequest::default()
    };
    execute_command(
        persistence,
        entity_id,
        action.to_command(&request),
        request.expected_version,
        actor,
        create_test_cause(),
        test_now(),
    )
}
