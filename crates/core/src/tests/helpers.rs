// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use inst_plan_audit::{Actor, Cause};
use inst_plan_domain::{Budget, EntityKind, Role, WorkflowEntity, WorkflowState};
use time::OffsetDateTime;
use time::macros::datetime;

pub const OWNER: &str = "planner-1";

pub fn create_test_actor(id: &str, roles: &[Role]) -> Actor {
    Actor::new(String::from(id), roles.to_vec())
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Test request"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-05-04 10:30 UTC)
}

/// A stored entity owned by [`OWNER`] in the given state.
pub fn create_test_entity(kind: EntityKind, state: WorkflowState) -> WorkflowEntity {
    let budget: Option<Budget> = match kind {
        EntityKind::Objective => None,
        EntityKind::Project => Some(Budget::assigned(10_000).unwrap()),
    };
    let mut entity: WorkflowEntity = WorkflowEntity::new_draft(
        kind,
        String::from(match kind {
            EntityKind::Objective => "OBJ-001",
            EntityKind::Project => "PRJ-002",
        }),
        String::from("Test entity"),
        String::from("Ministry of Planning"),
        String::from(OWNER),
        budget,
        datetime!(2026-05-01 08:00 UTC),
    );
    entity.entity_id = Some(1);
    entity.state = state;
    entity
}
