// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;
mod transition_tests;

use inst_plan::{Command, CreationResult, apply_create};
use inst_plan_audit::{Actor, Cause};
use inst_plan_domain::{EntityKind, Role, WorkflowEntity};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::Persistence;

pub const OWNER: &str = "planner-1";

pub fn create_test_actor(id: &str, roles: &[Role]) -> Actor {
    Actor::new(String::from(id), roles.to_vec())
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-05-04 10:30 UTC)
}

/// Creates and stores a draft owned by [`OWNER`].
pub fn store_draft(
    persistence: &mut Persistence,
    kind: EntityKind,
    code: &str,
    institution: &str,
) -> WorkflowEntity {
    let budget_assigned: Option<i64> = match kind {
        EntityKind::Objective => None,
        EntityKind::Project => Some(10_000),
    };
    let result: CreationResult = apply_create(
        Command::Create {
            kind,
            code: String::from(code),
            name: format!("Entity {code}"),
            institution: String::from(institution),
            budget_assigned,
        },
        create_test_actor(OWNER, &[Role::Planner]),
        create_test_cause(),
        test_now(),
    )
    .expect("creation should be accepted");

    persistence
        .persist_creation(&result)
        .expect("creation should persist")
        .0
}
