// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use inst_plan::{Command, TransitionResult, apply};
use inst_plan_audit::{AuditEvent, DecisionRecord};
use inst_plan_domain::{Decision, EntityKind, Role, WorkflowEntity, WorkflowState};

use super::{OWNER, create_test_actor, create_test_cause, store_draft, test_now};
use crate::{Persistence, PersistenceError, PersistTransitionResult};

fn submit(entity: &WorkflowEntity) -> TransitionResult {
    apply(
        entity,
        Command::Submit,
        create_test_actor(OWNER, &[Role::Planner]),
        create_test_cause(),
        test_now(),
    )
    .unwrap()
}

#[test]
fn test_submit_updates_entity_and_appends_event() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let draft: WorkflowEntity = store_draft(
        &mut persistence,
        EntityKind::Objective,
        "OBJ-001",
        "Ministry of Planning",
    );

    let result: TransitionResult = submit(&draft);
    let ids: PersistTransitionResult = persistence.persist_transition(&result).unwrap();

    assert!(ids.decision_record_id.is_none());
    let stored: WorkflowEntity = persistence.get_entity(draft.entity_id.unwrap()).unwrap();
    assert_eq!(stored.state, WorkflowState::SentForValidation);
    assert_eq!(stored.version, 2);

    let event: AuditEvent = persistence.get_audit_event(ids.event_id).unwrap();
    assert_eq!(event.action.name, "Submit");
    assert_eq!(event.entity_id, draft.entity_id);
}

#[test]
fn test_rejection_stores_decision_with_justification() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let draft: WorkflowEntity = store_draft(
        &mut persistence,
        EntityKind::Project,
        "PRJ-002",
        "Ministry of Planning",
    );
    let submitted: TransitionResult = submit(&draft);
    persistence.persist_transition(&submitted).unwrap();

    let rejected: TransitionResult = apply(
        &submitted.new_entity,
        Command::Reject {
            justification: Some(String::from("Budget lines do not add up")),
        },
        create_test_actor("reviewer-1", &[Role::Reviewer]),
        create_test_cause(),
        test_now(),
    )
    .unwrap();
    let ids: PersistTransitionResult = persistence.persist_transition(&rejected).unwrap();
    assert!(ids.decision_record_id.is_some());

    let decisions: Vec<DecisionRecord> =
        persistence.list_decisions(draft.entity_id.unwrap()).unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].record_id, ids.decision_record_id);
    assert_eq!(decisions[0].decision, Decision::Rejected);
    assert_eq!(decisions[0].actor_role, Role::Reviewer);
    assert_eq!(
        decisions[0].justification.as_deref(),
        Some("Budget lines do not add up")
    );
    assert_eq!(decisions[0].from_state, WorkflowState::SentForReview);
    assert_eq!(decisions[0].to_state, WorkflowState::Rejected);
    assert_eq!(decisions[0].decided_at, test_now());
}

#[test]
fn test_stale_copy_loses_the_race() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let draft: WorkflowEntity = store_draft(
        &mut persistence,
        EntityKind::Objective,
        "OBJ-001",
        "Ministry of Planning",
    );
    let submitted: TransitionResult = submit(&draft);
    persistence.persist_transition(&submitted).unwrap();

    // Two validators act on the same read.
    let copy_a: WorkflowEntity = persistence.get_entity(draft.entity_id.unwrap()).unwrap();
    let copy_b: WorkflowEntity = copy_a.clone();

    let approve: TransitionResult = apply(
        &copy_a,
        Command::Approve {
            justification: None,
        },
        create_test_actor("validator-1", &[Role::Validator]),
        create_test_cause(),
        test_now(),
    )
    .unwrap();
    let reject: TransitionResult = apply(
        &copy_b,
        Command::Reject {
            justification: Some(String::from("Out of scope")),
        },
        create_test_actor("validator-2", &[Role::Validator]),
        create_test_cause(),
        test_now(),
    )
    .unwrap();

    persistence.persist_transition(&approve).unwrap();
    let loser = persistence.persist_transition(&reject);

    assert_eq!(
        loser.unwrap_err(),
        PersistenceError::ConcurrentModification {
            entity_id: draft.entity_id.unwrap(),
            expected_version: 2,
        }
    );

    let stored: WorkflowEntity = persistence.get_entity(draft.entity_id.unwrap()).unwrap();
    assert_eq!(stored.state, WorkflowState::Validated);
    assert_eq!(stored.version, 3);

    // Only the winner's decision was recorded.
    let decisions: Vec<DecisionRecord> =
        persistence.list_decisions(draft.entity_id.unwrap()).unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].decision, Decision::Approved);
    assert_eq!(persistence.get_audit_timeline(draft.entity_id).unwrap().len(), 3);
}

#[test]
fn test_failed_decision_insert_rolls_back_entity_update() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let draft: WorkflowEntity = store_draft(
        &mut persistence,
        EntityKind::Project,
        "PRJ-002",
        "Ministry of Planning",
    );
    let submitted: TransitionResult = submit(&draft);
    persistence.persist_transition(&submitted).unwrap();

    let mut approve: TransitionResult = apply(
        &submitted.new_entity,
        Command::Approve {
            justification: None,
        },
        create_test_actor("reviewer-1", &[Role::Reviewer]),
        create_test_cause(),
        test_now(),
    )
    .unwrap();
    // Point the decision at an entity that does not exist.
    if let Some(record) = approve.decision.as_mut() {
        record.entity_id = 999;
    }

    assert!(persistence.persist_transition(&approve).is_err());

    let stored: WorkflowEntity = persistence.get_entity(draft.entity_id.unwrap()).unwrap();
    assert_eq!(stored.state, WorkflowState::SentForReview);
    assert_eq!(stored.version, 2);
    assert!(persistence.list_all_decisions().unwrap().is_empty());
    assert_eq!(persistence.get_audit_timeline(draft.entity_id).unwrap().len(), 2);
}

#[test]
fn test_resubmission_keeps_decision_history() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let draft: WorkflowEntity = store_draft(
        &mut persistence,
        EntityKind::Objective,
        "OBJ-001",
        "Ministry of Planning",
    );
    let submitted: TransitionResult = submit(&draft);
    persistence.persist_transition(&submitted).unwrap();

    let rejected: TransitionResult = apply(
        &submitted.new_entity,
        Command::Reject {
            justification: Some(String::from("Missing indicators")),
        },
        create_test_actor("validator-1", &[Role::Validator]),
        create_test_cause(),
        test_now(),
    )
    .unwrap();
    persistence.persist_transition(&rejected).unwrap();

    let resubmitted: TransitionResult = apply(
        &rejected.new_entity,
        Command::Resubmit,
        create_test_actor(OWNER, &[Role::Planner]),
        create_test_cause(),
        test_now(),
    )
    .unwrap();
    persistence.persist_transition(&resubmitted).unwrap();

    let stored: WorkflowEntity = persistence.get_entity(draft.entity_id.unwrap()).unwrap();
    assert_eq!(stored.state, WorkflowState::Draft);
    assert_eq!(stored.version, 4);
    assert_eq!(
        persistence
            .list_decisions(draft.entity_id.unwrap())
            .unwrap()
            .len(),
        1
    );

    let actions: Vec<String> = persistence
        .get_audit_timeline(draft.entity_id)
        .unwrap()
        .into_iter()
        .map(|event| event.action.name)
        .collect();
    assert_eq!(actions, vec!["Create", "Submit", "Reject", "Resubmit"]);
}
