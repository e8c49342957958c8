// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{CreationResult, TransitionResult};
use inst_plan_audit::{Action, Actor, AuditEvent, Cause, DecisionRecord, StateSnapshot};
use inst_plan_domain::{
    Budget, DomainError, EntityKind, JustificationPolicy, Role, TransitionRule, WorkflowEntity,
    WorkflowState, capabilities_for, validate_budget_for_kind, validate_entity_code,
    validate_institution, validate_justification, validate_name, validate_transition,
};
use time::OffsetDateTime;

/// Applies a creation command, producing a new draft and its audit event.
///
/// The actor becomes the owner of the draft.
///
/// # Arguments
///
/// * `command` - Must be `Command::Create`
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The time the command is accepted
///
/// # Errors
///
/// Returns an error if:
/// - The command is not a creation
/// - No held role may edit the kind's module
/// - A field fails validation
/// - An objective is given a budget
pub fn apply_create(
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CreationResult, CoreError> {
    let (kind, code, name, institution, budget_assigned) = match command {
        Command::Create {
            kind,
            code,
            name,
            institution,
            budget_assigned,
        } => (kind, code, name, institution, budget_assigned),
        other => return Err(CoreError::UnsupportedCommand(other.name())),
    };

    if !actor
        .roles
        .iter()
        .any(|role| capabilities_for(*role, kind.module()).can_edit)
    {
        return Err(CoreError::Unauthorized {
            action: String::from("Create"),
            reason: format!("no held role may edit the {} module", kind.module()),
        });
    }

    let code: String = validate_entity_code(&code)?;
    let name: String = validate_name(&name)?;
    let institution: String = validate_institution(&institution)?;
    let budget: Option<Budget> = budget_assigned.map(Budget::assigned).transpose()?;
    validate_budget_for_kind(kind, budget.as_ref())?;

    let new_entity: WorkflowEntity =
        WorkflowEntity::new_draft(kind, code, name, institution, actor.id.clone(), budget, now);

    let action: Action = Action::new(
        String::from("Create"),
        Some(format!("Created {kind} '{}'", new_entity.code)),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::new(String::from("none")),
        StateSnapshot::new(new_entity.snapshot()),
        None,
        now,
    );

    Ok(CreationResult {
        new_entity,
        audit_event,
    })
}

/// Applies a command to an existing entity, producing the changed entity,
/// its audit event and, for decisions, a decision record.
///
/// Nothing is mutated; the caller persists the result.
///
/// # Arguments
///
/// * `entity` - The entity as currently stored
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The time the command is accepted
///
/// # Errors
///
/// Returns an error if:
/// - A rejection carries no justification (checked before anything else)
/// - The requested transition is not in the transition table
/// - No held role may trigger the transition
/// - A planner submits or resubmits an entity they do not own
/// - Details are edited outside `Draft`
pub fn apply(
    entity: &WorkflowEntity,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::Submit => transition(
            entity,
            entity.kind.submitted_state(),
            None,
            "Submit",
            actor,
            cause,
            now,
        ),
        Command::Approve { justification } => transition(
            entity,
            entity.kind.approved_state(),
            justification.as_deref(),
            "Approve",
            actor,
            cause,
            now,
        ),
        Command::Reject { justification } => {
            // A rejection without reasons never reaches the state machine.
            validate_justification(justification.as_deref(), JustificationPolicy::Required)?;
            transition(
                entity,
                WorkflowState::Rejected,
                justification.as_deref(),
                "Reject",
                actor,
                cause,
                now,
            )
        }
        Command::Resubmit => transition(
            entity,
            WorkflowState::Draft,
            None,
            "Resubmit",
            actor,
            cause,
            now,
        ),
        Command::UpdateDetails {
            name,
            budget_assigned,
        } => update_details(entity, name.as_deref(), budget_assigned, actor, cause, now),
        Command::RecordExecution { executed } => {
            record_execution(entity, executed, actor, cause, now)
        }
        Command::Create { .. } => Err(CoreError::UnsupportedCommand("Create")),
    }
}

/// Picks the first held role that satisfies the rule, honouring ownership.
fn authorizing_role(
    rule: &TransitionRule,
    entity: &WorkflowEntity,
    actor: &Actor,
) -> Result<Role, CoreError> {
    let owner: bool = entity.is_owned_by(&actor.id);
    let permitted: Vec<Role> = actor
        .roles
        .iter()
        .copied()
        .filter(|role| rule.permits(*role))
        .collect();

    if permitted.is_empty() {
        return Err(CoreError::Unauthorized {
            action: format!("move {} from {} to {}", entity.kind, rule.from, rule.to),
            reason: format!("roles [{}] are not permitted", actor.roles_label()),
        });
    }

    permitted
        .into_iter()
        .find(|role| !rule.requires_ownership() || *role != Role::Planner || owner)
        .ok_or_else(|| CoreError::Unauthorized {
            action: format!("move {} from {} to {}", entity.kind, rule.from, rule.to),
            reason: format!("'{}' does not own '{}'", actor.id, entity.code),
        })
}

/// Picks the first held role that may edit the entity's module.
///
/// Planners may only edit what they own.
fn editing_role(entity: &WorkflowEntity, actor: &Actor, action: &str) -> Result<Role, CoreError> {
    let owner: bool = entity.is_owned_by(&actor.id);
    actor
        .roles
        .iter()
        .copied()
        .filter(|role| capabilities_for(*role, entity.kind.module()).can_edit)
        .find(|role| *role != Role::Planner || owner)
        .ok_or_else(|| CoreError::Unauthorized {
            action: String::from(action),
            reason: format!(
                "'{}' with roles [{}] may not edit '{}'",
                actor.id,
                actor.roles_label(),
                entity.code
            ),
        })
}

fn transition(
    entity: &WorkflowEntity,
    to: WorkflowState,
    justification: Option<&str>,
    action_name: &str,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let rule: &TransitionRule = validate_transition(entity.kind, entity.state, to)?;
    let justification: Option<String> = validate_justification(justification, rule.justification)?;
    let role: Role = authorizing_role(rule, entity, &actor)?;

    let mut new_entity: WorkflowEntity = entity.clone();
    new_entity.state = to;
    new_entity.version += 1;
    new_entity.updated_at = now;

    let decision: Option<DecisionRecord> = match rule.decision {
        Some(decision) => Some(DecisionRecord {
            record_id: None,
            entity_kind: entity.kind,
            entity_id: entity.entity_id.ok_or(CoreError::EntityNotStored)?,
            entity_code: entity.code.clone(),
            decision,
            actor_id: actor.id.clone(),
            actor_role: role,
            justification: justification.clone(),
            from_state: rule.from,
            to_state: rule.to,
            decided_at: now,
        }),
        None => None,
    };

    let details: String = justification.map_or_else(
        || format!("{} -> {} as {role}", rule.from, rule.to),
        |text| format!("{} -> {} as {role}: {text}", rule.from, rule.to),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(String::from(action_name), Some(details)),
        StateSnapshot::new(entity.snapshot()),
        StateSnapshot::new(new_entity.snapshot()),
        entity.entity_id,
        now,
    );

    Ok(TransitionResult {
        new_entity,
        audit_event,
        decision,
    })
}

fn update_details(
    entity: &WorkflowEntity,
    name: Option<&str>,
    budget_assigned: Option<i64>,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if entity.state != WorkflowState::Draft {
        return Err(DomainError::EditNotPermitted {
            state: entity.state,
        }
        .into());
    }
    editing_role(entity, &actor, "UpdateDetails")?;
    if name.is_none() && budget_assigned.is_none() {
        return Err(DomainError::EmptyUpdate.into());
    }

    let mut new_entity: WorkflowEntity = entity.clone();
    if let Some(name) = name {
        new_entity.name = validate_name(name)?;
    }
    if let Some(assigned) = budget_assigned {
        let executed: i64 = entity.budget.map_or(0, |b| b.executed);
        let budget: Budget = Budget::new(assigned, executed)?;
        validate_budget_for_kind(entity.kind, Some(&budget))?;
        new_entity.budget = Some(budget);
    }
    new_entity.version += 1;
    new_entity.updated_at = now;

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("UpdateDetails"),
            Some(format!("Updated details of '{}'", entity.code)),
        ),
        StateSnapshot::new(entity.snapshot()),
        StateSnapshot::new(new_entity.snapshot()),
        entity.entity_id,
        now,
    );

    Ok(TransitionResult {
        new_entity,
        audit_event,
        decision: None,
    })
}

fn record_execution(
    entity: &WorkflowEntity,
    executed: i64,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if entity.kind != EntityKind::Project {
        return Err(DomainError::BudgetNotAllowed { kind: entity.kind }.into());
    }
    if entity.state != WorkflowState::Approved {
        return Err(DomainError::EditNotPermitted {
            state: entity.state,
        }
        .into());
    }
    editing_role(entity, &actor, "RecordExecution")?;

    let assigned: i64 = entity.budget.map_or(0, |b| b.assigned);
    let budget: Budget = Budget::new(assigned, executed)?;

    let mut new_entity: WorkflowEntity = entity.clone();
    new_entity.budget = Some(budget);
    new_entity.version += 1;
    new_entity.updated_at = now;

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("RecordExecution"),
            Some(format!("Executed {executed} of {assigned}")),
        ),
        StateSnapshot::new(entity.snapshot()),
        StateSnapshot::new(new_entity.snapshot()),
        entity.entity_id,
        now,
    );

    Ok(TransitionResult {
        new_entity,
        audit_event,
        decision: None,
    })
}
