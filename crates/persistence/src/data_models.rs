// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversions to and from domain values.
//!
//! Enumerations are stored as their canonical strings and timestamps as
//! RFC 3339 text in UTC.

use diesel::prelude::*;
use inst_plan_audit::{Action, Actor, AuditEvent, Cause, DecisionRecord, StateSnapshot};
use inst_plan_domain::{Budget, Decision, EntityKind, Role, WorkflowEntity, WorkflowState};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{audit_events, decision_records, entities};
use crate::error::PersistenceError;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub roles: Vec<String>,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(value.to_offset(time::UtcOffset::UTC).format(&Rfc3339)?)
}

pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    Ok(OffsetDateTime::parse(value, &Rfc3339)?)
}

fn parse_column<T>(column: &str, value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| {
        PersistenceError::ReconstructionError(format!("column {column}: {e}"))
    })
}

/// Insertable row for a new entity.
#[derive(Insertable)]
#[diesel(table_name = entities)]
pub struct NewEntityRow<'a> {
    pub kind: &'a str,
    pub code: &'a str,
    pub name: &'a str,
    pub institution: &'a str,
    pub owner_id: &'a str,
    pub state: &'a str,
    pub version: i64,
    pub budget_assigned: Option<i64>,
    pub budget_executed: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl<'a> NewEntityRow<'a> {
    pub fn from_entity(entity: &'a WorkflowEntity) -> Result<Self, PersistenceError> {
        Ok(Self {
            kind: entity.kind.as_str(),
            code: &entity.code,
            name: &entity.name,
            institution: &entity.institution,
            owner_id: &entity.owner_id,
            state: entity.state.as_str(),
            version: entity.version,
            budget_assigned: entity.budget.map(|b| b.assigned),
            budget_executed: entity.budget.map(|b| b.executed),
            created_at: format_timestamp(entity.created_at)?,
            updated_at: format_timestamp(entity.updated_at)?,
        })
    }
}

/// A stored entity row.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = entities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EntityRow {
    pub entity_id: i64,
    pub kind: String,
    pub code: String,
    pub name: String,
    pub institution: String,
    pub owner_id: String,
    pub state: String,
    pub version: i64,
    pub budget_assigned: Option<i64>,
    pub budget_executed: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl EntityRow {
    pub fn into_entity(self) -> Result<WorkflowEntity, PersistenceError> {
        let kind: EntityKind = parse_column("kind", &self.kind)?;
        let state: WorkflowState = parse_column("state", &self.state)?;
        let budget: Option<Budget> = match (self.budget_assigned, self.budget_executed) {
            (Some(assigned), executed) => Some(
                Budget::new(assigned, executed.unwrap_or(0))
                    .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
            ),
            (None, _) => None,
        };

        Ok(WorkflowEntity {
            entity_id: Some(self.entity_id),
            kind,
            code: self.code,
            name: self.name,
            institution: self.institution,
            owner_id: self.owner_id,
            state,
            version: self.version,
            budget,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Insertable row for a decision record.
#[derive(Insertable)]
#[diesel(table_name = decision_records)]
pub struct NewDecisionRow<'a> {
    pub entity_id: i64,
    pub entity_kind: &'a str,
    pub entity_code: &'a str,
    pub decision: &'a str,
    pub actor_id: &'a str,
    pub actor_role: &'a str,
    pub justification: Option<&'a str>,
    pub from_state: &'a str,
    pub to_state: &'a str,
    pub decided_at: String,
}

impl<'a> NewDecisionRow<'a> {
    pub fn from_record(record: &'a DecisionRecord) -> Result<Self, PersistenceError> {
        Ok(Self {
            entity_id: record.entity_id,
            entity_kind: record.entity_kind.as_str(),
            entity_code: &record.entity_code,
            decision: record.decision.as_str(),
            actor_id: &record.actor_id,
            actor_role: record.actor_role.as_str(),
            justification: record.justification.as_deref(),
            from_state: record.from_state.as_str(),
            to_state: record.to_state.as_str(),
            decided_at: format_timestamp(record.decided_at)?,
        })
    }
}

/// A stored decision record row.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = decision_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DecisionRow {
    pub record_id: i64,
    pub entity_id: i64,
    pub entity_kind: String,
    pub entity_code: String,
    pub decision: String,
    pub actor_id: String,
    pub actor_role: String,
    pub justification: Option<String>,
    pub from_state: String,
    pub to_state: String,
    pub decided_at: String,
}

impl DecisionRow {
    pub fn into_record(self) -> Result<DecisionRecord, PersistenceError> {
        Ok(DecisionRecord {
            record_id: Some(self.record_id),
            entity_kind: parse_column::<EntityKind>("entity_kind", &self.entity_kind)?,
            entity_id: self.entity_id,
            entity_code: self.entity_code,
            decision: parse_column::<Decision>("decision", &self.decision)?,
            actor_id: self.actor_id,
            actor_role: parse_column::<Role>("actor_role", &self.actor_role)?,
            justification: self.justification,
            from_state: parse_column::<WorkflowState>("from_state", &self.from_state)?,
            to_state: parse_column::<WorkflowState>("to_state", &self.to_state)?,
            decided_at: parse_timestamp(&self.decided_at)?,
        })
    }
}

/// Insertable row for an audit event.
#[derive(Insertable)]
#[diesel(table_name = audit_events)]
pub struct NewAuditEventRow<'a> {
    pub entity_id: Option<i64>,
    pub actor_id: &'a str,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub occurred_at: String,
}

impl<'a> NewAuditEventRow<'a> {
    /// Builds a row, overriding the event's entity id when one is given.
    pub fn from_event(
        event: &'a AuditEvent,
        entity_id: Option<i64>,
    ) -> Result<Self, PersistenceError> {
        let actor_data: ActorData = ActorData {
            id: event.actor.id.clone(),
            roles: event
                .actor
                .roles
                .iter()
                .map(|role| role.as_str().to_string())
                .collect(),
        };
        let cause_data: CauseData = CauseData {
            id: event.cause.id.clone(),
            description: event.cause.description.clone(),
        };
        let action_data: ActionData = ActionData {
            name: event.action.name.clone(),
            details: event.action.details.clone(),
        };
        let before_data: StateSnapshotData = StateSnapshotData {
            data: event.before.data.clone(),
        };
        let after_data: StateSnapshotData = StateSnapshotData {
            data: event.after.data.clone(),
        };

        Ok(Self {
            entity_id: entity_id.or(event.entity_id),
            actor_id: &event.actor.id,
            actor_json: serde_json::to_string(&actor_data)?,
            cause_json: serde_json::to_string(&cause_data)?,
            action_json: serde_json::to_string(&action_data)?,
            before_snapshot_json: serde_json::to_string(&before_data)?,
            after_snapshot_json: serde_json::to_string(&after_data)?,
            occurred_at: format_timestamp(event.occurred_at)?,
        })
    }
}

/// A stored audit event row.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditEventRow {
    pub event_id: i64,
    pub entity_id: Option<i64>,
    #[allow(dead_code)]
    pub actor_id: String,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub occurred_at: String,
}

impl AuditEventRow {
    pub fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let actor_data: ActorData = serde_json::from_str(&self.actor_json)?;
        let cause_data: CauseData = serde_json::from_str(&self.cause_json)?;
        let action_data: ActionData = serde_json::from_str(&self.action_json)?;
        let before_data: StateSnapshotData = serde_json::from_str(&self.before_snapshot_json)?;
        let after_data: StateSnapshotData = serde_json::from_str(&self.after_snapshot_json)?;

        let roles: Vec<Role> = actor_data
            .roles
            .iter()
            .map(|role| parse_column::<Role>("actor_json.roles", role))
            .collect::<Result<Vec<Role>, PersistenceError>>()?;

        let mut event: AuditEvent = AuditEvent::new(
            Actor::new(actor_data.id, roles),
            Cause::new(cause_data.id, cause_data.description),
            Action::new(action_data.name, action_data.details),
            StateSnapshot::new(before_data.data),
            StateSnapshot::new(after_data.data),
            self.entity_id,
            parse_timestamp(&self.occurred_at)?,
        );
        event.event_id = Some(self.event_id);
        Ok(event)
    }
}
