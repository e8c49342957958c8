// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence of core results.
//!
//! Each result is written in a single transaction: the entity change,
//! its decision record (if any) and its audit event land together or not
//! at all.

use diesel::SqliteConnection;
use diesel::prelude::*;
use inst_plan::{CreationResult, TransitionResult};
use tracing::info;

use crate::error::PersistenceError;
use crate::mutations::audit::insert_audit_event;
use crate::mutations::decisions::insert_decision;
use crate::mutations::entities::{insert_entity, update_entity_versioned};

/// Identifiers assigned when a creation is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistCreationResult {
    /// The new entity's ID.
    pub entity_id: i64,
    /// The creation audit event's ID.
    pub event_id: i64,
}

/// Identifiers assigned when a transition is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The audit event's ID.
    pub event_id: i64,
    /// The decision record's ID, for approvals and rejections.
    pub decision_record_id: Option<i64>,
}

/// Persists a creation result.
///
/// # Errors
///
/// Returns `DuplicateCode` if the code is taken, or a database error. On
/// error nothing is written.
pub fn persist_creation(
    conn: &mut SqliteConnection,
    result: &CreationResult,
) -> Result<PersistCreationResult, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let entity_id: i64 = insert_entity(conn, &result.new_entity)?;
        let event_id: i64 = insert_audit_event(conn, &result.audit_event, Some(entity_id))?;

        info!(
            entity_id,
            event_id,
            kind = %result.new_entity.kind,
            code = %result.new_entity.code,
            "Persisted creation"
        );
        Ok(PersistCreationResult {
            entity_id,
            event_id,
        })
    })
}

/// Persists a transition result under optimistic concurrency.
///
/// The entity row is only updated if its stored version is still the one
/// the result was computed from.
///
/// # Errors
///
/// Returns `ConcurrentModification` if another writer got there first, or
/// a database error if any insert fails. On error nothing is written.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    let entity_id: i64 = result.new_entity.entity_id.ok_or_else(|| {
        PersistenceError::NotFound(String::from("transition result has no entity_id"))
    })?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        update_entity_versioned(
            conn,
            entity_id,
            result.expected_version(),
            &result.new_entity,
        )?;

        let decision_record_id: Option<i64> = match &result.decision {
            Some(record) => Some(insert_decision(conn, record)?),
            None => None,
        };
        let event_id: i64 = insert_audit_event(conn, &result.audit_event, Some(entity_id))?;

        info!(
            entity_id,
            event_id,
            action = %result.audit_event.action.name,
            state = %result.new_entity.state,
            version = result.new_entity.version,
            "Persisted transition"
        );
        Ok(PersistTransitionResult {
            event_id,
            decision_record_id,
        })
    })
}
