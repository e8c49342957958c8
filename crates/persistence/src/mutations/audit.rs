// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use diesel::SqliteConnection;
use diesel::prelude::*;
use inst_plan_audit::AuditEvent;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::NewAuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Appends an audit event.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The audit event to persist
/// * `entity_id` - Overrides `event.entity_id`; used when the entity was
///   inserted in the same transaction
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn insert_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
    entity_id: Option<i64>,
) -> Result<i64, PersistenceError> {
    let row: NewAuditEventRow<'_> = NewAuditEventRow::from_event(event, entity_id)?;

    diesel::insert_into(audit_events::table)
        .values(&row)
        .execute(conn)?;

    let event_id: i64 = conn.get_last_insert_rowid()?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}
