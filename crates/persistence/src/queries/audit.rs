// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event retrieval.

use diesel::SqliteConnection;
use diesel::prelude::*;
use inst_plan_audit::AuditEvent;

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns `EventNotFound` if no row exists, or an error if the row
/// cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: Option<AuditEventRow> = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first(conn)
        .optional()?;

    row.ok_or(PersistenceError::EventNotFound(event_id))?
        .into_event()
}

/// Retrieves the ordered audit timeline.
///
/// With an `entity_id` only that entity's events are returned; without
/// one the whole log is.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be deserialized.
pub fn get_audit_timeline(
    conn: &mut SqliteConnection,
    entity_id: Option<i64>,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let mut query = audit_events::table
        .select(AuditEventRow::as_select())
        .order(audit_events::event_id.asc())
        .into_boxed();

    if let Some(entity_id) = entity_id {
        query = query.filter(audit_events::entity_id.eq(entity_id));
    }

    query
        .load::<AuditEventRow>(conn)?
        .into_iter()
        .map(AuditEventRow::into_event)
        .collect()
}
