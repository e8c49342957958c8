// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Entity row mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use inst_plan_domain::WorkflowEntity;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{NewEntityRow, format_timestamp};
use crate::diesel_schema::entities;
use crate::error::PersistenceError;

/// Inserts a new entity row.
///
/// # Returns
///
/// The `entity_id` assigned by the database.
///
/// # Errors
///
/// Returns `DuplicateCode` if the kind already uses the code, or a
/// database error for any other failure.
pub fn insert_entity(
    conn: &mut SqliteConnection,
    entity: &WorkflowEntity,
) -> Result<i64, PersistenceError> {
    let row: NewEntityRow<'_> = NewEntityRow::from_entity(entity)?;

    match diesel::insert_into(entities::table)
        .values(&row)
        .execute(conn)
    {
        Ok(_) => {}
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(PersistenceError::DuplicateCode {
                kind: entity.kind,
                code: entity.code.clone(),
            });
        }
        Err(e) => return Err(e.into()),
    }

    let entity_id: i64 = conn.get_last_insert_rowid()?;
    debug!(entity_id, code = %entity.code, "Inserted entity");
    Ok(entity_id)
}

/// Writes the changed entity if the stored version still matches.
///
/// The row is only touched when its `version` equals `expected_version`,
/// so two writers holding the same copy cannot both succeed.
///
/// # Errors
///
/// Returns `ConcurrentModification` when no row matched, or a database
/// error for any other failure.
pub fn update_entity_versioned(
    conn: &mut SqliteConnection,
    entity_id: i64,
    expected_version: i64,
    entity: &WorkflowEntity,
) -> Result<(), PersistenceError> {
    let updated_at: String = format_timestamp(entity.updated_at)?;

    let rows: usize = diesel::update(
        entities::table
            .filter(entities::entity_id.eq(entity_id))
            .filter(entities::version.eq(expected_version)),
    )
    .set((
        entities::name.eq(&entity.name),
        entities::state.eq(entity.state.as_str()),
        entities::version.eq(entity.version),
        entities::budget_assigned.eq(entity.budget.map(|b| b.assigned)),
        entities::budget_executed.eq(entity.budget.map(|b| b.executed)),
        entities::updated_at.eq(updated_at),
    ))
    .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::ConcurrentModification {
            entity_id,
            expected_version,
        });
    }

    debug!(entity_id, version = entity.version, "Updated entity");
    Ok(())
}
