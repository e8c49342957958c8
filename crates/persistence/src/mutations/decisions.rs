// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use inst_plan_audit::DecisionRecord;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::NewDecisionRow;
use crate::diesel_schema::decision_records;
use crate::error::PersistenceError;

/// Appends a decision record.
///
/// The table rejects updates and deletes, and refuses a rejection whose
/// justification is blank.
///
/// # Errors
///
/// Returns an error if the insert violates a constraint (unknown entity,
/// blank rejection justification) or the database fails.
pub fn insert_decision(
    conn: &mut SqliteConnection,
    record: &DecisionRecord,
) -> Result<i64, PersistenceError> {
    let row: NewDecisionRow<'_> = NewDecisionRow::from_record(record)?;

    diesel::insert_into(decision_records::table)
        .values(&row)
        .execute(conn)?;

    let record_id: i64 = conn.get_last_insert_rowid()?;
    debug!(
        record_id,
        entity_id = record.entity_id,
        decision = %record.decision,
        "Recorded decision"
    );
    Ok(record_id)
}
