// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use inst_plan_audit::DecisionRecord;

use crate::data_models::DecisionRow;
use crate::diesel_schema::decision_records;
use crate::error::PersistenceError;

/// Lists the decisions taken on one entity, in the order they were made.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_decisions(
    conn: &mut SqliteConnection,
    entity_id: i64,
) -> Result<Vec<DecisionRecord>, PersistenceError> {
    decision_records::table
        .filter(decision_records::entity_id.eq(entity_id))
        .order(decision_records::record_id.asc())
        .select(DecisionRow::as_select())
        .load::<DecisionRow>(conn)?
        .into_iter()
        .map(DecisionRow::into_record)
        .collect()
}

/// Lists every decision record, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_all_decisions(
    conn: &mut SqliteConnection,
) -> Result<Vec<DecisionRecord>, PersistenceError> {
    decision_records::table
        .order(decision_records::record_id.asc())
        .select(DecisionRow::as_select())
        .load::<DecisionRow>(conn)?
        .into_iter()
        .map(DecisionRow::into_record)
        .collect()
}
