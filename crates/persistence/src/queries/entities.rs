// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Entity lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;
use inst_plan_domain::{EntityKind, WorkflowEntity, WorkflowState};
use num_traits::ToPrimitive;

use crate::data_models::EntityRow;
use crate::diesel_schema::entities;
use crate::error::PersistenceError;

/// Optional constraints for listing entities. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityFilter {
    pub kind: Option<EntityKind>,
    pub institution: Option<String>,
    pub state: Option<WorkflowState>,
    pub limit: Option<usize>,
}

impl EntityFilter {
    /// A filter restricted to one kind.
    #[must_use]
    pub fn for_kind(kind: EntityKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }
}

/// Loads an entity by ID.
///
/// # Errors
///
/// Returns `EntityNotFound` if no row exists.
pub fn get_entity(
    conn: &mut SqliteConnection,
    entity_id: i64,
) -> Result<WorkflowEntity, PersistenceError> {
    let row: Option<EntityRow> = entities::table
        .filter(entities::entity_id.eq(entity_id))
        .select(EntityRow::as_select())
        .first(conn)
        .optional()?;

    row.ok_or(PersistenceError::EntityNotFound(entity_id))?
        .into_entity()
}

/// Loads an entity by its kind and code.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_entity_by_code(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    code: &str,
) -> Result<Option<WorkflowEntity>, PersistenceError> {
    entities::table
        .filter(entities::kind.eq(kind.as_str()))
        .filter(entities::code.eq(code))
        .select(EntityRow::as_select())
        .first(conn)
        .optional()?
        .map(EntityRow::into_entity)
        .transpose()
}

/// Lists entities matching a filter, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_entities(
    conn: &mut SqliteConnection,
    filter: &EntityFilter,
) -> Result<Vec<WorkflowEntity>, PersistenceError> {
    let mut query = entities::table
        .select(EntityRow::as_select())
        .order(entities::entity_id.asc())
        .into_boxed();

    if let Some(kind) = filter.kind {
        query = query.filter(entities::kind.eq(kind.as_str()));
    }
    if let Some(institution) = &filter.institution {
        query = query.filter(entities::institution.eq(institution.clone()));
    }
    if let Some(state) = filter.state {
        query = query.filter(entities::state.eq(state.as_str()));
    }
    if let Some(limit) = filter.limit {
        let limit: i64 = limit.to_i64().ok_or_else(|| {
            PersistenceError::QueryFailed(format!("limit {limit} is out of range"))
        })?;
        query = query.limit(limit);
    }

    query
        .load::<EntityRow>(conn)?
        .into_iter()
        .map(EntityRow::into_entity)
        .collect()
}
