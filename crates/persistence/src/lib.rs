// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the institutional planning system.
//!
//! Entities, decision records and audit events are stored in `SQLite`
//! through Diesel. Migrations are embedded and applied on open.
//!
//! ## Guarantees
//!
//! - Every core result is written in one transaction. The entity change,
//!   its decision record and its audit event are stored together or not
//!   at all.
//! - Entity updates carry the version they were computed from. A stale
//!   writer receives `ConcurrentModification` instead of overwriting.
//! - `decision_records` and `audit_events` are append-only. Triggers abort
//!   any `UPDATE` or `DELETE`.
//! - A rejection cannot be stored without a non-blank justification.
//! - Foreign key enforcement is verified at startup.
//!
//! ## Testing
//!
//! Tests use isolated shared in-memory databases, one per `new_in_memory`
//! call.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use inst_plan::{CreationResult, TransitionResult};
use inst_plan_audit::{AuditEvent, DecisionRecord};
use inst_plan_domain::{EntityKind, WorkflowEntity};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mutations::{PersistCreationResult, PersistTransitionResult};
pub use queries::EntityFilter;

use backend::PersistenceBackend;

/// Counter for unique in-memory database names.
///
/// Each `new_in_memory()` call gets its own database, so tests never share
/// state.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a persistence adapter backed by a fresh shared in-memory
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter backed by a database file.
    ///
    /// The file is created if missing and switched to WAL mode.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Persists a creation result and returns the stored entity.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` if the kind already uses the code, or a
    /// database error.
    pub fn persist_creation(
        &mut self,
        result: &CreationResult,
    ) -> Result<(WorkflowEntity, PersistCreationResult), PersistenceError> {
        let ids: PersistCreationResult = mutations::persist_creation(&mut self.conn, result)?;
        let mut entity: WorkflowEntity = result.new_entity.clone();
        entity.entity_id = Some(ids.entity_id);
        Ok((entity, ids))
    }

    /// Persists a transition result atomically.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentModification` if the stored version moved on, or a
    /// database error. Nothing is written on error.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::persist_transition(&mut self.conn, result)
    }

    /// Appends a single decision record outside a transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert violates a constraint.
    pub fn record_decision(&mut self, record: &DecisionRecord) -> Result<i64, PersistenceError> {
        mutations::insert_decision(&mut self.conn, record)
    }

    /// Appends a single audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the insert fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::insert_audit_event(&mut self.conn, event, None)
    }

    // ========================================================================
    // Entity Queries
    // ========================================================================

    /// Loads an entity by ID.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if it does not exist.
    pub fn get_entity(&mut self, entity_id: i64) -> Result<WorkflowEntity, PersistenceError> {
        queries::entities::get_entity(&mut self.conn, entity_id)
    }

    /// Loads an entity by kind and code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn get_entity_by_code(
        &mut self,
        kind: EntityKind,
        code: &str,
    ) -> Result<Option<WorkflowEntity>, PersistenceError> {
        queries::entities::get_entity_by_code(&mut self.conn, kind, code)
    }

    /// Lists entities matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_entities(
        &mut self,
        filter: &EntityFilter,
    ) -> Result<Vec<WorkflowEntity>, PersistenceError> {
        queries::entities::list_entities(&mut self.conn, filter)
    }

    // ========================================================================
    // Decision Queries
    // ========================================================================

    /// Lists decisions for one entity in the order they were taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_decisions(
        &mut self,
        entity_id: i64,
    ) -> Result<Vec<DecisionRecord>, PersistenceError> {
        queries::decisions::list_decisions(&mut self.conn, entity_id)
    }

    /// Lists every decision record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_all_decisions(&mut self) -> Result<Vec<DecisionRecord>, PersistenceError> {
        queries::decisions::list_all_decisions(&mut self.conn)
    }

    // ========================================================================
    // Audit Queries
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound` if it does not exist.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves the ordered audit timeline, optionally for one entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn get_audit_timeline(
        &mut self,
        entity_id: Option<i64>,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_audit_timeline(&mut self.conn, entity_id)
    }

    /// Lists schema object names of one type, e.g. `trigger`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    pub fn list_schema_objects(
        &mut self,
        object_type: &str,
    ) -> Result<Vec<String>, PersistenceError> {
        backend::sqlite::list_schema_objects(&mut self.conn, object_type)
    }
}
