// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first: Persistence = Persistence::new_in_memory().unwrap();
    let mut second: Persistence = Persistence::new_in_memory().unwrap();

    super::store_draft(
        &mut first,
        inst_plan_domain::EntityKind::Objective,
        "OBJ-001",
        "Ministry of Planning",
    );

    assert_eq!(first.list_entities(&crate::EntityFilter::default()).unwrap().len(), 1);
    assert!(second.list_entities(&crate::EntityFilter::default()).unwrap().is_empty());
}

#[test]
fn test_foreign_keys_are_enforced_after_open() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_migrations_create_tables_and_triggers() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let tables: Vec<String> = persistence.list_schema_objects("table").unwrap();
    for table in ["audit_events", "decision_records", "entities"] {
        assert!(tables.iter().any(|t| t == table), "missing table {table}");
    }

    let triggers: Vec<String> = persistence.list_schema_objects("trigger").unwrap();
    assert_eq!(
        triggers,
        vec![
            String::from("audit_events_no_delete"),
            String::from("audit_events_no_update"),
            String::from("decision_records_no_delete"),
            String::from("decision_records_no_update"),
        ]
    );
}

#[test]
fn test_file_database_survives_reopen() {
    let dir: std::path::PathBuf = std::env::temp_dir().join(format!(
        "inst-plan-persistence-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path: std::path::PathBuf = dir.join("reopen.db");
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        super::store_draft(
            &mut persistence,
            inst_plan_domain::EntityKind::Project,
            "PRJ-002",
            "Ministry of Planning",
        );
    }

    let mut reopened: Persistence = Persistence::new_with_file(&path).unwrap();
    let stored = reopened
        .get_entity_by_code(inst_plan_domain::EntityKind::Project, "PRJ-002")
        .unwrap();
    assert!(stored.is_some());

    drop(reopened);
    let _ = std::fs::remove_dir_all(&dir);
}
