// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Developer automation for the workspace: build, lint, test, and a
//! migration check that applies, reverts and re-applies the `SQLite`
//! migrations and compares the resulting schemas.
//!
//! Run with `cargo xtask <command>`.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::BTreeMap;
use std::{io, process::Output};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::eyre, eyre::Context, Result};
use diesel::sql_types::Text;
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables every migrated database must contain.
const REQUIRED_TABLES: [&str; 3] = ["audit_events", "decision_records", "entities"];

/// Triggers that keep the decision and audit tables append-only.
const REQUIRED_TRIGGERS: [&str; 4] = [
    "audit_events_no_delete",
    "audit_events_no_update",
    "decision_records_no_delete",
    "decision_records_no_update",
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Lint formatting and clippy
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Verify the migrations apply, revert and re-apply to the same schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintFormatting => lint_format(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting and clippy
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all"])
}

/// Run all workspace tests, docs included
fn test() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])?;
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// One row of `sqlite_master`, keyed by `type:name`.
type SchemaObjects = BTreeMap<String, String>;

#[derive(QueryableByName)]
struct SchemaRow {
    #[diesel(sql_type = Text)]
    kind: String,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    sql: String,
}

#[derive(QueryableByName)]
struct ForeignKeyViolation {
    #[diesel(sql_type = Text)]
    table: String,
}

fn introspect_schema(conn: &mut SqliteConnection) -> Result<SchemaObjects> {
    let rows: Vec<SchemaRow> = diesel::sql_query(
        "SELECT type AS kind, name, COALESCE(sql, '') AS sql FROM sqlite_master \
         WHERE name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' \
         ORDER BY type, name",
    )
    .load(conn)
    .wrap_err("Failed to read sqlite_master")?;

    Ok(rows
        .into_iter()
        .map(|row| (format!("{}:{}", row.kind, row.name), row.sql))
        .collect())
}

fn require_objects(schema: &SchemaObjects, kind: &str, names: &[&str]) -> Result<()> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| !schema.contains_key(&format!("{kind}:{name}")))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(eyre!("Migrated schema is missing {kind}s: {}", missing.join(", ")))
    }
}

/// Verify the `SQLite` migrations.
///
/// Applies every migration to a fresh in-memory database, checks that the
/// workflow tables and append-only triggers exist, reverts everything,
/// confirms nothing is left behind, re-applies, and fails if the second
/// schema differs from the first.
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;
    tracing::info!("Applied {} migrations", applied.len());

    let first: SchemaObjects = introspect_schema(&mut conn)?;
    require_objects(&first, "table", &REQUIRED_TABLES)?;
    require_objects(&first, "trigger", &REQUIRED_TRIGGERS)?;

    let violations: Vec<ForeignKeyViolation> = diesel::sql_query("PRAGMA foreign_key_check")
        .load(&mut conn)
        .wrap_err("Failed to run foreign key check")?;
    if let Some(violation) = violations.first() {
        return Err(eyre!("Foreign key violation in {}", violation.table));
    }

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let reverted: SchemaObjects = introspect_schema(&mut conn)?;
    if !reverted.is_empty() {
        let leftover: Vec<&str> = reverted.keys().map(String::as_str).collect();
        return Err(eyre!(
            "Reverting left objects behind: {}",
            leftover.join(", ")
        ));
    }

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply migrations: {e}"))?;
    let second: SchemaObjects = introspect_schema(&mut conn)?;

    if first != second {
        for (key, sql) in &first {
            match second.get(key) {
                None => tracing::error!("{key} missing after re-apply"),
                Some(other) if other != sql => tracing::error!("{key} differs after re-apply"),
                Some(_) => {}
            }
        }
        return Err(eyre!("Schema changed after revert and re-apply"));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
