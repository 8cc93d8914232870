//! SQL schema definitions.
//!
//! The schema is created with `CREATE ... IF NOT EXISTS` on every connect.
//! There is no migration system; changing a table means recreating the
//! database.
//!
//! `seq` records insertion order, since creation timestamps of records
//! written in the same sync batch are equal. The database assigns it
//! (`AUTOINCREMENT` on SQLite, an identity column on PostgreSQL), so
//! concurrent writers never share a value. `rooms_json` and
//! `position_json` hold the structured item fields as JSON text.

use crate::Result;

use super::{DbKind, SqlxBackend, SqlxResultExt};

/// Column definition of the database-assigned creation order.
fn seq_column(kind: DbKind) -> &'static str {
    match kind {
        DbKind::Sqlite => "seq INTEGER PRIMARY KEY AUTOINCREMENT",
        DbKind::Postgres => "seq BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY",
    }
}

/// SQL statements to create the schema tables.
pub fn create_tables(kind: DbKind) -> Vec<String> {
    let seq = seq_column(kind);
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS items (
                {seq},
                id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL DEFAULT '',
                date_added TEXT NOT NULL DEFAULT '',
                rooms_json TEXT NOT NULL DEFAULT '[]',
                position_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT
            )"
        ),
        // guid is assigned by the BIM system
        format!(
            "CREATE TABLE IF NOT EXISTS elements (
                {seq},
                guid TEXT NOT NULL UNIQUE,
                revit_id BIGINT NOT NULL DEFAULT 0,
                name TEXT NOT NULL DEFAULT '',
                element_type TEXT NOT NULL DEFAULT '',
                material TEXT NOT NULL DEFAULT '',
                year_added TEXT NOT NULL DEFAULT '',
                software_originator TEXT NOT NULL DEFAULT '',
                comment TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT
            )"
        ),
    ]
}

/// Creates tables if they don't exist.
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    for statement in create_tables(backend.db_kind()) {
        sqlx::query(&statement)
            .execute(pool)
            .await
            .sql_context(&format!("Schema creation failed - SQL: {statement}"))?;
    }

    tracing::debug!(kind = ?backend.db_kind(), "SQL schema ready");
    Ok(())
}
