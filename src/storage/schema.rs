//! Database schema for the SQLite checkpoint backend

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per checkpointed job
CREATE TABLE IF NOT EXISTS jobs (
    job_key TEXT PRIMARY KEY,
    record_count INTEGER NOT NULL,
    saved_at TEXT NOT NULL
);

-- The job's records in fetch order
CREATE TABLE IF NOT EXISTS checkpoint_records (
    job_key TEXT NOT NULL REFERENCES jobs(job_key) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    placeholder INTEGER NOT NULL DEFAULT 0,
    record TEXT NOT NULL,
    PRIMARY KEY (job_key, position)
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
