// Database schema — table creation and migrations.
//
// Migrations are version-gated: a `schema_version` table records which ones
// have already run, and each migration is a function that executes its SQL
// exactly once.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- The global banned-word corpus, shared by every tenant
        CREATE TABLE IF NOT EXISTS banned_words (
            word TEXT PRIMARY KEY,             -- canonical lowercase form
            added_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Tenants and their moderation settings
        CREATE TABLE IF NOT EXISTS tenants (
            id TEXT PRIMARY KEY,               -- tenant slug
            tolerance INTEGER NOT NULL DEFAULT 0,  -- 0 (flag everything) to 5
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Per-tenant custom banned words, layered on top of the corpus
        CREATE TABLE IF NOT EXISTS tenant_words (
            tenant_id TEXT NOT NULL REFERENCES tenants(id),
            word TEXT NOT NULL,                -- canonical lowercase form
            added_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (tenant_id, word)
        );

        -- Audit log of moderation calls that flagged something
        CREATE TABLE IF NOT EXISTS flagged_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tenant_id TEXT NOT NULL,
            original TEXT NOT NULL,            -- the text as submitted
            censored TEXT NOT NULL,            -- same text with hits starred out
            flagged_json TEXT NOT NULL,        -- JSON array of {original, matched}
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Index for listing a tenant's recent flagged messages
        CREATE INDEX IF NOT EXISTS idx_flagged_tenant
            ON flagged_messages(tenant_id, created_at);

        -- Index for loading a tenant's custom words
        CREATE INDEX IF NOT EXISTS idx_tenant_words
            ON tenant_words(tenant_id);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    // Migration v2: add a severity column to banned_words. Originally every
    // banned word was treated as maximally severe; per-word severity lets
    // the lexicon model and the tolerance gate distinguish tiers.
    run_migration(conn, 2, |c| {
        c.execute_batch("ALTER TABLE banned_words ADD COLUMN severity INTEGER NOT NULL DEFAULT 5;")
    })?;

    Ok(())
}

/// Run a migration if it hasn't been applied yet.
/// The migration function receives the connection and should execute its SQL.
fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
