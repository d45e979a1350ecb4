// Database queries — CRUD for every table.
//
// All SQL lives here; callers get plain Rust signatures and never see a
// statement string. Functions take &Connection so the async wrapper and
// tests can share them.

use anyhow::Result;
use rusqlite::{params, Connection};

use super::models::{BannedWordRow, FlaggedMessage, Tenant};
use crate::pipeline::FlaggedWord;
use crate::severity::Severity;

// --- Global banned words ---

/// Add a word to the global corpus. Words are stored lowercased; returns
/// false if the word was already present (the existing row is untouched).
pub fn add_banned_word(conn: &Connection, word: &str, severity: Severity) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO banned_words (word, severity) VALUES (?1, ?2)",
        params![word.to_lowercase(), severity.level()],
    )?;
    Ok(changed > 0)
}

/// Update the severity of an existing corpus word. Returns false if the
/// word isn't in the corpus.
pub fn set_word_severity(conn: &Connection, word: &str, severity: Severity) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE banned_words SET severity = ?2 WHERE word = ?1",
        params![word.to_lowercase(), severity.level()],
    )?;
    Ok(changed > 0)
}

/// Remove a word from the global corpus. Returns false if it wasn't there.
pub fn remove_banned_word(conn: &Connection, word: &str) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM banned_words WHERE word = ?1",
        params![word.to_lowercase()],
    )?;
    Ok(changed > 0)
}

/// Get the whole global corpus, sorted by word.
pub fn get_banned_words(conn: &Connection) -> Result<Vec<BannedWordRow>> {
    let mut stmt =
        conn.prepare("SELECT word, severity, added_at FROM banned_words ORDER BY word")?;

    let rows = stmt.query_map([], |row| {
        Ok(BannedWordRow {
            word: row.get(0)?,
            severity: Severity::from_level(row.get(1)?),
            added_at: row.get(2)?,
        })
    })?;

    let mut words = Vec::new();
    for row in rows {
        words.push(row?);
    }
    Ok(words)
}

/// Size of the global corpus.
pub fn banned_word_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM banned_words", [], |row| row.get(0))?;
    Ok(count)
}

// --- Tenants ---

/// Create a tenant or update its tolerance (upsert).
pub fn upsert_tenant(conn: &Connection, id: &str, tolerance: Severity) -> Result<()> {
    conn.execute(
        "INSERT INTO tenants (id, tolerance) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET tolerance = ?2",
        params![id, tolerance.level()],
    )?;
    Ok(())
}

/// Look up one tenant by slug.
pub fn get_tenant(conn: &Connection, id: &str) -> Result<Option<Tenant>> {
    let mut stmt = conn.prepare("SELECT id, tolerance, created_at FROM tenants WHERE id = ?1")?;
    let result = stmt
        .query_row(params![id], |row| {
            Ok(Tenant {
                id: row.get(0)?,
                tolerance: Severity::from_level(row.get(1)?),
                created_at: row.get(2)?,
            })
        })
        .optional()?;
    Ok(result)
}

/// All tenants, sorted by slug.
pub fn list_tenants(conn: &Connection) -> Result<Vec<Tenant>> {
    let mut stmt = conn.prepare("SELECT id, tolerance, created_at FROM tenants ORDER BY id")?;

    let rows = stmt.query_map([], |row| {
        Ok(Tenant {
            id: row.get(0)?,
            tolerance: Severity::from_level(row.get(1)?),
            created_at: row.get(2)?,
        })
    })?;

    let mut tenants = Vec::new();
    for row in rows {
        tenants.push(row?);
    }
    Ok(tenants)
}

/// Number of registered tenants.
pub fn tenant_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM tenants", [], |row| row.get(0))?;
    Ok(count)
}

/// Add a custom word to a tenant's list. Returns false if it was already
/// there.
pub fn add_tenant_word(conn: &Connection, tenant_id: &str, word: &str) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO tenant_words (tenant_id, word) VALUES (?1, ?2)",
        params![tenant_id, word.to_lowercase()],
    )?;
    Ok(changed > 0)
}

/// Remove a custom word from a tenant's list. Returns false if it wasn't
/// there.
pub fn remove_tenant_word(conn: &Connection, tenant_id: &str, word: &str) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM tenant_words WHERE tenant_id = ?1 AND word = ?2",
        params![tenant_id, word.to_lowercase()],
    )?;
    Ok(changed > 0)
}

/// A tenant's custom words, sorted.
pub fn get_tenant_words(conn: &Connection, tenant_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT word FROM tenant_words WHERE tenant_id = ?1 ORDER BY word")?;

    let rows = stmt.query_map(params![tenant_id], |row| row.get(0))?;

    let mut words = Vec::new();
    for row in rows {
        words.push(row?);
    }
    Ok(words)
}

// --- Flagged messages ---

/// Record one moderation call that flagged something.
pub fn insert_flagged_message(
    conn: &Connection,
    tenant_id: &str,
    original: &str,
    censored: &str,
    flagged: &[FlaggedWord],
) -> Result<i64> {
    let flagged_json = serde_json::to_string(flagged)?;
    conn.execute(
        "INSERT INTO flagged_messages (tenant_id, original, censored, flagged_json)
         VALUES (?1, ?2, ?3, ?4)",
        params![tenant_id, original, censored, flagged_json],
    )?;
    Ok(conn.last_insert_rowid())
}

/// A tenant's most recent flagged messages, newest first.
pub fn get_flagged_messages(
    conn: &Connection,
    tenant_id: &str,
    limit: u32,
) -> Result<Vec<FlaggedMessage>> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, original, censored, flagged_json, created_at
         FROM flagged_messages
         WHERE tenant_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![tenant_id, limit], |row| {
        let flagged_json: String = row.get(4)?;
        let flagged: Vec<FlaggedWord> = serde_json::from_str(&flagged_json).unwrap_or_default();
        Ok(FlaggedMessage {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            original: row.get(2)?,
            censored: row.get(3)?,
            flagged,
            created_at: row.get(5)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(row?);
    }
    Ok(messages)
}

/// Delete one flagged message by id (e.g. after a retention review).
/// Returns false if no such row existed.
pub fn delete_flagged_message(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM flagged_messages WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Total number of audit entries across all tenants.
pub fn flagged_count(conn: &Connection) -> Result<i64> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM flagged_messages", [], |row| row.get(0))?;
    Ok(count)
}

// rusqlite's optional() helper — converts "no rows" into None
use rusqlite::OptionalExtension;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_banned_word_roundtrip() {
        let conn = test_db();
        assert_eq!(banned_word_count(&conn).unwrap(), 0);

        assert!(add_banned_word(&conn, "Fuck", Severity::Severe).unwrap());
        // Stored lowercased, so the same word again is a duplicate
        assert!(!add_banned_word(&conn, "fuck", Severity::Severe).unwrap());

        let words = get_banned_words(&conn).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "fuck");
        assert_eq!(words[0].severity, Severity::Severe);

        assert!(remove_banned_word(&conn, "FUCK").unwrap());
        assert!(!remove_banned_word(&conn, "fuck").unwrap());
        assert_eq!(banned_word_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_add_keeps_original_severity() {
        let conn = test_db();
        add_banned_word(&conn, "damn", Severity::Moderate).unwrap();
        add_banned_word(&conn, "damn", Severity::Severe).unwrap();

        let words = get_banned_words(&conn).unwrap();
        assert_eq!(words[0].severity, Severity::Moderate);
    }

    #[test]
    fn test_set_word_severity() {
        let conn = test_db();
        add_banned_word(&conn, "damn", Severity::Severe).unwrap();

        assert!(set_word_severity(&conn, "DAMN", Severity::Moderate).unwrap());
        let words = get_banned_words(&conn).unwrap();
        assert_eq!(words[0].severity, Severity::Moderate);

        // Unknown word — nothing to update
        assert!(!set_word_severity(&conn, "missing", Severity::Mild).unwrap());
    }

    #[test]
    fn test_word_list_is_sorted() {
        let conn = test_db();
        for word in ["shit", "ass", "fuck"] {
            add_banned_word(&conn, word, Severity::Severe).unwrap();
        }

        let words: Vec<String> = get_banned_words(&conn)
            .unwrap()
            .into_iter()
            .map(|row| row.word)
            .collect();
        assert_eq!(words, vec!["ass", "fuck", "shit"]);
    }

    #[test]
    fn test_tenant_upsert_and_lookup() {
        let conn = test_db();
        assert!(get_tenant(&conn, "acme").unwrap().is_none());

        upsert_tenant(&conn, "acme", Severity::Benign).unwrap();
        let tenant = get_tenant(&conn, "acme").unwrap().unwrap();
        assert_eq!(tenant.id, "acme");
        assert_eq!(tenant.tolerance, Severity::Benign);

        // Upsert updates the tolerance in place
        upsert_tenant(&conn, "acme", Severity::Moderate).unwrap();
        let tenant = get_tenant(&conn, "acme").unwrap().unwrap();
        assert_eq!(tenant.tolerance, Severity::Moderate);
        assert_eq!(tenant_count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_tenant_words_are_scoped() {
        let conn = test_db();
        upsert_tenant(&conn, "acme", Severity::Benign).unwrap();
        upsert_tenant(&conn, "globex", Severity::Benign).unwrap();

        assert!(add_tenant_word(&conn, "acme", "Widget").unwrap());
        assert!(!add_tenant_word(&conn, "acme", "widget").unwrap());
        add_tenant_word(&conn, "globex", "sprocket").unwrap();

        assert_eq!(get_tenant_words(&conn, "acme").unwrap(), vec!["widget"]);
        assert_eq!(get_tenant_words(&conn, "globex").unwrap(), vec!["sprocket"]);

        assert!(remove_tenant_word(&conn, "acme", "widget").unwrap());
        assert!(!remove_tenant_word(&conn, "acme", "widget").unwrap());
        assert!(get_tenant_words(&conn, "acme").unwrap().is_empty());
        // The other tenant's list is untouched
        assert_eq!(get_tenant_words(&conn, "globex").unwrap().len(), 1);
    }

    #[test]
    fn test_flagged_message_roundtrip() {
        let conn = test_db();

        let flagged = vec![
            FlaggedWord {
                original: "f@ck".to_string(),
                matched: "fuck".to_string(),
            },
            FlaggedWord {
                original: "sh1t".to_string(),
                matched: "shit".to_string(),
            },
        ];
        let id =
            insert_flagged_message(&conn, "acme", "f@ck this sh1t", "**** this ****", &flagged)
                .unwrap();
        assert!(id > 0);

        let messages = get_flagged_messages(&conn, "acme", 10).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].original, "f@ck this sh1t");
        assert_eq!(messages[0].censored, "**** this ****");
        assert_eq!(messages[0].flagged, flagged);

        // Other tenants don't see it
        assert!(get_flagged_messages(&conn, "globex", 10).unwrap().is_empty());
        assert_eq!(flagged_count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_flagged_messages_limit_newest_first() {
        let conn = test_db();
        for i in 0..5 {
            insert_flagged_message(&conn, "acme", &format!("message {i}"), "********", &[])
                .unwrap();
        }

        let messages = get_flagged_messages(&conn, "acme", 3).unwrap();
        assert_eq!(messages.len(), 3);
        // Same created_at second for all five — the id tiebreak keeps
        // newest-first ordering deterministic
        assert_eq!(messages[0].original, "message 4");
        assert_eq!(messages[2].original, "message 2");
    }

    #[test]
    fn test_delete_flagged_message() {
        let conn = test_db();
        let id = insert_flagged_message(&conn, "acme", "damn", "****", &[]).unwrap();

        assert!(delete_flagged_message(&conn, id).unwrap());
        assert!(!delete_flagged_message(&conn, id).unwrap());
        assert_eq!(flagged_count(&conn).unwrap(), 0);
    }
}
