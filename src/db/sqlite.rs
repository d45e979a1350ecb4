// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection sits behind a tokio::sync::Mutex. Trait methods lock it,
// do their synchronous rusqlite work, and return; the guard is always
// dropped before anything awaits.
//
// The free functions in queries.rs stay as plain sync functions so tests
// can hit a bare Connection directly.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{BannedWordRow, FlaggedMessage, Tenant};
use super::traits::Database;
use crate::pipeline::ModerationResult;
use crate::severity::Severity;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn add_banned_word(&self, word: &str, severity: Severity) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::add_banned_word(&conn, word, severity)
    }

    async fn set_word_severity(&self, word: &str, severity: Severity) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::set_word_severity(&conn, word, severity)
    }

    async fn remove_banned_word(&self, word: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::remove_banned_word(&conn, word)
    }

    async fn get_banned_words(&self) -> Result<Vec<BannedWordRow>> {
        let conn = self.conn.lock().await;
        super::queries::get_banned_words(&conn)
    }

    async fn banned_word_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::banned_word_count(&conn)
    }

    async fn upsert_tenant(&self, id: &str, tolerance: Severity) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_tenant(&conn, id, tolerance)
    }

    async fn get_tenant(&self, id: &str) -> Result<Option<Tenant>> {
        let conn = self.conn.lock().await;
        super::queries::get_tenant(&conn, id)
    }

    async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let conn = self.conn.lock().await;
        super::queries::list_tenants(&conn)
    }

    async fn tenant_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::tenant_count(&conn)
    }

    async fn add_tenant_word(&self, tenant_id: &str, word: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::add_tenant_word(&conn, tenant_id, word)
    }

    async fn remove_tenant_word(&self, tenant_id: &str, word: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::remove_tenant_word(&conn, tenant_id, word)
    }

    async fn get_tenant_words(&self, tenant_id: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;
        super::queries::get_tenant_words(&conn, tenant_id)
    }

    async fn record_flagged_message(
        &self,
        tenant_id: &str,
        original: &str,
        result: &ModerationResult,
    ) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_flagged_message(
            &conn,
            tenant_id,
            original,
            &result.censored,
            &result.flagged,
        )
    }

    async fn get_flagged_messages(
        &self,
        tenant_id: &str,
        limit: u32,
    ) -> Result<Vec<FlaggedMessage>> {
        let conn = self.conn.lock().await;
        super::queries::get_flagged_messages(&conn, tenant_id, limit)
    }

    async fn delete_flagged_message(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::delete_flagged_message(&conn, id)
    }

    async fn flagged_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::flagged_count(&conn)
    }
}
