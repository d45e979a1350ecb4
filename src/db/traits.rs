// Database trait — backend-agnostic async interface for all DB operations.
//
// Implementor: SqliteDatabase (wraps rusqlite behind a Mutex). All methods
// are async so a native async backend could fit behind the same interface
// without touching callers, which hold an `Arc<dyn Database>`.
//
// The trait mirrors the queries.rs function signatures, so each method is a
// straightforward lock-and-delegate in the implementation.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{BannedWordRow, FlaggedMessage, Tenant};
use crate::pipeline::ModerationResult;
use crate::severity::Severity;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Global banned words ---

    /// Add a word to the global corpus. Returns false if it was already
    /// present.
    async fn add_banned_word(&self, word: &str, severity: Severity) -> Result<bool>;

    /// Update the severity of an existing corpus word.
    async fn set_word_severity(&self, word: &str, severity: Severity) -> Result<bool>;

    /// Remove a word from the global corpus. Returns false if it wasn't
    /// there.
    async fn remove_banned_word(&self, word: &str) -> Result<bool>;

    /// The whole global corpus, sorted by word.
    async fn get_banned_words(&self) -> Result<Vec<BannedWordRow>>;

    /// Size of the global corpus.
    async fn banned_word_count(&self) -> Result<i64>;

    // --- Tenants ---

    /// Create a tenant or update its tolerance (upsert).
    async fn upsert_tenant(&self, id: &str, tolerance: Severity) -> Result<()>;

    /// Look up one tenant by slug.
    async fn get_tenant(&self, id: &str) -> Result<Option<Tenant>>;

    /// All tenants, sorted by slug.
    async fn list_tenants(&self) -> Result<Vec<Tenant>>;

    /// Number of registered tenants.
    async fn tenant_count(&self) -> Result<i64>;

    /// Add a custom word to a tenant's list. Returns false if it was
    /// already there.
    async fn add_tenant_word(&self, tenant_id: &str, word: &str) -> Result<bool>;

    /// Remove a custom word from a tenant's list.
    async fn remove_tenant_word(&self, tenant_id: &str, word: &str) -> Result<bool>;

    /// A tenant's custom words, sorted.
    async fn get_tenant_words(&self, tenant_id: &str) -> Result<Vec<String>>;

    // --- Flagged messages ---

    /// Record a moderation result that flagged something and return the
    /// audit entry's ID.
    async fn record_flagged_message(
        &self,
        tenant_id: &str,
        original: &str,
        result: &ModerationResult,
    ) -> Result<i64>;

    /// A tenant's most recent flagged messages, newest first.
    async fn get_flagged_messages(&self, tenant_id: &str, limit: u32)
        -> Result<Vec<FlaggedMessage>>;

    /// Delete one flagged message by id. Returns false if no such row
    /// existed.
    async fn delete_flagged_message(&self, id: i64) -> Result<bool>;

    /// Total number of audit entries across all tenants.
    async fn flagged_count(&self) -> Result<i64>;
}
