// Data models — Rust structs that map to database rows.
//
// Kept apart from the query layer so the rest of the crate can pass rows
// around without depending on rusqlite.

use serde::{Deserialize, Serialize};

use crate::pipeline::FlaggedWord;
use crate::severity::Severity;

/// A word in the global banned corpus, with the severity the lexicon model
/// assumes for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannedWordRow {
    pub word: String,
    pub severity: Severity,
    pub added_at: String,
}

/// A tenant and its moderation settings. Custom words live in their own
/// table and are loaded separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub tolerance: Severity,
    pub created_at: String,
}

/// One audited moderation call that flagged something.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedMessage {
    pub id: i64,
    pub tenant_id: String,
    pub original: String,
    pub censored: String,
    /// What was censored and why (JSON-encoded in the DB)
    pub flagged: Vec<FlaggedWord>,
    pub created_at: String,
}
