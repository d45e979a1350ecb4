// System status display — shows DB stats, corpus size, tenants, model backend.

use anyhow::Result;
use std::sync::Arc;

use crate::db::Database;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_display_path: &str, model_backend: &str) -> Result<()> {
    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    // Corpus status
    let word_count = db.banned_word_count().await?;
    if word_count == 0 {
        println!("Banned words: none");
        println!("  Run `bleep init` to seed the default corpus");
    } else {
        println!("Banned words: {} in the global corpus", word_count);
    }

    // Tenants
    let tenants = db.list_tenants().await?;
    if tenants.is_empty() {
        println!("Tenants: none registered");
        println!("  Run `bleep tenant set-tolerance <slug> <0-5>` to add one");
    } else {
        println!("Tenants: {}", tenants.len());
        for tenant in &tenants {
            let custom = db.get_tenant_words(&tenant.id).await?.len();
            println!(
                "  {} (tolerance {}, {} custom words)",
                tenant.id,
                tenant.tolerance.level(),
                custom
            );
        }
    }

    // Audit log
    println!("Flagged messages: {}", db.flagged_count().await?);

    // Model
    println!("Severity model: {}", model_backend);

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
