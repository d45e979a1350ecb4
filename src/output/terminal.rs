// Colored terminal output for moderation results and store listings.
//
// This module handles all terminal-specific formatting: colors, tables,
// severity highlighting. The main.rs display functions delegate here.

use colored::Colorize;

use crate::db::models::{BannedWordRow, FlaggedMessage, Tenant};
use crate::pipeline::ModerationResult;
use crate::severity::Severity;

/// Display one moderation result: the censored text plus a table of what
/// was flagged.
pub fn display_moderation(result: &ModerationResult) {
    println!("\n{}", "=== Moderation Result ===".bold());
    println!();
    println!("  {}", result.censored);

    if result.flagged.is_empty() {
        println!("\n  {}", "Nothing flagged.".green());
        return;
    }

    println!("\n  {} flagged:", result.flagged.len());
    println!(
        "  {:<24} {}",
        "Token".dimmed(),
        "Matched banned word".dimmed()
    );
    println!("  {}", "-".repeat(48).dimmed());
    for entry in &result.flagged {
        println!("  {:<24} {}", entry.original, entry.matched.red());
    }
}

/// Display the `bleep preview` rows: each word token with its canonical
/// form and severity. Canonical forms that differ from the token are
/// highlighted, since those are the obfuscations the normalizer unwound.
pub fn display_preview(rows: &[(String, String, Severity)]) {
    if rows.is_empty() {
        println!("No word tokens found.");
        return;
    }

    println!(
        "  {:<20} {:<20} {}",
        "Token".dimmed(),
        "Canonical".dimmed(),
        "Severity".dimmed()
    );
    println!("  {}", "-".repeat(52).dimmed());
    for (token, canonical, severity) in rows {
        let canonical_display = if canonical == token {
            canonical.normal()
        } else {
            canonical.yellow()
        };
        println!(
            "  {:<20} {:<20} {}",
            token,
            canonical_display,
            colorize_severity(*severity)
        );
    }
}

/// Display the global banned-word corpus.
pub fn display_word_list(words: &[BannedWordRow]) {
    if words.is_empty() {
        println!("The global corpus is empty. Run `bleep init` to seed it, or `bleep words add <word>`.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Global banned words ({}) ===", words.len()).bold()
    );
    println!();
    println!(
        "  {:<24} {:<10} {}",
        "Word".dimmed(),
        "Severity".dimmed(),
        "Added".dimmed()
    );
    println!("  {}", "-".repeat(56).dimmed());
    for row in words {
        println!(
            "  {:<24} {:<10} {}",
            row.word,
            colorize_severity(row.severity),
            row.added_at.dimmed()
        );
    }
}

/// Display one tenant's settings and custom word list.
pub fn display_tenant(tenant: &Tenant, words: &[String]) {
    println!("\n{}", format!("=== Tenant '{}' ===", tenant.id).bold());
    println!(
        "  Tolerance: {} ({})",
        tenant.tolerance.level(),
        colorize_severity(tenant.tolerance)
    );
    println!("  Created: {}", tenant.created_at.dimmed());

    if words.is_empty() {
        println!("  Custom words: none");
    } else {
        println!("  Custom words ({}):", words.len());
        for word in words {
            println!("    {}", word.red());
        }
    }
}

/// Display all tenants.
pub fn display_tenant_list(tenants: &[Tenant]) {
    if tenants.is_empty() {
        println!("No tenants registered. Run `bleep tenant set-tolerance <slug> <0-5>` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Tenants ({}) ===", tenants.len()).bold()
    );
    println!();
    println!(
        "  {:<20} {:<12} {}",
        "Slug".dimmed(),
        "Tolerance".dimmed(),
        "Created".dimmed()
    );
    println!("  {}", "-".repeat(52).dimmed());
    for tenant in tenants {
        println!(
            "  {:<20} {:<12} {}",
            tenant.id,
            colorize_severity(tenant.tolerance),
            tenant.created_at.dimmed()
        );
    }
}

/// Display a tenant's recent flagged messages, newest first.
pub fn display_flagged_messages(tenant_id: &str, messages: &[FlaggedMessage]) {
    if messages.is_empty() {
        println!("No flagged messages recorded for tenant '{tenant_id}'.");
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Flagged messages for '{}' ({}) ===",
            tenant_id,
            messages.len()
        )
        .bold()
    );
    println!();

    for message in messages {
        let words: Vec<&str> = message
            .flagged
            .iter()
            .map(|entry| entry.matched.as_str())
            .collect();
        println!(
            "  #{} {} [{}]",
            message.id,
            message.created_at.dimmed(),
            words.join(", ").red()
        );
        println!("    {}", super::truncate_chars(&message.original, 80));
        println!(
            "    {}",
            super::truncate_chars(&message.censored, 80).dimmed()
        );
        println!();
    }
}

/// Colorize a severity level for table display.
fn colorize_severity(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Severe => severity.as_str().red().bold(),
        Severity::Strong => severity.as_str().bright_red(),
        Severity::Moderate | Severity::Crude => severity.as_str().yellow(),
        Severity::Mild => severity.as_str().green(),
        Severity::Benign => severity.as_str().dimmed(),
    }
}
