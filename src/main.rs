use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

use bleep::config::{Config, ModelBackend};
use bleep::matcher::BannedWordSet;
use bleep::pipeline::{Moderator, TenantContext};
use bleep::severity::lexicon::LexiconModel;
use bleep::severity::ngram::CharNgramModel;
use bleep::severity::{Severity, SeverityModel};
use bleep::tokenize::TokenKind;

/// Bleep: multi-tenant text moderation.
///
/// Detects banned words hidden behind leetspeak, separators, and
/// misspellings; censors them in place without changing the text's length;
/// and keeps a per-tenant audit trail of everything it flagged.
#[derive(Parser)]
#[command(name = "bleep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and seed the default corpus
    Init,

    /// Moderate a text on behalf of a tenant
    Moderate {
        /// Tenant slug (register one with `tenant set-tolerance`)
        #[arg(long)]
        tenant: String,

        /// The text to moderate
        text: String,

        /// Override the tenant's stored tolerance for this call (0-5)
        #[arg(long)]
        tolerance: Option<u8>,

        /// Print the result as JSON instead of the table view
        #[arg(long)]
        json: bool,
    },

    /// Preview tokenization and normalization without touching the store
    Preview {
        /// The text to preview
        text: String,
    },

    /// Administer the global banned-word corpus
    Words {
        #[command(subcommand)]
        action: WordsAction,
    },

    /// Administer tenants and their custom word lists
    Tenant {
        #[command(subcommand)]
        action: TenantAction,
    },

    /// Show recent flagged messages for a tenant
    Flagged {
        /// Tenant slug
        #[arg(long)]
        tenant: String,

        /// Max entries to show (default: 20)
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Show system status (database, corpus, model backend)
    Status,

    /// Fit the char-ngram severity model offline
    Train {
        /// Where to write the model file (default: the configured model path)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Labeled dataset as a JSON word->level map (default: built-in seed)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum WordsAction {
    /// Add a word to the global corpus
    Add {
        word: String,

        /// Severity the lexicon model reports for this word (0-5, default 5)
        #[arg(long)]
        severity: Option<u8>,
    },

    /// Remove a word from the global corpus
    Remove { word: String },

    /// List the global corpus
    List,

    /// Bulk-import words from a JSON word->severity map
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum TenantAction {
    /// Create a tenant, or update an existing tenant's tolerance (0-5)
    SetTolerance { slug: String, tolerance: u8 },

    /// Add a custom banned word for one tenant
    AddWord { slug: String, word: String },

    /// Remove one of a tenant's custom words
    RemoveWord { slug: String, word: String },

    /// Show a tenant's tolerance and custom words
    Show { slug: String },

    /// List all tenants
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bleep=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing bleep database...");
            let config = Config::load()?;
            let db = bleep::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;

            let mut seeded = 0;
            for (word, severity) in bleep::severity::lexicon::builtin_entries() {
                if db.add_banned_word(&word, severity).await? {
                    seeded += 1;
                }
            }

            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("Seed words added: {seeded}");
            println!("\nBleep is ready. Next steps:");
            println!("  bleep tenant set-tolerance demo 0");
            println!("  bleep moderate --tenant demo \"f@ck you\"");
        }

        Commands::Moderate {
            tenant,
            text,
            tolerance,
            json,
        } => {
            let config = Config::load()?;
            let db = bleep::db::open_sqlite(&config.db_path)?;

            let tenant_row = match db.get_tenant(&tenant).await? {
                Some(row) => row,
                None => {
                    let known: Vec<String> = db
                        .list_tenants()
                        .await?
                        .into_iter()
                        .map(|t| t.id)
                        .collect();
                    if known.is_empty() {
                        bail!(
                            "Unknown tenant '{tenant}' and no tenants are registered yet.\n\
                             Run `bleep tenant set-tolerance {tenant} <0-5>` first."
                        );
                    }
                    bail!(
                        "Unknown tenant '{tenant}'. Known tenants: {}.\n\
                         Run `bleep tenant set-tolerance {tenant} <0-5>` to register it.",
                        known.join(", ")
                    );
                }
            };

            let effective_tolerance = match tolerance {
                Some(level) => parse_severity(level)?,
                None => tenant_row.tolerance,
            };
            let custom = BannedWordSet::from_words(db.get_tenant_words(&tenant).await?);
            let context =
                TenantContext::new(&tenant, effective_tolerance).with_custom_words(custom);

            let rows = db.get_banned_words().await?;
            let global = BannedWordSet::from_words(rows.iter().map(|row| row.word.as_str()));
            let overrides: Vec<(String, Severity)> = rows
                .into_iter()
                .map(|row| (row.word, row.severity))
                .collect();
            let model = build_model(&config, overrides)?;

            let moderator = Moderator::new(config.rules()?, config.thresholds());
            let result = moderator.moderate(&text, &context, &global, model.as_ref())?;

            if !result.flagged.is_empty() {
                let id = db.record_flagged_message(&tenant, &text, &result).await?;
                info!(
                    id,
                    tenant = %tenant,
                    flagged = result.flagged.len(),
                    "Recorded flagged message"
                );
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                bleep::output::terminal::display_moderation(&result);
            }
        }

        Commands::Preview { text } => {
            let config = Config::load()?;
            let model = build_model(&config, Vec::new())?;
            let moderator = Moderator::new(config.rules()?, config.thresholds());

            let mut rows = Vec::new();
            for token in moderator.tokenizer().tokenize(&text) {
                if token.kind != TokenKind::Word {
                    continue;
                }
                let canonical = moderator.normalizer().normalize(token.text);
                let severity = model.severity(&canonical)?;
                rows.push((token.text.to_string(), canonical, severity));
            }
            bleep::output::terminal::display_preview(&rows);
        }

        Commands::Words { action } => {
            let config = Config::load()?;
            let db = bleep::db::open_sqlite(&config.db_path)?;

            match action {
                WordsAction::Add { word, severity } => {
                    let level = match severity {
                        Some(raw) => parse_severity(raw)?,
                        None => Severity::Severe,
                    };
                    if db.add_banned_word(&word, level).await? {
                        println!(
                            "Added '{}' to the global corpus (severity {}).",
                            word.to_lowercase(),
                            level
                        );
                    } else if severity.is_some() {
                        db.set_word_severity(&word, level).await?;
                        println!(
                            "'{}' was already banned; severity updated to {}.",
                            word.to_lowercase(),
                            level
                        );
                    } else {
                        println!("'{}' is already in the global corpus.", word.to_lowercase());
                    }
                }

                WordsAction::Remove { word } => {
                    if db.remove_banned_word(&word).await? {
                        println!("Removed '{}' from the global corpus.", word.to_lowercase());
                    } else {
                        println!("'{}' is not in the global corpus.", word.to_lowercase());
                    }
                }

                WordsAction::List => {
                    let words = db.get_banned_words().await?;
                    bleep::output::terminal::display_word_list(&words);
                }

                WordsAction::Import { file } => {
                    let raw = std::fs::read_to_string(&file)
                        .with_context(|| format!("Failed to read word list at {}", file.display()))?;
                    let levels: HashMap<String, u8> = serde_json::from_str(&raw)
                        .with_context(|| format!("Failed to parse word list at {}", file.display()))?;
                    let mut entries: Vec<(String, u8)> = levels.into_iter().collect();
                    entries.sort();

                    let pb = ProgressBar::new(entries.len() as u64);
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("  Importing [{bar:30}] {pos}/{len} ({eta})")
                            .unwrap(),
                    );

                    let mut added = 0usize;
                    let mut skipped = 0usize;
                    for (word, level) in entries {
                        if db
                            .add_banned_word(&word, Severity::from_level(level))
                            .await?
                        {
                            added += 1;
                        } else {
                            skipped += 1;
                        }
                        pb.inc(1);
                    }
                    pb.finish_and_clear();

                    println!("Imported {added} words ({skipped} duplicates skipped).");
                }
            }
        }

        Commands::Tenant { action } => {
            let config = Config::load()?;
            let db = bleep::db::open_sqlite(&config.db_path)?;

            match action {
                TenantAction::SetTolerance { slug, tolerance } => {
                    let level = parse_severity(tolerance)?;
                    db.upsert_tenant(&slug, level).await?;
                    println!(
                        "Tenant '{slug}' tolerance set to {} ({}).",
                        level.level(),
                        level
                    );
                }

                TenantAction::AddWord { slug, word } => {
                    if db.get_tenant(&slug).await?.is_none() {
                        db.upsert_tenant(&slug, config.default_tolerance).await?;
                        println!(
                            "Tenant '{slug}' created with default tolerance {}.",
                            config.default_tolerance.level()
                        );
                    }
                    if db.add_tenant_word(&slug, &word).await? {
                        println!("Added '{}' to tenant '{slug}'.", word.to_lowercase());
                    } else {
                        println!(
                            "'{}' is already on tenant '{slug}'s list.",
                            word.to_lowercase()
                        );
                    }
                }

                TenantAction::RemoveWord { slug, word } => {
                    if db.remove_tenant_word(&slug, &word).await? {
                        println!("Removed '{}' from tenant '{slug}'.", word.to_lowercase());
                    } else {
                        println!(
                            "'{}' is not on tenant '{slug}'s list.",
                            word.to_lowercase()
                        );
                    }
                }

                TenantAction::Show { slug } => match db.get_tenant(&slug).await? {
                    Some(tenant) => {
                        let words = db.get_tenant_words(&slug).await?;
                        bleep::output::terminal::display_tenant(&tenant, &words);
                    }
                    None => bail!(
                        "Unknown tenant '{slug}'. Run `bleep tenant set-tolerance {slug} <0-5>` to create it."
                    ),
                },

                TenantAction::List => {
                    let tenants = db.list_tenants().await?;
                    bleep::output::terminal::display_tenant_list(&tenants);
                }
            }
        }

        Commands::Flagged { tenant, limit } => {
            let config = Config::load()?;
            let db = bleep::db::open_sqlite(&config.db_path)?;
            let messages = db.get_flagged_messages(&tenant, limit).await?;
            bleep::output::terminal::display_flagged_messages(&tenant, &messages);
        }

        Commands::Status => {
            let config = Config::load()?;
            if !std::path::Path::new(&config.db_path).exists() {
                println!("Database: not initialized");
                println!("\nRun `bleep init` to set up the database.");
                return Ok(());
            }
            let db = bleep::db::open_sqlite(&config.db_path)?;
            bleep::status::show(&db, &config.db_path, config.model_backend.as_str()).await?;
        }

        Commands::Train { output, dataset } => {
            let config = Config::load()?;
            let examples = match dataset {
                Some(path) => bleep::severity::train::load_dataset(&path)?,
                None => bleep::severity::train::builtin_dataset(),
            };
            println!(
                "Training char-ngram severity model on {} examples...",
                examples.len()
            );

            let normalizer = bleep::normalize::Normalizer::new(config.rules()?);
            let model_file = bleep::severity::train::train(
                &normalizer,
                &examples,
                &bleep::severity::train::TrainOptions::default(),
            );

            let out_path = output.unwrap_or_else(|| config.model_path.clone());
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create directory for model file: {}", out_path.display())
                    })?;
                }
            }
            std::fs::write(&out_path, serde_json::to_string_pretty(&model_file)?)
                .with_context(|| format!("Failed to write model file to {}", out_path.display()))?;

            println!("Model written to: {}", out_path.display());
            println!("  Trained at: {}", model_file.trained_at);
            println!("\nTo classify with it, set:");
            println!("  {}", "export BLEEP_MODEL=ngram".bold());
            println!("  export BLEEP_MODEL_PATH={}", out_path.display());
        }
    }

    Ok(())
}

/// Validate a user-supplied severity level.
fn parse_severity(level: u8) -> Result<Severity> {
    if level > 5 {
        bail!("Severity must be between 0 (benign) and 5 (severe), got {level}");
    }
    Ok(Severity::from_level(level))
}

/// Build the configured severity model.
///
/// The lexicon backend layers the store's per-word severities over the
/// built-in (or file-based) lexicon; the ngram backend loads its trained
/// model file.
fn build_model(
    config: &Config,
    overrides: Vec<(String, Severity)>,
) -> Result<Box<dyn SeverityModel>> {
    match config.model_backend {
        ModelBackend::Lexicon => {
            let base = match &config.lexicon_path {
                Some(path) => LexiconModel::from_path(path)?,
                None => LexiconModel::builtin(),
            };
            Ok(Box::new(base.with_overrides(overrides)))
        }
        ModelBackend::Ngram => {
            info!(
                "Using char-ngram severity model from {}",
                config.model_path.display()
            );
            Ok(Box::new(CharNgramModel::load(&config.model_path)?))
        }
    }
}
