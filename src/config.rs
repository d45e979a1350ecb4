use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use tracing::warn;

use crate::matcher::MatchThresholds;
use crate::normalize::NormalizationRules;
use crate::severity::Severity;

/// Which severity model backend classifies tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    /// Word-level lexicon (default) — no model file needed
    Lexicon,
    /// Trained char-ngram model — requires a model file from `bleep train`
    Ngram,
}

impl ModelBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelBackend::Lexicon => "lexicon",
            ModelBackend::Ngram => "ngram",
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Everything
/// has a usable default, so `bleep` runs with no configuration at all;
/// numeric variables that fail to parse fall back to their defaults with a
/// warning rather than aborting.
pub struct Config {
    pub db_path: String,
    /// Which severity model to use (BLEEP_MODEL: "lexicon" or "ngram")
    pub model_backend: ModelBackend,
    /// Path of the trained char-ngram model file (BLEEP_MODEL_PATH)
    pub model_path: PathBuf,
    /// Optional custom normalization rule table, JSON (BLEEP_RULES_PATH)
    pub rules_path: Option<PathBuf>,
    /// Optional lexicon file replacing the built-in one (BLEEP_LEXICON_PATH)
    pub lexicon_path: Option<PathBuf>,
    /// Whole-string fuzzy threshold (BLEEP_RATIO_THRESHOLD, default 85)
    pub ratio_threshold: f64,
    /// Partial-ratio fuzzy threshold (BLEEP_PARTIAL_THRESHOLD, default 90)
    pub partial_threshold: f64,
    /// Minimum token/word length for fuzzy matching (BLEEP_MIN_FUZZY_LEN)
    pub min_fuzzy_len: usize,
    /// Tolerance given to tenants created implicitly, e.g. by
    /// `tenant add-word` on a new slug (BLEEP_DEFAULT_TOLERANCE, default 0)
    pub default_tolerance: Severity,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let model_backend = match env::var("BLEEP_MODEL").as_deref() {
            Ok("ngram") => ModelBackend::Ngram,
            // "lexicon" or unset both default to the lexicon
            _ => ModelBackend::Lexicon,
        };

        let data_dir = default_data_dir();
        let db_path = env::var("BLEEP_DB_PATH")
            .unwrap_or_else(|_| data_dir.join("bleep.db").to_string_lossy().into_owned());
        let model_path = env::var("BLEEP_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("model.json"));

        Ok(Self {
            db_path,
            model_backend,
            model_path,
            rules_path: env::var("BLEEP_RULES_PATH").ok().map(PathBuf::from),
            lexicon_path: env::var("BLEEP_LEXICON_PATH").ok().map(PathBuf::from),
            ratio_threshold: parse_env_or("BLEEP_RATIO_THRESHOLD", 85.0),
            partial_threshold: parse_env_or("BLEEP_PARTIAL_THRESHOLD", 90.0),
            min_fuzzy_len: parse_env_or("BLEEP_MIN_FUZZY_LEN", 3),
            default_tolerance: Severity::from_level(parse_env_or("BLEEP_DEFAULT_TOLERANCE", 0u8)),
        })
    }

    /// The fuzzy-matching thresholds in effect.
    pub fn thresholds(&self) -> MatchThresholds {
        MatchThresholds {
            ratio: self.ratio_threshold,
            partial: self.partial_threshold,
            min_fuzzy_len: self.min_fuzzy_len,
        }
    }

    /// The normalization rule table in effect: the file named by
    /// BLEEP_RULES_PATH, or the built-in default table.
    pub fn rules(&self) -> Result<NormalizationRules> {
        match &self.rules_path {
            Some(path) => NormalizationRules::from_path(path),
            None => Ok(NormalizationRules::default()),
        }
    }
}

/// Parse an env var, falling back to the default when the value doesn't
/// parse. Absent variables fall back silently; present-but-broken ones warn.
fn parse_env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparseable {name}={raw}; using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}

/// Platform data directory for the database and model files
/// (~/.local/share/bleep on Linux). Falls back to the working directory on
/// platforms without one.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("bleep"))
        .unwrap_or_else(|| PathBuf::from("."))
}
