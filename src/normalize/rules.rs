// Normalization rule tables — the configuration data behind the Normalizer.
//
// Substitution rules and the misspelling table are explicit values passed in
// at construction, never module-level globals. A deployment can ship its own
// table as JSON; the built-in default covers the common leetspeak glyphs.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One obfuscation-glyph substitution: every occurrence of `pattern` in the
/// lower-cased token is replaced by `replacement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub pattern: String,
    pub replacement: String,
}

/// On-disk shape of a rule table. Parsed and then handed to
/// [`NormalizationRules::new`], which establishes the ordering invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesFile {
    pub substitutions: Vec<SubstitutionRule>,
    #[serde(default)]
    pub misspellings: HashMap<String, String>,
}

/// The full rule set the Normalizer runs with.
///
/// Substitutions are kept sorted by descending pattern length (stable within
/// equal lengths), so a multi-character pattern like `\/\/` is always tried
/// before a shorter pattern it contains, like `/\/`. Trying the shorter one
/// first would split the glyph and produce the wrong letter.
#[derive(Debug, Clone)]
pub struct NormalizationRules {
    substitutions: Vec<SubstitutionRule>,
    misspellings: HashMap<String, String>,
}

impl NormalizationRules {
    /// Build a rule set, sorting substitutions into priority order.
    pub fn new(
        mut substitutions: Vec<SubstitutionRule>,
        misspellings: HashMap<String, String>,
    ) -> Self {
        substitutions.sort_by_key(|rule| std::cmp::Reverse(rule.pattern.chars().count()));
        Self {
            substitutions,
            misspellings,
        }
    }

    /// Load a rule table from a JSON file (see [`RulesFile`] for the shape).
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file at {}", path.display()))?;
        let file: RulesFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse rules file at {}", path.display()))?;
        Ok(Self::new(file.substitutions, file.misspellings))
    }

    /// The non-alphanumeric characters appearing in substitution patterns.
    ///
    /// The tokenizer treats these as word characters, so the word alphabet
    /// stays in lockstep with whatever glyphs the rule table can decode.
    pub fn word_symbols(&self) -> HashSet<char> {
        self.substitutions
            .iter()
            .flat_map(|rule| rule.pattern.chars())
            .filter(|c| !c.is_alphanumeric())
            .collect()
    }

    /// Run every substitution rule, in priority order, over the input.
    pub(crate) fn apply_substitutions(&self, input: &str) -> String {
        let mut out = input.to_string();
        for rule in &self.substitutions {
            if out.contains(&rule.pattern) {
                out = out.replace(&rule.pattern, &rule.replacement);
            }
        }
        out
    }

    /// Exact-lookup misspelling correction. Not a spell-checker — the table
    /// is a finite, explicitly maintained list keyed on post-substitution
    /// strings.
    pub(crate) fn correct(&self, word: String) -> String {
        match self.misspellings.get(&word) {
            Some(canonical) => canonical.clone(),
            None => word,
        }
    }

    pub fn substitution_count(&self) -> usize {
        self.substitutions.len()
    }

    pub fn misspelling_count(&self) -> usize {
        self.misspellings.len()
    }
}

impl Default for NormalizationRules {
    /// The built-in table. Multi-character glyphs first for readability,
    /// though `new` re-sorts regardless of declaration order.
    fn default() -> Self {
        let substitutions = [
            // Slash and pipe digraphs. `\/\/` must outrank `/\/` because the
            // shorter pattern is contained in the longer one.
            ("\\/\\/", "w"),
            ("/\\/", "n"),
            ("|\\|", "n"),
            ("||", "n"),
            // Single-character glyphs
            ("@", "a"),
            ("4", "a"),
            ("3", "e"),
            ("1", "i"),
            ("!", "i"),
            ("0", "o"),
            ("$", "s"),
            ("5", "s"),
            ("7", "t"),
            ("9", "g"),
            ("(", "c"),
            (")", "c"),
            ("\\", "l"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| SubstitutionRule {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        })
        .collect();

        let misspellings = [
            ("fukc", "fuck"),
            ("fcuk", "fuck"),
            ("shyt", "shit"),
            ("biatch", "bitch"),
        ]
        .into_iter()
        .map(|(wrong, canonical)| (wrong.to_string(), canonical.to_string()))
        .collect();

        Self::new(substitutions, misspellings)
    }
}
