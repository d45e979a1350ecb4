// Lexicon severity model — exact lookup against a word -> severity table.
//
// The default backend. Words absent from the table are Benign, so the
// built-in seed only carries the non-benign entries. Word-store rows can
// override or extend the seed at load time (`with_overrides`).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use super::traits::SeverityModel;
use super::Severity;

/// The built-in seed: terms with a non-benign severity. Kept in one place so
/// `bleep init` can derive its default banned corpus from the same data.
pub fn builtin_entries() -> Vec<(String, Severity)> {
    [
        ("fuck", 5),
        ("shit", 5),
        ("bitch", 5),
        ("ass", 5),
        ("pussy", 5),
        ("dick", 5),
        ("damn", 3),
        ("crap", 3),
        ("heck", 2),
        ("darn", 2),
        ("frick", 2),
        ("dang", 2),
        ("butt", 1),
        ("poop", 1),
    ]
    .into_iter()
    .map(|(word, level)| (word.to_string(), Severity::from_level(level)))
    .collect()
}

pub struct LexiconModel {
    words: HashMap<String, Severity>,
}

impl LexiconModel {
    /// The built-in seed table.
    pub fn builtin() -> Self {
        Self {
            words: builtin_entries().into_iter().collect(),
        }
    }

    /// Load a lexicon from a JSON file: a flat `{"word": level}` map.
    /// Keys are lowercased on load; they must be canonical (normalized)
    /// forms for lookups to hit.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file at {}", path.display()))?;
        let levels: HashMap<String, u8> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse lexicon file at {}", path.display()))?;
        let words = levels
            .into_iter()
            .map(|(word, level)| (word.to_lowercase(), Severity::from_level(level)))
            .collect();
        Ok(Self { words })
    }

    /// Apply per-word overrides on top of the current table. Word-store rows
    /// win over the seed so operators can retune severities without
    /// rebuilding anything.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, Severity)>,
    {
        for (word, severity) in overrides {
            self.words.insert(word.to_lowercase(), severity);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl SeverityModel for LexiconModel {
    fn severity(&self, normalized: &str) -> Result<Severity> {
        Ok(self
            .words
            .get(normalized)
            .copied()
            .unwrap_or(Severity::Benign))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookups() {
        let model = LexiconModel::builtin();
        assert_eq!(model.severity("fuck").unwrap(), Severity::Severe);
        assert_eq!(model.severity("damn").unwrap(), Severity::Moderate);
        assert_eq!(model.severity("heck").unwrap(), Severity::Crude);
        assert_eq!(model.severity("poop").unwrap(), Severity::Mild);
    }

    #[test]
    fn test_unknown_words_are_benign() {
        let model = LexiconModel::builtin();
        assert_eq!(model.severity("hello").unwrap(), Severity::Benign);
        assert_eq!(model.severity("").unwrap(), Severity::Benign);
        // Inflected forms the table doesn't carry fall through to benign
        assert_eq!(model.severity("fucking").unwrap(), Severity::Benign);
    }

    #[test]
    fn test_overrides_win() {
        let model = LexiconModel::builtin()
            .with_overrides([("damn".to_string(), Severity::Severe)]);
        assert_eq!(model.severity("damn").unwrap(), Severity::Severe);
        // Overrides can add new words too
        let model = model.with_overrides([("Widget".to_string(), Severity::Strong)]);
        assert_eq!(model.severity("widget").unwrap(), Severity::Strong);
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join("bleep-lexicon-test.json");
        std::fs::write(&path, r#"{"Frak": 4, "gosh": 1}"#).unwrap();
        let model = LexiconModel::from_path(&path).unwrap();
        assert_eq!(model.severity("frak").unwrap(), Severity::Strong);
        assert_eq!(model.severity("gosh").unwrap(), Severity::Mild);
        assert_eq!(model.severity("fuck").unwrap(), Severity::Benign);
        std::fs::remove_file(&path).ok();
    }
}
