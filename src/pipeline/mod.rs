// Moderation pipeline — ties the tokenizer, normalizer, severity gate, and
// banned-word matcher together for a single call.
//
// The pipeline is a pure synchronous computation: no I/O, no shared mutable
// state. Callers build a Moderator once, run it from as many threads as they
// like, and hand the flagged list to whatever audit sink they keep.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matcher::{match_token, BannedWordSet, MatchResult, MatchThresholds};
use crate::normalize::{NormalizationRules, Normalizer};
use crate::severity::{Severity, SeverityModel};
use crate::tokenize::{TokenKind, Tokenizer};

/// The tenant a moderation call runs on behalf of. Resolved by the caller
/// layer before the pipeline is invoked; immutable for the duration of the
/// call.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub id: String,
    /// Tokens classified strictly below this severity are exempt from
    /// matching and censorship.
    pub tolerance: Severity,
    /// Tenant-specific additions to the global corpus.
    pub custom_words: BannedWordSet,
}

impl TenantContext {
    pub fn new(id: impl Into<String>, tolerance: Severity) -> Self {
        Self {
            id: id.into(),
            tolerance,
            custom_words: BannedWordSet::default(),
        }
    }

    pub fn with_custom_words(mut self, words: BannedWordSet) -> Self {
        self.custom_words = words;
        self
    }
}

/// One censored token: the lowercased original text and the banned word it
/// matched. Entries appear in order of first occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedWord {
    pub original: String,
    pub matched: String,
}

/// The output of one moderation call. `censored` always has the same
/// character count as the input text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResult {
    pub censored: String,
    pub flagged: Vec<FlaggedWord>,
}

/// The assembled detection pipeline. All state is immutable configuration,
/// so a single instance serves concurrent callers.
pub struct Moderator {
    normalizer: Normalizer,
    tokenizer: Tokenizer,
    thresholds: MatchThresholds,
    censor: char,
}

impl Moderator {
    pub fn new(rules: NormalizationRules, thresholds: MatchThresholds) -> Self {
        let tokenizer = Tokenizer::new(&rules);
        Self {
            normalizer: Normalizer::new(rules),
            tokenizer,
            thresholds,
            censor: '*',
        }
    }

    /// Replace the default `*` censor character.
    pub fn with_censor(mut self, censor: char) -> Self {
        self.censor = censor;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Moderate one text for one tenant.
    ///
    /// Separator tokens pass through untouched. Each word token is
    /// normalized, classified, gated against the tenant's tolerance, and
    /// matched against the union of the global and tenant corpora; a hit is
    /// replaced by a censor run of the same character count, so the output
    /// always lines up with the input character-for-character.
    pub fn moderate(
        &self,
        text: &str,
        tenant: &TenantContext,
        global: &BannedWordSet,
        model: &dyn SeverityModel,
    ) -> Result<ModerationResult> {
        let effective = global.union(&tenant.custom_words);
        let mut censored = String::with_capacity(text.len());
        let mut flagged = Vec::new();

        for token in self.tokenizer.tokenize(text) {
            if token.kind != TokenKind::Word {
                censored.push_str(token.text);
                continue;
            }

            let normalized = self.normalizer.normalize(token.text);
            let severity = model
                .severity(&normalized)
                .with_context(|| format!("Severity classification failed for {:?}", token.text))?;
            if severity < tenant.tolerance {
                censored.push_str(token.text);
                continue;
            }

            match match_token(&normalized, &effective, &self.thresholds) {
                MatchResult::Exact { word } | MatchResult::Fuzzy { word, .. } => {
                    for _ in 0..token.text.chars().count() {
                        censored.push(self.censor);
                    }
                    flagged.push(FlaggedWord {
                        original: token.text.to_lowercase(),
                        matched: word,
                    });
                }
                MatchResult::NoMatch => censored.push_str(token.text),
            }
        }

        debug!(
            tenant = %tenant.id,
            flagged = flagged.len(),
            "Moderation call complete"
        );
        Ok(ModerationResult { censored, flagged })
    }
}

impl Default for Moderator {
    fn default() -> Self {
        Self::new(NormalizationRules::default(), MatchThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use crate::severity::lexicon::LexiconModel;

    fn tenant() -> TenantContext {
        TenantContext::new("acme", Severity::Benign)
    }

    #[test]
    fn test_clean_text_passes_through_unchanged() {
        let moderator = Moderator::default();
        let global = BannedWordSet::from_words(["fuck"]);
        let model = LexiconModel::builtin();

        let result = moderator
            .moderate("hello there, friend", &tenant(), &global, &model)
            .unwrap();
        assert_eq!(result.censored, "hello there, friend");
        assert!(result.flagged.is_empty());
    }

    #[test]
    fn test_flagged_token_is_censored_by_char_count() {
        let moderator = Moderator::default();
        let global = BannedWordSet::from_words(["fuck"]);
        let model = LexiconModel::builtin();

        let result = moderator
            .moderate("Fucking hell", &tenant(), &global, &model)
            .unwrap();
        assert_eq!(result.censored, "******* hell");
        assert_eq!(
            result.flagged,
            vec![FlaggedWord {
                original: "fucking".to_string(),
                matched: "fuck".to_string(),
            }]
        );
    }

    #[test]
    fn test_custom_censor_char() {
        let moderator = Moderator::default().with_censor('#');
        let global = BannedWordSet::from_words(["fuck"]);
        let model = LexiconModel::builtin();

        let result = moderator
            .moderate("fuck", &tenant(), &global, &model)
            .unwrap();
        assert_eq!(result.censored, "####");
    }

    #[test]
    fn test_censoring_counts_chars_not_bytes() {
        let moderator = Moderator::default();
        let global = BannedWordSet::from_words(["héllo"]);
        let model = LexiconModel::builtin();

        // "héllo" is five characters across six bytes
        let result = moderator
            .moderate("héllo.", &tenant(), &global, &model)
            .unwrap();
        assert_eq!(result.censored, "*****.");
        assert_eq!(result.censored.chars().count(), "héllo.".chars().count());
    }

    #[test]
    fn test_tolerance_exempts_low_severity() {
        let moderator = Moderator::default();
        let global = BannedWordSet::from_words(["damn"]);
        let model = LexiconModel::builtin();

        // "damn" is Moderate (3) in the built-in lexicon
        let strict = moderator
            .moderate("damn", &tenant(), &global, &model)
            .unwrap();
        assert_eq!(strict.censored, "****");

        let lax = TenantContext::new("acme", Severity::Strong);
        let result = moderator.moderate("damn", &lax, &global, &model).unwrap();
        assert_eq!(result.censored, "damn");
        assert!(result.flagged.is_empty());
    }

    #[test]
    fn test_tenant_custom_words_extend_global() {
        let moderator = Moderator::default();
        let global = BannedWordSet::from_words(["fuck"]);
        let model = LexiconModel::builtin();

        let ctx = tenant().with_custom_words(BannedWordSet::from_words(["widget"]));
        let result = moderator
            .moderate("widget fuck", &ctx, &global, &model)
            .unwrap();
        assert_eq!(result.censored, "****** ****");
        assert_eq!(result.flagged.len(), 2);
    }

    #[test]
    fn test_empty_text() {
        let moderator = Moderator::default();
        let result = moderator
            .moderate("", &tenant(), &BannedWordSet::default(), &LexiconModel::builtin())
            .unwrap();
        assert_eq!(result.censored, "");
        assert!(result.flagged.is_empty());
    }

    #[test]
    fn test_model_errors_propagate() {
        struct OfflineModel;
        impl SeverityModel for OfflineModel {
            fn severity(&self, _normalized: &str) -> Result<Severity> {
                bail!("model offline")
            }
        }

        let moderator = Moderator::default();
        let global = BannedWordSet::from_words(["fuck"]);
        let err = moderator
            .moderate("anything", &tenant(), &global, &OfflineModel)
            .unwrap_err();
        assert!(err.to_string().contains("Severity classification failed"));
    }
}
