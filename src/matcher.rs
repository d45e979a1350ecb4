// Banned-word matching — exact set membership first, then fuzzy similarity.
//
// Fuzzy scoring computes two Levenshtein-based ratios, both normalized to
// 0-100: a whole-string ratio and a partial ratio that slides the shorter
// string across the longer one (so "fucking" scores 100 against "fuck").
// Before any O(len^2) edit distance runs, candidates are blocked on cheap
// length and character-class bounds; with a corpus of a few thousand words
// the full scoring only ever touches a handful of survivors per token.

use std::collections::HashSet;

use strsim::levenshtein;

/// One banned word plus its precomputed blocking keys.
#[derive(Debug, Clone)]
struct BannedEntry {
    word: String,
    /// Character count — censoring and all similarity bounds are char-based.
    len: usize,
    /// Character-class bitmask for the partial-ratio pre-filter.
    mask: u32,
}

/// The banned-word corpus a moderation call matches against.
///
/// Words are lowercased, trimmed, and deduplicated on construction, and the
/// entries are stored sorted — iteration order, and therefore fuzzy
/// tie-breaking, is deterministic. The union of the global and tenant tiers
/// is idempotent and reuses each side's precomputed blocking keys.
#[derive(Debug, Clone, Default)]
pub struct BannedWordSet {
    entries: Vec<BannedEntry>,
    index: HashSet<String>,
}

impl BannedWordSet {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical: Vec<String> = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        canonical.sort();
        canonical.dedup();

        let index = canonical.iter().cloned().collect();
        let entries = canonical
            .into_iter()
            .map(|word| {
                let len = word.chars().count();
                let mask = char_mask(&word);
                BannedEntry { word, len, mask }
            })
            .collect();

        Self { entries, index }
    }

    /// Merge two tiers into the effective set for one call.
    pub fn union(&self, other: &BannedWordSet) -> BannedWordSet {
        let mut entries: Vec<BannedEntry> = self
            .entries
            .iter()
            .chain(&other.entries)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.word.cmp(&b.word));
        entries.dedup_by(|a, b| a.word == b.word);

        let index = entries.iter().map(|entry| entry.word.clone()).collect();
        BannedWordSet { entries, index }
    }

    /// Case-sensitive membership — callers pass already-lowercased tokens.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stored words in sorted order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.word.as_str())
    }
}

/// Fuzzy-matching thresholds. Configuration, not constants — deployments
/// tune these per corpus via the BLEEP_* variables.
#[derive(Debug, Clone)]
pub struct MatchThresholds {
    /// Whole-string ratio at or above this declares a match (default 85.0).
    pub ratio: f64,
    /// Partial ratio at or above this declares a match (default 90.0).
    /// This is the containment path: "fucking" vs banned "fuck" scores 100.
    pub partial: f64,
    /// Tokens or banned words with fewer characters than this never
    /// fuzzy-match (default 3). Tiny strings make the partial ratio
    /// degenerate — "a" would score 100 against anything containing an "a".
    pub min_fuzzy_len: usize,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            ratio: 85.0,
            partial: 90.0,
            min_fuzzy_len: 3,
        }
    }
}

/// Outcome of matching one normalized token. A token yields at most one
/// result; exact membership always wins over fuzzy scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    NoMatch,
    Exact { word: String },
    Fuzzy { word: String, score: f64 },
}

impl MatchResult {
    /// The banned word that matched, if any.
    pub fn matched_word(&self) -> Option<&str> {
        match self {
            MatchResult::NoMatch => None,
            MatchResult::Exact { word } | MatchResult::Fuzzy { word, .. } => Some(word),
        }
    }
}

/// Whole-string similarity on an edit-distance basis:
/// `100 * (len_a + len_b - levenshtein(a, b)) / (len_a + len_b)`.
///
/// Length-sum normalization is what puts one substitution in a four-letter
/// word at 87.5 rather than 75 — "fack" has to clear the default threshold
/// of 85 against "fuck". Two empty strings are identical, so 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 100.0;
    }
    let distance = levenshtein(a, b);
    100.0 * (total - distance) as f64 / total as f64
}

/// Best whole-string ratio of the shorter string against every contiguous
/// same-length character window of the longer string. Equal-length inputs
/// degrade to plain [`ratio`].
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    if short_len == 0 {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    // Char boundary offsets so windows slice cleanly on multibyte input
    let bounds: Vec<usize> = long
        .char_indices()
        .map(|(offset, _)| offset)
        .chain([long.len()])
        .collect();
    let long_len = bounds.len() - 1;

    let mut best = 0.0f64;
    for start in 0..=(long_len - short_len) {
        let window = &long[bounds[start]..bounds[start + short_len]];
        let score = ratio(short, window);
        if score > best {
            best = score;
        }
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Match a normalized token against the corpus: exact membership, then
/// fuzzy scoring over pre-filtered candidates.
///
/// The tie-break among qualifying banned words is deterministic: the highest
/// `max(ratio, partial)` score wins, and equal scores go to the
/// lexicographically smallest word. Entries iterate in sorted order, so the
/// first qualifier at a given score is already the smallest.
pub fn match_token(
    normalized: &str,
    banned: &BannedWordSet,
    thresholds: &MatchThresholds,
) -> MatchResult {
    if banned.contains(normalized) {
        return MatchResult::Exact {
            word: normalized.to_string(),
        };
    }

    let token_len = normalized.chars().count();
    if token_len < thresholds.min_fuzzy_len {
        return MatchResult::NoMatch;
    }
    let token_mask = char_mask(normalized);

    let mut best: Option<(f64, &BannedEntry)> = None;
    for entry in &banned.entries {
        if entry.len < thresholds.min_fuzzy_len {
            continue;
        }
        // Blocking: skip candidates that cannot reach either threshold.
        // Qualification needs only one of the two paths, so a candidate
        // survives if either bound leaves its threshold reachable.
        if !ratio_reachable(token_len, entry.len, thresholds.ratio)
            && !partial_reachable(token_len, token_mask, entry, thresholds.partial)
        {
            continue;
        }

        let whole = ratio(normalized, &entry.word);
        let partial = partial_ratio(normalized, &entry.word);
        if whole >= thresholds.ratio || partial >= thresholds.partial {
            let score = whole.max(partial);
            let better = match best {
                None => true,
                Some((best_score, _)) => score > best_score,
            };
            if better {
                best = Some((score, entry));
            }
        }
    }

    match best {
        Some((score, entry)) => MatchResult::Fuzzy {
            word: entry.word.clone(),
            score,
        },
        None => MatchResult::NoMatch,
    }
}

/// The best ratio two strings of these lengths can reach is
/// `200 * min / (len_a + len_b)`, since the edit distance is at least the
/// length difference.
fn ratio_reachable(len_a: usize, len_b: usize, threshold: f64) -> bool {
    let total = len_a + len_b;
    if total == 0 {
        return true;
    }
    200.0 * len_a.min(len_b) as f64 / total as f64 >= threshold
}

/// Partial-ratio bound from character classes: every class present in the
/// shorter side but absent from the longer side forces at least one edit in
/// the best window, so `100 * (2*min - missing) / (2*min)` caps the score.
/// Classes are coarse (letters exact, digits and everything else bucketed),
/// which only weakens the bound — never unsound.
fn partial_reachable(token_len: usize, token_mask: u32, entry: &BannedEntry, threshold: f64) -> bool {
    let min_len = token_len.min(entry.len);
    if min_len == 0 {
        return false;
    }
    let missing = if entry.len <= token_len {
        (entry.mask & !token_mask).count_ones()
    } else {
        (token_mask & !entry.mask).count_ones()
    };
    let cap = 100.0 * ((2 * min_len) as f64 - f64::from(missing)) / (2 * min_len) as f64;
    cap >= threshold
}

/// Character-class bitmask: bits 0-25 for lowercase ascii letters, 26 for
/// ascii digits, 27 for anything else.
fn char_mask(word: &str) -> u32 {
    let mut mask = 0u32;
    for c in word.chars() {
        let bit = match c {
            'a'..='z' => c as u32 - 'a' as u32,
            '0'..='9' => 26,
            _ => 27,
        };
        mask |= 1 << bit;
    }
    mask
}
