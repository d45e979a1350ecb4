// Normalizer — collapses obfuscation into a canonical lowercase form.
//
// The pass order matters: glyph substitution runs before separator stripping
// because patterns like |\| contain the glyphs themselves, and stripping can
// butt two pipe halves together (|_| -> ||), so the substitution pass runs a
// second time afterwards. Repeated-run collapse and misspelling correction
// come last, on letters only.

pub mod rules;

pub use rules::{NormalizationRules, RulesFile, SubstitutionRule};

/// Maps a raw token to its canonical form. Pure and total — unmappable
/// input passes through unchanged after whichever rules applied.
pub struct Normalizer {
    rules: NormalizationRules,
}

impl Normalizer {
    pub fn new(rules: NormalizationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NormalizationRules {
        &self.rules
    }

    /// Normalize one token: lowercase, substitute glyphs, strip separator
    /// characters, substitute again, collapse repeated runs, correct known
    /// misspellings. Idempotent for the built-in table.
    pub fn normalize(&self, token: &str) -> String {
        let lowered = token.to_lowercase();
        let substituted = self.rules.apply_substitutions(&lowered);
        let stripped = strip_separators(&substituted);
        // Stripping can rejoin digraph halves (|_| becomes ||), so the
        // substitution pass gets one more look at the result.
        let substituted = self.rules.apply_substitutions(&stripped);
        let collapsed = collapse_runs(&substituted);
        self.rules.correct(collapsed)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizationRules::default())
    }
}

/// Remove embedded underscores/hyphens, collapse whitespace runs to a single
/// space, and trim.
fn strip_separators(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for c in input.chars() {
        if c == '_' || c == '-' {
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }
    out
}

/// Collapse any run of 3 or more identical characters to a single occurrence.
/// Runs of exactly 2 are kept — doubled letters are legitimate ("ass",
/// "shell").
fn collapse_runs(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1usize;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        if run >= 3 {
            out.push(c);
        } else {
            for _ in 0..run {
                out.push(c);
            }
        }
    }
    out
}
