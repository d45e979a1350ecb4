// Severity model trait — the swap-ready abstraction.
//
// Any implementation that maps a normalized token to a consistent ordinal
// severity fits: the built-in lexicon lookup, the trained char-ngram model,
// or a caller's own table. The pipeline never knows which one it has.

use anyhow::Result;

use super::Severity;

/// Classifies a normalized token on the 0-5 severity scale.
///
/// Classification is pure for a fixed model snapshot; the Result exists
/// because a backing model can be missing or corrupt, and that failure must
/// surface rather than silently disabling tolerance filtering.
pub trait SeverityModel: Send + Sync {
    fn severity(&self, normalized: &str) -> Result<Severity>;
}
