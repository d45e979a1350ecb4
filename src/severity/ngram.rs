// Char-ngram severity model — a trained linear classifier over hashed
// character 1- and 2-gram counts.
//
// Unlike the lexicon this generalizes to unseen variants ("fuckin",
// "shitty") because nearby spellings share most of their grams. The model
// file is JSON, written by `bleep train`; loading validates the format
// version and feature dimension up front so a stale file fails loudly
// instead of misclassifying quietly.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::traits::SeverityModel;
use super::Severity;

/// Number of hash buckets for gram counts. Changing this invalidates every
/// trained model, which is why the file records it.
pub const FEATURE_DIM: usize = 512;

/// Bump when the file layout or feature extraction changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Number of severity classes (levels 0 through 5).
pub const CLASS_COUNT: usize = 6;

/// Serialized model: one weight row and bias per severity level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramModelFile {
    pub version: u32,
    pub feature_dim: usize,
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub trained_at: DateTime<Utc>,
    pub examples: usize,
}

#[derive(Debug)]
pub struct CharNgramModel {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl CharNgramModel {
    /// Load a trained model from disk, validating shape and version.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Severity model not found at {}\n\
                 Run `bleep train` to fit one, or set BLEEP_MODEL=lexicon to use the lexicon backend.",
                path.display()
            );
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file at {}", path.display()))?;
        let file: NgramModelFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse model file at {}", path.display()))?;
        Self::from_file(file)
    }

    /// Validate a parsed model file and build the scorer.
    pub fn from_file(file: NgramModelFile) -> Result<Self> {
        if file.version != MODEL_FORMAT_VERSION {
            bail!(
                "Severity model format v{} is not supported (expected v{}).\n\
                 Re-run `bleep train` to produce a current model.",
                file.version,
                MODEL_FORMAT_VERSION
            );
        }
        if file.feature_dim != FEATURE_DIM {
            bail!(
                "Severity model was trained with {} feature buckets (expected {}).\n\
                 Re-run `bleep train` to produce a current model.",
                file.feature_dim,
                FEATURE_DIM
            );
        }
        if file.weights.len() != CLASS_COUNT
            || file.bias.len() != CLASS_COUNT
            || file.weights.iter().any(|row| row.len() != FEATURE_DIM)
        {
            bail!("Severity model file is malformed: wrong weight matrix shape");
        }
        Ok(Self {
            weights: file.weights,
            bias: file.bias,
        })
    }

    fn classify(&self, word: &str) -> Severity {
        let feat = features(word);
        let mut best_level = 0u8;
        let mut best_score = f32::NEG_INFINITY;
        for (level, (row, bias)) in self.weights.iter().zip(&self.bias).enumerate() {
            let score: f32 = row.iter().zip(&feat).map(|(w, f)| w * f).sum::<f32>() + bias;
            // Strict improvement only, so ties resolve to the lower level
            if score > best_score {
                best_score = score;
                best_level = level as u8;
            }
        }
        Severity::from_level(best_level)
    }
}

impl SeverityModel for CharNgramModel {
    fn severity(&self, normalized: &str) -> Result<Severity> {
        Ok(self.classify(normalized))
    }
}

/// Hashed, L2-normalized character 1- and 2-gram counts.
pub fn features(word: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; FEATURE_DIM];
    let chars: Vec<char> = word.chars().collect();

    let mut buf = [0u8; 8];
    for c in &chars {
        let len = c.encode_utf8(&mut buf).len();
        vector[bucket(&buf[..len])] += 1.0;
    }
    for pair in chars.windows(2) {
        let first = pair[0].encode_utf8(&mut buf).len();
        let second = pair[1].encode_utf8(&mut buf[first..]).len();
        vector[bucket(&buf[..first + second])] += 1.0;
    }

    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

/// FNV-1a over the gram bytes, folded into the feature range. Deterministic
/// across runs and platforms — a model trained anywhere loads anywhere.
fn bucket(bytes: &[u8]) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    (hash % FEATURE_DIM as u64) as usize
}
