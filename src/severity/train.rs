// Offline trainer for the char-ngram severity model.
//
// A multiclass averaged perceptron over the hashed gram features. Small
// enough to fit the seed dataset in milliseconds, and deterministic by
// construction: fixed epoch count, shuffle driven by a seeded LCG, examples
// sorted before training. Two runs over the same dataset produce the same
// weights.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::lexicon;
use super::ngram::{features, NgramModelFile, CLASS_COUNT, FEATURE_DIM, MODEL_FORMAT_VERSION};
use super::Severity;
use crate::normalize::Normalizer;

/// One labeled example: a word and the severity assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub word: String,
    pub severity: Severity,
}

/// Training knobs. Fixed values rather than tuned hyperparameters, so a
/// retrain is reproducible.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self { epochs: 40, seed: 7 }
    }
}

/// The built-in labeled dataset: the lexicon seed entries, a benign tier so
/// the model learns what NOT to flag, and a few obfuscated spellings that
/// normalization folds onto canonical or near-canonical forms.
pub fn builtin_dataset() -> Vec<TrainingExample> {
    let mut examples: Vec<TrainingExample> = lexicon::builtin_entries()
        .into_iter()
        .map(|(word, severity)| TrainingExample { word, severity })
        .collect();

    let benign = [
        "golly", "gee", "hi", "hello", "good", "morning", "friend", "nice", "love", "great",
        "awesome", "peace",
    ];
    examples.extend(benign.iter().map(|word| TrainingExample {
        word: (*word).to_string(),
        severity: Severity::Benign,
    }));

    let variants = [
        ("sh1t", Severity::Severe),
        ("f@ck", Severity::Severe),
        ("fukc", Severity::Severe),
        ("d@mn", Severity::Moderate),
    ];
    examples.extend(variants.iter().map(|(word, severity)| TrainingExample {
        word: (*word).to_string(),
        severity: *severity,
    }));

    examples
}

/// Load a labeled dataset from a JSON file holding a flat `{"word": level}`
/// map. Entries are sorted by word after parsing so training order does not
/// depend on map iteration order.
pub fn load_dataset(path: &Path) -> Result<Vec<TrainingExample>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file at {}", path.display()))?;
    let levels: HashMap<String, u8> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse dataset file at {}", path.display()))?;

    let mut examples: Vec<TrainingExample> = levels
        .into_iter()
        .map(|(word, level)| TrainingExample {
            word,
            severity: Severity::from_level(level),
        })
        .collect();
    examples.sort_by(|a, b| a.word.cmp(&b.word));
    Ok(examples)
}

/// Fit the model. Words are normalized before feature extraction, matching
/// what the pipeline feeds the model at classification time.
pub fn train(
    normalizer: &Normalizer,
    examples: &[TrainingExample],
    options: &TrainOptions,
) -> NgramModelFile {
    let prepared: Vec<(Vec<f32>, usize)> = examples
        .iter()
        .map(|example| {
            (
                features(&normalizer.normalize(&example.word)),
                example.severity.level() as usize,
            )
        })
        .collect();

    let mut weights = vec![vec![0.0f32; FEATURE_DIM]; CLASS_COUNT];
    let mut bias = vec![0.0f32; CLASS_COUNT];
    // Running totals for the averaging step. The average over every update
    // position damps the noise of the last few epochs.
    let mut weight_totals = vec![vec![0.0f64; FEATURE_DIM]; CLASS_COUNT];
    let mut bias_totals = vec![0.0f64; CLASS_COUNT];
    let mut steps: u64 = 0;

    let mut order: Vec<usize> = (0..prepared.len()).collect();
    let mut rng = Lcg::new(options.seed);

    for _ in 0..options.epochs {
        shuffle(&mut order, &mut rng);
        for &idx in &order {
            let (feat, gold) = &prepared[idx];
            let predicted = argmax(&weights, &bias, feat);
            if predicted != *gold {
                for (w, f) in weights[*gold].iter_mut().zip(feat) {
                    *w += *f;
                }
                bias[*gold] += 1.0;
                for (w, f) in weights[predicted].iter_mut().zip(feat) {
                    *w -= *f;
                }
                bias[predicted] -= 1.0;
            }

            for (totals, row) in weight_totals.iter_mut().zip(&weights) {
                for (total, w) in totals.iter_mut().zip(row) {
                    *total += f64::from(*w);
                }
            }
            for (total, b) in bias_totals.iter_mut().zip(&bias) {
                *total += f64::from(*b);
            }
            steps += 1;
        }
    }

    let divisor = steps.max(1) as f64;
    let averaged_weights = weight_totals
        .into_iter()
        .map(|row| row.into_iter().map(|total| (total / divisor) as f32).collect())
        .collect();
    let averaged_bias = bias_totals
        .into_iter()
        .map(|total| (total / divisor) as f32)
        .collect();

    NgramModelFile {
        version: MODEL_FORMAT_VERSION,
        feature_dim: FEATURE_DIM,
        weights: averaged_weights,
        bias: averaged_bias,
        trained_at: Utc::now(),
        examples: examples.len(),
    }
}

/// Same scoring rule as the runtime model: strict improvement only, so tied
/// scores resolve to the lower severity level.
fn argmax(weights: &[Vec<f32>], bias: &[f32], feat: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_score = f32::NEG_INFINITY;
    for (level, (row, b)) in weights.iter().zip(bias).enumerate() {
        let score: f32 = row.iter().zip(feat).map(|(w, f)| w * f).sum::<f32>() + b;
        if score > best_score {
            best_score = score;
            best = level;
        }
    }
    best
}

/// Knuth's MMIX linear congruential generator. Tiny, stable across
/// platforms, exactly reproducible — all the shuffle needs.
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }
}

/// Fisher-Yates driven by the LCG.
fn shuffle(order: &mut [usize], rng: &mut Lcg) {
    for i in (1..order.len()).rev() {
        let j = (rng.next() % (i as u64 + 1)) as usize;
        order.swap(i, j);
    }
}
