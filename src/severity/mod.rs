// Severity scale and the pluggable classifier implementations.
//
// The pipeline only ever sees the SeverityModel trait; the lexicon and
// char-ngram models are interchangeable backends behind it.

pub mod lexicon;
pub mod ngram;
pub mod train;
pub mod traits;

pub use traits::SeverityModel;

use serde::{Deserialize, Serialize};

/// Ordinal severity of a term, 0 (benign) through 5 (severe).
///
/// Tenant tolerance is expressed on the same scale: tokens classified
/// strictly below the tolerance are exempt from matching and censorship.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Benign = 0,
    Mild = 1,
    Crude = 2,
    Moderate = 3,
    Strong = 4,
    Severe = 5,
}

impl Severity {
    /// Clamp a raw level to the scale. Values above 5 saturate to Severe.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Severity::Benign,
            1 => Severity::Mild,
            2 => Severity::Crude,
            3 => Severity::Moderate,
            4 => Severity::Strong,
            _ => Severity::Severe,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Benign => "benign",
            Severity::Mild => "mild",
            Severity::Crude => "crude",
            Severity::Moderate => "moderate",
            Severity::Strong => "strong",
            Severity::Severe => "severe",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
