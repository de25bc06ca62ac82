//! Diagnostic records of committed substitutions

use serde::{Deserialize, Serialize};

use crate::substitution::cache::Replacement;
use crate::types::{Glyph, Matrix, Point};

/// How a glyph of an anonymized chunk was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Reused an earlier replacement
    Cached,
    /// Kept inside a whitelisted zone
    ZoneKept,
    /// Whitelisted character kept
    CharKept,
    /// Substituted from a thin pool, or kept because the pool is empty
    LowCoverage,
    /// The draw happened to return the original character
    Unchanged,
    Substituted,
    /// No character class for the original
    Unsubstitutable,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::Cached,
        Outcome::ZoneKept,
        Outcome::CharKept,
        Outcome::LowCoverage,
        Outcome::Unchanged,
        Outcome::Substituted,
        Outcome::Unsubstitutable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Cached => "cached",
            Outcome::ZoneKept => "zone_kept",
            Outcome::CharKept => "char_kept",
            Outcome::LowCoverage => "low_coverage",
            Outcome::Unchanged => "unchanged",
            Outcome::Substituted => "substituted",
            Outcome::Unsubstitutable => "unsubstitutable",
        }
    }
}

/// One committed glyph of an accepted candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionRecord {
    pub font: String,
    pub original: char,
    pub replacement: Replacement,
    pub outcome: Outcome,
    /// Footprint of the drawn glyph in device space
    pub vertices: [Point; 4],
}

impl SubstitutionRecord {
    pub fn new(original: &Glyph, drawn: &Glyph, outcome: Outcome, ctm: &Matrix) -> Self {
        Self {
            font: original.font_name().to_string(),
            original: original.unicode,
            replacement: Replacement::of(drawn),
            outcome,
            vertices: drawn.vertices(ctm),
        }
    }
}
