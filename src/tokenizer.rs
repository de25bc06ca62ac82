//! Tokenizer: groups a text object's glyphs into replaceable chunks
//! Created: 2026-09-17

use std::fmt::Debug;

use tracing::trace;

use crate::anonymizer::kerning::KerningProfile;
use crate::config::{AnonymizerConfig, ChunkingMode};
use crate::types::{glyph_string, Glyph, WritingMode};

/// Decides where one chunk ends and the next begins
pub trait ChunkingStrategy: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `curr` must start a new chunk after `last`
    fn splits(&self, last: &Glyph, curr: &Glyph) -> bool;
}

/// Boundaries every strategy honours: a separator glyph closes its chunk,
/// and chunks never span a font or writing-mode change.
fn hard_boundary(last: &Glyph, curr: &Glyph) -> bool {
    is_separator(last.unicode) || !curr.same_font(last) || curr.wmode != last.wmode
}

pub fn is_separator(c: char) -> bool {
    c.is_whitespace()
}

/// Split only at separators and font or mode changes
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparatorSplit;

impl ChunkingStrategy for SeparatorSplit {
    fn name(&self) -> &'static str {
        "separator"
    }

    fn splits(&self, last: &Glyph, curr: &Glyph) -> bool {
        hard_boundary(last, curr)
    }
}

/// Additionally split wherever the next glyph does not continue from the
/// previous one's advance point within `max_glyph_distance` font sizes.
#[derive(Debug, Clone, Copy)]
pub struct GeometricSplit {
    pub max_glyph_distance: f64,
}

impl GeometricSplit {
    fn matrices_differ(&self, last: &Glyph, curr: &Glyph) -> bool {
        let expected = &last.next_matrix;
        if !curr.matrix.same_linear(expected) {
            return true;
        }
        curr.matrix.distance(expected) > self.max_glyph_distance * expected.font_size()
    }
}

impl ChunkingStrategy for GeometricSplit {
    fn name(&self) -> &'static str {
        "geometric"
    }

    fn splits(&self, last: &Glyph, curr: &Glyph) -> bool {
        hard_boundary(last, curr) || self.matrices_differ(last, curr)
    }
}

/// Maximal run of glyphs substituted as one unit
#[derive(Debug, Clone)]
pub struct Chunk {
    glyphs: Vec<Glyph>,
    kerning: KerningProfile,
}

impl Chunk {
    pub fn new(glyphs: Vec<Glyph>) -> Self {
        let kerning = KerningProfile::measure(&glyphs);
        Self { glyphs, kerning }
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn kerning(&self) -> &KerningProfile {
        &self.kerning
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn text(&self) -> String {
        glyph_string(&self.glyphs)
    }

    pub fn font_name(&self) -> Option<&str> {
        self.glyphs.first().map(Glyph::font_name)
    }

    pub fn wmode(&self) -> Option<WritingMode> {
        self.glyphs.first().map(|g| g.wmode)
    }

    pub fn into_glyphs(self) -> Vec<Glyph> {
        self.glyphs
    }
}

/// Splits glyph lists using the configured [`ChunkingStrategy`]
#[derive(Debug)]
pub struct Tokenizer {
    strategy: Box<dyn ChunkingStrategy>,
}

impl Tokenizer {
    pub fn new(strategy: Box<dyn ChunkingStrategy>) -> Self {
        Self { strategy }
    }

    pub fn from_config(config: &AnonymizerConfig) -> Self {
        let strategy: Box<dyn ChunkingStrategy> = match config.chunking {
            ChunkingMode::Separator => Box::new(SeparatorSplit),
            ChunkingMode::Geometric => Box::new(GeometricSplit {
                max_glyph_distance: config.max_glyph_distance,
            }),
        };
        Self::new(strategy)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn tokenize(&self, glyphs: Vec<Glyph>) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<Glyph> = Vec::new();

        for glyph in glyphs {
            if let Some(last) = current.last() {
                if self.strategy.splits(last, &glyph) {
                    chunks.push(Chunk::new(std::mem::take(&mut current)));
                }
            }
            current.push(glyph);
        }
        if !current.is_empty() {
            chunks.push(Chunk::new(current));
        }

        trace!(strategy = self.strategy.name(), chunks = chunks.len(), "tokenized text object");
        chunks
    }
}
