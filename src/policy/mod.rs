//! Redaction policy
//! Created: 2026-09-18
//!
//! Decides, per glyph, whether it may be replaced, and in word-scoped mode
//! which spans of chunks are anonymized at all. Per-glyph precedence is
//! fixed: an existing cache entry wins over everything, then the zone
//! whitelist, then the character whitelist.

use std::ops::Range;

use tracing::debug;

use crate::config::RedactionScope;
use crate::substitution::cache::{Replacement, ReplacementCache, SubstitutionKey};
use crate::tokenizer::Chunk;
use crate::types::{Glyph, Matrix};

pub mod chars;
pub mod words;
pub mod zone;

pub use chars::CharWhitelist;
pub use words::{StopWords, WordList, WordMatch};
pub use zone::{Zone, ZoneWhitelist};

/// Protection status of a single glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Reuse an earlier accepted replacement
    Cached(Replacement),
    /// Inside a whitelisted zone
    Zone,
    /// Whitelisted character
    Character,
    /// Free to substitute
    Open,
}

/// What to do with a run of chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentAction {
    Anonymize { word: Option<String> },
    Keep,
}

/// Consecutive chunks sharing one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub chunks: Range<usize>,
    pub action: SegmentAction,
}

#[derive(Debug, Clone, Default)]
pub struct PolicyFilter {
    zones: ZoneWhitelist,
    chars: CharWhitelist,
    words: WordList,
    scope: RedactionScope,
}

impl PolicyFilter {
    pub fn new(zones: ZoneWhitelist, chars: CharWhitelist, words: WordList, scope: RedactionScope) -> Self {
        Self {
            zones,
            chars,
            words,
            scope,
        }
    }

    pub fn with_zones(mut self, zones: ZoneWhitelist) -> Self {
        self.zones = zones;
        self
    }

    pub fn with_chars(mut self, chars: CharWhitelist) -> Self {
        self.chars = chars;
        self
    }

    pub fn with_words(mut self, words: WordList) -> Self {
        self.words = words;
        self.scope = RedactionScope::Words;
        self
    }

    /// Scope in effect: word scope without any words anonymizes everything
    pub fn scope(&self) -> RedactionScope {
        match self.scope {
            RedactionScope::Words if self.words.is_empty() => RedactionScope::Characters,
            scope => scope,
        }
    }

    pub fn zones(&self) -> &ZoneWhitelist {
        &self.zones
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn zone_protects(&self, glyph: &Glyph, ctm: &Matrix) -> bool {
        self.zones.protects(glyph, ctm)
    }

    pub fn char_protects(&self, glyph: &Glyph) -> bool {
        self.chars.contains(glyph.unicode)
    }

    /// First matching rule for `glyph`
    pub fn protection(&self, glyph: &Glyph, key: &SubstitutionKey, ctm: &Matrix, cache: &ReplacementCache) -> Protection {
        if let Some(replacement) = cache.get(key) {
            Protection::Cached(replacement)
        } else if self.zone_protects(glyph, ctm) {
            Protection::Zone
        } else if self.char_protects(glyph) {
            Protection::Character
        } else {
            Protection::Open
        }
    }

    /// Partition a text object's chunks into anonymized and kept segments
    pub fn plan(&self, chunks: &[Chunk]) -> Vec<Segment> {
        if chunks.is_empty() {
            return Vec::new();
        }
        match self.scope() {
            RedactionScope::Characters => vec![Segment {
                chunks: 0..chunks.len(),
                action: SegmentAction::Anonymize { word: None },
            }],
            RedactionScope::Words => self.plan_words(chunks),
        }
    }

    fn plan_words(&self, chunks: &[Chunk]) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut pos = 0;
        while pos < chunks.len() {
            match self.words.match_at(chunks, pos) {
                Some(hit) => {
                    debug!(word = %hit.word, chunks = hit.end - hit.start, "word-list match");
                    segments.push(Segment {
                        chunks: hit.start..hit.end,
                        action: SegmentAction::Anonymize { word: Some(hit.word) },
                    });
                    pos = hit.end;
                }
                None => {
                    match segments.last_mut() {
                        Some(last) if last.action == SegmentAction::Keep => last.chunks.end = pos + 1,
                        _ => segments.push(Segment {
                            chunks: pos..pos + 1,
                            action: SegmentAction::Keep,
                        }),
                    }
                    pos += 1;
                }
            }
        }
        segments
    }
}
