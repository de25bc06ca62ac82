//! Page-run anonymization engine
//! Created: 2026-09-30

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::anonymizer::{
    reuse_cached, Anonymizer, ChunkOutcome, KerningProfile, Outcome, SearchContext, SearchStatus, SubstitutionRecord,
};
use crate::config::AnonymizerConfig;
use crate::error::Result;
use crate::font::CharacterMap;
use crate::policy::{PolicyFilter, SegmentAction};
use crate::stream::{glyphs_to_text, Text};
use crate::substitution::{CacheStats, PoolRegistry, ReplacementCache};
use crate::tokenizer::{Chunk, Tokenizer};
use crate::types::{Glyph, Matrix};

/// Counters of one page run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub text_objects: u64,
    pub glyphs: u64,
    pub chunks: u64,
    /// Chunks or word spans that went through the search
    pub searched: u64,
    pub accepted: u64,
    pub forced: u64,
    pub exhausted: u64,
    /// Chunks passed through in word-scoped runs
    pub kept_chunks: u64,
    pub attempts: u64,
    pub backoffs: u64,
    pub outcomes: BTreeMap<Outcome, u64>,
}

impl EngineStats {
    fn record(&mut self, outcome: &ChunkOutcome) {
        self.searched += 1;
        self.attempts += outcome.attempts;
        self.backoffs += outcome.backoffs.len() as u64;
        match outcome.status {
            SearchStatus::Accepted => self.accepted += 1,
            SearchStatus::Forced => self.forced += 1,
            SearchStatus::Exhausted => self.exhausted += 1,
        }
        for record in &outcome.records {
            *self.outcomes.entry(record.outcome).or_default() += 1;
        }
    }
}

/// Owns every piece of state shared by the text objects of one page
#[derive(Debug)]
pub struct AnonymizationEngine<R: Rng = StdRng> {
    config: AnonymizerConfig,
    tokenizer: Tokenizer,
    policy: PolicyFilter,
    anonymizer: Anonymizer,
    pools: PoolRegistry,
    cache: ReplacementCache,
    records: Vec<SubstitutionRecord>,
    stats: EngineStats,
    rng: R,
}

impl<R: Rng> AnonymizationEngine<R> {
    pub fn new(config: AnonymizerConfig, policy: PolicyFilter, rng: R) -> Self {
        Self {
            tokenizer: Tokenizer::from_config(&config),
            anonymizer: Anonymizer::from_config(&config),
            pools: PoolRegistry::new(config.pool_source),
            cache: ReplacementCache::new(),
            records: Vec::new(),
            stats: EngineStats::default(),
            config,
            policy,
            rng,
        }
    }

    /// Characters observed on the page, for observed-source pools
    pub fn with_character_map(mut self, map: CharacterMap) -> Self {
        self.pools = PoolRegistry::new(self.config.pool_source).with_character_map(map);
        self
    }

    pub fn config(&self) -> &AnonymizerConfig {
        &self.config
    }

    pub fn policy(&self) -> &PolicyFilter {
        &self.policy
    }

    pub fn cache(&self) -> &ReplacementCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn records(&self) -> &[SubstitutionRecord] {
        &self.records
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Replacement for one text object drawn under `ctm`
    #[instrument(skip(self, text), fields(glyphs = text.len()))]
    pub fn anonymize_text(&mut self, text: &Text, ctm: &Matrix) -> Result<Text> {
        self.stats.text_objects += 1;
        self.stats.glyphs += text.len() as u64;

        let chunks = self.tokenizer.tokenize(text.glyphs());
        self.stats.chunks += chunks.len() as u64;
        let segments = self.policy.plan(&chunks);
        let mut out: Vec<Glyph> = Vec::with_capacity(text.len());

        for segment in segments {
            let span = &chunks[segment.chunks.clone()];
            match segment.action {
                SegmentAction::Keep => {
                    self.stats.kept_chunks += span.len() as u64;
                    for chunk in span {
                        out.extend(reuse_cached(chunk.glyphs(), ctm, &self.cache));
                    }
                }
                SegmentAction::Anonymize { word: None } => {
                    for chunk in span {
                        out.extend(self.search(chunk.glyphs(), chunk.kerning(), ctm)?);
                    }
                }
                SegmentAction::Anonymize { word: Some(word) } => {
                    debug!(word = %word, chunks = span.len(), "anonymizing word span");
                    let glyphs = match span {
                        [single] => self.search(single.glyphs(), single.kerning(), ctm)?,
                        _ => {
                            let joined: Vec<Glyph> = span.iter().flat_map(|c| c.glyphs().iter().cloned()).collect();
                            let kerning = KerningProfile::measure(&joined);
                            self.search(&joined, &kerning, ctm)?
                        }
                    };
                    out.extend(glyphs);
                }
            }
        }

        Ok(glyphs_to_text(&out))
    }

    fn search(&mut self, glyphs: &[Glyph], kerning: &KerningProfile, ctm: &Matrix) -> Result<Vec<Glyph>> {
        let mut ctx = SearchContext {
            policy: &self.policy,
            pools: &mut self.pools,
            cache: &mut self.cache,
        };
        let outcome = self.anonymizer.anonymize_chunk(glyphs, kerning, ctm, &mut ctx, &mut self.rng)?;
        self.stats.record(&outcome);
        self.records.extend(outcome.records);
        Ok(outcome.glyphs)
    }

    /// Anonymize a standalone chunk, bypassing word planning
    pub fn anonymize_chunk(&mut self, chunk: &Chunk, ctm: &Matrix) -> Result<Vec<Glyph>> {
        self.search(chunk.glyphs(), chunk.kerning(), ctm)
    }
}
