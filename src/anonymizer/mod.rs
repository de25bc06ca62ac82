//! Glyph substitution search
//! Created: 2026-09-22
//!
//! A chunk is replaced by drawing random same-class characters for every
//! substitutable glyph until the replacement run ends within a tolerance
//! of where the original run ended. The tolerance starts at a fraction of
//! the font size and widens geometrically when candidates keep missing,
//! so long or awkward chunks still converge.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::config::{AnonymizerConfig, ExhaustionPolicy};
use crate::error::{AnonymizerError, Result};
use crate::policy::{PolicyFilter, Protection};
use crate::substitution::cache::{Replacement, ReplacementCache, SubstitutionKey};
use crate::substitution::pool::{CharClass, PoolRegistry};
use crate::types::{glyph_string, Glyph, Matrix};

pub mod kerning;
pub mod record;

pub use kerning::{determine_kerning, KerningProfile};
pub use record::{Outcome, SubstitutionRecord};

/// Tuning of the substitution search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub tolerance_factor: f64,
    pub back_off_frequency: u64,
    pub back_off_amount: f64,
    /// 0 searches until a candidate fits
    pub max_attempts: u64,
    pub exhaustion: ExhaustionPolicy,
    pub low_coverage_threshold: f64,
}

impl SearchParams {
    pub fn from_config(config: &AnonymizerConfig) -> Self {
        Self {
            tolerance_factor: config.glyph_replacement_tolerance,
            back_off_frequency: config.back_off_frequency,
            back_off_amount: config.back_off_amount,
            max_attempts: config.max_attempts,
            exhaustion: config.exhaustion,
            low_coverage_threshold: config.low_coverage_threshold,
        }
    }

    /// Starting tolerance for a chunk whose first glyph is `first`
    pub fn initial_tolerance(&self, first: &Glyph) -> f64 {
        self.tolerance_factor * first.size()
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::from_config(&AnonymizerConfig::default())
    }
}

/// How a chunk search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// A candidate landed within tolerance
    Accepted,
    /// Nothing in the chunk was drawn at random, so the only candidate
    /// was taken as is
    Forced,
    /// Attempts ran out; the original glyphs were kept
    Exhausted,
}

/// One widening of the tolerance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Backoff {
    pub after_attempts: u64,
    pub tolerance: f64,
}

/// Result of anonymizing one chunk
#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    /// Glyphs to draw in place of the chunk
    pub glyphs: Vec<Glyph>,
    pub records: Vec<SubstitutionRecord>,
    pub status: SearchStatus,
    pub attempts: u64,
    pub initial_tolerance: f64,
    pub tolerance: f64,
    /// End-point drift of the returned glyphs
    pub distance: f64,
    pub backoffs: Vec<Backoff>,
}

impl ChunkOutcome {
    pub fn text(&self) -> String {
        glyph_string(&self.glyphs)
    }
}

/// Run state the search reads and commits into
#[derive(Debug)]
pub struct SearchContext<'a> {
    pub policy: &'a PolicyFilter,
    pub pools: &'a mut PoolRegistry,
    pub cache: &'a mut ReplacementCache,
}

/// Per-glyph decision, fixed for the whole search of a chunk
#[derive(Debug, Clone, Copy)]
enum GlyphPlan {
    Fixed { replacement: Replacement, outcome: Outcome },
    Draw { class: CharClass, low_coverage: bool },
}

struct Candidate {
    glyphs: Vec<Glyph>,
    outcomes: Vec<Outcome>,
    distance: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Anonymizer {
    params: SearchParams,
}

impl Anonymizer {
    pub fn new(params: SearchParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &AnonymizerConfig) -> Self {
        Self::new(SearchParams::from_config(config))
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Search for a replacement of `glyphs`, laid out on `kerning`, and
    /// commit it into the cache.
    #[instrument(skip(self, glyphs, kerning, ctx, rng), fields(chunk = %glyph_string(glyphs)))]
    pub fn anonymize_chunk<R: Rng + ?Sized>(
        &self,
        glyphs: &[Glyph],
        kerning: &KerningProfile,
        ctm: &Matrix,
        ctx: &mut SearchContext<'_>,
        rng: &mut R,
    ) -> Result<ChunkOutcome> {
        let (first, last) = match (glyphs.first(), glyphs.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AnonymizerError::EmptyChunk.into()),
        };

        let keys: Vec<SubstitutionKey> = glyphs.iter().map(|g| SubstitutionKey::for_glyph(g, ctm)).collect();
        let plans: Vec<GlyphPlan> = glyphs
            .iter()
            .zip(&keys)
            .map(|(g, key)| self.plan_glyph(g, key, ctm, ctx))
            .collect();
        let deterministic = plans.iter().all(|p| matches!(p, GlyphPlan::Fixed { .. }));

        let target = last.next_matrix;
        let initial_tolerance = self.params.initial_tolerance(first);
        let mut tolerance = initial_tolerance;
        let back_off_every = self.params.back_off_frequency.max(1).saturating_mul(glyphs.len() as u64);
        let mut backoffs = Vec::new();
        let mut attempts = 0u64;

        debug!(glyphs = glyphs.len(), tolerance, "searching replacement");
        loop {
            attempts += 1;
            let candidate = build_candidate(glyphs, &keys, &plans, kerning, &target, &*ctx.pools, rng);
            trace!(
                attempt = attempts,
                candidate = %glyph_string(&candidate.glyphs),
                distance = candidate.distance,
                tolerance,
                "candidate"
            );

            let fits = candidate.distance <= tolerance;
            if fits || deterministic {
                let status = if fits { SearchStatus::Accepted } else { SearchStatus::Forced };
                debug!(
                    replacement = %glyph_string(&candidate.glyphs),
                    attempts,
                    distance = candidate.distance,
                    ?status,
                    "accepted replacement"
                );
                let records = commit(glyphs, keys, &candidate, ctm, ctx.cache);
                return Ok(ChunkOutcome {
                    glyphs: candidate.glyphs,
                    records,
                    status,
                    attempts,
                    initial_tolerance,
                    tolerance,
                    distance: candidate.distance,
                    backoffs,
                });
            }

            if attempts % back_off_every == 0 {
                tolerance *= self.params.back_off_amount;
                backoffs.push(Backoff {
                    after_attempts: attempts,
                    tolerance,
                });
                debug!(attempts, tolerance, "increasing tolerance");
            }

            if self.params.max_attempts != 0 && attempts >= self.params.max_attempts {
                let original = glyph_string(glyphs);
                return match self.params.exhaustion {
                    ExhaustionPolicy::Fail => Err(AnonymizerError::Exhausted { original, attempts }.into()),
                    ExhaustionPolicy::KeepOriginal => {
                        warn!(chunk = %original, attempts, tolerance, "no replacement found, keeping original");
                        Ok(ChunkOutcome {
                            glyphs: glyphs.to_vec(),
                            records: Vec::new(),
                            status: SearchStatus::Exhausted,
                            attempts,
                            initial_tolerance,
                            tolerance,
                            distance: 0.0,
                            backoffs,
                        })
                    }
                };
            }
        }
    }

    fn plan_glyph(&self, glyph: &Glyph, key: &SubstitutionKey, ctm: &Matrix, ctx: &mut SearchContext<'_>) -> GlyphPlan {
        let keep = |outcome| GlyphPlan::Fixed {
            replacement: Replacement::of(glyph),
            outcome,
        };
        match ctx.policy.protection(glyph, key, ctm, &*ctx.cache) {
            Protection::Cached(replacement) => GlyphPlan::Fixed {
                replacement,
                outcome: Outcome::Cached,
            },
            Protection::Zone => keep(Outcome::ZoneKept),
            Protection::Character => keep(Outcome::CharKept),
            Protection::Open => match CharClass::of(glyph.unicode) {
                None => keep(Outcome::Unsubstitutable),
                Some(class) => {
                    let pool = ctx.pools.pools_for(glyph.font.as_ref()).pool(class);
                    if pool.is_empty() {
                        keep(Outcome::LowCoverage)
                    } else {
                        GlyphPlan::Draw {
                            class,
                            low_coverage: pool.coverage() < self.params.low_coverage_threshold,
                        }
                    }
                }
            },
        }
    }
}

fn build_candidate<R: Rng + ?Sized>(
    glyphs: &[Glyph],
    keys: &[SubstitutionKey],
    plans: &[GlyphPlan],
    kerning: &KerningProfile,
    target: &Matrix,
    pools: &PoolRegistry,
    rng: &mut R,
) -> Candidate {
    // a key repeated within the chunk resolves to one pick
    let mut picked: HashMap<&SubstitutionKey, (Replacement, Outcome)> = HashMap::new();
    let mut out = Vec::with_capacity(glyphs.len());
    let mut outcomes = Vec::with_capacity(glyphs.len());
    let mut m = glyphs[0].matrix;

    for (i, ((original, key), plan)) in glyphs.iter().zip(keys).zip(plans).enumerate() {
        let (replacement, outcome) = match picked.get(key) {
            Some(pick) => *pick,
            None => {
                let pick = resolve(original, plan, pools, rng);
                picked.insert(key, pick);
                pick
            }
        };
        let drawn = Glyph::new(original.font.clone(), m, replacement.glyph, replacement.unicode, original.wmode);
        m = kerning.place_after(i, &m, drawn.advance(), original.wmode);
        out.push(drawn);
        outcomes.push(outcome);
    }

    Candidate {
        glyphs: out,
        outcomes,
        distance: m.distance(target),
    }
}

fn resolve<R: Rng + ?Sized>(original: &Glyph, plan: &GlyphPlan, pools: &PoolRegistry, rng: &mut R) -> (Replacement, Outcome) {
    match *plan {
        GlyphPlan::Fixed { replacement, outcome } => (replacement, outcome),
        GlyphPlan::Draw { class, low_coverage } => {
            let font = original.font.as_ref();
            let drawn = pools
                .get(font.name())
                .and_then(|p| p.pool(class).draw(rng))
                .and_then(|unicode| pools.glyph_for(font, unicode).map(|glyph| Replacement { unicode, glyph }));
            match drawn {
                Some(r) if low_coverage => (r, Outcome::LowCoverage),
                Some(r) if r.unicode == original.unicode => (r, Outcome::Unchanged),
                Some(r) => (r, Outcome::Substituted),
                None => (Replacement::of(original), Outcome::Unchanged),
            }
        }
    }
}

fn commit(
    originals: &[Glyph],
    keys: Vec<SubstitutionKey>,
    candidate: &Candidate,
    ctm: &Matrix,
    cache: &mut ReplacementCache,
) -> Vec<SubstitutionRecord> {
    keys.into_iter()
        .zip(originals)
        .zip(candidate.glyphs.iter().zip(&candidate.outcomes))
        .map(|((key, original), (drawn, outcome))| {
            cache.insert(key, Replacement::of(drawn));
            SubstitutionRecord::new(original, drawn, *outcome, ctm)
        })
        .collect()
}

/// `glyphs` with every glyph that has a cache entry drawn as its stored
/// replacement, in place.
pub fn reuse_cached(glyphs: &[Glyph], ctm: &Matrix, cache: &ReplacementCache) -> Vec<Glyph> {
    glyphs
        .iter()
        .map(|g| match cache.get(&SubstitutionKey::for_glyph(g, ctm)) {
            Some(r) => g.replaced(r.unicode, r.glyph),
            None => g.clone(),
        })
        .collect()
}
