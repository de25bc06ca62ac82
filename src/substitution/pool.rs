//! Per-font character-class substitution pools
//! Created: 2026-09-20

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PoolSource;
use crate::font::{CharacterMap, FontMetrics};

// Alphabets repeat letters roughly in proportion to their frequency in
// English text, so uniform draws produce plausible-looking words.
const LOWER_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzabcdefghiklmnopqrstuvwxyabcdefghiklmnopqrstuvwxyabcdefghiklmnoprstuvwxyabcdefghiklmnoprstuvwxyabcdefghiklmnoprstuvwxyabcdefghiklmnoprstuvwxyabcdefghiklmnoprstuvwxyabcdefghiklmnoprstuvwxyabcdefghiklmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuvwyabcdefghilmnoprstuyacdefghilmnoprstuyacdefghilmnoprstuyacdefghilmnoprstuyacdeghilmnoprstuyacdehilmnoprstuyacdehilmnoprstuyacdehilmnoprstuyacdehilmnoprstuyacdehilmnoprstuyacdehilmnoprstuyacdehilmnoprstuyacdehilmnoprstuyacdehilmnorstuyacdehilmnorstuacdehilmnorstuacdeilmnorstuacdeilmnorstuacdeilmnorstuacdeilmnorstuacdeilmnorstuacdeilmnorstuacdeilmnorstuacdeilmnorstuacdeilmnorstuacdeilnorstuacdeilnorstuacdeilnorstuacdeilnorstuacdeilnorstuacdeilnorstuacdeilnorstuacdeilnorstuacdeilnorstuacdeilnorstuaceilnorstuaceilnorstuaceilnorstuaceilnorstuaceilnorstuaceilnorstuaceilnorstuaceilnorstaceilnorstaceilnorstaceilnorstaceilnorstaeilnorstaeilnorstaeilnorstaeilnorstaeilnorstaeinorstaeinorstaeinorstaeinorstaeinorstaeinorstaeinorstaeinorstaeinorstaeinorstaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaeinortaenotaenotaenotaenotaenotaeotaeotaeotaeotaeotaeotaeotaeotaeotaeotaeotaeotaeotaeotaeotaeteteeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
const UPPER_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZABCDEFGHIJKLMNOPQRSTUVWXYABCDEFGHIJKLMNOPRSTUVWXYABCDEFGHILMNOPRSTUVWYABCDEFGHILMNOPRSTUVWYABCDEFGHILMNOPRSTUVWYABCDEFGHILMNOPRSTUWABCDEFGHILMNOPRSTUABCDEGILMNOPRSTUABCDEGILMNOPRSTUABCDEGILMNOPRSTUABCDEILMNOPRSTABCDEILMNOPRSTABCDEILNOPRSTACDEILNOPRSTACDEILNOPRSTACDEILNOPRSTACDEILNOPRSTACDEINOPRSTACDEINOPRSTACEINOPRSTACEINORSTACEINOSTAEINSTAEINSTAEINSTAESTAESTAESTAETAETATATATAT";
const DIGIT_ALPHABET: &str = "012345678901200";

/// Character class a replacement must stay within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    Lower,
    Upper,
    Digit,
}

impl CharClass {
    pub const ALL: [CharClass; 3] = [CharClass::Lower, CharClass::Upper, CharClass::Digit];

    pub fn alphabet(&self) -> &'static str {
        match self {
            CharClass::Lower => LOWER_ALPHABET,
            CharClass::Upper => UPPER_ALPHABET,
            CharClass::Digit => DIGIT_ALPHABET,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharClass::Lower => "lower",
            CharClass::Upper => "upper",
            CharClass::Digit => "digit",
        }
    }

    /// Class whose alphabet contains `c`
    pub fn of(c: char) -> Option<CharClass> {
        CharClass::ALL.into_iter().find(|class| class.alphabet().contains(c))
    }

    fn unique_len(&self) -> usize {
        self.alphabet().chars().collect::<HashSet<_>>().len()
    }
}

/// Characters of one class a font can render
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionPool {
    class: CharClass,
    /// Alphabet order and repetition preserved
    candidates: Vec<char>,
    coverage: f64,
}

impl SubstitutionPool {
    pub fn build(class: CharClass, supports: impl Fn(char) -> bool) -> Self {
        let candidates: Vec<char> = class.alphabet().chars().filter(|c| supports(*c)).collect();
        let unique = candidates.iter().collect::<HashSet<_>>().len();
        let coverage = unique as f64 / class.unique_len() as f64;
        Self {
            class,
            candidates,
            coverage,
        }
    }

    pub fn class(&self) -> CharClass {
        self.class
    }

    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.candidates.contains(&c)
    }

    /// Uniform draw over the (frequency-weighted) candidates
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char> {
        self.candidates.choose(rng).copied()
    }
}

/// All class pools of one font
#[derive(Debug, Clone)]
pub struct FontPools {
    font: String,
    pools: Vec<SubstitutionPool>,
}

impl FontPools {
    pub fn build(font: &str, supports: impl Fn(char) -> bool) -> Self {
        let pools = CharClass::ALL
            .iter()
            .map(|class| SubstitutionPool::build(*class, &supports))
            .collect();
        Self {
            font: font.to_string(),
            pools,
        }
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn pool(&self, class: CharClass) -> &SubstitutionPool {
        // built from CharClass::ALL, so every class is present
        &self.pools[class as usize]
    }

    /// Pool for the class `c` belongs to
    pub fn pool_for(&self, c: char) -> Option<&SubstitutionPool> {
        CharClass::of(c).map(|class| self.pool(class))
    }

    pub fn coverage(&self, class: CharClass) -> f64 {
        self.pool(class).coverage()
    }
}

/// Lazily built pools for every font seen during a run
#[derive(Debug, Clone)]
pub struct PoolRegistry {
    source: PoolSource,
    observed: CharacterMap,
    fonts: HashMap<String, FontPools>,
}

impl PoolRegistry {
    pub fn new(source: PoolSource) -> Self {
        Self {
            source,
            observed: CharacterMap::default(),
            fonts: HashMap::new(),
        }
    }

    /// Characters seen on the page; consulted for [`PoolSource::Observed`]
    pub fn with_character_map(mut self, observed: CharacterMap) -> Self {
        self.observed = observed;
        self
    }

    pub fn source(&self) -> PoolSource {
        self.source
    }

    /// Pools for `font`, built on first use
    pub fn pools_for(&mut self, font: &dyn FontMetrics) -> &FontPools {
        let source = self.source;
        let observed = &self.observed;
        self.fonts.entry(font.name().to_string()).or_insert_with(|| {
            let pools = FontPools::build(font.name(), |c| lookup(source, observed, font, c).is_some());
            debug!(
                font = font.name(),
                lower = pools.coverage(CharClass::Lower),
                upper = pools.coverage(CharClass::Upper),
                digit = pools.coverage(CharClass::Digit),
                "built substitution pools"
            );
            pools
        })
    }

    /// Pools already built for the font named `font`
    pub fn get(&self, font: &str) -> Option<&FontPools> {
        self.fonts.get(font)
    }

    /// Glyph that renders `c` in `font`
    pub fn glyph_for(&self, font: &dyn FontMetrics, c: char) -> Option<u32> {
        lookup(self.source, &self.observed, font, c)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

fn lookup(source: PoolSource, observed: &CharacterMap, font: &dyn FontMetrics, c: char) -> Option<u32> {
    match source {
        PoolSource::Font => font.glyph_for_unicode(c),
        PoolSource::Observed => observed.glyph(font.name(), c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TableFont;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_class_membership() {
        assert_eq!(CharClass::of('q'), Some(CharClass::Lower));
        assert_eq!(CharClass::of('Q'), Some(CharClass::Upper));
        assert_eq!(CharClass::of('9'), Some(CharClass::Digit));
        assert_eq!(CharClass::of('é'), None);
        assert_eq!(CharClass::of('-'), None);
    }

    #[test]
    fn test_full_and_partial_coverage() {
        let full = SubstitutionPool::build(CharClass::Lower, |c| c.is_ascii_lowercase());
        assert_eq!(full.coverage(), 1.0);

        let vowels = SubstitutionPool::build(CharClass::Upper, |c| "AEIOU".contains(c));
        assert!((vowels.coverage() - 5.0 / 26.0).abs() < 1e-12);

        let none = SubstitutionPool::build(CharClass::Digit, |_| false);
        assert_eq!(none.coverage(), 0.0);
        assert!(none.is_empty());
        assert_eq!(none.draw(&mut StdRng::seed_from_u64(1)), None);
    }

    #[test]
    fn test_draws_stay_in_supported_class() {
        let pool = SubstitutionPool::build(CharClass::Lower, |c| "xyz".contains(c));
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let c = pool.draw(&mut rng).unwrap();
            assert!("xyz".contains(c));
        }
    }

    #[test]
    fn test_registry_builds_once_per_font() {
        let font = TableFont::new("Digits").with_chars("0123456789", |_| 0.5);
        let mut registry = PoolRegistry::new(PoolSource::Font);
        assert_eq!(registry.pools_for(&font).coverage(CharClass::Digit), 1.0);
        assert_eq!(registry.pools_for(&font).coverage(CharClass::Lower), 0.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_observed_source_restricts_to_seen_characters() {
        let font = TableFont::new("Seen").with_chars("abcdefghijklmnopqrstuvwxyz", |_| 0.5);
        let mut observed = CharacterMap::default();
        observed.insert("Seen", 'a', 1);
        observed.insert("Seen", 'b', 2);
        let mut registry = PoolRegistry::new(PoolSource::Observed).with_character_map(observed);

        let pools = registry.pools_for(&font);
        assert!((pools.coverage(CharClass::Lower) - 2.0 / 26.0).abs() < 1e-12);
        assert!(pools.pool(CharClass::Lower).contains('b'));
        assert!(!pools.pool(CharClass::Lower).contains('c'));
        assert_eq!(registry.glyph_for(&font, 'c'), None);
    }
}
