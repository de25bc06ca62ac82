//! Configuration types and validation for the anonymizer
//! Created: 2026-09-14

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::policy::chars::DEFAULT_CHAR_WHITELIST;

/// How a text object is split into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingMode {
    /// Split at separators, font and writing-mode changes only
    Separator,
    /// Also split at positional discontinuities
    Geometric,
}

/// Which glyphs are anonymized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RedactionScope {
    /// Everything not whitelisted
    Characters,
    /// Only word-list matches
    Words,
}

impl Default for RedactionScope {
    fn default() -> Self {
        RedactionScope::Characters
    }
}

/// Where substitution pools learn which characters a font can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PoolSource {
    /// Ask the font for every alphabet character
    Font,
    /// Only characters observed on the page in that font
    Observed,
}

/// What happens when the search runs out of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Leave the chunk as it was
    KeepOriginal,
    /// Abort with an error
    Fail,
}

/// Anonymizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizerConfig {
    /// Output raster resolution in pixels per inch
    pub resolution: f64,
    /// Accepted end-point drift, as a fraction of the font size
    pub glyph_replacement_tolerance: f64,
    /// Failed attempts per glyph of a chunk before the tolerance widens
    pub back_off_frequency: u64,
    /// Factor the tolerance is multiplied by on each back-off
    pub back_off_amount: f64,
    /// Chunk split sensitivity, as a fraction of the font size
    pub max_glyph_distance: f64,
    /// Attempts per chunk before the exhaustion policy applies; 0 is unbounded
    pub max_attempts: u64,
    pub exhaustion: ExhaustionPolicy,
    /// Pool coverage below which a substitution is flagged
    pub low_coverage_threshold: f64,
    /// Characters that are never replaced
    pub char_whitelist: String,
    pub chunking: ChunkingMode,
    pub scope: RedactionScope,
    pub pool_source: PoolSource,
    /// Blank raster images before forwarding them
    pub mask_images: bool,
    /// Emit the substitution highlight overlay
    pub highlight: bool,
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            resolution: 300.0,
            glyph_replacement_tolerance: 0.1,
            back_off_frequency: 10,
            back_off_amount: 1.5,
            max_glyph_distance: 0.1,
            max_attempts: 100_000,
            exhaustion: ExhaustionPolicy::KeepOriginal,
            low_coverage_threshold: 0.25,
            char_whitelist: DEFAULT_CHAR_WHITELIST.to_string(),
            chunking: ChunkingMode::Geometric,
            scope: RedactionScope::Characters,
            pool_source: PoolSource::Font,
            mask_images: false,
            highlight: false,
        }
    }
}

impl AnonymizerConfig {
    /// Load from a JSON or YAML file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "loaded anonymizer config");
        Ok(config)
    }

    /// Parse JSON first, then YAML
    pub fn parse(content: &str) -> Result<Self> {
        let config: AnonymizerConfig = serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.resolution > 0.0) {
            return Err(ConfigError::Invalid("resolution must be positive".into()).into());
        }
        if !(self.glyph_replacement_tolerance > 0.0) {
            return Err(ConfigError::Invalid("glyph_replacement_tolerance must be positive".into()).into());
        }
        if self.back_off_frequency == 0 {
            return Err(ConfigError::Invalid("back_off_frequency must be at least 1".into()).into());
        }
        if !(self.back_off_amount >= 1.0) {
            return Err(ConfigError::Invalid("back_off_amount must be at least 1.0".into()).into());
        }
        if self.back_off_amount == 1.0 && self.max_attempts == 0 {
            return Err(ConfigError::Invalid("unbounded attempts need back_off_amount above 1.0".into()).into());
        }
        if !(self.max_glyph_distance >= 0.0) {
            return Err(ConfigError::Invalid("max_glyph_distance must not be negative".into()).into());
        }
        if !(0.0..=1.0).contains(&self.low_coverage_threshold) {
            return Err(ConfigError::Invalid("low_coverage_threshold must be within [0, 1]".into()).into());
        }
        Ok(())
    }

    /// Read a numeric or flag option by key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "resolution" => Some(self.resolution.to_string()),
            "glyph_replacement_tolerance" => Some(self.glyph_replacement_tolerance.to_string()),
            "back_off_frequency" => Some(self.back_off_frequency.to_string()),
            "back_off_amount" => Some(self.back_off_amount.to_string()),
            "max_glyph_distance" => Some(self.max_glyph_distance.to_string()),
            "max_attempts" => Some(self.max_attempts.to_string()),
            "low_coverage_threshold" => Some(self.low_coverage_threshold.to_string()),
            "char_whitelist" => Some(self.char_whitelist.clone()),
            "mask_images" => Some(self.mask_images.to_string()),
            "highlight" => Some(self.highlight.to_string()),
            _ => None,
        }
    }

    /// Override a numeric or flag option by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("invalid value for {}: {}", key, value)).into())
        }

        match key {
            "resolution" => self.resolution = parse(key, value)?,
            "glyph_replacement_tolerance" => self.glyph_replacement_tolerance = parse(key, value)?,
            "back_off_frequency" => self.back_off_frequency = parse(key, value)?,
            "back_off_amount" => self.back_off_amount = parse(key, value)?,
            "max_glyph_distance" => self.max_glyph_distance = parse(key, value)?,
            "max_attempts" => self.max_attempts = parse(key, value)?,
            "low_coverage_threshold" => self.low_coverage_threshold = parse(key, value)?,
            "char_whitelist" => self.char_whitelist = value.to_string(),
            "mask_images" => self.mask_images = parse(key, value)?,
            "highlight" => self.highlight = parse(key, value)?,
            _ => return Err(ConfigError::Invalid(format!("Unknown key: {}", key)).into()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults_match_reference_tuning() {
        let config = AnonymizerConfig::default();
        assert_eq!(config.resolution, 300.0);
        assert_eq!(config.glyph_replacement_tolerance, 0.1);
        assert_eq!(config.back_off_frequency, 10);
        assert_eq!(config.back_off_amount, 1.5);
        assert_eq!(config.max_glyph_distance, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml_with_partial_fields() {
        let config = AnonymizerConfig::parse("back_off_amount: 2.0\nscope: words\nchunking: separator\n").unwrap();
        assert_eq!(config.back_off_amount, 2.0);
        assert_eq!(config.scope, RedactionScope::Words);
        assert_eq!(config.chunking, ChunkingMode::Separator);
        assert_eq!(config.back_off_frequency, 10);
    }

    #[test]
    fn test_parse_json() {
        let config = AnonymizerConfig::parse(r#"{"max_attempts": 0, "exhaustion": "fail"}"#).unwrap();
        assert_eq!(config.max_attempts, 0);
        assert_eq!(config.exhaustion, ExhaustionPolicy::Fail);
    }

    #[test]
    fn test_validation_rejects_shrinking_backoff() {
        let err = AnonymizerConfig::parse(r#"{"back_off_amount": 0.5}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_endless_search() {
        let err = AnonymizerConfig::parse(r#"{"back_off_amount": 1.0, "max_attempts": 0}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(ConfigError::Invalid(_))));
        assert!(AnonymizerConfig::parse(r#"{"back_off_amount": 1.0, "max_attempts": 50}"#).is_ok());
    }

    #[test]
    fn test_get_set_round() {
        let mut config = AnonymizerConfig::default();
        config.set("back_off_frequency", "4").unwrap();
        assert_eq!(config.get("back_off_frequency").as_deref(), Some("4"));
        assert!(config.set("back_off_frequency", "four").is_err());
        assert!(config.set("unknown", "1").is_err());
    }
}
