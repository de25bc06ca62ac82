//! Run report written next to the anonymized page
//! Created: 2026-10-03

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::anonymizer::SubstitutionRecord;
use crate::config::AnonymizerConfig;
use crate::engine::{AnonymizationEngine, EngineStats};
use crate::error::Result;
use crate::substitution::CacheStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub output: String,
    /// Seed of the run, when it is reproducible
    pub seed: Option<u64>,
    pub config: AnonymizerConfig,
    pub stats: EngineStats,
    pub cache: CacheStats,
    pub highlights: usize,
    pub records: Vec<SubstitutionRecord>,
}

impl RunReport {
    pub fn from_engine<R: Rng>(engine: &AnonymizationEngine<R>, input: &str, output: &str, seed: Option<u64>) -> Self {
        Self {
            timestamp: Utc::now(),
            input: input.to_string(),
            output: output.to_string(),
            seed,
            config: engine.config().clone(),
            stats: engine.stats().clone(),
            cache: engine.cache_stats(),
            highlights: 0,
            records: engine.records().to_vec(),
        }
    }

    pub fn with_highlights(mut self, highlights: usize) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// One-line summary for the log
    pub fn summary(&self) -> String {
        format!(
            "{} text objects, {} glyphs, {} searches ({} accepted, {} forced, {} exhausted), {} attempts, {} cache entries",
            self.stats.text_objects,
            self.stats.glyphs,
            self.stats.searched,
            self.stats.accepted,
            self.stats.forced,
            self.stats.exhausted,
            self.stats.attempts,
            self.cache.entries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TableFont;
    use crate::policy::PolicyFilter;
    use crate::stream::Text;
    use crate::types::{FontRef, Matrix, WritingMode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_report_round_trips_through_file() {
        let font: FontRef = Arc::new(TableFont::new("R").with_chars("abc", |_| 0.5));
        let mut text = Text::new();
        text.show_string(&font, Matrix::scale(10.0, 10.0), "abc", WritingMode::Horizontal);
        let mut engine = AnonymizationEngine::new(AnonymizerConfig::default(), PolicyFilter::default(), StdRng::seed_from_u64(1));
        engine.anonymize_text(&text, &Matrix::IDENTITY).unwrap();

        let report = RunReport::from_engine(&engine, "in.json", "out.json", Some(1)).with_highlights(3);
        assert!(report.summary().starts_with("1 text objects, 3 glyphs"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save(&path).unwrap();
        let back: RunReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.stats, report.stats);
        assert_eq!(back.records.len(), 3);
        assert_eq!(back.cache.entries, 3);
    }
}
