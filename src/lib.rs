//! Glyph-substitution text anonymizer
//!
//! Replaces the text a page renders with random characters of the same
//! class, chosen so that every replacement run occupies the space of the
//! run it replaces. The anonymizer sits between a host renderer and its
//! draw device as a [`RenderSink`] decorator.

// Configuration and Core Types
pub mod config;
pub mod error;
pub mod types;

// Host Interfaces
pub mod device;
pub mod dump;
pub mod font;
pub mod stream;

// Substitution Pipeline
pub mod anonymizer;
pub mod engine;
pub mod policy;
pub mod substitution;
pub mod tokenizer;

// Diagnostics
pub mod overlay;
pub mod report;
pub mod utils;

pub use anonymizer::{Anonymizer, ChunkOutcome, Outcome, SearchParams, SearchStatus, SubstitutionRecord};
pub use config::{AnonymizerConfig, ChunkingMode, ExhaustionPolicy, PoolSource, RedactionScope};
pub use device::{AnonymizingDevice, DrawOp, RecordingSink, RenderSink};
pub use dump::{PageDump, RenderedPage};
pub use engine::{AnonymizationEngine, EngineStats};
pub use error::{Error, Result};
pub use font::{CharacterMap, FontMetrics, TableFont};
pub use policy::{PolicyFilter, StopWords, WordList, ZoneWhitelist};
pub use report::RunReport;
pub use stream::Text;
pub use substitution::{ReplacementCache, SharedReplacementCache};
pub use tokenizer::Tokenizer;
pub use types::{FontRef, Glyph, Matrix, WritingMode};
pub use utils::{LogLevel, Logger};
