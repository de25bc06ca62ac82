//! Error types and handling for the glyph anonymizer
//! Created: 2026-09-14

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for anonymization operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for anonymization operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Policy error: {0}")]
    PolicyError(#[from] PolicyError),

    #[error("Anonymizer error: {0}")]
    AnonymizerError(#[from] AnonymizerError),

    #[error("Page dump error: {0}")]
    DumpError(#[from] DumpError),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Config parsing error: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PolicyError {
    #[error("Failed to read policy file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed zone file: {0}")]
    MalformedZones(String),

    #[error("Invalid zone: {0}")]
    InvalidZone(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnonymizerError {
    #[error("No replacement for {original:?} within tolerance after {attempts} attempts")]
    Exhausted { original: String, attempts: u64 },

    #[error("Cannot anonymize an empty chunk")]
    EmptyChunk,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DumpError {
    #[error("Unknown font referenced: {0}")]
    UnknownFont(String),
}
