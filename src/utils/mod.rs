//! Utility helpers shared by the library and the CLI

pub mod logger;

pub use logger::{LogLevel, Logger};
