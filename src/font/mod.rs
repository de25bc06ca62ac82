//! Font capability required from the host
//! Created: 2026-09-16
//!
//! The anonymizer never parses font programs. Everything it needs to know
//! about a font is answered through [`FontMetrics`]: a stable name used as
//! the identity key for pools and the replacement cache, the advance of a
//! glyph in glyph space (fractions of the font size), and the glyph that
//! renders a given character.

use std::fmt::Debug;

use crate::types::WritingMode;

pub mod survey;
pub mod table;

pub use survey::CharacterMap;
pub use table::TableFont;

/// Metrics provider for one host font
pub trait FontMetrics: Debug + Send + Sync {
    /// Identity key of the font
    fn name(&self) -> &str;

    /// Advance of `glyph` along `wmode`, in glyph space
    fn advance(&self, glyph: u32, wmode: WritingMode) -> f64;

    /// Glyph index rendering `unicode`, if the font has one
    fn glyph_for_unicode(&self, unicode: char) -> Option<u32>;
}
