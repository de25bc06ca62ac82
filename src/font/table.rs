//! Table-driven font metrics
//!
//! Used by the page dump format, where the host exports the advances and
//! character map of every font it drew with, and by tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::FontMetrics;
use crate::types::WritingMode;

/// Serializable description of a font's metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSpec {
    pub name: String,
    #[serde(default = "default_advance")]
    pub default_advance: f64,
    #[serde(default = "default_vertical_advance")]
    pub vertical_advance: f64,
    #[serde(default)]
    pub glyphs: Vec<GlyphSpec>,
}

/// One glyph of a [`FontSpec`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlyphSpec {
    pub glyph: u32,
    #[serde(default)]
    pub unicode: Option<char>,
    pub advance: f64,
}

fn default_advance() -> f64 {
    0.5
}

fn default_vertical_advance() -> f64 {
    1.0
}

/// Font whose metrics are looked up in in-memory tables
#[derive(Debug, Clone)]
pub struct TableFont {
    name: String,
    default_advance: f64,
    vertical_advance: f64,
    advances: HashMap<u32, f64>,
    cmap: HashMap<char, u32>,
}

impl TableFont {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_advance: default_advance(),
            vertical_advance: default_vertical_advance(),
            advances: HashMap::new(),
            cmap: HashMap::new(),
        }
    }

    /// Map `unicode` to `glyph` with the given horizontal advance
    pub fn with_glyph(mut self, unicode: char, glyph: u32, advance: f64) -> Self {
        self.cmap.insert(unicode, glyph);
        self.advances.insert(glyph, advance);
        self
    }

    /// Every character of `chars` gets its own glyph, numbered from 1,
    /// with `advance_of` deciding its width.
    pub fn with_chars(mut self, chars: &str, advance_of: impl Fn(char) -> f64) -> Self {
        for ch in chars.chars() {
            if self.cmap.contains_key(&ch) {
                continue;
            }
            let glyph = self.next_glyph_index();
            self = self.with_glyph(ch, glyph, advance_of(ch));
        }
        self
    }

    pub fn with_vertical_advance(mut self, advance: f64) -> Self {
        self.vertical_advance = advance;
        self
    }

    pub fn from_spec(spec: &FontSpec) -> Self {
        let mut font = TableFont::new(spec.name.clone());
        font.default_advance = spec.default_advance;
        font.vertical_advance = spec.vertical_advance;
        for g in &spec.glyphs {
            font.advances.insert(g.glyph, g.advance);
            if let Some(unicode) = g.unicode {
                font.cmap.insert(unicode, g.glyph);
            }
        }
        font
    }

    pub fn supported_chars(&self) -> usize {
        self.cmap.len()
    }

    fn next_glyph_index(&self) -> u32 {
        self.advances.keys().max().map_or(1, |max| max + 1)
    }
}

impl FontMetrics for TableFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn advance(&self, glyph: u32, wmode: WritingMode) -> f64 {
        match wmode {
            WritingMode::Horizontal => self.advances.get(&glyph).copied().unwrap_or(self.default_advance),
            WritingMode::Vertical => self.vertical_advance,
        }
    }

    fn glyph_for_unicode(&self, unicode: char) -> Option<u32> {
        self.cmap.get(&unicode).copied()
    }
}
