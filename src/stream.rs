//! Glyph stream adapter
//! Created: 2026-09-16
//!
//! Converts between the host's text objects (ordered glyph show events) and
//! the [`Glyph`] records the anonymizer works with.

use serde::{Deserialize, Serialize};

use crate::types::{FontRef, Glyph, Matrix, WritingMode};

/// One glyph show event as emitted by the host
#[derive(Debug, Clone)]
pub struct GlyphEvent {
    pub font: FontRef,
    pub matrix: Matrix,
    pub glyph: u32,
    pub unicode: char,
    pub wmode: WritingMode,
}

impl GlyphEvent {
    pub fn record(&self) -> GlyphRecord {
        GlyphRecord {
            font: self.font.name().to_string(),
            matrix: self.matrix,
            glyph: self.glyph,
            unicode: self.unicode,
            wmode: self.wmode,
        }
    }
}

/// Serializable form of a [`GlyphEvent`], fonts referenced by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRecord {
    pub font: String,
    pub matrix: Matrix,
    pub glyph: u32,
    pub unicode: char,
    #[serde(default)]
    pub wmode: WritingMode,
}

/// Ordered text object
#[derive(Debug, Clone, Default)]
pub struct Text {
    events: Vec<GlyphEvent>,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_glyph(&mut self, font: FontRef, matrix: Matrix, glyph: u32, unicode: char, wmode: WritingMode) {
        self.events.push(GlyphEvent {
            font,
            matrix,
            glyph,
            unicode,
            wmode,
        });
    }

    /// Lay out `s` glyph by glyph starting at `matrix`, using the font's
    /// character map and advances. Characters the font lacks are skipped.
    pub fn show_string(&mut self, font: &FontRef, matrix: Matrix, s: &str, wmode: WritingMode) -> Matrix {
        let mut m = matrix;
        for unicode in s.chars() {
            if let Some(glyph) = font.glyph_for_unicode(unicode) {
                self.show_glyph(font.clone(), m, glyph, unicode, wmode);
                let (tx, ty) = wmode.step(font.advance(glyph, wmode));
                m = m.advance(tx, ty);
            }
        }
        m
    }

    pub fn events(&self) -> &[GlyphEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn records(&self) -> Vec<GlyphRecord> {
        self.events.iter().map(GlyphEvent::record).collect()
    }

    /// Append every event of `self` to `other`
    pub fn walk(&self, other: &mut Text) {
        other.events.extend(self.events.iter().cloned());
    }

    pub fn glyphs(&self) -> Vec<Glyph> {
        text_to_glyphs(self)
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            write!(f, "{}", event.unicode)?;
        }
        Ok(())
    }
}

pub fn text_to_glyphs(text: &Text) -> Vec<Glyph> {
    text.events
        .iter()
        .map(|e| Glyph::new(e.font.clone(), e.matrix, e.glyph, e.unicode, e.wmode))
        .collect()
}

pub fn glyphs_to_text<'a>(glyphs: impl IntoIterator<Item = &'a Glyph>) -> Text {
    let mut text = Text::new();
    for g in glyphs {
        text.show_glyph(g.font.clone(), g.matrix, g.glyph, g.unicode, g.wmode);
    }
    text
}
