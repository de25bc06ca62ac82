//! Positioned glyph records produced by the stream adapter

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::font::FontMetrics;
use crate::types::geometry::{Matrix, Point};

/// Shared handle to a host font
pub type FontRef = Arc<dyn FontMetrics>;

/// Direction glyphs advance in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingMode {
    Horizontal,
    Vertical,
}

impl WritingMode {
    /// Glyph-space translation for an advance of `advance` units
    pub fn step(&self, advance: f64) -> (f64, f64) {
        match self {
            WritingMode::Horizontal => (advance, 0.0),
            WritingMode::Vertical => (0.0, -advance),
        }
    }
}

impl Default for WritingMode {
    fn default() -> Self {
        WritingMode::Horizontal
    }
}

/// One glyph shown by a text object
#[derive(Clone)]
pub struct Glyph {
    pub font: FontRef,
    pub matrix: Matrix,
    /// `matrix` advanced by the glyph's own advance width
    pub next_matrix: Matrix,
    pub glyph: u32,
    pub unicode: char,
    pub wmode: WritingMode,
}

impl Glyph {
    pub fn new(font: FontRef, matrix: Matrix, glyph: u32, unicode: char, wmode: WritingMode) -> Self {
        let next_matrix = advance_matrix(&matrix, font.as_ref(), glyph, wmode);
        Self {
            font,
            matrix,
            next_matrix,
            glyph,
            unicode,
            wmode,
        }
    }

    pub fn font_name(&self) -> &str {
        self.font.name()
    }

    /// Font size as carried by the text matrix
    pub fn size(&self) -> f64 {
        self.matrix.font_size()
    }

    pub fn advance(&self) -> f64 {
        self.font.advance(self.glyph, self.wmode)
    }

    pub fn same_font(&self, other: &Glyph) -> bool {
        Arc::ptr_eq(&self.font, &other.font) || self.font_name() == other.font_name()
    }

    /// The same glyph slot drawn with a different character
    pub fn replaced(&self, unicode: char, glyph: u32) -> Glyph {
        Glyph::new(self.font.clone(), self.matrix, glyph, unicode, self.wmode)
    }

    /// Footprint of the glyph box in device space
    pub fn vertices(&self, ctm: &Matrix) -> [Point; 4] {
        footprint(&self.matrix, &self.next_matrix, ctm)
    }
}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("font", &self.font_name())
            .field("unicode", &self.unicode)
            .field("glyph", &self.glyph)
            .field("wmode", &self.wmode)
            .field("matrix", &self.matrix.to_array())
            .finish()
    }
}

/// Advance `m` by the measured advance of `glyph`
pub fn advance_matrix(m: &Matrix, font: &dyn FontMetrics, glyph: u32, wmode: WritingMode) -> Matrix {
    let (tx, ty) = wmode.step(font.advance(glyph, wmode));
    m.advance(tx, ty)
}

/// Quadrilateral spanned between a glyph's matrix and its advanced matrix,
/// one font size tall, mapped through `ctm`.
pub fn footprint(matrix: &Matrix, next: &Matrix, ctm: &Matrix) -> [Point; 4] {
    let m = matrix.concat(ctm);
    let n = next.concat(ctm);
    [
        Point::new(m.e, m.f),
        Point::new(m.e + m.b, m.f - m.a),
        Point::new(n.e + n.b, n.f - n.a),
        Point::new(n.e, n.f),
    ]
}

/// Concatenated characters of a glyph sequence
pub fn glyph_string(glyphs: &[Glyph]) -> String {
    glyphs.iter().map(|g| g.unicode).collect()
}
