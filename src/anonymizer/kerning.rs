//! Kerning adjustment
//! Created: 2026-09-23
//!
//! Source documents routinely position glyphs a little off their nominal
//! advance. A [`KerningProfile`] measures that residual for every adjacent
//! pair of an original run so that the replacement run can be laid out on
//! the same sequence of gaps, not merely the same total width.

use crate::font::FontMetrics;
use crate::types::{Glyph, Matrix, WritingMode};

/// Residual spacing between `matrix` and the observed position of the
/// following glyph, along the writing axis and in glyph space.
pub fn determine_kerning(font: &dyn FontMetrics, glyph: u32, wmode: WritingMode, matrix: &Matrix, next: &Matrix) -> f64 {
    let adv = font.advance(glyph, wmode);
    match wmode {
        WritingMode::Horizontal => {
            let tx = if matrix.a != 0.0 {
                (next.e - matrix.e) / matrix.a
            } else if matrix.b != 0.0 {
                (next.f - matrix.f) / matrix.b
            } else {
                adv
            };
            tx - adv
        }
        WritingMode::Vertical => {
            let ty = if matrix.c != 0.0 {
                (next.e - matrix.e) / matrix.c
            } else if matrix.d != 0.0 {
                (next.f - matrix.f) / matrix.d
            } else {
                -adv
            };
            ty + adv
        }
    }
}

/// Per-position kerning deltas of an original glyph run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KerningProfile {
    deltas: Vec<f64>,
}

impl KerningProfile {
    pub fn measure(glyphs: &[Glyph]) -> Self {
        let deltas = glyphs
            .iter()
            .enumerate()
            .map(|(i, g)| match glyphs.get(i + 1) {
                Some(next) => determine_kerning(g.font.as_ref(), g.glyph, g.wmode, &g.matrix, &next.matrix),
                None => 0.0,
            })
            .collect();
        Self { deltas }
    }

    /// A profile with no residual spacing
    pub fn flat(len: usize) -> Self {
        Self { deltas: vec![0.0; len] }
    }

    pub fn delta(&self, index: usize) -> f64 {
        self.deltas.get(index).copied().unwrap_or(0.0)
    }

    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    pub fn is_flat(&self) -> bool {
        self.deltas.iter().all(|d| *d == 0.0)
    }

    /// Position of the glyph following slot `index`, given that slot is
    /// drawn at `matrix` with a replacement of advance `advance`.
    pub fn place_after(&self, index: usize, matrix: &Matrix, advance: f64, wmode: WritingMode) -> Matrix {
        let kern = self.delta(index);
        match wmode {
            WritingMode::Horizontal => matrix.advance(advance + kern, 0.0),
            WritingMode::Vertical => matrix.advance(0.0, -advance + kern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TableFont;
    use crate::types::FontRef;
    use std::sync::Arc;

    fn font() -> FontRef {
        Arc::new(TableFont::new("K").with_chars("abc", |_| 0.5).with_vertical_advance(1.0))
    }

    #[test]
    fn test_measures_extra_gap_in_glyph_space() {
        let f = font();
        let a = Glyph::new(f.clone(), Matrix::new(10.0, 0.0, 0.0, 10.0, 0.0, 0.0), 1, 'a', WritingMode::Horizontal);
        let b = Glyph::new(f.clone(), Matrix::new(10.0, 0.0, 0.0, 10.0, 7.0, 0.0), 2, 'b', WritingMode::Horizontal);
        let c = Glyph::new(f, Matrix::new(10.0, 0.0, 0.0, 10.0, 12.0, 0.0), 3, 'c', WritingMode::Horizontal);

        let profile = KerningProfile::measure(&[a.clone(), b, c]);
        assert!((profile.delta(0) - 0.2).abs() < 1e-12);
        assert!(profile.delta(1).abs() < 1e-12);
        assert_eq!(profile.delta(2), 0.0);

        let placed = profile.place_after(0, &a.matrix, 0.3, WritingMode::Horizontal);
        assert!((placed.e - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_kerning_uses_c_and_d() {
        let f = font();
        let m = Matrix::new(10.0, 0.0, 0.0, 10.0, 0.0, 100.0);
        let top = Glyph::new(f.clone(), m, 1, 'a', WritingMode::Vertical);
        // nominal next is at f = 90; the document placed it at 89
        let below = Glyph::new(f, Matrix { f: 89.0, ..m }, 2, 'b', WritingMode::Vertical);

        let profile = KerningProfile::measure(&[top.clone(), below.clone()]);
        assert!((profile.delta(0) + 0.1).abs() < 1e-12);

        let placed = profile.place_after(0, &top.matrix, 1.0, WritingMode::Vertical);
        assert!((placed.f - below.matrix.f).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_text_falls_back_to_b() {
        let f = font();
        let m = Matrix::new(0.0, 10.0, -10.0, 0.0, 0.0, 0.0);
        let next = Matrix { f: 6.0, ..m };
        let kern = determine_kerning(f.as_ref(), 1, WritingMode::Horizontal, &m, &next);
        assert!((kern - 0.1).abs() < 1e-12);
    }
}
