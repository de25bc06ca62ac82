//! Character survey
//!
//! Some host fonts only carry the glyphs a document actually uses, so
//! asking them for arbitrary alphabet characters is unreliable. A
//! [`CharacterMap`] collects the `(character, glyph)` pairs observed per
//! font during a dry pass over the page and answers lookups from that.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::device::{ColorSpace, Image, Path, Rect, RenderSink, Shade, StrokeState};
use crate::error::Result;
use crate::stream::Text;
use crate::types::Matrix;

#[derive(Debug, Clone, Default)]
pub struct CharacterMap {
    fonts: HashMap<String, BTreeMap<char, u32>>,
}

impl CharacterMap {
    /// Record that `glyph` renders `unicode` in `font`. The first glyph
    /// observed for a character is kept.
    pub fn insert(&mut self, font: &str, unicode: char, glyph: u32) {
        self.fonts
            .entry(font.to_string())
            .or_default()
            .entry(unicode)
            .or_insert(glyph);
    }

    pub fn glyph(&self, font: &str, unicode: char) -> Option<u32> {
        self.fonts.get(font).and_then(|chars| chars.get(&unicode).copied())
    }

    pub fn record(&mut self, text: &Text) {
        for event in text.events() {
            self.insert(event.font.name(), event.unicode, event.glyph);
        }
    }

    pub fn survey<'a>(texts: impl IntoIterator<Item = &'a Text>) -> Self {
        let mut map = Self::default();
        for text in texts {
            map.record(text);
        }
        map
    }

    /// Characters observed in `font`, in code point order
    pub fn chars(&self, font: &str) -> Vec<char> {
        self.fonts
            .get(font)
            .map(|chars| chars.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn fonts(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fonts.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

// Survey pass: every text call is recorded, everything else is dropped.
impl RenderSink for CharacterMap {
    fn fill_text(&mut self, text: &Text, _ctm: &Matrix, _cs: ColorSpace, _color: &[f32], _alpha: f32) -> Result<()> {
        self.record(text);
        Ok(())
    }

    fn clip_text(&mut self, text: &Text, _ctm: &Matrix) -> Result<()> {
        self.record(text);
        Ok(())
    }

    fn stroke_text(
        &mut self,
        text: &Text,
        _stroke: &StrokeState,
        _ctm: &Matrix,
        _cs: ColorSpace,
        _color: &[f32],
        _alpha: f32,
    ) -> Result<()> {
        self.record(text);
        Ok(())
    }

    fn clip_stroke_text(&mut self, text: &Text, _stroke: &StrokeState, _ctm: &Matrix) -> Result<()> {
        self.record(text);
        Ok(())
    }

    fn ignore_text(&mut self, text: &Text, _ctm: &Matrix) -> Result<()> {
        self.record(text);
        Ok(())
    }

    fn fill_path(&mut self, _: &Path, _: bool, _: &Matrix, _: ColorSpace, _: &[f32], _: f32) -> Result<()> {
        Ok(())
    }

    fn clip_path(&mut self, _: &Path, _: bool, _: &Matrix) -> Result<()> {
        Ok(())
    }

    fn stroke_path(&mut self, _: &Path, _: &StrokeState, _: &Matrix, _: ColorSpace, _: &[f32], _: f32) -> Result<()> {
        Ok(())
    }

    fn clip_stroke_path(&mut self, _: &Path, _: &StrokeState, _: &Matrix) -> Result<()> {
        Ok(())
    }

    fn fill_shade(&mut self, _: &Shade, _: &Matrix, _: f32) -> Result<()> {
        Ok(())
    }

    fn fill_image(&mut self, _: &Image, _: &Matrix, _: f32) -> Result<()> {
        Ok(())
    }

    fn fill_image_mask(&mut self, _: &Image, _: &Matrix, _: ColorSpace, _: &[f32], _: f32) -> Result<()> {
        Ok(())
    }

    fn clip_image_mask(&mut self, _: &Image, _: &Matrix) -> Result<()> {
        Ok(())
    }

    fn begin_mask(&mut self, _: &Rect, _: bool, _: ColorSpace, _: &[f32]) -> Result<()> {
        Ok(())
    }

    fn end_mask(&mut self) -> Result<()> {
        Ok(())
    }

    fn pop_clip(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_group(&mut self, _: &Rect, _: bool, _: bool, _: &str, _: f32) -> Result<()> {
        Ok(())
    }

    fn end_group(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_tile(&mut self, _: &Rect, _: &Rect, _: f64, _: f64, _: &Matrix, _: i32) -> Result<()> {
        Ok(())
    }

    fn end_tile(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        debug!(fonts = self.fonts.len(), chars = self.len(), "character survey complete");
        Ok(())
    }
}
