//! Anonymizing decorator over a host draw device
//! Created: 2026-09-28

use std::borrow::Cow;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use super::{ColorSpace, Image, Path, Rect, RenderSink, Shade, StrokeState};
use crate::engine::AnonymizationEngine;
use crate::error::Result;
use crate::overlay;
use crate::stream::Text;
use crate::types::Matrix;

/// Rewrites the text of every text call through the engine and forwards
/// everything to the wrapped sink.
#[derive(Debug)]
pub struct AnonymizingDevice<S, R: Rng = StdRng> {
    sink: S,
    engine: AnonymizationEngine<R>,
    mask_images: bool,
}

impl<S: RenderSink, R: Rng> AnonymizingDevice<S, R> {
    pub fn new(sink: S, engine: AnonymizationEngine<R>) -> Self {
        let mask_images = engine.config().mask_images;
        Self {
            sink,
            engine,
            mask_images,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn engine(&self) -> &AnonymizationEngine<R> {
        &self.engine
    }

    pub fn into_parts(self) -> (S, AnonymizationEngine<R>) {
        (self.sink, self.engine)
    }

    /// Draw the highlight overlay of everything substituted so far into
    /// the wrapped sink. Returns the number of polygons drawn.
    pub fn draw_highlights(&mut self) -> Result<usize> {
        let drawn = overlay::draw(&mut self.sink, self.engine.records())?;
        debug!(polygons = drawn, "drew substitution highlights");
        Ok(drawn)
    }

    fn image<'a>(&self, image: &'a Image) -> Cow<'a, Image> {
        if self.mask_images {
            Cow::Owned(image.masked())
        } else {
            Cow::Borrowed(image)
        }
    }
}

impl<S: RenderSink, R: Rng> RenderSink for AnonymizingDevice<S, R> {
    fn fill_text(&mut self, text: &Text, ctm: &Matrix, colorspace: ColorSpace, color: &[f32], alpha: f32) -> Result<()> {
        let text = self.engine.anonymize_text(text, ctm)?;
        self.sink.fill_text(&text, ctm, colorspace, color, alpha)
    }

    fn clip_text(&mut self, text: &Text, ctm: &Matrix) -> Result<()> {
        let text = self.engine.anonymize_text(text, ctm)?;
        self.sink.clip_text(&text, ctm)
    }

    fn stroke_text(
        &mut self,
        text: &Text,
        stroke: &StrokeState,
        ctm: &Matrix,
        colorspace: ColorSpace,
        color: &[f32],
        alpha: f32,
    ) -> Result<()> {
        let text = self.engine.anonymize_text(text, ctm)?;
        self.sink.stroke_text(&text, stroke, ctm, colorspace, color, alpha)
    }

    fn clip_stroke_text(&mut self, text: &Text, stroke: &StrokeState, ctm: &Matrix) -> Result<()> {
        let text = self.engine.anonymize_text(text, ctm)?;
        self.sink.clip_stroke_text(&text, stroke, ctm)
    }

    fn ignore_text(&mut self, text: &Text, ctm: &Matrix) -> Result<()> {
        let text = self.engine.anonymize_text(text, ctm)?;
        self.sink.ignore_text(&text, ctm)
    }

    fn fill_path(
        &mut self,
        path: &Path,
        even_odd: bool,
        ctm: &Matrix,
        colorspace: ColorSpace,
        color: &[f32],
        alpha: f32,
    ) -> Result<()> {
        self.sink.fill_path(path, even_odd, ctm, colorspace, color, alpha)
    }

    fn clip_path(&mut self, path: &Path, even_odd: bool, ctm: &Matrix) -> Result<()> {
        self.sink.clip_path(path, even_odd, ctm)
    }

    fn stroke_path(
        &mut self,
        path: &Path,
        stroke: &StrokeState,
        ctm: &Matrix,
        colorspace: ColorSpace,
        color: &[f32],
        alpha: f32,
    ) -> Result<()> {
        self.sink.stroke_path(path, stroke, ctm, colorspace, color, alpha)
    }

    fn clip_stroke_path(&mut self, path: &Path, stroke: &StrokeState, ctm: &Matrix) -> Result<()> {
        self.sink.clip_stroke_path(path, stroke, ctm)
    }

    fn fill_shade(&mut self, shade: &Shade, ctm: &Matrix, alpha: f32) -> Result<()> {
        self.sink.fill_shade(shade, ctm, alpha)
    }

    fn fill_image(&mut self, image: &Image, ctm: &Matrix, alpha: f32) -> Result<()> {
        let image = self.image(image);
        self.sink.fill_image(&image, ctm, alpha)
    }

    fn fill_image_mask(&mut self, image: &Image, ctm: &Matrix, colorspace: ColorSpace, color: &[f32], alpha: f32) -> Result<()> {
        let image = self.image(image);
        self.sink.fill_image_mask(&image, ctm, colorspace, color, alpha)
    }

    fn clip_image_mask(&mut self, image: &Image, ctm: &Matrix) -> Result<()> {
        let image = self.image(image);
        self.sink.clip_image_mask(&image, ctm)
    }

    fn begin_mask(&mut self, area: &Rect, luminosity: bool, colorspace: ColorSpace, color: &[f32]) -> Result<()> {
        self.sink.begin_mask(area, luminosity, colorspace, color)
    }

    fn end_mask(&mut self) -> Result<()> {
        self.sink.end_mask()
    }

    fn pop_clip(&mut self) -> Result<()> {
        self.sink.pop_clip()
    }

    fn begin_group(&mut self, area: &Rect, isolated: bool, knockout: bool, blend_mode: &str, alpha: f32) -> Result<()> {
        self.sink.begin_group(area, isolated, knockout, blend_mode, alpha)
    }

    fn end_group(&mut self) -> Result<()> {
        self.sink.end_group()
    }

    fn begin_tile(&mut self, area: &Rect, view: &Rect, xstep: f64, ystep: f64, ctm: &Matrix, id: i32) -> Result<()> {
        self.sink.begin_tile(area, view, xstep, ystep, ctm, id)
    }

    fn end_tile(&mut self) -> Result<()> {
        self.sink.end_tile()
    }

    fn close(&mut self) -> Result<()> {
        self.sink.close()
    }
}
