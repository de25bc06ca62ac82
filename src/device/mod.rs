//! Draw-device interface of the host renderer
//! Created: 2026-09-28
//!
//! [`RenderSink`] mirrors the host's device callbacks one to one. The
//! anonymizer plugs in as a decorator ([`AnonymizingDevice`]) that rewrites
//! the text arguments and forwards every call to the sink it wraps.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stream::Text;
use crate::types::Matrix;

pub mod anonymizing;
pub mod recording;

pub use anonymizing::AnonymizingDevice;
pub use recording::{DrawOp, RecordingSink};

/// Sample value raster images are blanked to
pub const IMAGE_MASK_VALUE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathOp {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CurveTo { x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64 },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(PathOp::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(PathOp::LineTo { x, y });
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.ops.push(PathOp::CurveTo { x1, y1, x2, y2, x3, y3 });
    }

    pub fn close_path(&mut self) {
        self.ops.push(PathOp::Close);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeState {
    pub line_width: f32,
    pub line_cap: u8,
    pub line_join: u8,
    pub miter_limit: f32,
    pub dash: Vec<f32>,
}

impl Default for StrokeState {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            line_cap: 0,
            line_join: 0,
            miter_limit: 10.0,
            dash: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Decoded raster image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub components: u8,
    pub samples: Vec<u8>,
}

impl Image {
    /// Same geometry with every sample set to [`IMAGE_MASK_VALUE`]
    pub fn masked(&self) -> Image {
        Image {
            samples: vec![IMAGE_MASK_VALUE; self.samples.len()],
            ..self.clone()
        }
    }
}

/// Opaque host shading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shade {
    pub id: String,
}

/// Host draw device
pub trait RenderSink {
    fn fill_text(&mut self, text: &Text, ctm: &Matrix, colorspace: ColorSpace, color: &[f32], alpha: f32) -> Result<()>;
    fn clip_text(&mut self, text: &Text, ctm: &Matrix) -> Result<()>;
    fn stroke_text(
        &mut self,
        text: &Text,
        stroke: &StrokeState,
        ctm: &Matrix,
        colorspace: ColorSpace,
        color: &[f32],
        alpha: f32,
    ) -> Result<()>;
    fn clip_stroke_text(&mut self, text: &Text, stroke: &StrokeState, ctm: &Matrix) -> Result<()>;
    fn ignore_text(&mut self, text: &Text, ctm: &Matrix) -> Result<()>;

    fn fill_path(
        &mut self,
        path: &Path,
        even_odd: bool,
        ctm: &Matrix,
        colorspace: ColorSpace,
        color: &[f32],
        alpha: f32,
    ) -> Result<()>;
    fn clip_path(&mut self, path: &Path, even_odd: bool, ctm: &Matrix) -> Result<()>;
    fn stroke_path(
        &mut self,
        path: &Path,
        stroke: &StrokeState,
        ctm: &Matrix,
        colorspace: ColorSpace,
        color: &[f32],
        alpha: f32,
    ) -> Result<()>;
    fn clip_stroke_path(&mut self, path: &Path, stroke: &StrokeState, ctm: &Matrix) -> Result<()>;

    fn fill_shade(&mut self, shade: &Shade, ctm: &Matrix, alpha: f32) -> Result<()>;
    fn fill_image(&mut self, image: &Image, ctm: &Matrix, alpha: f32) -> Result<()>;
    fn fill_image_mask(&mut self, image: &Image, ctm: &Matrix, colorspace: ColorSpace, color: &[f32], alpha: f32) -> Result<()>;
    fn clip_image_mask(&mut self, image: &Image, ctm: &Matrix) -> Result<()>;

    fn begin_mask(&mut self, area: &Rect, luminosity: bool, colorspace: ColorSpace, color: &[f32]) -> Result<()>;
    fn end_mask(&mut self) -> Result<()>;
    fn pop_clip(&mut self) -> Result<()>;
    fn begin_group(&mut self, area: &Rect, isolated: bool, knockout: bool, blend_mode: &str, alpha: f32) -> Result<()>;
    fn end_group(&mut self) -> Result<()>;
    fn begin_tile(&mut self, area: &Rect, view: &Rect, xstep: f64, ystep: f64, ctm: &Matrix, id: i32) -> Result<()>;
    fn end_tile(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
