//! A sink that records the calls it receives

use serde::{Deserialize, Serialize};

use super::{ColorSpace, Image, Path, Rect, RenderSink, Shade, StrokeState};
use crate::error::Result;
use crate::stream::{GlyphRecord, Text};
use crate::types::Matrix;

/// One recorded device call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillText {
        text: Vec<GlyphRecord>,
        ctm: Matrix,
        colorspace: ColorSpace,
        color: Vec<f32>,
        alpha: f32,
    },
    ClipText {
        text: Vec<GlyphRecord>,
        ctm: Matrix,
    },
    StrokeText {
        text: Vec<GlyphRecord>,
        stroke: StrokeState,
        ctm: Matrix,
        colorspace: ColorSpace,
        color: Vec<f32>,
        alpha: f32,
    },
    ClipStrokeText {
        text: Vec<GlyphRecord>,
        stroke: StrokeState,
        ctm: Matrix,
    },
    IgnoreText {
        text: Vec<GlyphRecord>,
        ctm: Matrix,
    },
    FillPath {
        path: Path,
        even_odd: bool,
        ctm: Matrix,
        colorspace: ColorSpace,
        color: Vec<f32>,
        alpha: f32,
    },
    ClipPath {
        path: Path,
        even_odd: bool,
        ctm: Matrix,
    },
    StrokePath {
        path: Path,
        stroke: StrokeState,
        ctm: Matrix,
        colorspace: ColorSpace,
        color: Vec<f32>,
        alpha: f32,
    },
    ClipStrokePath {
        path: Path,
        stroke: StrokeState,
        ctm: Matrix,
    },
    FillShade {
        shade: Shade,
        ctm: Matrix,
        alpha: f32,
    },
    FillImage {
        image: Image,
        ctm: Matrix,
        alpha: f32,
    },
    FillImageMask {
        image: Image,
        ctm: Matrix,
        colorspace: ColorSpace,
        color: Vec<f32>,
        alpha: f32,
    },
    ClipImageMask {
        image: Image,
        ctm: Matrix,
    },
    BeginMask {
        area: Rect,
        luminosity: bool,
        colorspace: ColorSpace,
        color: Vec<f32>,
    },
    EndMask,
    PopClip,
    BeginGroup {
        area: Rect,
        isolated: bool,
        knockout: bool,
        blend_mode: String,
        alpha: f32,
    },
    EndGroup,
    BeginTile {
        area: Rect,
        view: Rect,
        xstep: f64,
        ystep: f64,
        ctm: Matrix,
        id: i32,
    },
    EndTile,
    Close,
}

impl DrawOp {
    pub fn name(&self) -> &'static str {
        match self {
            DrawOp::FillText { .. } => "fill_text",
            DrawOp::ClipText { .. } => "clip_text",
            DrawOp::StrokeText { .. } => "stroke_text",
            DrawOp::ClipStrokeText { .. } => "clip_stroke_text",
            DrawOp::IgnoreText { .. } => "ignore_text",
            DrawOp::FillPath { .. } => "fill_path",
            DrawOp::ClipPath { .. } => "clip_path",
            DrawOp::StrokePath { .. } => "stroke_path",
            DrawOp::ClipStrokePath { .. } => "clip_stroke_path",
            DrawOp::FillShade { .. } => "fill_shade",
            DrawOp::FillImage { .. } => "fill_image",
            DrawOp::FillImageMask { .. } => "fill_image_mask",
            DrawOp::ClipImageMask { .. } => "clip_image_mask",
            DrawOp::BeginMask { .. } => "begin_mask",
            DrawOp::EndMask => "end_mask",
            DrawOp::PopClip => "pop_clip",
            DrawOp::BeginGroup { .. } => "begin_group",
            DrawOp::EndGroup => "end_group",
            DrawOp::BeginTile { .. } => "begin_tile",
            DrawOp::EndTile => "end_tile",
            DrawOp::Close => "close",
        }
    }

    /// Glyphs carried by a text operation
    pub fn text(&self) -> Option<&[GlyphRecord]> {
        match self {
            DrawOp::FillText { text, .. }
            | DrawOp::ClipText { text, .. }
            | DrawOp::StrokeText { text, .. }
            | DrawOp::ClipStrokeText { text, .. }
            | DrawOp::IgnoreText { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    ops: Vec<DrawOp>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn push(&mut self, op: DrawOp) -> Result<()> {
        self.ops.push(op);
        Ok(())
    }
}

impl RenderSink for RecordingSink {
    fn fill_text(&mut self, text: &Text, ctm: &Matrix, colorspace: ColorSpace, color: &[f32], alpha: f32) -> Result<()> {
        self.push(DrawOp::FillText {
            text: text.records(),
            ctm: *ctm,
            colorspace,
            color: color.to_vec(),
            alpha,
        })
    }

    fn clip_text(&mut self, text: &Text, ctm: &Matrix) -> Result<()> {
        self.push(DrawOp::ClipText {
            text: text.records(),
            ctm: *ctm,
        })
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
        self.push(DrawOp::StrokeText {
            text: text.records(),
            stroke: stroke.clone(),
            ctm: *ctm,
            colorspace,
            color: color.to_vec(),
            alpha,
        })
    }

    fn clip_stroke_text(&mut self, text: &Text, stroke: &StrokeState, ctm: &Matrix) -> Result<()> {
        self.push(DrawOp::ClipStrokeText {
            text: text.records(),
            stroke: stroke.clone(),
            ctm: *ctm,
        })
    }

    fn ignore_text(&mut self, text: &Text, ctm: &Matrix) -> Result<()> {
        self.push(DrawOp::IgnoreText {
            text: text.records(),
            ctm: *ctm,
        })
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
        self.push(DrawOp::FillPath {
            path: path.clone(),
            even_odd,
            ctm: *ctm,
            colorspace,
            color: color.to_vec(),
            alpha,
        })
    }

    fn clip_path(&mut self, path: &Path, even_odd: bool, ctm: &Matrix) -> Result<()> {
        self.push(DrawOp::ClipPath {
            path: path.clone(),
            even_odd,
            ctm: *ctm,
        })
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
        self.push(DrawOp::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
            ctm: *ctm,
            colorspace,
            color: color.to_vec(),
            alpha,
        })
    }

    fn clip_stroke_path(&mut self, path: &Path, stroke: &StrokeState, ctm: &Matrix) -> Result<()> {
        self.push(DrawOp::ClipStrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
            ctm: *ctm,
        })
    }

    fn fill_shade(&mut self, shade: &Shade, ctm: &Matrix, alpha: f32) -> Result<()> {
        self.push(DrawOp::FillShade {
            shade: shade.clone(),
            ctm: *ctm,
            alpha,
        })
    }

    fn fill_image(&mut self, image: &Image, ctm: &Matrix, alpha: f32) -> Result<()> {
        self.push(DrawOp::FillImage {
            image: image.clone(),
            ctm: *ctm,
            alpha,
        })
    }

    fn fill_image_mask(&mut self, image: &Image, ctm: &Matrix, colorspace: ColorSpace, color: &[f32], alpha: f32) -> Result<()> {
        self.push(DrawOp::FillImageMask {
            image: image.clone(),
            ctm: *ctm,
            colorspace,
            color: color.to_vec(),
            alpha,
        })
    }

    fn clip_image_mask(&mut self, image: &Image, ctm: &Matrix) -> Result<()> {
        self.push(DrawOp::ClipImageMask {
            image: image.clone(),
            ctm: *ctm,
        })
    }

    fn begin_mask(&mut self, area: &Rect, luminosity: bool, colorspace: ColorSpace, color: &[f32]) -> Result<()> {
        self.push(DrawOp::BeginMask {
            area: *area,
            luminosity,
            colorspace,
            color: color.to_vec(),
        })
    }

    fn end_mask(&mut self) -> Result<()> {
        self.push(DrawOp::EndMask)
    }

    fn pop_clip(&mut self) -> Result<()> {
        self.push(DrawOp::PopClip)
    }

    fn begin_group(&mut self, area: &Rect, isolated: bool, knockout: bool, blend_mode: &str, alpha: f32) -> Result<()> {
        self.push(DrawOp::BeginGroup {
            area: *area,
            isolated,
            knockout,
            blend_mode: blend_mode.to_string(),
            alpha,
        })
    }

    fn end_group(&mut self) -> Result<()> {
        self.push(DrawOp::EndGroup)
    }

    fn begin_tile(&mut self, area: &Rect, view: &Rect, xstep: f64, ystep: f64, ctm: &Matrix, id: i32) -> Result<()> {
        self.push(DrawOp::BeginTile {
            area: *area,
            view: *view,
            xstep,
            ystep,
            ctm: *ctm,
            id,
        })
    }

    fn end_tile(&mut self) -> Result<()> {
        self.push(DrawOp::EndTile)
    }

    fn close(&mut self) -> Result<()> {
        self.push(DrawOp::Close)
    }
}
