//! Page dump format
//! Created: 2026-10-02
//!
//! A page dump is the host's export of one page: its size in points, the
//! metrics of every font it draws with, and the ordered device calls of a
//! rendering pass in page space. Replaying a dump into a [`RenderSink`]
//! stands in for running the page through the host renderer.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::device::{DrawOp, RenderSink};
use crate::error::{DumpError, Result};
use crate::font::table::{FontSpec, TableFont};
use crate::stream::{GlyphRecord, Text};
use crate::types::{FontRef, Matrix};

/// Points per inch of page space
pub const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDump {
    /// Page width in points
    pub width: f64,
    /// Page height in points
    pub height: f64,
    #[serde(default)]
    pub fonts: Vec<FontSpec>,
    #[serde(default)]
    pub ops: Vec<DrawOp>,
}

/// Fonts of a dump, by name
pub type FontTable = HashMap<String, FontRef>;

impl PageDump {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let dump = Self::parse(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), fonts = dump.fonts.len(), ops = dump.ops.len(), "loaded page dump");
        Ok(dump)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Page space to device space at `resolution` pixels per inch
    pub fn page_matrix(resolution: f64) -> Matrix {
        let scale = resolution / POINTS_PER_INCH;
        Matrix::scale(scale, scale)
    }

    /// Device size in pixels at `resolution`
    pub fn pixel_size(&self, resolution: f64) -> (f64, f64) {
        (
            self.width * resolution / POINTS_PER_INCH,
            self.height * resolution / POINTS_PER_INCH,
        )
    }

    pub fn font_table(&self) -> FontTable {
        self.fonts
            .iter()
            .map(|spec| {
                let font: FontRef = Arc::new(TableFont::from_spec(spec));
                (spec.name.clone(), font)
            })
            .collect()
    }

    /// Issue every recorded call against `sink` with the page scaled to
    /// `resolution`. Recorded `close` calls are skipped; closing the sink
    /// is left to the caller.
    pub fn replay<S: RenderSink + ?Sized>(&self, sink: &mut S, resolution: f64) -> Result<()> {
        let fonts = self.font_table();
        let page = Self::page_matrix(resolution);
        for op in &self.ops {
            replay_op(op, sink, &fonts, &page)?;
        }
        Ok(())
    }
}

/// Rebuild a text object from serialized glyphs
pub fn text_from_records(records: &[GlyphRecord], fonts: &FontTable) -> Result<Text> {
    let mut text = Text::new();
    for record in records {
        let font = fonts
            .get(&record.font)
            .ok_or_else(|| DumpError::UnknownFont(record.font.clone()))?;
        text.show_glyph(font.clone(), record.matrix, record.glyph, record.unicode, record.wmode);
    }
    Ok(text)
}

fn replay_op<S: RenderSink + ?Sized>(op: &DrawOp, sink: &mut S, fonts: &FontTable, page: &Matrix) -> Result<()> {
    let device = |ctm: &Matrix| ctm.concat(page);
    match op {
        DrawOp::FillText {
            text,
            ctm,
            colorspace,
            color,
            alpha,
        } => sink.fill_text(&text_from_records(text, fonts)?, &device(ctm), *colorspace, color, *alpha),
        DrawOp::ClipText { text, ctm } => sink.clip_text(&text_from_records(text, fonts)?, &device(ctm)),
        DrawOp::StrokeText {
            text,
            stroke,
            ctm,
            colorspace,
            color,
            alpha,
        } => sink.stroke_text(&text_from_records(text, fonts)?, stroke, &device(ctm), *colorspace, color, *alpha),
        DrawOp::ClipStrokeText { text, stroke, ctm } => {
            sink.clip_stroke_text(&text_from_records(text, fonts)?, stroke, &device(ctm))
        }
        DrawOp::IgnoreText { text, ctm } => sink.ignore_text(&text_from_records(text, fonts)?, &device(ctm)),
        DrawOp::FillPath {
            path,
            even_odd,
            ctm,
            colorspace,
            color,
            alpha,
        } => sink.fill_path(path, *even_odd, &device(ctm), *colorspace, color, *alpha),
        DrawOp::ClipPath { path, even_odd, ctm } => sink.clip_path(path, *even_odd, &device(ctm)),
        DrawOp::StrokePath {
            path,
            stroke,
            ctm,
            colorspace,
            color,
            alpha,
        } => sink.stroke_path(path, stroke, &device(ctm), *colorspace, color, *alpha),
        DrawOp::ClipStrokePath { path, stroke, ctm } => sink.clip_stroke_path(path, stroke, &device(ctm)),
        DrawOp::FillShade { shade, ctm, alpha } => sink.fill_shade(shade, &device(ctm), *alpha),
        DrawOp::FillImage { image, ctm, alpha } => sink.fill_image(image, &device(ctm), *alpha),
        DrawOp::FillImageMask {
            image,
            ctm,
            colorspace,
            color,
            alpha,
        } => sink.fill_image_mask(image, &device(ctm), *colorspace, color, *alpha),
        DrawOp::ClipImageMask { image, ctm } => sink.clip_image_mask(image, &device(ctm)),
        DrawOp::BeginMask {
            area,
            luminosity,
            colorspace,
            color,
        } => sink.begin_mask(area, *luminosity, *colorspace, color),
        DrawOp::EndMask => sink.end_mask(),
        DrawOp::PopClip => sink.pop_clip(),
        DrawOp::BeginGroup {
            area,
            isolated,
            knockout,
            blend_mode,
            alpha,
        } => sink.begin_group(area, *isolated, *knockout, blend_mode, *alpha),
        DrawOp::EndGroup => sink.end_group(),
        DrawOp::BeginTile {
            area,
            view,
            xstep,
            ystep,
            ctm,
            id,
        } => sink.begin_tile(area, view, *xstep, *ystep, &device(ctm), *id),
        DrawOp::EndTile => sink.end_tile(),
        DrawOp::Close => Ok(()),
    }
}

/// Device calls of an anonymized page, ready to be written out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    pub resolution: f64,
    /// Device width in pixels
    pub width: f64,
    /// Device height in pixels
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl RenderedPage {
    pub fn new(dump: &PageDump, resolution: f64, ops: Vec<DrawOp>) -> Self {
        let (width, height) = dump.pixel_size(resolution);
        Self {
            resolution,
            width,
            height,
            ops,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RecordingSink;
    use crate::error::Error;

    const DUMP: &str = r#"{
        "width": 612,
        "height": 792,
        "fonts": [
            {"name": "Helv", "glyphs": [
                {"glyph": 1, "unicode": "h", "advance": 0.55},
                {"glyph": 2, "unicode": "i", "advance": 0.25}
            ]}
        ],
        "ops": [
            {"op": "fill_text",
             "text": [
                {"font": "Helv", "matrix": [12, 0, 0, 12, 72, 700], "glyph": 1, "unicode": "h"},
                {"font": "Helv", "matrix": [12, 0, 0, 12, 78.6, 700], "glyph": 2, "unicode": "i"}
             ],
             "ctm": [1, 0, 0, 1, 0, 0], "colorspace": "gray", "color": [0], "alpha": 1},
            {"op": "fill_image",
             "image": {"width": 1, "height": 1, "components": 1, "samples": [7]},
             "ctm": [10, 0, 0, 10, 0, 0], "alpha": 1},
            {"op": "close"}
        ]
    }"#;

    #[test]
    fn test_replay_scales_to_resolution() {
        let dump = PageDump::parse(DUMP).unwrap();
        assert_eq!(dump.pixel_size(144.0), (1224.0, 1584.0));

        let mut sink = RecordingSink::new();
        dump.replay(&mut sink, 144.0).unwrap();
        // close is left to the caller
        assert_eq!(sink.len(), 2);

        match &sink.ops()[0] {
            DrawOp::FillText { text, ctm, .. } => {
                assert_eq!(*ctm, Matrix::scale(2.0, 2.0));
                assert_eq!(text.len(), 2);
                assert_eq!(text[1].matrix.e, 78.6);
            }
            other => panic!("unexpected op {:?}", other),
        }
        match &sink.ops()[1] {
            DrawOp::FillImage { ctm, .. } => assert_eq!(*ctm, Matrix::new(20.0, 0.0, 0.0, 20.0, 0.0, 0.0)),
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_letter_page_pixel_size_is_exact() {
        let dump = PageDump {
            width: 612.0,
            height: 792.0,
            fonts: Vec::new(),
            ops: Vec::new(),
        };
        assert_eq!(dump.pixel_size(300.0), (2550.0, 3300.0));
        assert_eq!(dump.pixel_size(150.0), (1275.0, 1650.0));
    }

    #[test]
    fn test_unknown_font_is_rejected() {
        let dump = PageDump::parse(&DUMP.replace(r#""name": "Helv""#, r#""name": "Other""#)).unwrap();
        let err = dump.replay(&mut RecordingSink::new(), 72.0).unwrap_err();
        assert!(matches!(err, Error::DumpError(DumpError::UnknownFont(ref f)) if f == "Helv"));
    }
}
