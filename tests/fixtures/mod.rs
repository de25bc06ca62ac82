use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use pdxanon::device::{ColorSpace, Image, Path, Rect, StrokeState};
use pdxanon::font::table::{FontSpec, GlyphSpec};
use pdxanon::stream::GlyphRecord;
use pdxanon::{
    AnonymizationEngine, AnonymizerConfig, AnonymizingDevice, DrawOp, FontRef, Matrix, PageDump, PolicyFilter,
    RecordingSink, RenderSink, TableFont, Text, WritingMode,
};

pub const FONT: &str = "Body";
pub const INVOICE: &str = "Invoice 2024-117 for John Smith.";
pub const TOTAL: &str = "Total due: 1,250.00 EUR";

const CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 .,:-";

fn advance_of(c: char) -> f64 {
    match c {
        'i' | 'l' | 'j' | 't' | 'f' => 0.28,
        'm' | 'w' => 0.83,
        'I' => 0.3,
        'M' | 'W' => 0.9,
        c if c.is_ascii_uppercase() => 0.66,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_ascii_digit() => 0.55,
        ' ' => 0.25,
        _ => 0.3,
    }
}

pub fn font_spec() -> FontSpec {
    let glyphs = CHARS
        .chars()
        .enumerate()
        .map(|(i, c)| GlyphSpec {
            glyph: i as u32 + 1,
            unicode: Some(c),
            advance: advance_of(c),
        })
        .collect();
    FontSpec {
        name: FONT.to_string(),
        default_advance: 0.5,
        vertical_advance: 1.0,
        glyphs,
    }
}

pub fn body_font() -> FontRef {
    Arc::new(TableFont::from_spec(&font_spec()))
}

pub fn line(s: &str, x: f64, y: f64) -> Vec<GlyphRecord> {
    let mut text = Text::new();
    text.show_string(&body_font(), Matrix::new(12.0, 0.0, 0.0, 12.0, x, y), s, WritingMode::Horizontal);
    text.records()
}

pub fn image() -> Image {
    Image {
        width: 2,
        height: 2,
        components: 3,
        samples: vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 200, 210, 220],
    }
}

pub fn graphics_ops() -> Vec<DrawOp> {
    let mut path = Path::new();
    path.move_to(72.0, 600.0);
    path.line_to(540.0, 600.0);
    path.line_to(540.0, 560.0);
    path.close_path();
    let area = Rect {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    vec![
        DrawOp::FillPath {
            path: path.clone(),
            even_odd: false,
            ctm: Matrix::IDENTITY,
            colorspace: ColorSpace::Rgb,
            color: vec![0.9, 0.9, 0.9],
            alpha: 1.0,
        },
        DrawOp::StrokePath {
            path: path.clone(),
            stroke: StrokeState::default(),
            ctm: Matrix::IDENTITY,
            colorspace: ColorSpace::Gray,
            color: vec![0.0],
            alpha: 1.0,
        },
        DrawOp::ClipPath {
            path,
            even_odd: true,
            ctm: Matrix::IDENTITY,
        },
        DrawOp::PopClip,
        DrawOp::BeginGroup {
            area,
            isolated: true,
            knockout: false,
            blend_mode: "Normal".into(),
            alpha: 0.8,
        },
        DrawOp::FillImage {
            image: image(),
            ctm: Matrix::new(100.0, 0.0, 0.0, 50.0, 400.0, 700.0),
            alpha: 1.0,
        },
        DrawOp::EndGroup,
        DrawOp::BeginMask {
            area,
            luminosity: true,
            colorspace: ColorSpace::Gray,
            color: vec![0.0],
        },
        DrawOp::FillImageMask {
            image: image(),
            ctm: Matrix::IDENTITY,
            colorspace: ColorSpace::Gray,
            color: vec![0.0],
            alpha: 1.0,
        },
        DrawOp::EndMask,
        DrawOp::ClipImageMask {
            image: image(),
            ctm: Matrix::IDENTITY,
        },
        DrawOp::PopClip,
        DrawOp::BeginTile {
            area,
            view: area,
            xstep: 10.0,
            ystep: 10.0,
            ctm: Matrix::IDENTITY,
            id: 3,
        },
        DrawOp::EndTile,
    ]
}

/// A letter page drawing two lines of text, the first one twice
pub fn page_dump() -> PageDump {
    let mut ops = vec![
        DrawOp::FillText {
            text: line(INVOICE, 72.0, 700.0),
            ctm: Matrix::IDENTITY,
            colorspace: ColorSpace::Gray,
            color: vec![0.0],
            alpha: 1.0,
        },
        DrawOp::ClipText {
            text: line(INVOICE, 72.0, 700.0),
            ctm: Matrix::IDENTITY,
        },
        DrawOp::PopClip,
        DrawOp::StrokeText {
            text: line(TOTAL, 72.0, 650.0),
            stroke: StrokeState::default(),
            ctm: Matrix::IDENTITY,
            colorspace: ColorSpace::Rgb,
            color: vec![0.2, 0.2, 0.2],
            alpha: 1.0,
        },
    ];
    ops.extend(graphics_ops());
    ops.push(DrawOp::Close);

    PageDump {
        width: 612.0,
        height: 792.0,
        fonts: vec![font_spec()],
        ops,
    }
}

pub fn engine(config: AnonymizerConfig, policy: PolicyFilter, seed: u64) -> AnonymizationEngine<StdRng> {
    AnonymizationEngine::new(config, policy, StdRng::seed_from_u64(seed))
}

/// Replay `dump` through an anonymizing device and close it
pub fn run_page(dump: &PageDump, engine: AnonymizationEngine<StdRng>) -> (Vec<DrawOp>, AnonymizationEngine<StdRng>) {
    let resolution = engine.config().resolution;
    let mut device = AnonymizingDevice::new(RecordingSink::new(), engine);
    dump.replay(&mut device, resolution).unwrap();
    device.close().unwrap();
    let (sink, engine) = device.into_parts();
    (sink.into_ops(), engine)
}

pub fn text_ops(ops: &[DrawOp]) -> Vec<&[GlyphRecord]> {
    ops.iter().filter_map(DrawOp::text).collect()
}

pub fn string_of(records: &[GlyphRecord]) -> String {
    records.iter().map(|r| r.unicode).collect()
}
