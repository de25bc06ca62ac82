//! Substitution highlight overlay
//! Created: 2026-09-29
//!
//! Draws a translucent polygon over every committed glyph, coloured by how
//! the glyph was resolved, so a reviewer can see at a glance what was
//! replaced and what was kept.

use crate::anonymizer::{Outcome, SubstitutionRecord};
use crate::device::{ColorSpace, Path, RenderSink};
use crate::error::Result;
use crate::types::{Matrix, Point};

pub const HIGHLIGHT_ALPHA: f32 = 0.3;

pub fn outcome_color(outcome: Outcome) -> [f32; 3] {
    match outcome {
        Outcome::Cached => [1.0, 1.0, 0.0],
        Outcome::ZoneKept => [0.0, 0.0, 1.0],
        Outcome::CharKept => [0.0, 1.0, 0.0],
        Outcome::LowCoverage => [1.0, 0.0, 0.0],
        Outcome::Unchanged => [0.0, 1.0, 1.0],
        Outcome::Substituted => [0.0, 1.0, 0.0],
        Outcome::Unsubstitutable => [0.5, 0.5, 0.5],
    }
}

/// Closed polygon through `vertices`, starting from the last one
pub fn polygon(vertices: &[Point]) -> Path {
    let mut path = Path::new();
    if let Some(last) = vertices.last() {
        path.move_to(last.x, last.y);
        for p in vertices {
            path.line_to(p.x, p.y);
        }
    }
    path
}

/// Fill one highlight per record into `sink`, in device space
pub fn draw<S: RenderSink + ?Sized>(sink: &mut S, records: &[SubstitutionRecord]) -> Result<usize> {
    for record in records {
        let color = outcome_color(record.outcome);
        sink.fill_path(
            &polygon(&record.vertices),
            true,
            &Matrix::IDENTITY,
            ColorSpace::Rgb,
            &color,
            HIGHLIGHT_ALPHA,
        )?;
    }
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DrawOp, PathOp, RecordingSink};
    use crate::substitution::Replacement;

    #[test]
    fn test_polygon_closes_on_first_vertex() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(0.0, -1.0),
            Point::new(1.0, -1.0),
            Point::new(1.0, 0.0),
        ];
        let path = polygon(&square);
        assert_eq!(path.ops.len(), 5);
        assert_eq!(path.ops[0], PathOp::MoveTo { x: 1.0, y: 0.0 });
        assert_eq!(path.ops[4], PathOp::LineTo { x: 1.0, y: 0.0 });
    }

    #[test]
    fn test_one_fill_per_record() {
        let record = SubstitutionRecord {
            font: "F".into(),
            original: 'a',
            replacement: Replacement { unicode: 'e', glyph: 5 },
            outcome: Outcome::LowCoverage,
            vertices: [Point::default(); 4],
        };
        let mut sink = RecordingSink::new();
        assert_eq!(draw(&mut sink, &[record.clone(), record]).unwrap(), 2);

        match &sink.ops()[0] {
            DrawOp::FillPath {
                even_odd, color, alpha, ctm, ..
            } => {
                assert!(*even_odd);
                assert_eq!(color, &vec![1.0, 0.0, 0.0]);
                assert_eq!(*alpha, HIGHLIGHT_ALPHA);
                assert_eq!(*ctm, Matrix::IDENTITY);
            }
            other => panic!("unexpected op {:?}", other),
        }
    }
}
