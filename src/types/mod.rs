// Type definitions for the glyph anonymizer

pub mod geometry;
pub mod glyph;

pub use geometry::*;
pub use glyph::*;
