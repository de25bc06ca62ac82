//! Zone whitelist: page regions exempt from anonymization
//! Created: 2026-09-18

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PolicyError, Result};
use crate::types::{Glyph, Matrix, Point};

/// Axis-aligned rectangle; fractions of the page in zone files, device
/// pixels once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Zone {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    fn scaled(&self, width: f64, height: f64) -> Zone {
        Zone::new(self.x1 * width, self.y1 * height, self.x2 * width, self.y2 * height)
    }

    fn is_finite(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
    }
}

/// Zones in device space
#[derive(Debug, Clone, Default)]
pub struct ZoneWhitelist {
    zones: Vec<Zone>,
}

impl ZoneWhitelist {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Scale normalized zones onto a `width` x `height` device
    pub fn from_normalized(zones: &[Zone], width: f64, height: f64) -> Result<Self> {
        let mut scaled = Vec::with_capacity(zones.len());
        for zone in zones {
            if !zone.is_finite() {
                return Err(PolicyError::InvalidZone(format!("{:?}", zone)).into());
            }
            scaled.push(zone.scaled(width, height));
        }
        Ok(Self::new(scaled))
    }

    /// Parse a JSON zone file
    pub fn parse(content: &str, width: f64, height: f64) -> Result<Self> {
        let zones: Vec<Zone> = serde_json::from_str(content).map_err(|e| PolicyError::MalformedZones(e.to_string()))?;
        Self::from_normalized(&zones, width, height)
    }

    pub fn load(path: impl AsRef<Path>, width: f64, height: f64) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let zones = Self::parse(&content, width, height)?;
        debug!(path = %path.display(), zones = zones.len(), "loaded zone whitelist");
        Ok(zones)
    }

    /// Like [`ZoneWhitelist::load`], but an unreadable or malformed file
    /// yields an empty whitelist.
    pub fn load_or_default(path: impl AsRef<Path>, width: f64, height: f64) -> Self {
        let path = path.as_ref();
        match Self::load(path, width, height) {
            Ok(zones) => zones,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring zone whitelist");
                Self::default()
            }
        }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Whether any corner or the centre of the glyph box lies in a zone
    pub fn protects(&self, glyph: &Glyph, ctm: &Matrix) -> bool {
        if self.zones.is_empty() {
            return false;
        }
        let vertices = glyph.vertices(ctm);
        let n = vertices.len() as f64;
        let centre = Point::new(
            vertices.iter().map(|p| p.x).sum::<f64>() / n,
            vertices.iter().map(|p| p.y).sum::<f64>() / n,
        );
        self.zones
            .iter()
            .any(|zone| vertices.iter().chain(std::iter::once(&centre)).any(|p| zone.contains(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TableFont;
    use crate::types::{FontRef, WritingMode};
    use std::io::Write;
    use std::sync::Arc;

    fn glyph_at(x: f64, y: f64) -> Glyph {
        let font: FontRef = Arc::new(TableFont::new("Z").with_chars("a", |_| 0.5));
        Glyph::new(font, Matrix::new(10.0, 0.0, 0.0, 10.0, x, y), 1, 'a', WritingMode::Horizontal)
    }

    #[test]
    fn test_normalized_zones_are_scaled() {
        let zones = ZoneWhitelist::parse(r#"[{"x1": 0.5, "y1": 0.0, "x2": 1.0, "y2": 0.5}]"#, 200.0, 100.0).unwrap();
        assert_eq!(zones.zones()[0], Zone::new(100.0, 0.0, 200.0, 50.0));
    }

    #[test]
    fn test_footprint_intersection() {
        let zones = ZoneWhitelist::new(vec![Zone::new(100.0, 0.0, 200.0, 50.0)]);
        // box spans x 98..103, y 10..20
        assert!(zones.protects(&glyph_at(98.0, 20.0), &Matrix::IDENTITY));
        assert!(!zones.protects(&glyph_at(10.0, 20.0), &Matrix::IDENTITY));
        // the CTM moves the glyph into the zone
        assert!(zones.protects(&glyph_at(10.0, 20.0), &Matrix::translate(120.0, 0.0)));
    }

    #[test]
    fn test_missing_or_malformed_file_is_empty() {
        let zones = ZoneWhitelist::load_or_default("/nonexistent/zones.json", 100.0, 100.0);
        assert!(zones.is_empty());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(ZoneWhitelist::load(file.path(), 100.0, 100.0).is_err());
        assert!(ZoneWhitelist::load_or_default(file.path(), 100.0, 100.0).is_empty());
    }
}
