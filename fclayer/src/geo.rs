//! Viewport geometry.
//!
//! All coordinates are WGS84 degrees (EPSG:4326), which is also the spatial
//! reference used for every data-source query.

use serde::{Deserialize, Serialize};

/// Metres per degree of latitude, used to turn offset tables into degrees.
pub const METRES_PER_DEGREE: f64 = 111_000.0;

/// Zoom level that maps onto index 0 of a max-offset table.
pub const OFFSET_TABLE_BASE_ZOOM: u8 = 12;

/// Axis-aligned bounding box in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// Creates an extent, normalising swapped corners.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin: xmin.min(xmax),
            ymin: ymin.min(ymax),
            xmax: xmin.max(xmax),
            ymax: ymin.max(ymax),
        }
    }

    /// Returns true if the two extents share any area or edge.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.xmin && lon <= self.xmax && lat >= self.ymin && lat <= self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Extent of the given size centred on a point.
    pub fn around(lon: f64, lat: f64, width: f64, height: f64) -> Self {
        Self::new(
            lon - width / 2.0,
            lat - height / 2.0,
            lon + width / 2.0,
            lat + height / 2.0,
        )
    }
}

/// The map view a fetch generation is computed for.
///
/// Immutable once handed to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: u8,
    pub extent: Extent,
    /// Region codes the host editor reports as on screen. When present this
    /// takes precedence over intersecting the catalog bounds.
    #[serde(default)]
    pub regions_hint: Option<Vec<String>>,
}

impl Viewport {
    pub fn new(zoom: u8, extent: Extent) -> Self {
        Self {
            zoom,
            extent,
            regions_hint: None,
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions_hint = Some(regions.into_iter().map(Into::into).collect());
        self
    }
}

/// Geometry simplification tolerance in degrees for a zoom level.
///
/// `table` holds tolerances in metres starting at zoom 12; zooms outside the
/// table use its nearest end. An empty table disables simplification.
pub fn max_allowable_offset(table: &[f64], zoom: u8) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    let index = (zoom.saturating_sub(OFFSET_TABLE_BASE_ZOOM) as usize).min(table.len() - 1);
    table[index] / METRES_PER_DEGREE
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [f64; 10] = [30.0, 15.0, 8.0, 4.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_extent_normalises_corners() {
        let e = Extent::new(-76.0, 39.0, -77.0, 38.0);
        assert_eq!(e.xmin, -77.0);
        assert_eq!(e.ymax, 39.0);
    }

    #[test]
    fn test_intersects() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Extent::new(5.0, 5.0, 15.0, 15.0)));
        assert!(a.intersects(&Extent::new(10.0, 10.0, 11.0, 11.0)));
        assert!(!a.intersects(&Extent::new(10.5, 0.0, 11.0, 1.0)));
        assert!(!a.intersects(&Extent::new(0.0, -5.0, 1.0, -0.1)));
    }

    #[test]
    fn test_around() {
        let e = Extent::around(-77.0, 38.9, 0.2, 0.1);
        assert!(e.contains(-77.0, 38.9));
        assert!((e.width() - 0.2).abs() < 1e-9);
        assert!((e.height() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_max_allowable_offset_indexes_from_zoom_12() {
        assert!((max_allowable_offset(&TABLE, 12) - 30.0 / 111_000.0).abs() < 1e-12);
        assert!((max_allowable_offset(&TABLE, 14) - 8.0 / 111_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_allowable_offset_clamps() {
        assert_eq!(max_allowable_offset(&TABLE, 11), max_allowable_offset(&TABLE, 12));
        assert_eq!(max_allowable_offset(&TABLE, 25), 1.0 / 111_000.0);
        assert_eq!(max_allowable_offset(&[], 14), 0.0);
    }

    #[test]
    fn test_viewport_with_regions() {
        let vp = Viewport::new(14, Extent::new(0.0, 0.0, 1.0, 1.0)).with_regions(["DC", "MD"]);
        assert_eq!(vp.regions_hint, Some(vec!["DC".to_string(), "MD".to_string()]));
    }
}
