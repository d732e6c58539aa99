//! In-memory range table returned by the pipeline.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use geo_types::{Coord, Geometry, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ItemId;

/// One mapped region: source attributes plus geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeFeature {
    /// Attribute columns from the source file, ordered by column name.
    pub attributes: BTreeMap<String, Value>,

    /// Region geometry. `None` for null shapes.
    pub geometry: Option<Geometry<f64>>,
}

impl RangeFeature {
    /// Whether this row carries a geometry.
    #[must_use]
    pub const fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attribute(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column)
    }
}

/// Where a range table came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Species name as supplied by the caller.
    pub species_name: String,

    /// Name the catalog was searched with (the scientific name after a taxonomy fallback).
    pub searched_name: String,

    /// Common name, from the taxonomy service or the item title.
    pub common_name: Option<String>,

    /// Source identifier.
    pub source: String,

    /// Catalog item the file belongs to.
    pub item_id: ItemId,

    /// Catalog item title.
    pub item_title: String,

    /// Range file name.
    pub source_file: String,

    /// Range file locator.
    pub download_url: String,

    /// Range file size in bytes, as downloaded.
    pub file_size: u64,

    /// When the file was retrieved.
    pub retrieved_at: DateTime<Utc>,
}

/// Axis-aligned bounds of all geometries in a table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum x (longitude in geographic CRSs).
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Maximum x.
    pub max_x: f64,
    /// Maximum y.
    pub max_y: f64,
}

impl BoundingBox {
    fn from_coord(c: Coord<f64>) -> Self {
        Self { min_x: c.x, min_y: c.y, max_x: c.x, max_y: c.y }
    }

    fn extend(&mut self, c: Coord<f64>) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }
}

/// A species range map as a geospatial table.
///
/// Created fresh per call and owned by the caller; two loads of unchanged
/// upstream data produce equal `features`.
#[derive(Debug, Clone)]
pub struct RangeTable {
    /// Rows, in source-file order.
    pub features: Vec<RangeFeature>,

    /// Coordinate reference system: an authority code or WKT from the source file.
    pub crs: String,

    /// Retrieval metadata, filled in by the pipeline.
    pub provenance: Option<Provenance>,
}

impl RangeTable {
    /// Create a table without provenance.
    #[must_use]
    pub fn new(features: Vec<RangeFeature>, crs: impl Into<String>) -> Self {
        Self { features, crs: crs.into(), provenance: None }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of rows that carry a geometry.
    #[must_use]
    pub fn geometry_count(&self) -> usize {
        self.features.iter().filter(|f| f.has_geometry()).count()
    }

    /// Union of attribute column names, sorted.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.features
            .iter()
            .flat_map(|f| f.attributes.keys().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Bounds of every coordinate in the table, or `None` without geometry.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for geometry in self.features.iter().filter_map(|f| f.geometry.as_ref()) {
            visit_coords(geometry, &mut |c| match bbox.as_mut() {
                Some(b) => b.extend(c),
                None => bbox = Some(BoundingBox::from_coord(c)),
            });
        }
        bbox
    }

    /// Attach retrieval metadata.
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}

fn visit_coords(geometry: &Geometry<f64>, f: &mut impl FnMut(Coord<f64>)) {
    match geometry {
        Geometry::Point(p) => f(p.0),
        Geometry::Line(l) => {
            f(l.start);
            f(l.end);
        }
        Geometry::LineString(ls) => ls.0.iter().copied().for_each(&mut *f),
        Geometry::Polygon(poly) => visit_polygon(poly, f),
        Geometry::MultiPoint(mp) => mp.0.iter().for_each(|p| f(p.0)),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                ls.0.iter().copied().for_each(&mut *f);
            }
        }
        Geometry::MultiPolygon(mp) => {
            for poly in &mp.0 {
                visit_polygon(poly, f);
            }
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                visit_coords(g, f);
            }
        }
        Geometry::Rect(r) => {
            f(r.min());
            f(r.max());
        }
        Geometry::Triangle(t) => t.to_array().into_iter().for_each(&mut *f),
    }
}

fn visit_polygon(poly: &Polygon<f64>, f: &mut impl FnMut(Coord<f64>)) {
    poly.exterior().0.iter().copied().for_each(&mut *f);
    for ring in poly.interiors() {
        ring.0.iter().copied().for_each(&mut *f);
    }
}
