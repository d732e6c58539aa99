//! Compact JSON summaries.

use serde_json::{Value, json};

use crate::models::{CatalogItem, RangeTable};

/// Create a compact range table summary for JSON output.
///
/// Geometries are left out; use the GeoJSON formatter for the full table.
#[must_use]
pub fn compact_range(table: &RangeTable) -> Value {
    let mut obj = json!({
        "crs": table.crs,
        "rows": table.len(),
        "geometries": table.geometry_count(),
        "columns": table.columns(),
    });

    if let Some(bbox) = table.bounding_box() {
        obj["bbox"] = json!([bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y]);
    }

    if let Some(provenance) = &table.provenance {
        obj["provenance"] = json!(provenance);
    }

    obj
}

/// Create a compact catalog item representation for JSON output.
#[must_use]
pub fn compact_item(item: &CatalogItem) -> Value {
    let mut obj = json!({
        "id": item.id,
        "title": item.title,
    });

    if let Some(common) = item.common_name() {
        obj["commonName"] = json!(common);
    }

    if let Some(scientific) = item.scientific_name() {
        obj["scientificName"] = json!(scientific);
    }

    let tags = item.tag_names();
    if !tags.is_empty() {
        obj["tags"] = json!(tags);
    }

    obj
}
