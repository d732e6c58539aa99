//! GeoJSON export of range tables.

use ::geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::json;

use crate::models::RangeTable;

/// Convert a range table to a GeoJSON FeatureCollection.
///
/// Attributes become feature properties. The CRS and provenance are written as
/// foreign members of the collection.
///
/// # Errors
///
/// Returns error if the provenance cannot be serialized.
pub fn to_feature_collection(table: &RangeTable) -> serde_json::Result<FeatureCollection> {
    let features = table
        .features
        .iter()
        .map(|row| Feature {
            bbox: None,
            geometry: row.geometry.as_ref().map(|g| ::geojson::Geometry::new(::geojson::Value::from(g))),
            id: None,
            properties: Some(row.attributes.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            foreign_members: None,
        })
        .collect();

    let mut members = JsonObject::new();
    members.insert(
        "crs".to_string(),
        json!({ "type": "name", "properties": { "name": table.crs } }),
    );
    if let Some(provenance) = &table.provenance {
        members.insert("provenance".to_string(), serde_json::to_value(provenance)?);
    }

    Ok(FeatureCollection { bbox: None, features, foreign_members: Some(members) })
}

/// Serialize a range table as pretty-printed GeoJSON text.
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn to_geojson_string(table: &RangeTable) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&to_feature_collection(table)?)
}
