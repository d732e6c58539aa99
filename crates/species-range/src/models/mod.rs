//! Data models for catalog records, taxonomy matches and range tables.
//!
//! Remote responses use `#[serde(default)]` for optional fields and
//! `#[serde(rename_all = "camelCase")]` to match API naming.

mod catalog;
mod range;
mod taxon;

pub use catalog::{
    CatalogFile, CatalogItem, Checksum, FileReference, ItemId, ItemRecord, ItemSearchResult, Tag,
};
pub use range::{BoundingBox, Provenance, RangeFeature, RangeTable};
pub use taxon::{MatchType, TaxonMatch};
