//! Integration tests for the species range pipeline.
//!
//! These tests hit the live ScienceBase and GBIF services.
//! Run with: `cargo test --features integration -- --nocapture`

#![cfg(feature = "integration")]

use std::sync::Arc;

use species_range::client::SpeciesRangeClient;
use species_range::config::Config;
use species_range::error::RangeError;
use species_range::pipeline::GapRangeSource;

fn create_source() -> GapRangeSource {
    let config = Config::from_env().expect("valid environment");
    GapRangeSource::new(Arc::new(SpeciesRangeClient::new(config).expect("Failed to create client")))
}

#[tokio::test]
async fn test_live_search_finds_robin() {
    let items = create_source().search_species("American Robin").await.unwrap();
    assert!(!items.is_empty());
    println!("First candidate: {}", items[0].title);
}

#[tokio::test]
async fn test_live_range_has_geometry() {
    let table = create_source().get_species_range("American Robin").await.unwrap();
    assert!(!table.is_empty());
    assert!(table.geometry_count() > 0);
    println!("{} rows, CRS {}", table.len(), table.crs);
}

#[tokio::test]
async fn test_live_unknown_species() {
    let err = create_source()
        .get_species_range("Zzyzx nonexistentia")
        .await
        .unwrap_err();
    assert!(matches!(err, RangeError::NotFound { .. }));
}
