//! Species Range
//!
//! Retrieves USGS Gap Analysis Project (GAP) species range maps from the
//! ScienceBase catalog and returns them as in-memory geospatial tables.
//!
//! # Features
//!
//! - **Name resolution**: common or scientific names, with a GBIF taxonomy fallback
//! - **Deterministic selection**: ranked candidates, ties reported as ambiguous
//! - **Verified downloads**: truncation and MD5 checks, scoped scratch directories
//! - **Formats**: zipped shapefiles and GeoJSON in, GeoJSON out
//!
//! # Example
//!
//! ```no_run
//! use species_range::{SpeciesRangeClient, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = SpeciesRangeClient::new(config)?;
//!
//!     let table = client.get_species_range("American Robin").await?;
//!     println!("{} rows in {}", table.len(), table.crs);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod pipeline;

pub use client::SpeciesRangeClient;
pub use config::Config;
pub use error::{ClientError, RangeError, RangeResult};
pub use models::{Provenance, RangeFeature, RangeTable};
pub use pipeline::{
    GapRangeSource, RangeSource, RangeSourceKind, create_source, list_available_sources,
};

/// Retrieve a species range map with the default configuration.
///
/// Builds a fresh client per call; hold a [`SpeciesRangeClient`] to reuse connections.
///
/// # Errors
///
/// See [`GapRangeSource::get_species_range`].
pub async fn get_species_range(species_name: &str) -> RangeResult<RangeTable> {
    let client = SpeciesRangeClient::new(Config::default())?;
    client.get_species_range(species_name).await
}
