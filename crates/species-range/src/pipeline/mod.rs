//! Range-map retrieval pipeline.
//!
//! Three stages, each awaited before the next starts:
//! 1. [`resolver`]: species name to one catalog item
//! 2. [`locator`]: catalog item to one range file
//! 3. loader: range file to an in-memory [`RangeTable`]
//!
//! The first failing stage ends the call and its error is returned unchanged.

mod loader;
pub mod locator;
pub mod parse;
pub mod resolver;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

pub use locator::{RangeFileFilter, select_range_file};
pub use parse::{RangeFormat, detect_format};
pub use resolver::{CandidateSet, RankedCandidate, Resolution, name_score, rank_candidates, select_unique};

use crate::client::SpeciesRangeClient;
use crate::error::{RangeError, RangeResult};
use crate::models::{CatalogItem, Provenance, RangeTable};

/// Identifiers of every range source this crate can build.
pub const AVAILABLE_SOURCES: &[&str] = &[RangeSourceKind::UsgsGap.as_str()];

/// A provider of species range maps.
#[async_trait]
pub trait RangeSource: Send + Sync {
    /// Source identifier, as accepted by [`RangeSourceKind::from_str`].
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str;

    /// Retrieve the range map for one species.
    async fn get_species_range(&self, species_name: &str) -> RangeResult<RangeTable>;

    /// List range-map candidates for a query, best first.
    async fn search_species(&self, query: &str) -> RangeResult<Vec<CatalogItem>>;
}

/// Known range sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSourceKind {
    /// USGS Gap Analysis Project species ranges on ScienceBase.
    UsgsGap,
}

impl RangeSourceKind {
    /// Source identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UsgsGap => "usgs_gap",
        }
    }
}

impl FromStr for RangeSourceKind {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usgs_gap" => Ok(Self::UsgsGap),
            _ => Err(RangeError::UnsupportedSource(s.to_string())),
        }
    }
}

impl std::fmt::Display for RangeSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers of the available range sources.
#[must_use]
pub fn list_available_sources() -> Vec<&'static str> {
    AVAILABLE_SOURCES.to_vec()
}

/// Build a source behind a trait object.
#[must_use]
pub fn create_source(kind: RangeSourceKind, client: Arc<SpeciesRangeClient>) -> Box<dyn RangeSource> {
    match kind {
        RangeSourceKind::UsgsGap => Box::new(GapRangeSource::new(client)),
    }
}

/// USGS GAP species ranges from the ScienceBase catalog.
#[derive(Debug, Clone)]
pub struct GapRangeSource {
    client: Arc<SpeciesRangeClient>,
    title_keywords: Vec<String>,
    file_filter: RangeFileFilter,
    taxonomy_fallback: bool,
    scratch_dir: Option<PathBuf>,
}

impl GapRangeSource {
    /// Create a source using the selection policy from the client's configuration.
    #[must_use]
    pub fn new(client: Arc<SpeciesRangeClient>) -> Self {
        let config = client.config();
        Self {
            title_keywords: config.title_keywords.clone(),
            file_filter: RangeFileFilter::new(&config.range_file_extensions),
            taxonomy_fallback: config.uses_taxonomy_fallback(),
            scratch_dir: config.scratch_dir.clone(),
            client,
        }
    }

    /// Replace the range file filter.
    #[must_use]
    pub fn with_file_filter(mut self, filter: RangeFileFilter) -> Self {
        self.file_filter = filter;
        self
    }

    /// Retrieve the range map for one species.
    ///
    /// Accepts a common or scientific name.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage:
    /// [`RangeError::Validation`], [`RangeError::NotFound`],
    /// [`RangeError::AmbiguousMatch`], [`RangeError::NoRangeFile`],
    /// [`RangeError::Download`], [`RangeError::Parse`] or [`RangeError::Upstream`].
    #[tracing::instrument(skip(self))]
    pub async fn get_species_range(&self, species_name: &str) -> RangeResult<RangeTable> {
        let resolution = self.resolve(species_name).await?;
        let file = self.locate_range_file(resolution.item_id()).await?;
        let loaded = self.load(&file).await?;

        let provenance = Provenance {
            species_name: species_name.trim().to_string(),
            searched_name: resolution.searched_name.clone(),
            common_name: resolution.common_name(),
            source: RangeSourceKind::UsgsGap.as_str().to_string(),
            item_id: resolution.item.id.clone(),
            item_title: resolution.item.title.clone(),
            source_file: file.name.clone(),
            download_url: file.url.clone(),
            file_size: loaded.bytes,
            retrieved_at: Utc::now(),
        };

        tracing::info!(
            rows = loaded.table.len(),
            crs = %loaded.table.crs,
            "Loaded species range"
        );
        Ok(loaded.table.with_provenance(provenance))
    }

    /// List range-map candidates for a query, best first.
    ///
    /// Uses the same search and taxonomy fallback as [`GapRangeSource::resolve`],
    /// but returns every candidate. Empty when nothing matches.
    ///
    /// # Errors
    ///
    /// [`RangeError::Validation`] for a blank query, [`RangeError::Upstream`]
    /// when the catalog search fails.
    #[tracing::instrument(skip(self))]
    pub async fn search_species(&self, query: &str) -> RangeResult<Vec<CatalogItem>> {
        let query = resolver::validate_name(query)?;
        let set = self.find_candidates(query).await?;
        Ok(set.candidates.into_iter().map(|c| c.item).collect())
    }
}

#[async_trait]
impl RangeSource for GapRangeSource {
    fn name(&self) -> &'static str {
        RangeSourceKind::UsgsGap.as_str()
    }

    fn description(&self) -> &'static str {
        "USGS Gap Analysis Project species range maps (ScienceBase)"
    }

    async fn get_species_range(&self, species_name: &str) -> RangeResult<RangeTable> {
        Self::get_species_range(self, species_name).await
    }

    async fn search_species(&self, query: &str) -> RangeResult<Vec<CatalogItem>> {
        Self::search_species(self, query).await
    }
}

impl SpeciesRangeClient {
    /// Retrieve a species range map from the GAP collection.
    ///
    /// Shorthand for [`GapRangeSource::get_species_range`] on a source built from
    /// a clone of this client.
    ///
    /// # Errors
    ///
    /// See [`GapRangeSource::get_species_range`].
    pub async fn get_species_range(&self, species_name: &str) -> RangeResult<RangeTable> {
        GapRangeSource::new(Arc::new(self.clone())).get_species_range(species_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("usgs_gap".parse::<RangeSourceKind>().unwrap(), RangeSourceKind::UsgsGap);
        assert_eq!(" USGS_GAP ".parse::<RangeSourceKind>().unwrap(), RangeSourceKind::UsgsGap);

        let err = "iucn".parse::<RangeSourceKind>().unwrap_err();
        assert!(matches!(err, RangeError::UnsupportedSource(ref s) if s == "iucn"));
    }

    #[test]
    fn test_list_available_sources() {
        assert_eq!(list_available_sources(), vec!["usgs_gap"]);
        for name in list_available_sources() {
            assert!(name.parse::<RangeSourceKind>().is_ok());
        }
    }

    #[test]
    fn test_source_reads_policy_from_config() {
        let mut config = Config::for_testing("http://127.0.0.1:1");
        config.taxonomy_fallback = false;
        config.range_file_extensions = vec!["shp.zip".to_string()];
        let client = Arc::new(SpeciesRangeClient::new(config).unwrap());

        let source = GapRangeSource::new(client);
        assert!(!source.taxonomy_fallback);
        assert_eq!(source.file_filter.extensions(), &[".shp.zip".to_string()]);
    }

    #[test]
    fn test_create_source() {
        let client = Arc::new(SpeciesRangeClient::new(Config::default()).unwrap());
        let source = create_source(RangeSourceKind::UsgsGap, client);
        assert_eq!(source.name(), "usgs_gap");
        assert!(source.description().contains("Gap Analysis"));
    }
}
