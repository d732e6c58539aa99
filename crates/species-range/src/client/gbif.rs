//! GBIF species-match endpoint.

use super::SpeciesRangeClient;
use crate::error::ClientResult;
use crate::models::TaxonMatch;

impl SpeciesRangeClient {
    /// Match a common or scientific name against the GBIF backbone taxonomy.
    ///
    /// # Errors
    ///
    /// Returns error on API failure or an undecodable response.
    pub async fn match_species(&self, name: &str) -> ClientResult<TaxonMatch> {
        let url = Self::endpoint(&self.config.gbif_api_url, &["species", "match"])?;
        let params = [("name", name.to_string())];

        let taxon: TaxonMatch = self.get(url, &params).await?;
        tracing::debug!(
            name,
            match_type = ?taxon.match_type,
            canonical = taxon.canonical_name.as_deref().unwrap_or(""),
            "GBIF species match"
        );
        Ok(taxon)
    }
}
