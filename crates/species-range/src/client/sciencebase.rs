//! ScienceBase catalog endpoints.

use super::SpeciesRangeClient;
use crate::error::ClientResult;
use crate::models::{ItemId, ItemRecord, ItemSearchResult};

impl SpeciesRangeClient {
    /// Search the range-map collection with a free-text query.
    ///
    /// # Errors
    ///
    /// Returns error on API failure or an undecodable response.
    pub async fn search_items(&self, query: &str) -> ClientResult<ItemSearchResult> {
        let url = Self::endpoint(&self.config.sciencebase_url, &["catalog", "items"])?;

        let params = [
            ("q", query.to_string()),
            ("parentId", self.config.collection_id.clone()),
            ("fields", crate::config::api::SEARCH_FIELDS.to_string()),
            ("max", self.config.search_limit.to_string()),
            ("format", "json".to_string()),
        ];

        let result: ItemSearchResult = self.get(url, &params).await?;
        tracing::debug!(query, total = result.total, returned = result.items.len(), "Catalog search");
        Ok(result)
    }

    /// Get an item record with its file listing.
    ///
    /// # Errors
    ///
    /// Returns error on API failure or an undecodable response.
    pub async fn get_item(&self, item_id: &ItemId) -> ClientResult<ItemRecord> {
        let url = Self::endpoint(
            &self.config.sciencebase_url,
            &["catalog", "item", item_id.as_str()],
        )?;
        let params = [("format", "json".to_string())];

        self.get(url, &params).await
    }
}
