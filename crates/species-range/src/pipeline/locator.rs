//! Dataset Locator: catalog item to range file.

use super::GapRangeSource;
use crate::error::{RangeError, RangeResult};
use crate::models::{CatalogFile, FileReference, ItemId, ItemRecord};

/// File-name suffix predicate for picking the range file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFileFilter {
    extensions: Vec<String>,
}

impl RangeFileFilter {
    /// Accept files whose names end with any of `extensions` (case-insensitive).
    ///
    /// A missing leading dot is added, so `"zip"` and `".zip"` are equivalent.
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty() && e != ".")
            .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
            .collect();
        Self { extensions }
    }

    /// Normalized suffixes, in configured order.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether a catalog file is an acceptable range file.
    #[must_use]
    pub fn matches(&self, file: &CatalogFile) -> bool {
        let name = file.name.to_ascii_lowercase();
        self.extensions.iter().any(|e| name.ends_with(e.as_str()))
    }
}

impl Default for RangeFileFilter {
    fn default() -> Self {
        Self::new(crate::config::defaults::RANGE_FILE_EXTENSIONS)
    }
}

/// First file in listing order that satisfies `predicate` and has a download locator.
pub fn select_range_file<P>(item: &ItemRecord, predicate: P) -> RangeResult<FileReference>
where
    P: Fn(&CatalogFile) -> bool,
{
    item.files
        .iter()
        .filter(|f| predicate(f))
        .find_map(FileReference::from_catalog_file)
        .ok_or_else(|| RangeError::NoRangeFile { item_id: item.id.to_string() })
}

impl GapRangeSource {
    /// Pick the range file attached to a catalog item using the configured filter.
    ///
    /// # Errors
    ///
    /// - [`RangeError::NoRangeFile`] when no attached file passes the filter
    /// - [`RangeError::Upstream`] when the item record cannot be fetched
    pub async fn locate_range_file(&self, item_id: &ItemId) -> RangeResult<FileReference> {
        let filter = self.file_filter.clone();
        self.locate_range_file_with(item_id, move |f| filter.matches(f)).await
    }

    /// Pick the range file with a caller-supplied predicate.
    ///
    /// # Errors
    ///
    /// Same as [`GapRangeSource::locate_range_file`].
    #[tracing::instrument(skip(self, predicate))]
    pub async fn locate_range_file_with<P>(
        &self,
        item_id: &ItemId,
        predicate: P,
    ) -> RangeResult<FileReference>
    where
        P: Fn(&CatalogFile) -> bool + Send,
    {
        let record = self.client.get_item(item_id).await?;
        tracing::debug!(files = record.files.len(), "Fetched item file listing");

        let file = select_range_file(&record, predicate)?;
        tracing::info!(file = %file.name, size = ?file.size, "Located range file");
        Ok(file)
    }
}
