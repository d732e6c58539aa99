//! ScienceBase catalog records.
//!
//! Responses are decoded into these structs at the client boundary. Keys the
//! pipeline depends on (`items`, `id`, file `name`) are required so a changed
//! response shape fails at decode time instead of surfacing later as an empty value.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// GAP titles read "Common Name (Genus species) <code> Range Map".
static TITLE_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<common>[^()]+?)\s*\((?P<scientific>[^()]+)\)").expect("valid title regex")
});

/// Opaque identifier of one catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A catalog search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Catalog item identifier.
    pub id: ItemId,

    /// Item title.
    #[serde(default)]
    pub title: String,

    /// Short description.
    #[serde(default)]
    pub summary: Option<String>,

    /// Keyword tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl CatalogItem {
    /// Common name parsed from a GAP-style title.
    #[must_use]
    pub fn common_name(&self) -> Option<&str> {
        TITLE_NAMES
            .captures(&self.title)
            .and_then(|c| c.name("common"))
            .map(|m| m.as_str())
    }

    /// Scientific name parsed from a GAP-style title.
    #[must_use]
    pub fn scientific_name(&self) -> Option<&str> {
        TITLE_NAMES
            .captures(&self.title)
            .and_then(|c| c.name("scientific"))
            .map(|m| m.as_str().trim())
    }

    /// Tag names, in listing order.
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).filter(|n| !n.is_empty()).collect()
    }
}

/// Keyword tag attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag text.
    #[serde(default)]
    pub name: String,

    /// Tag type (e.g., "Theme", "Place").
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Vocabulary the tag comes from.
    #[serde(default)]
    pub scheme: Option<String>,
}

/// Catalog search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemSearchResult {
    /// Total hits reported by the catalog.
    #[serde(default)]
    pub total: u64,

    /// Hits on this page.
    pub items: Vec<CatalogItem>,
}

/// Full item record with its attached files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Catalog item identifier.
    pub id: ItemId,

    /// Item title.
    #[serde(default)]
    pub title: String,

    /// Attached files, in listing order.
    #[serde(default)]
    pub files: Vec<CatalogFile>,
}

/// One file attached to a catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    /// File name, including extension.
    pub name: String,

    /// Direct file URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Alternate download URL.
    #[serde(default)]
    pub download_uri: Option<String>,

    /// MIME type.
    #[serde(default)]
    pub content_type: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,

    /// Declared checksum.
    #[serde(default)]
    pub checksum: Option<Checksum>,
}

impl CatalogFile {
    /// URL the file can be fetched from: `url`, falling back to `downloadUri`.
    #[must_use]
    pub fn download_locator(&self) -> Option<&str> {
        [self.url.as_deref(), self.download_uri.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|u| !u.is_empty())
    }
}

/// Checksum declared by the catalog for a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    /// Hex digest.
    pub value: String,

    /// Algorithm name (e.g., "MD5").
    #[serde(default, rename = "type")]
    pub algorithm: String,
}

impl Checksum {
    /// Whether this is an MD5 digest.
    #[must_use]
    pub fn is_md5(&self) -> bool {
        self.algorithm.eq_ignore_ascii_case("md5")
    }
}

/// The range file chosen for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// File name as listed in the catalog.
    pub name: String,

    /// Download locator.
    pub url: String,

    /// MIME type.
    pub content_type: Option<String>,

    /// Declared size in bytes.
    pub size: Option<u64>,

    /// Declared checksum.
    pub checksum: Option<Checksum>,
}

impl FileReference {
    /// A reference with only a name and a locator.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            content_type: None,
            size: None,
            checksum: None,
        }
    }

    /// Build from a catalog file, or `None` if it has no download locator.
    #[must_use]
    pub fn from_catalog_file(file: &CatalogFile) -> Option<Self> {
        let url = file.download_locator()?;
        Some(Self {
            name: file.name.clone(),
            url: url.to_string(),
            content_type: file.content_type.clone(),
            size: file.size,
            checksum: file.checksum.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_names() {
        let item = CatalogItem {
            id: ItemId::from("abc"),
            title: "American Robin (Turdus migratorius) bAMROx_CONUS_2001v1 Range Map".to_string(),
            ..Default::default()
        };
        assert_eq!(item.common_name(), Some("American Robin"));
        assert_eq!(item.scientific_name(), Some("Turdus migratorius"));
    }

    #[test]
    fn test_title_without_parentheses() {
        let item = CatalogItem { title: "GAP Species Range Maps".to_string(), ..Default::default() };
        assert_eq!(item.common_name(), None);
        assert_eq!(item.scientific_name(), None);
    }

    #[test]
    fn test_download_locator_prefers_url() {
        let file = CatalogFile {
            name: "range.zip".to_string(),
            url: Some("https://example.org/a".to_string()),
            download_uri: Some("https://example.org/b".to_string()),
            ..Default::default()
        };
        assert_eq!(file.download_locator(), Some("https://example.org/a"));

        let file = CatalogFile {
            url: Some("  ".to_string()),
            download_uri: Some("https://example.org/b".to_string()),
            ..file
        };
        assert_eq!(file.download_locator(), Some("https://example.org/b"));
    }

    #[test]
    fn test_file_reference_requires_locator() {
        let file = CatalogFile { name: "range.zip".to_string(), ..Default::default() };
        assert!(FileReference::from_catalog_file(&file).is_none());
    }

    #[test]
    fn test_item_record_requires_file_name() {
        let json = serde_json::json!({"id": "x", "files": [{"url": "https://example.org"}]});
        assert!(serde_json::from_value::<ItemRecord>(json).is_err());
    }

    #[test]
    fn test_search_result_requires_items() {
        let json = serde_json::json!({"total": 0});
        assert!(serde_json::from_value::<ItemSearchResult>(json).is_err());
    }

    #[test]
    fn test_checksum_algorithm() {
        let json = serde_json::json!({"value": "abc", "type": "MD5"});
        let checksum: Checksum = serde_json::from_value(json).unwrap();
        assert!(checksum.is_md5());
    }
}
