//! Configuration for the species range client.

use std::path::PathBuf;
use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for USGS ScienceBase.
    pub const SCIENCEBASE_URL: &str = "https://www.sciencebase.gov";

    /// Base URL for the GBIF species API.
    pub const GBIF_API_URL: &str = "https://api.gbif.org/v1";

    /// ScienceBase parent item holding the GAP species range maps.
    pub const GAP_RANGE_COLLECTION_ID: &str = "5951527de4b062508e3b1e79";

    /// Item fields requested from the catalog search.
    pub const SEARCH_FIELDS: &str = "title,summary,tags";

    /// Maximum search hits requested per query.
    pub const SEARCH_LIMIT: u32 = 20;

    /// Request timeout (covers the range file download as well).
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 4;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Transient-failure retries. Zero leaves retry policy to the caller.
    pub const MAX_RETRIES: u32 = 0;

    /// User agent sent with every request.
    pub const USER_AGENT: &str = concat!("species-range/", env!("CARGO_PKG_VERSION"));
}

/// Matching defaults for candidate selection.
pub mod defaults {
    /// Title keywords that mark a search hit as a range-map item, best first.
    pub const TITLE_KEYWORDS: &[&str] = &["range", "distribution", "habitat"];

    /// File-name suffixes accepted as the range file, matched case-insensitively.
    pub const RANGE_FILE_EXTENSIONS: &[&str] = &[".zip", ".geojson", ".json"];

    /// CRS assumed when the range file does not declare one.
    pub const CRS: &str = "EPSG:4326";

    /// Prefix of the per-call scratch directory.
    pub const SCRATCH_PREFIX: &str = "species-range-";
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// ScienceBase base URL (for testing with mock servers).
    pub sciencebase_url: String,

    /// GBIF API base URL (for testing with mock servers).
    pub gbif_api_url: String,

    /// Catalog collection that scopes every search.
    pub collection_id: String,

    /// Maximum search hits requested per query.
    pub search_limit: u32,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Retries for transient HTTP failures.
    pub max_retries: u32,

    /// Title keywords identifying range-map items, best first.
    pub title_keywords: Vec<String>,

    /// File-name suffixes accepted as the range file.
    pub range_file_extensions: Vec<String>,

    /// Resolve unmatched names through GBIF and search again with the scientific name.
    pub taxonomy_fallback: bool,

    /// Where per-call scratch directories are created (system temp dir if unset).
    pub scratch_dir: Option<PathBuf>,
}

impl Config {
    /// Create a configuration pointing at the public services.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sciencebase_url: api::SCIENCEBASE_URL.to_string(),
            gbif_api_url: api::GBIF_API_URL.to_string(),
            collection_id: api::GAP_RANGE_COLLECTION_ID.to_string(),
            search_limit: api::SEARCH_LIMIT,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_retries: api::MAX_RETRIES,
            title_keywords: defaults::TITLE_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            range_file_extensions: defaults::RANGE_FILE_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            taxonomy_fallback: true,
            scratch_dir: None,
        }
    }

    /// Create a test configuration with every endpoint on one mock server.
    ///
    /// GBIF is served under `/gbif/v1`.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            sciencebase_url: base_url.to_string(),
            gbif_api_url: format!("{}/gbif/v1", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Self::new()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `SCIENCEBASE_URL`, `GBIF_API_URL`, `SPECIES_RANGE_RETRIES`,
    /// `SPECIES_RANGE_SCRATCH_DIR` and `SPECIES_RANGE_TAXONOMY_FALLBACK`.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Some(url) = lookup("SCIENCEBASE_URL") {
            config.sciencebase_url = url;
        }
        if let Some(url) = lookup("GBIF_API_URL") {
            config.gbif_api_url = url;
        }
        if let Some(retries) = lookup("SPECIES_RANGE_RETRIES") {
            config.max_retries = retries
                .parse()
                .map_err(|e| anyhow::anyhow!("SPECIES_RANGE_RETRIES={retries}: {e}"))?;
        }
        if let Some(dir) = lookup("SPECIES_RANGE_SCRATCH_DIR") {
            config.scratch_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = lookup("SPECIES_RANGE_TAXONOMY_FALLBACK") {
            config.taxonomy_fallback = parse_flag(&flag).ok_or_else(|| {
                anyhow::anyhow!("SPECIES_RANGE_TAXONOMY_FALLBACK={flag}: expected true or false")
            })?;
        }

        Ok(config)
    }

    /// Check if unmatched names are retried through GBIF.
    #[must_use]
    pub const fn uses_taxonomy_fallback(&self) -> bool {
        self.taxonomy_fallback
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.sciencebase_url, api::SCIENCEBASE_URL);
        assert_eq!(config.collection_id, api::GAP_RANGE_COLLECTION_ID);
        assert_eq!(config.max_retries, 0);
        assert!(config.uses_taxonomy_fallback());
        assert!(config.scratch_dir.is_none());
    }

    #[test]
    fn test_config_for_testing() {
        let config = Config::for_testing("http://127.0.0.1:9999");
        assert_eq!(config.sciencebase_url, "http://127.0.0.1:9999");
        assert_eq!(config.gbif_api_url, "http://127.0.0.1:9999/gbif/v1");
        assert_eq!(config.title_keywords, vec!["range", "distribution", "habitat"]);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_from_vars_reads_every_variable() {
        let config = from_vars(&[
            ("SCIENCEBASE_URL", "http://catalog.test"),
            ("GBIF_API_URL", "http://gbif.test/v1"),
            ("SPECIES_RANGE_RETRIES", "3"),
            ("SPECIES_RANGE_SCRATCH_DIR", "/tmp/ranges"),
            ("SPECIES_RANGE_TAXONOMY_FALLBACK", "off"),
        ])
        .unwrap();

        assert_eq!(config.sciencebase_url, "http://catalog.test");
        assert_eq!(config.gbif_api_url, "http://gbif.test/v1");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.scratch_dir, Some(PathBuf::from("/tmp/ranges")));
        assert!(!config.uses_taxonomy_fallback());
    }

    #[test]
    fn test_from_vars_empty_is_default() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.sciencebase_url, api::SCIENCEBASE_URL);
        assert_eq!(config.gbif_api_url, api::GBIF_API_URL);
        assert_eq!(config.max_retries, api::MAX_RETRIES);
        assert!(config.uses_taxonomy_fallback());
        assert!(config.scratch_dir.is_none());
    }

    #[test]
    fn test_from_vars_rejects_non_numeric_retries() {
        let err = from_vars(&[("SPECIES_RANGE_RETRIES", "abc")]).unwrap_err();
        assert!(err.to_string().starts_with("SPECIES_RANGE_RETRIES=abc"));
    }

    #[test]
    fn test_from_vars_rejects_invalid_flag() {
        let err = from_vars(&[("SPECIES_RANGE_TAXONOMY_FALLBACK", "maybe")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "SPECIES_RANGE_TAXONOMY_FALLBACK=maybe: expected true or false"
        );
    }

    #[test]
    fn test_from_env_without_overrides() {
        // Only meaningful when the test environment leaves these unset.
        if std::env::var_os("SPECIES_RANGE_RETRIES").is_none()
            && std::env::var_os("SPECIES_RANGE_TAXONOMY_FALLBACK").is_none()
        {
            assert!(Config::from_env().is_ok());
        }
    }
}
