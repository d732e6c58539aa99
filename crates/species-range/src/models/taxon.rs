//! GBIF species-match response.

use serde::{Deserialize, Serialize};

/// How GBIF matched the queried name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchType {
    /// Exact name match.
    Exact,
    /// Fuzzy (misspelling-tolerant) match.
    Fuzzy,
    /// Only a higher rank (e.g., genus) matched.
    Higherrank,
    /// No match.
    #[default]
    None,
    /// Any value this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Result of `GET /species/match`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonMatch {
    /// Match quality.
    #[serde(default)]
    pub match_type: MatchType,

    /// GBIF backbone usage key.
    #[serde(default)]
    pub usage_key: Option<u64>,

    /// Scientific name with authorship.
    #[serde(default)]
    pub scientific_name: Option<String>,

    /// Scientific name without authorship.
    #[serde(default)]
    pub canonical_name: Option<String>,

    /// Vernacular (common) name, when GBIF has one.
    #[serde(default)]
    pub vernacular_name: Option<String>,

    /// Taxonomic rank of the match.
    #[serde(default)]
    pub rank: Option<String>,

    /// Match confidence, 0-100.
    #[serde(default)]
    pub confidence: Option<u8>,

    /// Kingdom.
    #[serde(default)]
    pub kingdom: Option<String>,

    /// Phylum.
    #[serde(default)]
    pub phylum: Option<String>,

    /// Class.
    #[serde(default)]
    pub class: Option<String>,

    /// Order.
    #[serde(default)]
    pub order: Option<String>,

    /// Family.
    #[serde(default)]
    pub family: Option<String>,

    /// Genus.
    #[serde(default)]
    pub genus: Option<String>,

    /// Species.
    #[serde(default)]
    pub species: Option<String>,
}

impl TaxonMatch {
    /// An exact or fuzzy match that carries a canonical name.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.match_type, MatchType::Exact | MatchType::Fuzzy)
            && self.canonical_name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// The canonical scientific name, if resolved.
    #[must_use]
    pub fn resolved_name(&self) -> Option<&str> {
        if self.is_resolved() { self.canonical_name.as_deref().map(str::trim) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_resolves() {
        let json = serde_json::json!({
            "matchType": "EXACT",
            "canonicalName": "Turdus migratorius",
            "vernacularName": "American Robin",
            "kingdom": "Animalia",
            "class": "Aves",
            "confidence": 100
        });
        let taxon: TaxonMatch = serde_json::from_value(json).unwrap();
        assert!(taxon.is_resolved());
        assert_eq!(taxon.resolved_name(), Some("Turdus migratorius"));
        assert_eq!(taxon.class.as_deref(), Some("Aves"));
        assert_eq!(taxon.confidence, Some(100));
    }

    #[test]
    fn test_none_match_does_not_resolve() {
        let taxon: TaxonMatch = serde_json::from_value(serde_json::json!({"matchType": "NONE"})).unwrap();
        assert!(!taxon.is_resolved());
        assert_eq!(taxon.resolved_name(), None);
    }

    #[test]
    fn test_higher_rank_does_not_resolve() {
        let json = serde_json::json!({"matchType": "HIGHERRANK", "canonicalName": "Turdus"});
        let taxon: TaxonMatch = serde_json::from_value(json).unwrap();
        assert!(!taxon.is_resolved());
    }

    #[test]
    fn test_unknown_match_type() {
        let json = serde_json::json!({"matchType": "VARIANT", "canonicalName": "Turdus migratorius"});
        let taxon: TaxonMatch = serde_json::from_value(json).unwrap();
        assert_eq!(taxon.match_type, MatchType::Unknown);
        assert!(!taxon.is_resolved());
    }

    #[test]
    fn test_fuzzy_without_name_does_not_resolve() {
        let json = serde_json::json!({"matchType": "FUZZY"});
        let taxon: TaxonMatch = serde_json::from_value(json).unwrap();
        assert!(!taxon.is_resolved());
    }
}
