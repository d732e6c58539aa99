//! Name Resolver: species name to catalog item.
//!
//! ## Selection policy
//!
//! A search hit is a candidate when one of the words of its title is a
//! configured range keyword. Candidates are ranked by:
//! 1. name score: 2 if the title contains the searched name as a phrase,
//!    1 if it contains every word of it, 0 otherwise
//! 2. keyword rank: index of the first keyword found in the title (lower is better)
//!
//! A unique top-ranked candidate is selected. A tie at the top is reported as
//! [`RangeError::AmbiguousMatch`] rather than broken by listing order.

use std::cmp::Reverse;
use std::collections::HashSet;

use super::GapRangeSource;
use crate::error::{RangeError, RangeResult};
use crate::models::{CatalogItem, ItemId, TaxonMatch};

/// A candidate with its ranking key.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    /// The search hit.
    pub item: CatalogItem,

    /// How well the title matches the searched name (0-2).
    pub name_score: u8,

    /// Index of the first range keyword found in the title.
    pub keyword_rank: usize,
}

impl RankedCandidate {
    fn key(&self) -> (Reverse<u8>, usize) {
        (Reverse(self.name_score), self.keyword_rank)
    }
}

/// Candidates found for one query, with the name they were found under.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    /// Name the catalog answered to: the query, or the scientific name after fallback.
    pub searched_name: String,

    /// GBIF match used for the fallback search, if one was needed.
    pub taxon: Option<TaxonMatch>,

    /// Ranked candidates, best first.
    pub candidates: Vec<RankedCandidate>,
}

/// A resolved catalog item.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The selected item.
    pub item: CatalogItem,

    /// Name the item was found under.
    pub searched_name: String,

    /// GBIF match, when the taxonomy fallback was used.
    pub taxon: Option<TaxonMatch>,
}

impl Resolution {
    /// The catalog item reference.
    #[must_use]
    pub const fn item_id(&self) -> &ItemId {
        &self.item.id
    }

    /// Best known common name: GBIF vernacular name, else the one in the item title.
    #[must_use]
    pub fn common_name(&self) -> Option<String> {
        self.taxon
            .as_ref()
            .and_then(|t| t.vernacular_name.clone())
            .or_else(|| self.item.common_name().map(str::to_string))
    }
}

/// Lowercase and collapse whitespace.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Score how well a title names the searched species.
#[must_use]
pub fn name_score(query: &str, title: &str) -> u8 {
    let query = normalize(query);
    let title = normalize(title);

    if query.is_empty() {
        return 0;
    }
    if title.contains(&query) {
        return 2;
    }

    let words = title_words(&title);
    if query.split(' ').all(|w| words.contains(w)) { 1 } else { 0 }
}

/// Words of a lowercased title. Hyphenated and apostrophized words stay whole.
fn title_words(title: &str) -> HashSet<&str> {
    title
        .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
        .filter(|w| !w.is_empty())
        .collect()
}

/// Keep range-map hits, drop duplicate ids, and sort best first.
///
/// The sort is stable, so equal candidates keep their search order.
#[must_use]
pub fn rank_candidates(
    query: &str,
    items: Vec<CatalogItem>,
    keywords: &[String],
) -> Vec<RankedCandidate> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut seen = HashSet::new();

    let mut ranked: Vec<RankedCandidate> = items
        .into_iter()
        .filter_map(|item| {
            let title = item.title.to_lowercase();
            let words = title_words(&title);
            let keyword_rank = keywords.iter().position(|k| words.contains(k.as_str()))?;
            if !seen.insert(item.id.clone()) {
                return None;
            }
            let name_score = name_score(query, &item.title);
            Some(RankedCandidate { item, name_score, keyword_rank })
        })
        .collect();

    ranked.sort_by_key(RankedCandidate::key);
    ranked
}

/// Pick the single best candidate.
///
/// `query` is the caller's original name, used in error reports.
pub fn select_unique(query: &str, mut candidates: Vec<RankedCandidate>) -> RangeResult<CatalogItem> {
    let Some(best) = candidates.first() else {
        return Err(RangeError::not_found(query));
    };

    let best_key = best.key();
    let tied: Vec<&RankedCandidate> = candidates.iter().take_while(|c| c.key() == best_key).collect();

    if tied.len() > 1 {
        return Err(RangeError::AmbiguousMatch {
            query: query.to_string(),
            candidates: tied.iter().map(|c| c.item.title.clone()).collect(),
        });
    }

    Ok(candidates.swap_remove(0).item)
}

impl GapRangeSource {
    /// Resolve a species name to exactly one catalog item.
    ///
    /// # Errors
    ///
    /// - [`RangeError::Validation`] for a blank name
    /// - [`RangeError::NotFound`] when no candidate exists, even after the taxonomy fallback
    /// - [`RangeError::AmbiguousMatch`] when candidates tie at the top
    /// - [`RangeError::Upstream`] when the catalog search fails
    #[tracing::instrument(skip(self), fields(source = "usgs_gap"))]
    pub async fn resolve(&self, species_name: &str) -> RangeResult<Resolution> {
        let query = validate_name(species_name)?;
        let set = self.find_candidates(query).await?;

        let item = select_unique(query, set.candidates)?;
        tracing::info!(item_id = %item.id, title = %item.title, "Resolved species to catalog item");

        Ok(Resolution { item, searched_name: set.searched_name, taxon: set.taxon })
    }

    /// Search for range-map candidates, falling back to the GBIF scientific name
    /// when the name as given finds nothing.
    pub(crate) async fn find_candidates(&self, query: &str) -> RangeResult<CandidateSet> {
        let candidates = self.search_ranked(query).await?;
        if !candidates.is_empty() || !self.taxonomy_fallback {
            return Ok(CandidateSet { searched_name: query.to_string(), taxon: None, candidates });
        }

        let empty = CandidateSet { searched_name: query.to_string(), taxon: None, candidates: vec![] };

        tracing::info!(query, "No catalog match, attempting name resolution");
        let Some(taxon) = self.resolve_taxon(query).await else {
            return Ok(empty);
        };
        let Some(scientific) = taxon.resolved_name().map(str::to_string) else {
            return Ok(empty);
        };
        if scientific.eq_ignore_ascii_case(query) {
            return Ok(empty);
        }

        tracing::info!(query, scientific = %scientific, "Searching again with scientific name");
        let candidates = self.search_ranked(&scientific).await?;
        Ok(CandidateSet { searched_name: scientific, taxon: Some(taxon), candidates })
    }

    /// Resolve a name through GBIF.
    ///
    /// Returns `None` when GBIF has no species-level match. GBIF failures are
    /// logged and also yield `None`: the lookup only widens the catalog search.
    pub async fn resolve_taxon(&self, name: &str) -> Option<TaxonMatch> {
        match self.client.match_species(name).await {
            Ok(taxon) if taxon.is_resolved() => Some(taxon),
            Ok(taxon) => {
                tracing::debug!(name, match_type = ?taxon.match_type, "No species-level GBIF match");
                None
            }
            Err(e) => {
                tracing::warn!(name, error = %e, "GBIF name resolution failed");
                None
            }
        }
    }

    async fn search_ranked(&self, query: &str) -> RangeResult<Vec<RankedCandidate>> {
        let result = self.client.search_items(query).await?;
        Ok(rank_candidates(query, result.items, &self.title_keywords))
    }
}

/// Trim a species name and reject blank input.
pub(crate) fn validate_name(species_name: &str) -> RangeResult<&str> {
    let trimmed = species_name.trim();
    if trimmed.is_empty() {
        return Err(RangeError::validation("species_name", "cannot be empty"));
    }
    Ok(trimmed)
}
