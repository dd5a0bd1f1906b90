//! Identifier normalization
//!
//! One pure function per identifier namespace. These feed both the
//! identifier cache and the mute filter's equality checks, so "the same
//! paper" means the same thing everywhere in the pipeline.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Trailing version suffix such as "v2" on an arXiv ID
    static ref ARXIV_VERSION: Regex = Regex::new(r"v\d+$").unwrap();
}

/// Normalize a DOI for comparison
pub fn normalize_doi(doi: &str) -> String {
    doi.to_lowercase()
        .replace("https://dx.doi.org/", "")
        .replace("http://dx.doi.org/", "")
        .replace("https://doi.org/", "")
        .replace("http://doi.org/", "")
        .replace("doi:", "")
        .trim()
        .to_string()
}

/// Normalize an arXiv ID for comparison (strips the `vN` version suffix)
pub fn normalize_arxiv_id(id: &str) -> String {
    let cleaned = id.to_lowercase().replace("arxiv:", "");
    let cleaned = cleaned.trim();
    ARXIV_VERSION.replace(cleaned, "").to_string()
}

/// Normalize an ADS bibcode for comparison
pub fn normalize_bibcode(bibcode: &str) -> String {
    bibcode.trim().to_lowercase()
}

/// Normalize a PubMed ID for comparison
pub fn normalize_pmid(pmid: &str) -> String {
    pmid.trim().to_lowercase()
}

/// Normalize an OpenAlex work ID for comparison
pub fn normalize_openalex_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Category segment of an old-style arXiv ID, normalized.
///
/// `astro-ph.CO/2024.12345` yields `astro-ph.co`. New-style IDs
/// (`2401.12345`) have no category segment and yield `None`.
pub fn arxiv_category(arxiv_id: &str) -> Option<String> {
    let normalized = normalize_arxiv_id(arxiv_id);
    let (category, _rest) = normalized.split_once('/')?;
    if category.is_empty() || category.chars().next()?.is_ascii_digit() {
        return None;
    }
    Some(category.to_string())
}
