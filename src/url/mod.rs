//! URL handling module for Coauthor-Ripple
//!
//! This module provides URL normalization, domain extraction, allow-list
//! matching and profile URL construction.

mod domain;
mod matcher;
mod normalize;
mod profile;

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::matches_wildcard;
pub use normalize::normalize_url;
pub use profile::{identifier_from_profile_url, profile_url};

/// Checks a domain against the allow-list
///
/// An empty allow-list admits every domain. Otherwise the domain must match
/// at least one pattern (exact or `*.` wildcard).
///
/// # Examples
///
/// ```
/// use coauthor_ripple::url::is_domain_allowed;
///
/// let allowed = vec!["dblp.uni-trier.de".to_string()];
/// assert!(is_domain_allowed("dblp.uni-trier.de", &allowed));
/// assert!(!is_domain_allowed("example.com", &allowed));
/// assert!(is_domain_allowed("example.com", &[]));
/// ```
pub fn is_domain_allowed(domain: &str, allowed: &[String]) -> bool {
    allowed.is_empty()
        || allowed
            .iter()
            .any(|pattern| matches_wildcard(pattern, domain))
}
