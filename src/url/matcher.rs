/// Checks if a domain matches an allow-list pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact: `dblp.org` matches only `dblp.org`
/// 2. Wildcard: `*.uni-trier.de` matches `uni-trier.de` and any subdomain of it
///
/// Matching is case-sensitive; callers pass lowercase domains.
///
/// # Examples
///
/// ```
/// use coauthor_ripple::url::matches_wildcard;
///
/// assert!(matches_wildcard("dblp.org", "dblp.org"));
/// assert!(matches_wildcard("*.uni-trier.de", "dblp.uni-trier.de"));
/// assert!(!matches_wildcard("*.uni-trier.de", "trier.de"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
