use url::Url;

/// Extracts the lowercase host from a URL
///
/// Ports are not part of the result, so a mock server on `127.0.0.1:PORT`
/// yields `127.0.0.1`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use coauthor_ripple::url::extract_domain;
///
/// let url = Url::parse("https://DBLP.uni-trier.de/pid/47/8013.xml").unwrap();
/// assert_eq!(extract_domain(&url), Some("dblp.uni-trier.de".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
