use crate::UrlError;
use url::Url;

/// Normalizes a URL before it enters the work queue
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an `http` or `https` scheme
/// 3. Require a host (the `url` crate lowercases it)
/// 4. Remove the fragment
///
/// The path is left untouched: profile identifiers contain slashes
/// (`47/8013`) and must reach the service verbatim.
///
/// # Examples
///
/// ```
/// use coauthor_ripple::url::normalize_url;
///
/// let url = normalize_url("https://DBLP.org/pid/47/8013.xml#top").unwrap();
/// assert_eq!(url.as_str(), "https://dblp.org/pid/47/8013.xml");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    // Plain HTTP stays allowed so tests can run against local mock servers
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}
