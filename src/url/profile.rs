//! Profile URL construction
//!
//! Author profiles live at `<base>/pid/<identifier>.xml`.

use crate::url::normalize_url;
use crate::UrlError;
use url::Url;

const PID_SEGMENT: &str = "/pid/";
const PROFILE_SUFFIX: &str = ".xml";

/// Builds the profile document URL for an author identifier
///
/// The identifier is inserted as-is; only surrounding whitespace is removed.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use coauthor_ripple::url::profile_url;
///
/// let base = Url::parse("https://dblp.uni-trier.de").unwrap();
/// let url = profile_url(&base, "47/8013").unwrap();
/// assert_eq!(url.as_str(), "https://dblp.uni-trier.de/pid/47/8013.xml");
/// ```
pub fn profile_url(base: &Url, identifier: &str) -> Result<Url, UrlError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(UrlError::InvalidIdentifier(identifier.to_string()));
    }

    let root = base.as_str().trim_end_matches('/');
    normalize_url(&format!("{root}{PID_SEGMENT}{identifier}{PROFILE_SUFFIX}"))
}

/// Recovers the author identifier from a profile URL, if it is one
pub fn identifier_from_profile_url(url: &Url) -> Option<String> {
    let path = url.path();
    let start = path.rfind(PID_SEGMENT)? + PID_SEGMENT.len();
    let identifier = path[start..].strip_suffix(PROFILE_SUFFIX)?;
    (!identifier.is_empty()).then(|| identifier.to_string())
}
