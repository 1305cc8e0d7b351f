//! HTTP transport for profile documents
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with a descriptive user agent
//! - GET requests returning the document body
//! - Following redirects only while they stay on allowed hosts
//! - Classifying non-2xx responses and transport failures
//!
//! There is no retry logic here; a failed fetch is final for that document.

use crate::config::UserAgentConfig;
use crate::crawler::DocumentError;
use crate::url::{extract_domain, is_domain_allowed};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Formats the user agent as `Name/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Maximum redirect hops followed for one document
const MAX_REDIRECTS: usize = 10;

/// Redirect policy that applies the allow-list to every hop
///
/// A hop to a host outside `allowed_domains` is not followed; the 3xx
/// response is handed back to `fetch_document`, which reports it.
fn redirect_policy(allowed_domains: Vec<String>) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }

        let allowed = extract_domain(attempt.url())
            .map(|domain| is_domain_allowed(&domain, &allowed_domains))
            .unwrap_or(false);

        if allowed {
            attempt.follow()
        } else {
            tracing::debug!("Not following redirect to {}", attempt.url());
            attempt.stop()
        }
    })
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total per-request timeout
/// * `allowed_domains` - Host patterns a redirect may lead to; empty admits any host
///
/// # Example
///
/// ```no_run
/// use coauthor_ripple::config::UserAgentConfig;
/// use coauthor_ripple::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "CoauthorRipple".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let allowed = vec!["dblp.org".to_string()];
/// let client = build_http_client(&config, Duration::from_secs(30), allowed).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
    allowed_domains: Vec<String>,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect_policy(allowed_domains))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a document body
///
/// # Returns
///
/// * `Ok(String)` - The body of a 2xx response
/// * `Err(DocumentError::RedirectBlocked)` - A redirect the client refused to follow
/// * `Err(DocumentError::Http)` - Any other status code
/// * `Err(DocumentError::Transport)` - Connection, timeout or body read failure
pub async fn fetch_document(client: &Client, url: &Url) -> Result<String, DocumentError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();

    if status.is_redirection() {
        if let Some(location) = response.headers().get(LOCATION) {
            return Err(DocumentError::RedirectBlocked {
                location: location.to_str().unwrap_or("<non-ascii>").to_string(),
            });
        }
    }

    if !status.is_success() {
        return Err(DocumentError::Http {
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}
