use crate::url::extract_domain;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Main configuration structure for Coauthor-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of discovery hops followed from a seed (seed = 0)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of fetches allowed in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Fixed delay before each fetch (milliseconds)
    #[serde(default)]
    pub delay: u64,

    /// Upper bound of the random jitter added before each fetch (milliseconds)
    #[serde(rename = "random-delay", default = "default_random_delay")]
    pub random_delay: u64,

    /// Whether a profile discovered from several documents is fetched each time
    #[serde(rename = "allow-revisit", default = "default_allow_revisit")]
    pub allow_revisit: bool,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
            delay: 0,
            random_delay: default_random_delay(),
            allow_revisit: default_allow_revisit(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl CrawlerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }

    pub fn random_delay(&self) -> Duration {
        Duration::from_millis(self.random_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_concurrency() -> u32 {
    2
}

fn default_random_delay() -> u64 {
    5_000
}

fn default_allow_revisit() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Where profiles are fetched from
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Service root; profiles live at `<base-url>/pid/<id>.xml`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Domain patterns the crawler may fetch from (defaults to the base URL host)
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,

    /// Profile URLs the crawl starts from
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl SourceConfig {
    /// Parses `base_url`; only meaningful after validation
    pub fn base(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }

    /// The allow-list actually enforced: the configured one, or the base host
    pub fn effective_allowed_domains(&self) -> Vec<String> {
        if !self.allowed_domains.is_empty() {
            return self.allowed_domains.clone();
        }
        self.base()
            .ok()
            .as_ref()
            .and_then(extract_domain)
            .into_iter()
            .collect()
    }
}

fn default_base_url() -> String {
    String::from("https://dblp.uni-trier.de")
}

/// XPath selectors used to pull fields out of a profile document
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Author display name
    #[serde(default = "default_name_selector")]
    pub name: String,

    /// Author identifier
    #[serde(default = "default_id_selector")]
    pub id: String,

    /// Every co-author identifier occurrence in the citation list
    #[serde(default = "default_collaborator_selector")]
    pub collaborator: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            name: default_name_selector(),
            id: default_id_selector(),
            collaborator: default_collaborator_selector(),
        }
    }
}

fn default_name_selector() -> String {
    String::from("/dblpperson/@name")
}

fn default_id_selector() -> String {
    String::from("/dblpperson/@pid")
}

fn default_collaborator_selector() -> String {
    String::from("//dblpperson/r/article/author/@pid")
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV dataset; `-` writes to stdout
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// What happens to an existing dataset file
    #[serde(rename = "write-mode", default)]
    pub write_mode: WriteMode,

    /// Column delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

/// Open-on-run semantics for the dataset file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Replace previous content
    #[default]
    Truncate,
    /// Keep previous rows and append; header only when the file is empty
    Append,
}
