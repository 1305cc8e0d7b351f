//! Integration tests for the crawler
//!
//! These tests use wiremock to serve fixed profile documents and run the
//! full crawl cycle end-to-end.

use coauthor_ripple::config::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SourceConfig, UserAgentConfig, WriteMode,
};
use coauthor_ripple::crawler::{run_crawl, Coordinator, CrawlOutcome};
use coauthor_ripple::AuthorRecord;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, seeds: &[&str], csv_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth: 2,
            concurrency: 2,
            delay: 0,
            random_delay: 0, // No jitter in tests
            allow_revisit: true,
            request_timeout: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        source: SourceConfig {
            base_url: server.uri(),
            allowed_domains: vec!["127.0.0.1".to_string()],
            seeds: seeds.iter().map(|pid| profile_link(server, pid)).collect(),
        },
        selectors: SelectorConfig::default(),
        output: OutputConfig {
            csv_path: csv_path.to_string(),
            write_mode: WriteMode::Truncate,
            delimiter: ',',
        },
    }
}

fn profile_link(server: &MockServer, pid: &str) -> String {
    format!("{}/pid/{}.xml", server.uri(), pid)
}

/// Builds a profile document; each inner slice is the author list of one article
fn profile(name: &str, pid: &str, articles: &[&[&str]]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="US-ASCII"?><dblpperson name="{}" pid="{}" n="{}">"#,
        name,
        pid,
        articles.len()
    );
    xml.push_str(&format!(
        r#"<person key="homepages/{}"><author pid="{}">{}</author></person>"#,
        pid, pid, name
    ));
    for (i, authors) in articles.iter().enumerate() {
        xml.push_str(&format!(r#"<r><article key="journals/test/{}">"#, i));
        for author in authors.iter() {
            xml.push_str(&format!(r#"<author pid="{}">Author {}</author>"#, author, author));
        }
        xml.push_str("<title>A paper.</title></article></r>");
    }
    xml.push_str("</dblpperson>");
    xml
}

async fn mount_profile(server: &MockServer, pid: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/pid/{}.xml", pid)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn requests_for(server: &MockServer, pid: &str) -> usize {
    let wanted = format!("/pid/{}.xml", pid);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == wanted)
        .count()
}

async fn crawl(config: Config) -> CrawlOutcome {
    Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run()
        .await
}

fn row(name: &str, id: &str, collaborators: &[&str]) -> AuthorRecord {
    AuthorRecord {
        name: name.to_string(),
        id: id.to_string(),
        collaborator_ids: collaborators.iter().map(|c| c.to_string()).collect(),
    }
}

/// Order-insensitive view of an output list
fn normalized(records: &[AuthorRecord]) -> Vec<(String, String, BTreeSet<String>)> {
    let mut rows: Vec<_> = records
        .iter()
        .map(|r| {
            (
                r.name.clone(),
                r.id.clone(),
                r.collaborator_ids.iter().cloned().collect(),
            )
        })
        .collect();
    rows.sort();
    rows
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open dataset");
    reader
        .records()
        .map(|row| row.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_end_to_end_two_profiles() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        "47/8013",
        profile("A. Example", "47/8013", &[&["47/8013", "1/2345"]]),
    )
    .await;
    mount_profile(&server, "1/2345", profile("B. Collaborator", "1/2345", &[])).await;

    let outcome = crawl(create_test_config(&server, &["47/8013"], "-")).await;

    assert_eq!(
        outcome.records,
        vec![
            row("A. Example", "47/8013", &["1/2345"]),
            row("B. Collaborator", "1/2345", &[]),
        ]
    );
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.stats.completed, 2);

    // The seed lists itself as an author but is never fetched again
    assert_eq!(requests_for(&server, "47/8013").await, 1);
}

#[tokio::test]
async fn test_depth_bound() {
    let server = MockServer::start().await;
    mount_profile(&server, "c/0", profile("Zero", "c/0", &[&["c/0", "c/1"]])).await;
    mount_profile(&server, "c/1", profile("One", "c/1", &[&["c/1", "c/2"]])).await;
    mount_profile(&server, "c/2", profile("Two", "c/2", &[&["c/2", "c/3"]])).await;

    // Three hops away: must never be requested
    Mock::given(method("GET"))
        .and(path("/pid/c/3.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile("Three", "c/3", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = crawl(create_test_config(&server, &["c/0"], "-")).await;

    let ids: BTreeSet<_> = outcome.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, BTreeSet::from(["c/0", "c/1", "c/2"]));
    assert_eq!(requests_for(&server, "c/3").await, 0);

    // The depth-2 document still records the collaborator it could not follow
    let two = outcome.records.iter().find(|r| r.id == "c/2").unwrap();
    assert_eq!(two.collaborator_ids, vec!["c/3"]);
    assert_eq!(outcome.stats.rejected, 1);
}

#[tokio::test]
async fn test_zero_depth_fetches_seed_only() {
    let server = MockServer::start().await;
    mount_profile(&server, "c/0", profile("Zero", "c/0", &[&["c/0", "c/1"]])).await;

    let mut config = create_test_config(&server, &["c/0"], "-");
    config.crawler.max_depth = 0;
    let outcome = crawl(config).await;

    assert_eq!(outcome.records, vec![row("Zero", "c/0", &["c/1"])]);
    assert_eq!(requests_for(&server, "c/1").await, 0);
}

#[tokio::test]
async fn test_self_exclusion_with_custom_selectors() {
    let server = MockServer::start().await;
    // The id lives on a separate element and the author is listed among
    // their own co-authors
    let body = r#"<dblpperson name="Late Id"><r><article><author pid="5/5"/><author pid="6/6"/></article></r><meta pid="5/5"/></dblpperson>"#;
    mount_profile(&server, "5/5", body.to_string()).await;
    mount_profile(&server, "6/6", profile("Six", "6/6", &[])).await;

    let mut config = create_test_config(&server, &["5/5"], "-");
    config.selectors.id = "//meta/@pid".to_string();
    config.selectors.collaborator = "//author/@pid".to_string();
    config.crawler.max_depth = 0;

    let outcome = crawl(config).await;

    assert_eq!(outcome.records, vec![row("Late Id", "5/5", &["6/6"])]);
}

#[tokio::test]
async fn test_per_document_dedup() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        "1/1",
        profile(
            "Prolific",
            "1/1",
            &[&["1/1", "2/2"], &["2/2", "3/3"], &["1/1", "2/2"]],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/pid/2/2.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile("Two", "2/2", &[])))
        .expect(1)
        .mount(&server)
        .await;
    mount_profile(&server, "3/3", profile("Three", "3/3", &[])).await;

    let mut config = create_test_config(&server, &["1/1"], "-");
    config.crawler.max_depth = 1;
    let outcome = crawl(config).await;

    let prolific = outcome.records.iter().find(|r| r.id == "1/1").unwrap();
    assert_eq!(prolific.collaborator_ids, vec!["2/2", "3/3"]);
    assert_eq!(requests_for(&server, "2/2").await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_cross_document_leakage() {
    let server = MockServer::start().await;
    let delayed = |body: String| {
        ResponseTemplate::new(200)
            .set_body_string(body)
            .set_delay(Duration::from_millis(200))
    };

    Mock::given(method("GET"))
        .and(path("/pid/x/0.xml"))
        .respond_with(delayed(profile("X", "x/0", &[&["x/0", "x/1"], &["x/2"]])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pid/y/0.xml"))
        .respond_with(delayed(profile("Y", "y/0", &[&["y/1", "y/0"], &["y/2", "y/3"]])))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &["x/0", "y/0"], "-");
    config.crawler.max_depth = 0;
    let outcome = crawl(config).await;

    assert_eq!(
        normalized(&outcome.records),
        normalized(&[
            row("X", "x/0", &["x/1", "x/2"]),
            row("Y", "y/0", &["y/1", "y/2", "y/3"]),
        ])
    );
}

#[tokio::test]
async fn test_revisit_follows_cycles_to_depth_bound() {
    let server = MockServer::start().await;
    mount_profile(&server, "a/1", profile("A", "a/1", &[&["a/1", "b/1"]])).await;
    mount_profile(&server, "b/1", profile("B", "b/1", &[&["b/1", "a/1"]])).await;

    let outcome = crawl(create_test_config(&server, &["a/1"], "-")).await;

    // a/1 (depth 0) -> b/1 (depth 1) -> a/1 (depth 2)
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(requests_for(&server, "a/1").await, 2);
    assert_eq!(requests_for(&server, "b/1").await, 1);
}

#[tokio::test]
async fn test_no_revisit_fetches_each_profile_once() {
    let server = MockServer::start().await;
    mount_profile(&server, "a/1", profile("A", "a/1", &[&["a/1", "b/1"]])).await;
    mount_profile(&server, "b/1", profile("B", "b/1", &[&["b/1", "a/1"]])).await;

    let mut config = create_test_config(&server, &["a/1"], "-");
    config.crawler.allow_revisit = false;
    let outcome = crawl(config).await;

    assert_eq!(
        outcome.records,
        vec![row("A", "a/1", &["b/1"]), row("B", "b/1", &["a/1"])]
    );
    assert_eq!(outcome.stats.rejected, 1);
}

#[tokio::test]
async fn test_idempotent_rerun() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        "47/8013",
        profile("A. Example", "47/8013", &[&["47/8013", "1/2345"], &["3/3"]]),
    )
    .await;
    mount_profile(
        &server,
        "1/2345",
        profile("B. Collaborator", "1/2345", &[&["1/2345", "3/3"]]),
    )
    .await;
    mount_profile(&server, "3/3", profile("C. Third", "3/3", &[&["3/3", "47/8013"]])).await;

    let first = crawl(create_test_config(&server, &["47/8013"], "-")).await;
    let second = crawl(create_test_config(&server, &["47/8013"], "-")).await;

    assert!(!first.records.is_empty());
    assert_eq!(normalized(&first.records), normalized(&second.records));
}

#[tokio::test]
async fn test_error_isolation() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        "47/8013",
        profile("A. Example", "47/8013", &[&["47/8013", "1/2345", "9/999"]]),
    )
    .await;
    mount_profile(&server, "1/2345", profile("B. Collaborator", "1/2345", &[])).await;

    // Slower than the client timeout: surfaces as a transport error
    Mock::given(method("GET"))
        .and(path("/pid/9/999.xml"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &["47/8013"], "-");
    config.crawler.request_timeout = 1;
    let outcome = crawl(config).await;

    assert_eq!(
        normalized(&outcome.records),
        normalized(&[
            row("A. Example", "47/8013", &["1/2345", "9/999"]),
            row("B. Collaborator", "1/2345", &[]),
        ])
    );

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url.as_str(), profile_link(&server, "9/999"));
    assert_eq!(outcome.failures[0].depth, 1);
    assert_eq!(outcome.stats.failed, 1);
}

#[tokio::test]
async fn test_malformed_document_is_dropped() {
    let server = MockServer::start().await;
    mount_profile(&server, "1/1", profile("One", "1/1", &[&["1/1", "2/2"]])).await;
    mount_profile(&server, "2/2", "<dblpperson name=\"Broken\"><r>".to_string()).await;

    let outcome = crawl(create_test_config(&server, &["1/1"], "-")).await;

    assert_eq!(outcome.records, vec![row("One", "1/1", &["2/2"])]);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].error.contains("XML"));
}

#[tokio::test]
async fn test_run_crawl_writes_dataset() {
    let server = MockServer::start().await;
    mount_profile(
        &server,
        "47/8013",
        profile("A. Example", "47/8013", &[&["47/8013", "1/2345"], &["3/3"]]),
    )
    .await;
    mount_profile(&server, "1/2345", profile("B. Collaborator", "1/2345", &[])).await;
    mount_profile(&server, "3/3", profile("C. Third", "3/3", &[])).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("clients.csv");
    let mut config = create_test_config(&server, &["47/8013"], &csv_path.to_string_lossy());
    config.crawler.max_depth = 1;
    config.crawler.concurrency = 1;

    let outcome = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(outcome.records.len(), 3);

    let rows = read_csv(&csv_path);
    assert_eq!(rows[0], vec!["name", "id", "collaborators"]);
    assert_eq!(rows[1], vec!["A. Example", "47/8013", "1/2345,3/3"]);
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn test_rerun_truncates_or_appends() {
    let server = MockServer::start().await;
    mount_profile(&server, "1/1", profile("One", "1/1", &[])).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("clients.csv");
    let mut config = create_test_config(&server, &["1/1"], &csv_path.to_string_lossy());

    run_crawl(config.clone()).await.unwrap();
    run_crawl(config.clone()).await.unwrap();
    assert_eq!(
        read_csv(&csv_path),
        vec![vec!["name", "id", "collaborators"], vec!["One", "1/1", ""]]
    );

    config.output.write_mode = WriteMode::Append;
    run_crawl(config).await.unwrap();
    assert_eq!(
        read_csv(&csv_path),
        vec![
            vec!["name", "id", "collaborators"],
            vec!["One", "1/1", ""],
            vec!["One", "1/1", ""],
        ]
    );
}

#[tokio::test]
async fn test_unwritable_output_fails_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile("One", "1/1", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("missing").join("clients.csv");
    let config = create_test_config(&server, &["1/1"], &csv_path.to_string_lossy());

    assert!(run_crawl(config).await.is_err());
}

#[tokio::test]
async fn test_missing_pid_attribute_falls_back_to_url() {
    let server = MockServer::start().await;
    let body = r#"<dblpperson name="No Pid"><r><article><author pid="2/2"/></article></r></dblpperson>"#;
    mount_profile(&server, "1/1", body.to_string()).await;

    let mut config = create_test_config(&server, &["1/1"], "-");
    config.crawler.max_depth = 0;
    let outcome = crawl(config).await;

    assert_eq!(outcome.records, vec![row("No Pid", "1/1", &["2/2"])]);
}

#[tokio::test]
async fn test_redirect_off_allow_list_is_not_followed() {
    let server = MockServer::start().await;
    // Same server under a host name the allow-list does not cover
    let offsite = format!("http://localhost:{}/offsite.xml", server.address().port());
    Mock::given(method("GET"))
        .and(path("/pid/1/1.xml"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", offsite.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/offsite.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(profile("Offsite", "9/9", &[&["9/9", "8/8"]])),
        )
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pid/8/8.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile("Child", "8/8", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = crawl(create_test_config(&server, &["1/1"], "-")).await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url.as_str(), profile_link(&server, "1/1"));
    assert!(outcome.failures[0].error.contains("offsite.xml"));
    assert_eq!(outcome.stats.failed, 1);
}

#[tokio::test]
async fn test_redirect_within_allow_list_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pid/1/1.xml"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", profile_link(&server, "2/2").as_str()),
        )
        .mount(&server)
        .await;
    mount_profile(&server, "2/2", profile("Moved", "2/2", &[])).await;

    let mut config = create_test_config(&server, &["1/1"], "-");
    config.crawler.max_depth = 0;
    let outcome = crawl(config).await;

    assert_eq!(outcome.records, vec![row("Moved", "2/2", &[])]);
    assert!(outcome.failures.is_empty());
}
