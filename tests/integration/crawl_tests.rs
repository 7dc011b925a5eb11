//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small fixture catalog and run the
//! full crawl cycle end-to-end against it.

use catalog_harvest::config::{
    Config, CrawlerConfig, FetchStrategy, OutputConfig, ServerConfig, UserAgentConfig,
};
use catalog_harvest::crawler::{Coordinator, StopReason};
use catalog_harvest::sink::JsonlStore;
use catalog_harvest::state::UrlState;
use catalog_harvest::url::canonicalize_str;
use std::fs;
use tempfile::TempDir;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at `seed` writing into `dir`
fn create_test_config(seed: &str, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed_url: seed.to_string(),
            allowed_domains: vec![],
            request_timeout_secs: 5,
            politeness_delay_ms: 0,
            max_new_records: None,
            fetch_strategy: FetchStrategy::Static,
            expected_minimum_records: None,
            max_full_text_chars: 20_000,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            records_path: dir.path().join("raw.jsonl").display().to_string(),
            archive_dir: dir.path().join("pages").display().to_string(),
            database_path: dir.path().join("catalog.db").display().to_string(),
            summary_path: dir.path().join("summary.md").display().to_string(),
        },
        server: ServerConfig::default(),
    }
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

fn product_page(name: &str, description: &str) -> String {
    format!(
        r#"<html><head><title>{name} | Catalog</title>
        <meta name="description" content="{description}">
        <script>track("{name}")</script></head>
        <body>
        <nav aria-label="Breadcrumb"><a href="/catalog/">Catalog</a><a href="/catalog/">Individual Tests</a></nav>
        <h1 onclick="highlight()">{name}</h1>
        <p>{description}</p>
        <div><span>Test Type: Knowledge &amp; Skills</span></div>
        </body></html>"#
    )
}

/// Mounts the fixture catalog: two listing pages, two products, one bundle
/// that must be rejected, and a link to a foreign origin
async fn mount_catalog(server: &MockServer, foreign: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(html_page(&format!(
            r#"<html><body>
            <a href="/solutions/java-8">Java 8</a>
            <a href="/solutions/sales-bundle#details">Sales bundle</a>
            <a href="/catalog/page/2">Next</a>
            <a href="{}/solutions/elsewhere">Partner</a>
            <a href="mailto:sales@example.com">Contact</a>
            </body></html>"#,
            foreign.uri()
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/catalog/page/2"))
        .respond_with(html_page(
            r#"<html><body>
            <a href="/solutions/python/">Python</a>
            <a href="/solutions/java-8/">Java 8 again</a>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/solutions/java-8"))
        .respond_with(html_page(&product_page(
            "Java 8",
            "Multi-choice test of Java 8 programming knowledge.",
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/solutions/python"))
        .respond_with(html_page(&product_page(
            "Python (New)",
            "Measures Python scripting skills.",
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/solutions/sales-bundle"))
        .respond_with(html_page(&product_page(
            "Pre-Packaged Job Solution: Sales",
            "A bundle of sales assessments.",
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("should never be fetched"))
        .expect(0)
        .mount(foreign)
        .await;
}

#[tokio::test]
async fn test_full_crawl_extracts_products() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_catalog(&server, &foreign).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/catalog/", server.uri()), &dir);
    let (_tx, rx) = watch::channel(false);

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run(rx).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(report.counts.new_records, 2);
    assert_eq!(report.counts.rejected, 1);
    assert_eq!(report.counts.failed, 0);
    assert_eq!(report.total_records, 2);

    let records = JsonlStore::new(dir.path().join("raw.jsonl")).read_all().unwrap();
    let urls: Vec<String> = records.iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/solutions/java-8", server.uri()),
            format!("{}/solutions/python", server.uri()),
        ]
    );

    let java = &records[0];
    assert_eq!(java.name, "Java 8");
    assert_eq!(java.category, "Catalog > Individual Tests");
    assert_eq!(
        java.short_description,
        "Multi-choice test of Java 8 programming knowledge."
    );
    assert_eq!(java.test_type_hint, "Test Type: Knowledge & Skills");
    assert!(java.full_text.contains("Java 8 programming"));

    // Snapshots are sanitized before archiving
    let snapshot = fs::read_to_string(dir.path().join("pages").join("Java_8.html")).unwrap();
    assert!(!snapshot.contains("<script"));
    assert!(!snapshot.contains("onclick"));
    assert!(dir.path().join("pages").join("Python__New_.html").exists());
}

#[tokio::test]
async fn test_rejected_bundle_is_seen_but_not_stored() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_catalog(&server, &foreign).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/catalog/", server.uri()), &dir);
    let (_tx, rx) = watch::channel(false);

    let mut coordinator = Coordinator::new(config).unwrap();
    coordinator.run(rx).await.unwrap();

    let bundle = canonicalize_str(&format!("{}/solutions/sales-bundle", server.uri())).unwrap();
    assert!(coordinator.scheduler().frontier().is_seen(&bundle));

    let contents = fs::read_to_string(dir.path().join("raw.jsonl")).unwrap();
    assert!(!contents.contains("sales-bundle"));
    assert!(!contents.to_lowercase().contains("pre-packaged"));
}

#[tokio::test]
async fn test_second_run_adds_nothing() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_catalog(&server, &foreign).await;

    let dir = TempDir::new().unwrap();
    let seed = format!("{}/catalog/", server.uri());
    let records_path = dir.path().join("raw.jsonl");

    let (_tx, rx) = watch::channel(false);
    let first = Coordinator::new(create_test_config(&seed, &dir))
        .unwrap()
        .run(rx)
        .await
        .unwrap();
    assert_eq!(first.counts.new_records, 2);
    let after_first = fs::read_to_string(&records_path).unwrap();

    let (_tx, rx) = watch::channel(false);
    let mut coordinator = Coordinator::new(create_test_config(&seed, &dir)).unwrap();
    let second = coordinator.run(rx).await.unwrap();

    assert_eq!(second.counts.new_records, 0);
    assert_eq!(second.total_records, 2);
    assert_eq!(fs::read_to_string(&records_path).unwrap(), after_first);

    let java = canonicalize_str(&format!("{}/solutions/java-8/", server.uri())).unwrap();
    assert!(coordinator.scheduler().frontier().is_seen(&java));
}

#[tokio::test]
async fn test_record_cap_stops_crawl() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_catalog(&server, &foreign).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/catalog/", server.uri()), &dir);
    config.crawler.max_new_records = Some(1);
    config.crawler.expected_minimum_records = Some(3);
    let (_tx, rx) = watch::channel(false);

    let report = Coordinator::new(config).unwrap().run(rx).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::RecordCapReached);
    assert_eq!(report.counts.new_records, 1);
    assert_eq!(report.total_records, 1);
    assert!(report.below_expected());
}

#[tokio::test]
async fn test_failed_product_does_not_stop_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(html_page(
            r#"<a href="/solutions/gone">Gone</a><a href="/solutions/ok">Ok</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solutions/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/solutions/ok"))
        .respond_with(html_page(&product_page("Ok Test", "Works.")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/catalog", server.uri()), &dir);
    let (_tx, rx) = watch::channel(false);

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run(rx).await.unwrap();

    assert_eq!(report.counts.new_records, 1);
    assert_eq!(report.counts.failed, 1);

    let gone = canonicalize_str(&format!("{}/solutions/gone", server.uri())).unwrap();
    assert_eq!(coordinator.scheduler().state_of(&gone), UrlState::Failed);
    assert!(!coordinator.scheduler().frontier().is_seen(&gone));

    // Listing, failed product and accepted product all count against the origin
    let origin = url::Url::parse(&server.uri()).unwrap();
    assert_eq!(coordinator.scheduler().requests_to(&origin), 3);
}

#[tokio::test]
async fn test_deep_pagination_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(html_page(r#"<a href="/catalog?start=12&page=2">2</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalog/page/3"))
        .respond_with(html_page(r#"<a href="/products/deep-item">Deep</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/deep-item"))
        .respond_with(html_page(&product_page("Deep Item", "Found on page three.")))
        .mount(&server)
        .await;
    // Query-string pagination serves page 2 at the same path as the seed;
    // its links point at path-style page 3.
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(wiremock::matchers::query_param("page", "2"))
        .respond_with(html_page(r#"<a href="/catalog/page/3">3</a>"#))
        .with_priority(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/catalog", server.uri()), &dir);
    let (_tx, rx) = watch::channel(false);

    let report = Coordinator::new(config).unwrap().run(rx).await.unwrap();

    assert_eq!(report.counts.listing_pages, 4);
    assert_eq!(report.counts.new_records, 1);

    let records = JsonlStore::new(dir.path().join("raw.jsonl")).read_all().unwrap();
    assert_eq!(records[0].name, "Deep Item");
}
