use async_trait::async_trait;
use catalog_sync::config::Config;
use catalog_sync::output::{JsonFileWriter, MemoryWriter};
use catalog_sync::sync::{
    run_pipeline, run_sync, LinkProbe, Pipeline, ProbeMethod, VerificationError,
};
use catalog_sync::{CatalogDocument, FetchError, SyncError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output: &Path) -> Config {
    let mut config = Config::default();
    config.source.base_url = format!("{}/", base_url);
    config.output.path = output.to_string_lossy().into_owned();
    config.http.timeout_secs = 5;
    config.http.connect_timeout_secs = 2;
    config.verify.concurrency = 4;
    config
}

/// Mounts the source page at `/`
async fn mount_page(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", body))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_head(server: &MockServer, file: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(file))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn sync_to_memory(config: &Config) -> Result<CatalogDocument, SyncError> {
    let writer = MemoryWriter::new();
    let document = run_sync(config, &writer).await?;
    assert_eq!(writer.last().as_ref(), Some(&document));
    Ok(document)
}

#[tokio::test]
async fn test_tool_and_certificate_scenario() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        r#"<a href="app.ipa">KSign</a> <a href="cert.pem">Root CA</a>"#,
    )
    .await;
    mount_head(&mock_server, "/app.ipa", 200).await;

    let config = create_test_config(&base_url, &dir.path().join("statuses.json"));
    let document = sync_to_memory(&config).await.expect("sync failed");

    assert_eq!(document.tools.len(), 1);
    let tool = &document.tools[0];
    assert_eq!(tool.id, "ksign");
    assert_eq!(tool.name, "KSign");
    assert_eq!(tool.url, format!("{}/app.ipa", base_url));
    assert_eq!(tool.status, Some(true));

    assert_eq!(document.certificates.len(), 1);
    let cert = &document.certificates[0];
    assert_eq!(cert.id, "cert-1");
    assert_eq!(cert.name, "Certificate");
    assert_eq!(cert.url, format!("{}/cert.pem", base_url));
    assert_eq!(cert.status, None);
}

#[tokio::test]
async fn test_direct_binary_preferred_over_docs_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        r#"
        <p>Read the <a href="docs/ksign">KSign guide</a> first.</p>
        <a href="x.ipa">KSign</a>
        "#,
    )
    .await;
    mount_head(&mock_server, "/x.ipa", 200).await;

    let config = create_test_config(&base_url, &dir.path().join("statuses.json"));
    let document = sync_to_memory(&config).await.expect("sync failed");

    assert_eq!(document.tools.len(), 1);
    assert_eq!(document.tools[0].id, "ksign");
    assert_eq!(document.tools[0].url, format!("{}/x.ipa", base_url));
    assert!(document.certificates.is_empty());
}

#[tokio::test]
async fn test_same_href_kept_once_in_first_category() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        r#"
        <a href="get?file=1">Certificate bundle</a>
        <a href="get?file=1">KSign</a>
        "#,
    )
    .await;

    let config = create_test_config(&base_url, &dir.path().join("statuses.json"));
    let document = sync_to_memory(&config).await.expect("sync failed");

    assert!(document.tools.is_empty());
    assert_eq!(document.certificates.len(), 1);
    assert_eq!(
        document.certificates[0].url,
        format!("{}/get?file=1", base_url)
    );
}

#[tokio::test]
async fn test_fetch_failure_leaves_previous_document() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("statuses.json");
    std::fs::write(&output, "previous").unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    // Verification must never start after a failed fetch
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &output);
    let writer = JsonFileWriter::new(&output, true);
    let result = run_sync(&config, &writer).await;

    assert!(matches!(
        result,
        Err(SyncError::Fetch(FetchError::Status { status: 500, .. }))
    ));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
}

#[tokio::test]
async fn test_unreachable_source_is_fetch_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("statuses.json");

    let config = create_test_config("http://127.0.0.1:9", &output);
    let writer = JsonFileWriter::new(&output, true);
    let result = run_sync(&config, &writer).await;

    assert!(matches!(result, Err(SyncError::Fetch(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_head_failure_falls_back_to_get() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        r#"
        <a href="ksign.ipa">KSign</a>
        <a href="esign.ipa">eSign</a>
        <a href="missing.ipa">Scarlet IPA</a>
        "#,
    )
    .await;
    mount_head(&mock_server, "/ksign.ipa", 200).await;
    mount_head(&mock_server, "/esign.ipa", 405).await;
    Mock::given(method("GET"))
        .and(path("/esign.ipa"))
        .respond_with(ResponseTemplate::new(200).set_body_string("binary"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir.path().join("statuses.json"));
    let document = sync_to_memory(&config).await.expect("sync failed");

    let statuses: Vec<_> = document
        .tools
        .iter()
        .map(|t| (t.id.as_str(), t.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("ksign", Some(true)),
            ("esign", Some(true)),
            ("app-1", Some(false)),
        ]
    );
    assert_eq!(document.tools[2].name, "Scarlet IPA");
}

#[tokio::test]
async fn test_document_invariants_on_noisy_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        r#"
        <nav><a href="/">Home</a><a href="mailto:me@example.com">Mail</a></nav>
        <a href="ksign.ipa">KSign</a>
        <a href="ksign.ipa">KSign mirror</a>
        <a href="ksign-bmw.ipa">KSign BMW</a>
        <a href="esign.ipa">eSign</a>
        <a href="esign-vnj.ipa">eSign VNJ</a>
        <a href="raw/release/ESign.ipa">eSign</a>
        <a href="a.ipa">Unknown one</a>
        <a href="b.ipa">Unknown two</a>
        <a href="b.ipa">Unknown two again</a>
        <a href="a.pem">Cert A</a>
        <a href="a.pem">Cert A</a>
        <a href="b.p12">Cert B
        <a href="block.mobileconfig">DNS</a>
        <div><a href="http://[broken">broken</a></div>
        "#,
    )
    .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir.path().join("statuses.json"));
    let document = sync_to_memory(&config).await.expect("sync failed");

    document.check_invariants().expect("invariants violated");

    let tool_ids: Vec<_> = document.tools.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        tool_ids,
        vec!["ksign", "ksign-bmw", "esign-vnj", "esign", "app-1", "app-2"]
    );
    // The raw release link outranks the plain one for eSign
    let esign = document.tools.iter().find(|t| t.id == "esign").unwrap();
    assert!(esign.url.ends_with("/raw/release/ESign.ipa"));

    let cert_ids: Vec<_> = document
        .certificates
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(cert_ids, vec!["cert-1", "cert-2", "dns-1"]);
}

#[tokio::test]
async fn test_json_file_written() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data").join("statuses.json");

    mount_page(
        &mock_server,
        r#"<a href="app.ipa">KSign</a><a href="cert.pem">Root CA</a>"#,
    )
    .await;
    mount_head(&mock_server, "/app.ipa", 200).await;

    let config = create_test_config(&base_url, &output);
    let pipeline = Pipeline::new(&config).unwrap();
    let writer = JsonFileWriter::new(&output, config.output.pretty);
    let document = run_pipeline(&pipeline, &writer).await.unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(value["tools"][0]["id"], "ksign");
    assert_eq!(value["tools"][0]["status"], true);
    assert_eq!(
        value["tools"][0]["description"],
        "Automatically found on 127.0.0.1"
    );
    assert!(value["certificates"][0].get("status").is_none());

    let parsed: CatalogDocument = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, document);
}

#[tokio::test]
async fn test_redirect_to_live_file_is_reachable() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, r#"<a href="latest.ipa">KSign</a>"#).await;
    Mock::given(method("HEAD"))
        .and(path("/latest.ipa"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/files/ksign-5.ipa"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/files/ksign-5.ipa"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir.path().join("statuses.json"));
    let document = sync_to_memory(&config).await.expect("sync failed");

    assert_eq!(document.tools.len(), 1);
    assert_eq!(document.tools[0].status, Some(true));
    // The entry keeps the link found on the page, not the redirect target
    assert_eq!(document.tools[0].url, format!("{}/latest.ipa", base_url));
}

#[tokio::test]
async fn test_redirect_to_missing_file_is_unreachable() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, r#"<a href="latest.ipa">KSign</a>"#).await;
    // Both HEAD and the GET fallback end on a 404
    Mock::given(path("/latest.ipa"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/gone.ipa"))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(path("/gone.ipa"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &dir.path().join("statuses.json"));
    let document = sync_to_memory(&config).await.expect("sync failed");

    assert_eq!(document.tools.len(), 1);
    assert_eq!(document.tools[0].status, Some(false));
}

#[tokio::test]
async fn test_slow_link_times_out_without_failing_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        r#"<a href="slow.ipa">KSign</a><a href="fast.ipa">eSign</a>"#,
    )
    .await;
    Mock::given(path("/slow.ipa"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;
    mount_head(&mock_server, "/fast.ipa", 200).await;

    let mut config = create_test_config(&mock_server.uri(), &dir.path().join("statuses.json"));
    config.http.timeout_secs = 1;

    let start = Instant::now();
    let document = sync_to_memory(&config).await.expect("sync failed");

    let statuses: Vec<_> = document
        .tools
        .iter()
        .map(|t| (t.id.as_str(), t.status))
        .collect();
    assert_eq!(statuses, vec![("ksign", Some(false)), ("esign", Some(true))]);
    // HEAD and GET each give up after the one-second timeout
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_slow_source_page_is_fetch_timeout() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("statuses.json");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="app.ipa">KSign</a>"#)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &output);
    config.http.timeout_secs = 1;
    let writer = JsonFileWriter::new(&output, true);
    let result = run_sync(&config, &writer).await;

    assert!(matches!(
        result,
        Err(SyncError::Fetch(FetchError::Timeout { .. }))
    ));
    assert!(!output.exists());
}

/// Probe that records every URL it is asked about and reports all as live
#[derive(Default)]
struct RecordingProbe {
    seen: Mutex<Vec<(String, ProbeMethod)>>,
}

#[async_trait]
impl LinkProbe for RecordingProbe {
    async fn probe(&self, url: &Url, method: ProbeMethod) -> Result<(), VerificationError> {
        self.seen.lock().unwrap().push((url.path().to_string(), method));
        Ok(())
    }
}

#[tokio::test]
async fn test_only_selected_tools_are_verified() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("statuses.json");

    mount_page(
        &mock_server,
        r#"
        <a href="docs/ksign">KSign guide</a>
        <a href="ksign.ipa">KSign</a>
        <a href="root.pem">Root CA</a>
        <a href="block.mobileconfig">DNS</a>
        "#,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &output);
    let probe = Arc::new(RecordingProbe::default());
    let pipeline = Pipeline::new(&config)
        .unwrap()
        .with_probe(Arc::clone(&probe) as Arc<dyn LinkProbe>);
    let writer = MemoryWriter::new();
    let document = run_pipeline(&pipeline, &writer).await.unwrap();

    let seen = probe.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("/ksign.ipa".to_string(), ProbeMethod::Head)]);
    assert_eq!(document.tools[0].status, Some(true));
    assert_eq!(document.certificates.len(), 2);
}
