//! Synchronization pipeline - orchestrates one catalog run
//!
//! The pipeline threads values through its stages:
//! 1. Fetch the source page
//! 2. Extract and classify links
//! 3. Group application links and select one per tool
//! 4. Verify the selected links concurrently
//! 5. Deduplicate and assemble the catalog document
//!
//! A fetch failure aborts the run before any verification starts.

use crate::catalog::{
    classifier_from_config, selector_from_config, Assembler, CatalogDocument, ClassifiedLink,
    Classifier, LinkCategory, Selector, VerifiedTool,
};
use crate::config::Config;
use crate::output::CatalogWriter;
use crate::sync::extractor::{extract_links, parse_document};
use crate::sync::fetcher::{build_http_client, fetch_page};
use crate::sync::verifier::{verify_all, HttpProbe, LinkProbe};
use crate::{ConfigError, SyncError};
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Main pipeline structure
pub struct Pipeline {
    base_url: Url,
    client: Client,
    probe: Arc<dyn LinkProbe>,
    classifier: Classifier,
    selector: Selector,
    assembler: Assembler,
    concurrency: usize,
}

impl Pipeline {
    /// Creates a pipeline from a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Ready to run
    /// * `Err(SyncError)` - Invalid base URL or HTTP client failure
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        let base_url = Url::parse(&config.source.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.source.base_url, e))
        })?;

        let client = build_http_client(&config.http)?;
        let probe: Arc<dyn LinkProbe> = Arc::new(HttpProbe::new(client.clone()));
        let host = base_url.host_str().unwrap_or_default().to_string();

        Ok(Self {
            client,
            probe,
            classifier: classifier_from_config(config),
            selector: selector_from_config(config),
            assembler: Assembler::new(config.descriptions.clone(), host),
            concurrency: config.verify.concurrency,
            base_url,
        })
    }

    /// Replaces the reachability probe
    pub fn with_probe(mut self, probe: Arc<dyn LinkProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Runs the pipeline and returns the assembled document
    pub async fn run(&self) -> Result<CatalogDocument, SyncError> {
        let start_time = Instant::now();
        tracing::info!("Synchronizing catalog from {}", self.base_url);

        let html = fetch_page(&self.client, &self.base_url).await?;
        tracing::debug!("Fetched {} bytes", html.len());

        let links = self.discover(&html);
        let (applications, certificates): (Vec<_>, Vec<_>) = links
            .into_iter()
            .partition(|link| link.category == LinkCategory::Application);
        tracing::info!(
            "Classified {} application links and {} certificate/profile links",
            applications.len(),
            certificates.len()
        );

        let selected = self.selector.select_all(applications);
        let urls: Vec<Url> = selected.iter().map(|tool| tool.link.url().clone()).collect();
        let statuses = verify_all(Arc::clone(&self.probe), urls, self.concurrency).await;

        let verified: Vec<VerifiedTool> = selected
            .into_iter()
            .zip(statuses)
            .map(|(tool, reachable)| VerifiedTool { tool, reachable })
            .collect();

        let document = self.assembler.assemble(verified, certificates)?;

        tracing::info!(
            "Assembled {} tools and {} certificates in {:?}",
            document.tools.len(),
            document.certificates.len(),
            start_time.elapsed()
        );

        Ok(document)
    }

    /// Extracts and classifies every link of the page, in discovery order
    fn discover(&self, html: &str) -> Vec<ClassifiedLink> {
        let document = parse_document(html);
        extract_links(&document, &self.base_url)
            .filter_map(|link| {
                let classified = self.classifier.classify_link(link);
                if let Some(link) = &classified {
                    tracing::trace!("{} -> {}", link.url(), link.category);
                }
                classified
            })
            .collect()
    }
}

/// Runs one synchronization and hands the document to `writer`
///
/// Nothing is written when any stage fails, so a previously published
/// document stays in place.
pub async fn run_sync(
    config: &Config,
    writer: &dyn CatalogWriter,
) -> Result<CatalogDocument, SyncError> {
    let pipeline = Pipeline::new(config)?;
    run_pipeline(&pipeline, writer).await
}

/// Runs an already-built pipeline and writes its document
pub async fn run_pipeline(
    pipeline: &Pipeline,
    writer: &dyn CatalogWriter,
) -> Result<CatalogDocument, SyncError> {
    let document = pipeline.run().await?;
    writer.write(&document)?;
    tracing::info!(
        "tools: {}, certificates: {}",
        document.tools.len(),
        document.certificates.len()
    );
    Ok(document)
}
