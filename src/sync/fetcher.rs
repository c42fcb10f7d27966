//! HTTP fetcher for the source page
//!
//! This module handles:
//! - Building the HTTP client shared by the fetcher and the verifier
//! - Fetching the source page body
//! - Mapping transport failures onto `FetchError`
//!
//! There are no retries here: if the source page cannot be fetched the whole
//! run is aborted.

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed by any request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_sync::config::HttpConfig;
/// use catalog_sync::sync::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the source page and returns its body
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Request timed out | `FetchError::Timeout` |
/// | Connection/DNS/TLS failure | `FetchError::Network` |
/// | Non-2xx final status | `FetchError::Status` |
/// | Body could not be read | `FetchError::Body` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, FetchError> {
    tracing::debug!("Fetching source page {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
