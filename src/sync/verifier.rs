//! Reachability verification for selected links
//!
//! Each URL goes through a two-step check:
//!
//! ```text
//! Untried --HEAD ok--> Reachable
//!    |
//!    +--HEAD failed--> Probed --GET ok--> Reachable
//!                         |
//!                         +--GET failed--> Unreachable
//! ```
//!
//! A fixed number of workers pull indices from a shared cursor. Every worker
//! returns the `(index, reachable)` pairs it produced and the coordinator
//! writes them into a pre-sized result vector, so results come back in input
//! order without sorting and without locks.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Why a single probe failed
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// HTTP method used by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    /// Lightweight first attempt
    Head,

    /// Fallback when the lightweight attempt fails
    Get,
}

/// Per-URL verification state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Untried,
    Probed,
    Reachable,
    Unreachable,
}

/// Performs a single liveness request
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn probe(&self, url: &Url, method: ProbeMethod) -> Result<(), VerificationError>;
}

/// Probe backed by a reqwest client
///
/// Any final status in 2xx or 3xx counts as reachable. The response is
/// dropped without reading the body.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn probe(&self, url: &Url, method: ProbeMethod) -> Result<(), VerificationError> {
        let request = match method {
            ProbeMethod::Head => self.client.head(url.clone()),
            ProbeMethod::Get => self.client.get(url.clone()),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                VerificationError::Timeout
            } else {
                VerificationError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(VerificationError::Status(status.as_u16()))
        }
    }
}

/// Runs the per-URL state machine to completion
pub async fn check_reachable<P>(probe: &P, url: &Url) -> bool
where
    P: LinkProbe + ?Sized,
{
    let mut state = ProbeState::Untried;

    loop {
        state = match state {
            ProbeState::Untried => match probe.probe(url, ProbeMethod::Head).await {
                Ok(()) => ProbeState::Reachable,
                Err(e) => {
                    tracing::debug!("HEAD {} failed ({}), falling back to GET", url, e);
                    ProbeState::Probed
                }
            },
            ProbeState::Probed => match probe.probe(url, ProbeMethod::Get).await {
                Ok(()) => ProbeState::Reachable,
                Err(e) => {
                    tracing::debug!("GET {} failed ({}), marking unreachable", url, e);
                    ProbeState::Unreachable
                }
            },
            ProbeState::Reachable => return true,
            ProbeState::Unreachable => return false,
        };
    }
}

/// Shared work queue: a fixed list of URLs and a cursor into it
struct WorkQueue {
    urls: Vec<Url>,
    next: AtomicUsize,
}

impl WorkQueue {
    fn new(urls: Vec<Url>) -> Self {
        Self {
            urls,
            next: AtomicUsize::new(0),
        }
    }

    /// Claims the next unprocessed URL
    fn claim(&self) -> Option<(usize, &Url)> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        self.urls.get(index).map(|url| (index, url))
    }
}

/// Verifies every URL with at most `limit` checks in flight
///
/// Returns one result per input URL, in input order. A failing URL only
/// affects its own result; a worker that panics leaves its unfinished URLs
/// marked unreachable.
pub async fn verify_all<P>(probe: Arc<P>, urls: Vec<Url>, limit: usize) -> Vec<bool>
where
    P: LinkProbe + ?Sized + 'static,
{
    let mut results = vec![false; urls.len()];
    if urls.is_empty() {
        return results;
    }

    let queue = Arc::new(WorkQueue::new(urls));
    let workers = limit.max(1).min(queue.urls.len());
    tracing::debug!(
        "Verifying {} links with {} workers",
        queue.urls.len(),
        workers
    );

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let probe = Arc::clone(&probe);
        let queue = Arc::clone(&queue);

        handles.push(tokio::spawn(async move {
            let mut finished = Vec::new();
            while let Some((index, url)) = queue.claim() {
                let reachable = check_reachable(probe.as_ref(), url).await;
                tracing::trace!("Worker {} checked {}: {}", worker_id, url, reachable);
                finished.push((index, reachable));
            }
            finished
        }));
    }

    for handle in handles {
        match handle.await {
            Ok(finished) => {
                for (index, reachable) in finished {
                    results[index] = reachable;
                }
            }
            Err(e) => tracing::warn!("Verification worker failed: {}", e),
        }
    }

    results
}
