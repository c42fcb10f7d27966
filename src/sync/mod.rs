//! Sync module: the networked side of a catalog run
//!
//! This module contains:
//! - Fetching the source page
//! - Lazy link extraction from the page markup
//! - Concurrency-bounded reachability verification
//! - The pipeline that drives a whole run

mod extractor;
mod fetcher;
mod pipeline;
mod verifier;

pub use extractor::{extract_links, parse_document, raw_links};
pub use fetcher::{build_http_client, fetch_page};
pub use pipeline::{run_pipeline, run_sync, Pipeline};
pub use verifier::{
    check_reachable, verify_all, HttpProbe, LinkProbe, ProbeMethod, ProbeState,
    VerificationError,
};
