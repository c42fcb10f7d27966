//! Link extraction from the source page markup
//!
//! Parsing is delegated to `scraper`, whose html5ever backend recovers from
//! malformed markup the way browsers do: unclosed anchors are closed, stray
//! tags are dropped, and nested inline tags become part of the anchor text.
//! Extraction itself is lazy: links are produced one at a time while the
//! caller walks the returned iterator.

use crate::catalog::{RawLink, ResolvedLink};
use scraper::{ElementRef, Html};
use url::Url;

/// Parses markup into a document; never fails
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Yields every `<a href>` of the document in document order
///
/// Anchors without an `href` attribute are skipped. Anchor text is the plain
/// text of all descendants with whitespace runs collapsed.
pub fn raw_links(document: &Html) -> impl Iterator<Item = RawLink> + '_ {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name().eq_ignore_ascii_case("a"))
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            Some(RawLink {
                href: href.to_string(),
                anchor_text: normalize_text(element.text()),
            })
        })
}

/// Yields resolved links in document order
///
/// Links that cannot be resolved to an absolute http(s) URL are dropped.
/// Positions count only the links that survive resolution.
pub fn extract_links<'a>(
    document: &'a Html,
    base_url: &'a Url,
) -> impl Iterator<Item = ResolvedLink> + 'a {
    raw_links(document)
        .filter_map(move |raw| {
            let url = resolve_link(&raw.href, base_url)?;
            let text = if raw.anchor_text.is_empty() {
                raw.href
            } else {
                raw.anchor_text
            };
            Some((url, text))
        })
        .enumerate()
        .map(|(position, (url, text))| ResolvedLink {
            url,
            text,
            position,
        })
}

/// Collapses whitespace runs in a sequence of text fragments
fn normalize_text<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    let joined: String = fragments.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(e) => {
            tracing::trace!("Dropping unresolvable link {:?}: {}", href, e);
            None
        }
    }
}
