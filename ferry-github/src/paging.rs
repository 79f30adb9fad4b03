//! Page bodies, continuation links and progress reporting

use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// Body of one list page
///
/// Most endpoints return a bare array and put the continuation in the
/// `link` header. Some wrap the array in an object that carries its own
/// continuation pointer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListBody {
    RawList(Vec<Value>),
    PagedList {
        #[serde(alias = "Items")]
        items: Vec<Value>,
        #[serde(default, alias = "NextPageLink")]
        next: Option<String>,
    },
}

impl ListBody {
    /// Decode a page body. An empty body is an empty page.
    pub fn parse(body: &str) -> serde_json::Result<Self> {
        if body.trim().is_empty() {
            return Ok(ListBody::RawList(Vec::new()));
        }
        serde_json::from_str(body)
    }

    /// Split into items and the body-level continuation, if any
    pub fn into_parts(self) -> (Vec<Value>, Option<String>) {
        match self {
            ListBody::RawList(items) => (items, None),
            ListBody::PagedList { items, next } => (items, next.filter(|n| !n.is_empty())),
        }
    }
}

/// Options for one paginated fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Stop once this many items have been collected and return exactly
    /// this many
    pub max_items: Option<usize>,
}

impl FetchOptions {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn at_most(max_items: usize) -> Self {
        Self {
            max_items: Some(max_items),
        }
    }
}

/// Receives a notice after every page
pub trait ProgressSink: Send + Sync {
    /// `first` and `last` are 1-based positions of the page's items in the
    /// accumulated result
    fn page(&self, url: &str, first: usize, last: usize);
}

/// Reports pages through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn page(&self, url: &str, first: usize, last: usize) {
        info!(url, "Retrieved items {} to {}.", first, last);
    }
}

/// Discards page notices
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn page(&self, _url: &str, _first: usize, _last: usize) {}
}

/// The `rel="next"` target of an RFC 5988 `link` header
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LINK)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_next_link)
}

/// Parse `<url>; rel="next", <url>; rel="last"` and return the next URL.
///
/// URLs are delimited by angle brackets rather than split on commas, since
/// query strings may contain commas.
pub fn parse_next_link(value: &str) -> Option<String> {
    let mut rest = value;
    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let close = after_open.find('>')?;
        let url = &after_open[..close];
        let params_and_rest = &after_open[close + 1..];
        let params_end = params_and_rest.find('<').unwrap_or(params_and_rest.len());
        let params = &params_and_rest[..params_end];

        if params.split(';').any(is_rel_next) {
            return Some(url.to_string());
        }
        rest = &params_and_rest[params_end..];
    }
    None
}

fn is_rel_next(param: &str) -> bool {
    let param = param.trim().trim_end_matches(',').trim();
    let Some((key, value)) = param.split_once('=') else {
        return false;
    };
    key.trim().eq_ignore_ascii_case("rel")
        && value
            .trim()
            .trim_matches('"')
            .split_whitespace()
            .any(|rel| rel.eq_ignore_ascii_case("next"))
}
