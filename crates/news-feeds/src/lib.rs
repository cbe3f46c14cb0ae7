use cycle_core::CycleError;
use std::time::Duration;

pub mod google_rss;
pub mod newsapi;
pub mod pricing;

pub use google_rss::{GoogleNewsFeed, GoogleNewsRssClient, RssItem};
pub use newsapi::NewsApiClient;
pub use pricing::{GoogleNewsPricingScraper, HEADLINES_PER_QUERY};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; cycle-monitor/0.1)";

/// HTTP client shared by the feed backends: per-request timeout, no retry.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, CycleError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| CycleError::Provider(format!("Failed to build HTTP client: {}", e)))
}

pub(crate) fn request_error(source: &'static str) -> impl Fn(reqwest::Error) -> CycleError {
    move |e| CycleError::transport(source, e.is_timeout(), &e.to_string())
}

/// Remove markup from a feed description and decode the common entities.
pub fn strip_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
