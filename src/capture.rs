//! Feed capture and artifact persistence. The feed markup is an opaque
//! payload; no transformation happens here.

use std::path::Path;

use crate::automation::Automation;
use crate::error::Result;
use crate::filter::FilterConfig;
use crate::registry::SelectorRegistry;

/// Default path for the captured feed markup.
pub const DEFAULT_FEED_PATH: &str = "feed.html";
/// Fixed path for the serialized filter configuration.
pub const FILTER_PATH: &str = "filter.json";

/// Read the rendered feed container's markup.
pub async fn capture_feed<A: Automation + ?Sized>(
    automation: &A,
    registry: &SelectorRegistry,
) -> Result<String> {
    automation.get_html(registry.feed_container()).await
}

/// Write captured feed markup as raw text.
pub fn write_feed(path: &Path, html: &str) -> Result<()> {
    std::fs::write(path, html)?;
    Ok(())
}

/// Persist the accumulated filter configuration as indented JSON.
pub fn write_filter(path: &Path, filter: &FilterConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(filter)?;
    std::fs::write(path, json)?;
    Ok(())
}
