use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{FeedError, Result};
use crate::Viewport;

/// Runtime configuration for a scraping session. Built from defaults, an
/// optional TOML file, and CLI overrides (see the binary's settings layer).
#[derive(Debug, Clone)]
pub struct Config {
    /// Start URL of the listings page.
    pub start_url: String,
    /// Consecutive no-growth loader iterations before giving up.
    pub stall_limit: u32,
    pub settle: SettleTimes,
    pub browser: BrowserSettings,
}

/// Settle-waits after page-mutating actions. The page reacts asynchronously
/// to clicks and keystrokes; the next step must observe settled state.
#[derive(Debug, Clone, Copy)]
pub struct SettleTimes {
    /// After a plain facet click (category panel, subcategory, location).
    pub after_click: Duration,
    /// After a market toggle or sort selection.
    pub after_toggle: Duration,
    /// Loader: after a scroll-to-bottom, before re-measuring the feed.
    pub after_load: Duration,
    /// Upper bound for the designer autocomplete to render a suggestion.
    pub suggestion: Duration,
    /// Between per-market advertised-total reads during target estimation.
    pub between_reads: Duration,
}

impl Default for SettleTimes {
    fn default() -> Self {
        Self {
            after_click: Duration::from_millis(200),
            after_toggle: Duration::from_millis(1000),
            after_load: Duration::from_millis(1000),
            suggestion: Duration::from_millis(3000),
            between_reads: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BrowserSettings {
    pub headless: bool,
    pub viewport: Viewport,
    pub navigation_timeout: Duration,
    pub launch_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            navigation_timeout: Duration::from_secs(30),
            launch_timeout: Duration::from_secs(20),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_url: "https://www.grailed.com/shop".to_string(),
            stall_limit: 15,
            settle: SettleTimes::default(),
            browser: BrowserSettings::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, or return defaults when no path is given.
    /// Absent keys keep their defaults; unknown keys are rejected.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FeedError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let file: FileConfig = toml::from_str(&raw).map_err(|e| {
            FeedError::config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        Ok(file.merge_into(Self::default()))
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.start_url)
            .map_err(|e| FeedError::config(format!("Invalid start URL {:?}: {}", self.start_url, e)))?;
        if self.stall_limit == 0 {
            return Err(FeedError::config("stall_limit must be at least 1"));
        }
        if self.settle.after_load.is_zero() {
            return Err(FeedError::config(
                "settle.after_load_ms must be positive; the feed loads asynchronously",
            ));
        }
        Ok(())
    }
}

/// On-disk TOML shape; durations are plain millisecond/second integers.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    start_url: Option<String>,
    stall_limit: Option<u32>,
    #[serde(default)]
    settle: FileSettle,
    #[serde(default)]
    browser: FileBrowser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettle {
    after_click_ms: Option<u64>,
    after_toggle_ms: Option<u64>,
    after_load_ms: Option<u64>,
    suggestion_ms: Option<u64>,
    between_reads_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileBrowser {
    headless: Option<bool>,
    viewport: Option<Viewport>,
    navigation_timeout_secs: Option<u64>,
    launch_timeout_secs: Option<u64>,
}

impl FileConfig {
    fn merge_into(self, mut config: Config) -> Config {
        if let Some(url) = self.start_url {
            config.start_url = url;
        }
        if let Some(limit) = self.stall_limit {
            config.stall_limit = limit;
        }
        let s = &mut config.settle;
        if let Some(ms) = self.settle.after_click_ms {
            s.after_click = Duration::from_millis(ms);
        }
        if let Some(ms) = self.settle.after_toggle_ms {
            s.after_toggle = Duration::from_millis(ms);
        }
        if let Some(ms) = self.settle.after_load_ms {
            s.after_load = Duration::from_millis(ms);
        }
        if let Some(ms) = self.settle.suggestion_ms {
            s.suggestion = Duration::from_millis(ms);
        }
        if let Some(ms) = self.settle.between_reads_ms {
            s.between_reads = Duration::from_millis(ms);
        }
        let b = &mut config.browser;
        if let Some(headless) = self.browser.headless {
            b.headless = headless;
        }
        if let Some(viewport) = self.browser.viewport {
            b.viewport = viewport;
        }
        if let Some(secs) = self.browser.navigation_timeout_secs {
            b.navigation_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.browser.launch_timeout_secs {
            b.launch_timeout = Duration::from_secs(secs);
        }
        config
    }
}
