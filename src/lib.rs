//! Facetfeed Library
//!
//! A facet-driven listings scraper: configure search filters in a live
//! browser session, resolve designer names through the site's autocomplete,
//! grow the results feed until it converges, and capture the rendered markup.
//!
//! # Module Overview
//!
//! - [`registry`] - Selector registry mapping facet names to page targets
//! - [`automation`] - The browser capability trait the pipeline consumes
//! - [`browser`] - Live Chromium (CDP) backend
//! - [`filter`] - Accumulated declarative filter model
//! - [`facets`] - Facet actuators (query, categories, price, sort, markets)
//! - [`designer`] - Designer autocomplete resolution
//! - [`loader`] - Convergence-based incremental feed loader
//! - [`capture`] - Feed markup capture and artifact persistence
//! - [`harvest`] - End-to-end pipeline orchestration
//! - [`config`] - Runtime configuration (TOML file support)
//!
//! # Example
//!
//! ```no_run
//! use facetfeed_lib::{run_harvest, CdpAutomation, Config, ScrapeRequest, SelectorRegistry};
//!
//! # async fn example() -> facetfeed_lib::Result<()> {
//! let config = Config::default();
//! let registry = SelectorRegistry::builtin();
//! let session = CdpAutomation::launch(&config.browser).await?;
//!
//! let request = ScrapeRequest {
//!     query: Some("raw denim".to_string()),
//!     designers: vec!["stone island".to_string()],
//!     ..ScrapeRequest::default()
//! };
//! let outcome = run_harvest(&session, &registry, &request, &config, None).await?;
//! println!("scraped {} items", outcome.total_items());
//!
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod automation;
pub mod browser;
pub mod capture;
pub mod config;
pub mod designer;
pub mod diagnostics;
pub mod error;
pub mod facets;
pub mod filter;
pub mod harvest;
pub mod loader;
pub mod registry;
pub mod viewport;

pub use automation::{Automation, TypeOptions};
pub use browser::CdpAutomation;
pub use capture::{capture_feed, write_feed, write_filter, DEFAULT_FEED_PATH, FILTER_PATH};
pub use config::{BrowserSettings, Config, SettleTimes};
pub use designer::{resolve_designers, ResolvedDesigner};
pub use diagnostics::{flatten_paths, ProgressFn};
pub use error::{FeedError, Result};
pub use facets::{CategorySpec, FacetPipeline};
pub use filter::{FilterConfig, FilterModel, FilterUpdate, PriceRange};
pub use harvest::{run_harvest, ScrapeOutcome, ScrapeRequest};
pub use loader::{LoaderOutcome, LoaderReport, STALL_LIMIT};
pub use registry::{
    CategoryDomain, CategoryEntry, MarketEntry, RegistryCoverage, SelectorRegistry, Target,
};
pub use viewport::Viewport;
