//! End-to-end pipeline: configure every requested facet on a settled page,
//! resolve designers, derive the target count, run the loader to
//! convergence, and capture the feed.
//!
//! Generic over [`Automation`], so the whole control flow is exercisable
//! against the scripted mock.

use crate::automation::Automation;
use crate::capture;
use crate::config::Config;
use crate::designer::{resolve_designers, ResolvedDesigner};
use crate::diagnostics::{report, ProgressFn};
use crate::error::Result;
use crate::facets::{CategorySpec, FacetPipeline};
use crate::filter::{FilterConfig, FilterModel};
use crate::loader::{self, LoaderOutcome, LoaderReport};
use crate::registry::{CategoryDomain, SelectorRegistry};

/// Everything the user asked for, before actuation.
#[derive(Debug, Clone, Default)]
pub struct ScrapeRequest {
    pub query: Option<String>,
    pub categories: Vec<CategorySpec>,
    pub sizes: Vec<CategorySpec>,
    pub locations: Vec<String>,
    pub markets: Vec<String>,
    pub designers: Vec<String>,
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    pub sort: Option<String>,
    /// Explicit target item count; 0 or absent means derive/unbounded.
    pub num_items: Option<u64>,
}

/// The completed run: the accumulated filter, designer resolutions, the
/// loader's verdict (`None` when the feed was empty and never scrolled),
/// and the captured markup.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub filter: FilterConfig,
    pub resolved_designers: Vec<ResolvedDesigner>,
    pub target_items: u64,
    pub loader: Option<LoaderReport>,
    pub feed_html: String,
}

impl ScrapeOutcome {
    /// True when a bounded target was requested and met.
    pub fn target_met(&self) -> bool {
        matches!(
            self.loader,
            Some(LoaderReport {
                outcome: LoaderOutcome::TargetMet,
                ..
            })
        )
    }

    pub fn total_items(&self) -> u64 {
        self.loader.map(|r| r.final_count).unwrap_or(0)
    }
}

/// Run the full pipeline against an already-launched automation session.
/// Facet actuation order is fixed and significant: query, categories,
/// sizes, locations, price, sort, markets, designers, target estimation,
/// then the loader and capture.
pub async fn run_harvest<A: Automation + ?Sized>(
    automation: &A,
    registry: &SelectorRegistry,
    request: &ScrapeRequest,
    config: &Config,
    progress: Option<ProgressFn>,
) -> Result<ScrapeOutcome> {
    automation.navigate(&config.start_url).await?;

    let mut filter = FilterModel::new();
    {
        let mut pipeline = FacetPipeline::new(
            automation,
            registry,
            &mut filter,
            config.settle,
            progress.clone(),
        );
        if let Some(query) = &request.query {
            pipeline.apply_query(query).await;
        }
        pipeline
            .apply_categorical(CategoryDomain::Categories, &request.categories)
            .await;
        pipeline
            .apply_categorical(CategoryDomain::Sizes, &request.sizes)
            .await;
        pipeline.apply_locations(&request.locations).await;
        pipeline.apply_price(request.price_min, request.price_max).await;
        if let Some(sort) = &request.sort {
            pipeline.apply_sort(sort).await;
        }
        pipeline.apply_markets(&request.markets).await;
    }

    let resolved_designers = resolve_designers(
        automation,
        registry,
        &mut filter,
        &request.designers,
        &config.settle,
        &progress,
    )
    .await;

    let target_items = {
        let mut pipeline = FacetPipeline::new(
            automation,
            registry,
            &mut filter,
            config.settle,
            progress.clone(),
        );
        pipeline
            .estimate_target_items(
                request.num_items,
                !request.designers.is_empty(),
                &request.markets,
            )
            .await
    };

    // Degenerate case: an over-constrained filter can yield zero results.
    // Scrolling is pointless then; the container is still captured below.
    let initial_count = automation.evaluate_count(registry.feed_item_query()).await?;
    let loader_report = if initial_count == 0 {
        report(&progress, "empty feed");
        None
    } else {
        Some(
            loader::run(
                automation,
                registry.feed_item_query(),
                target_items,
                &config.settle,
                config.stall_limit,
                &progress,
            )
            .await?,
        )
    };

    let feed_html = capture::capture_feed(automation, registry).await?;

    Ok(ScrapeOutcome {
        filter: filter.into_config(),
        resolved_designers,
        target_items,
        loader: loader_report,
        feed_html,
    })
}
