use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use facetfeed_lib::{
    flatten_paths, run_harvest, write_feed, write_filter, CategorySpec, CdpAutomation, FeedError,
    LoaderOutcome, ProgressFn, ScrapeOutcome, ScrapeRequest, SelectorRegistry, Viewport,
    FILTER_PATH,
};

use crate::settings::{comma_list, load_config, resolve_scrape_settings, ScrapeFlagSources};

/// Run the scrape command.
#[allow(clippy::too_many_arguments)]
pub async fn run_scrape(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    verbose: bool,
    query: Option<String>,
    categories: Vec<CategorySpec>,
    sizes: Vec<CategorySpec>,
    locations: Option<String>,
    markets: Option<String>,
    designers: Option<String>,
    min: Option<u32>,
    max: Option<u32>,
    sort: Option<String>,
    num_items: Option<u64>,
    output: PathBuf,
    save_filter: bool,
    registry_path: Option<PathBuf>,
    base_url: Option<String>,
    headed: bool,
    viewport: Viewport,
    nav_timeout: u64,
    launch_timeout: u64,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => return fail(err),
    };
    let registry = match registry_path {
        Some(path) => match SelectorRegistry::from_path(&path) {
            Ok(registry) => registry,
            Err(err) => return fail(err),
        },
        None => SelectorRegistry::builtin(),
    };

    let flags = ScrapeFlagSources::from_args(raw_args);
    let config = resolve_scrape_settings(
        viewport,
        nav_timeout,
        launch_timeout,
        headed,
        base_url,
        config,
        &flags,
    );
    // CLI overrides (--base-url) go through the same validation as the file.
    if let Err(err) = config.validate() {
        return fail(err);
    }

    // All registry markets stay enabled unless an explicit subset is given.
    let markets = match markets.as_deref() {
        Some(list) => comma_list(Some(list)),
        None => registry
            .market_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let request = ScrapeRequest {
        query,
        categories,
        sizes,
        locations: comma_list(locations.as_deref()),
        markets,
        designers: comma_list(designers.as_deref()),
        price_min: min,
        price_max: max,
        sort,
        num_items,
    };

    let progress: ProgressFn = Arc::new(|message: &str| eprintln!("{}", message));

    if verbose {
        eprintln!("Launching browser ({})", config.start_url);
    }
    let session = match CdpAutomation::launch(&config.browser).await {
        Ok(session) => session,
        Err(err) => return fail(err),
    };

    let outcome = match run_harvest(&session, &registry, &request, &config, Some(progress)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let _ = session.close().await;
            return fail(err);
        }
    };

    if let Err(err) = session.close().await {
        eprintln!("warning: {}", err);
    }

    if let Err(err) = write_feed(&output, &outcome.feed_html) {
        return fail(err);
    }
    eprintln!("feed written to {}", output.display());
    if save_filter {
        if let Err(err) = write_filter(Path::new(FILTER_PATH), &outcome.filter) {
            return fail(err);
        }
        eprintln!("filter written to {}", FILTER_PATH);
    }

    print_summary(&outcome, verbose);
    ExitCode::SUCCESS
}

fn print_summary(outcome: &ScrapeOutcome, verbose: bool) {
    if verbose {
        match serde_json::to_value(&outcome.filter) {
            Ok(value) => {
                println!("[FILTERS]");
                for (path, value) in flatten_paths(&value) {
                    println!("  {} = {}", path, value);
                }
            }
            Err(err) => eprintln!("warning: {}", err),
        }
    }

    let total = outcome.total_items();
    if total > 0 {
        println!("total items scraped: {}", total);
    }
    match &outcome.loader {
        None => println!("feed was empty"),
        Some(report) => match report.outcome {
            LoaderOutcome::TargetMet => {
                println!("target met ({} of {} items)", report.final_count, outcome.target_items)
            }
            LoaderOutcome::Stalled if outcome.target_items > 0 => println!(
                "feed stalled at {} items (target was {})",
                report.final_count, outcome.target_items
            ),
            LoaderOutcome::Stalled => {
                println!("feed exhausted at {} items", report.final_count)
            }
        },
    }
    for designer in &outcome.resolved_designers {
        match &designer.resolved {
            Some(resolved) => println!("designer {:?} -> {:?}", designer.requested, resolved),
            None => println!("designer {:?} -> not resolved", designer.requested),
        }
    }
}

fn fail(err: FeedError) -> ExitCode {
    eprintln!("Error: {}", err);
    ExitCode::from(1)
}
