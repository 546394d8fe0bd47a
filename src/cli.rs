use clap::{Parser, Subcommand};
use facetfeed_lib::{CategorySpec, Viewport};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "facetfeed")]
#[command(
    version,
    about = "Facet-driven listings scraper - configure filters in a live browser and harvest the feed",
    long_about = "Facetfeed\n\nModes:\n- scrape: open the listings page, apply the requested facets (query, categories, sizes, locations, price, sort, markets, designers), load the feed until the target is met or it stops growing, and save the rendered markup.\n- check-registry: parse and validate an external selector registry file and report its facet coverage (no browser needed).\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for URL/timeouts/settle intervals; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure search facets in a live browser session and harvest the feed
    Scrape {
        #[arg(long, short, help = "Search query typed into the header search box")]
        query: Option<String>,

        #[arg(
            long = "categories",
            value_name = "NAME:SUB1,SUB2",
            help = "Category group with subcategories (repeatable, e.g. tops:tee,hoodie)"
        )]
        categories: Vec<CategorySpec>,

        #[arg(
            long = "sizes",
            value_name = "NAME:SUB1,SUB2",
            help = "Size group with values (repeatable, e.g. tops:m,l)"
        )]
        sizes: Vec<CategorySpec>,

        #[arg(
            long = "locations",
            value_name = "LIST",
            help = "Seller locations to enable (comma-separated, e.g. us,europe)"
        )]
        locations: Option<String>,

        #[arg(
            long = "markets",
            value_name = "LIST",
            help = "Markets to enable (comma-separated); all registry markets when omitted"
        )]
        markets: Option<String>,

        #[arg(
            long = "designers",
            value_name = "LIST",
            help = "Designer names resolved through the site's autocomplete (comma-separated)"
        )]
        designers: Option<String>,

        #[arg(long, value_name = "PRICE", help = "Minimum price bound")]
        min: Option<u32>,

        #[arg(long, value_name = "PRICE", help = "Maximum price bound")]
        max: Option<u32>,

        #[arg(
            long,
            value_name = "KEY",
            help = "Sort order (default, new, popular, price-low-high, price-high-low)"
        )]
        sort: Option<String>,

        #[arg(
            long,
            value_name = "N",
            help = "Target item count; 0 keeps loading until the feed stops growing. Defaults to the summed market totals when designers are given, unbounded otherwise"
        )]
        num_items: Option<u64>,

        #[arg(
            long,
            short,
            default_value = facetfeed_lib::DEFAULT_FEED_PATH,
            help = "Where to write the captured feed markup"
        )]
        output: PathBuf,

        #[arg(
            long,
            help = "Also persist the accumulated filter configuration as filter.json"
        )]
        save_filter: bool,

        #[arg(
            long,
            value_name = "PATH",
            help = "External selector registry (JSON); compiled-in table when omitted"
        )]
        registry: Option<PathBuf>,

        #[arg(long, value_name = "URL", help = "Listings page to start from")]
        base_url: Option<String>,

        #[arg(long, help = "Run the browser with a visible window")]
        headed: bool,

        #[arg(
            long,
            default_value = "1440x900",
            help = "Viewport dimensions (WIDTHxHEIGHT)"
        )]
        viewport: Viewport,

        #[arg(
            long,
            default_value = "30",
            help = "Navigation timeout (seconds) for the initial page load"
        )]
        nav_timeout: u64,

        #[arg(
            long,
            default_value = "20",
            help = "Browser launch timeout (seconds)"
        )]
        launch_timeout: u64,
    },

    /// Validate a selector registry file and report its facet coverage
    CheckRegistry {
        #[arg(long, value_name = "PATH", help = "Selector registry file (JSON)")]
        registry: PathBuf,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
