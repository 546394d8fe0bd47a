mod check_registry;
mod scrape;

pub use check_registry::run_check_registry;
pub use scrape::run_scrape;
