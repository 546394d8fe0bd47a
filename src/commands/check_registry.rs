use std::path::PathBuf;
use std::process::ExitCode;

use facetfeed_lib::SelectorRegistry;

/// Run the check-registry command: parse, validate, and report coverage.
pub fn run_check_registry(path: PathBuf) -> ExitCode {
    let registry = match SelectorRegistry::from_path(&path) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(1);
        }
    };

    let coverage = registry.coverage();
    println!("registry {} OK", path.display());
    println!("  markets: {} ({})", coverage.markets, registry.market_names().join(", "));
    println!(
        "  categories: {} groups, {} subcategories",
        coverage.categories, coverage.subcategories
    );
    println!(
        "  sizes: {} groups, {} values",
        coverage.size_groups, coverage.size_values
    );
    println!("  locations: {}", coverage.locations);
    println!("  sort keys: {}", coverage.sort_keys);
    ExitCode::SUCCESS
}
