mod cli;
mod commands;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_check_registry, run_scrape};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();

    match args.command {
        Commands::Scrape {
            query,
            categories,
            sizes,
            locations,
            markets,
            designers,
            min,
            max,
            sort,
            num_items,
            output,
            save_filter,
            registry,
            base_url,
            headed,
            viewport,
            nav_timeout,
            launch_timeout,
        } => {
            run_scrape(
                &raw_args,
                args.config,
                args.verbose,
                query,
                categories,
                sizes,
                locations,
                markets,
                designers,
                min,
                max,
                sort,
                num_items,
                output,
                save_filter,
                registry,
                base_url,
                headed,
                viewport,
                nav_timeout,
                launch_timeout,
            )
            .await
        }
        Commands::CheckRegistry { registry } => run_check_registry(registry),
    }
}
