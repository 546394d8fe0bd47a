use std::path::Path;
use std::time::Duration;

use facetfeed_lib::{Config, FeedError, Viewport};

/// Tracks which CLI flags were explicitly provided vs. defaulted.
#[derive(Debug, Default)]
pub struct ScrapeFlagSources {
    pub viewport: bool,
    pub nav_timeout: bool,
    pub launch_timeout: bool,
}

impl ScrapeFlagSources {
    pub fn from_args(args: &[String]) -> Self {
        Self {
            viewport: flag_present(args, "--viewport"),
            nav_timeout: flag_present(args, "--nav-timeout"),
            launch_timeout: flag_present(args, "--launch-timeout"),
        }
    }
}

/// Checks if a flag was present in the command-line arguments.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// Merge CLI arguments into the config, preferring CLI when flags are present.
pub fn resolve_scrape_settings(
    cli_viewport: Viewport,
    cli_nav_timeout: u64,
    cli_launch_timeout: u64,
    cli_headed: bool,
    cli_base_url: Option<String>,
    mut config: Config,
    flags: &ScrapeFlagSources,
) -> Config {
    if let Some(url) = cli_base_url {
        config.start_url = url;
    }
    if cli_headed {
        config.browser.headless = false;
    }
    if flags.viewport {
        config.browser.viewport = cli_viewport;
    }
    if flags.nav_timeout {
        config.browser.navigation_timeout = Duration::from_secs(cli_nav_timeout);
    }
    if flags.launch_timeout {
        config.browser.launch_timeout = Duration::from_secs(cli_launch_timeout);
    }
    config
}

/// Load and validate the config file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<Config, FeedError> {
    let config = Config::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Split a comma-separated CLI list, trimming whitespace and dropping empty
/// entries.
pub fn comma_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_present_matches_plain_and_equals_forms() {
        let argv = args(&["facetfeed", "scrape", "--viewport", "800x600", "--nav-timeout=9"]);
        assert!(flag_present(&argv, "--viewport"));
        assert!(flag_present(&argv, "--nav-timeout"));
        assert!(!flag_present(&argv, "--launch-timeout"));
    }

    #[test]
    fn resolve_prefers_config_when_flags_absent() {
        let mut config = Config::default();
        config.browser.viewport = Viewport {
            width: 111,
            height: 222,
        };
        config.browser.navigation_timeout = Duration::from_secs(5);

        let resolved = resolve_scrape_settings(
            Viewport {
                width: 999,
                height: 999,
            },
            30,
            20,
            false,
            None,
            config,
            &ScrapeFlagSources::default(),
        );

        assert_eq!(resolved.browser.viewport.width, 111);
        assert_eq!(resolved.browser.viewport.height, 222);
        assert_eq!(resolved.browser.navigation_timeout, Duration::from_secs(5));
        assert!(resolved.browser.headless);
        assert_eq!(resolved.start_url, Config::default().start_url);
    }

    #[test]
    fn resolve_prefers_cli_when_flags_present() {
        let flags = ScrapeFlagSources {
            viewport: true,
            nav_timeout: true,
            launch_timeout: true,
        };
        let resolved = resolve_scrape_settings(
            Viewport {
                width: 800,
                height: 600,
            },
            15,
            10,
            true,
            Some("https://example.com/shop".to_string()),
            Config::default(),
            &flags,
        );

        assert_eq!(resolved.browser.viewport.width, 800);
        assert_eq!(resolved.browser.navigation_timeout, Duration::from_secs(15));
        assert_eq!(resolved.browser.launch_timeout, Duration::from_secs(10));
        assert!(!resolved.browser.headless);
        assert_eq!(resolved.start_url, "https://example.com/shop");
    }

    #[test]
    fn comma_list_trims_and_drops_empty_entries() {
        assert_eq!(
            comma_list(Some("nike, stone island ,, acne,")),
            vec!["nike", "stone island", "acne"]
        );
        assert!(comma_list(Some("  ,")).is_empty());
        assert!(comma_list(None).is_empty());
    }
}
