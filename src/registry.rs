//! Selector registry: the site-specific mapping from semantic facet names to
//! automation targets. Consumed as external data (JSON), with a compiled-in
//! default table. Every lookup returns an `Option`; a facet value absent
//! from the table means "unsupported", never a crash.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

/// A concrete automation target (CSS selector) the capability layer acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(pub String);

impl Target {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target(s.to_string())
    }
}

/// Which categorical facet domain a lookup addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDomain {
    Categories,
    Sizes,
}

impl CategoryDomain {
    pub fn key(self) -> &'static str {
        match self {
            CategoryDomain::Categories => "categories",
            CategoryDomain::Sizes => "sizes",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorRegistry {
    search: SearchSelectors,
    #[serde(default)]
    categories: BTreeMap<String, CategoryEntry>,
    #[serde(default)]
    sizes: BTreeMap<String, CategoryEntry>,
    #[serde(default)]
    locations: BTreeMap<String, Target>,
    /// Fixed market enumeration, in site declaration order.
    markets: Vec<MarketEntry>,
    prices: PriceSelectors,
    sort: SortSelectors,
    feed: FeedSelectors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSelectors {
    pub min: Target,
    pub max: Target,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSelectors {
    pub query_input: Target,
    pub designer_input: Target,
    /// First rendered autocomplete suggestion.
    pub designer_result: Target,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    /// Toggle that expands the category panel; must be opened before the
    /// subcategory targets are clickable.
    pub panel: Target,
    #[serde(default)]
    pub subcategories: BTreeMap<String, Target>,
}

impl CategoryEntry {
    pub fn subcategory(&self, name: &str) -> Option<&Target> {
        self.subcategories.get(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketEntry {
    pub name: String,
    pub toggle: Target,
    /// Element carrying the market's advertised item total.
    pub item_count: Target,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSelectors {
    pub dropdown: Target,
    #[serde(default)]
    pub options: BTreeMap<String, Target>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSelectors {
    pub container: Target,
    /// DOM query counting rendered (non-placeholder) feed items.
    pub item_query: String,
}

impl SelectorRegistry {
    /// Load an externally maintained registry from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FeedError::config(format!("Failed to read registry {}: {}", path.display(), e))
        })?;
        let registry: SelectorRegistry = serde_json::from_str(&raw).map_err(|e| {
            FeedError::config(format!("Invalid registry {}: {}", path.display(), e))
        })?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn validate(&self) -> Result<()> {
        if self.markets.is_empty() {
            return Err(FeedError::config("registry declares no markets"));
        }
        if self.feed.item_query.trim().is_empty() {
            return Err(FeedError::config("registry feed.itemQuery is empty"));
        }
        Ok(())
    }

    pub fn query_input(&self) -> &Target {
        &self.search.query_input
    }

    pub fn designer_input(&self) -> &Target {
        &self.search.designer_input
    }

    pub fn designer_result(&self) -> &Target {
        &self.search.designer_result
    }

    pub fn category(&self, domain: CategoryDomain, name: &str) -> Option<&CategoryEntry> {
        match domain {
            CategoryDomain::Categories => self.categories.get(name),
            CategoryDomain::Sizes => self.sizes.get(name),
        }
    }

    pub fn location(&self, name: &str) -> Option<&Target> {
        self.locations.get(name)
    }

    pub fn market(&self, name: &str) -> Option<&MarketEntry> {
        self.markets.iter().find(|m| m.name == name)
    }

    /// The fixed market enumeration, in declaration order.
    pub fn markets(&self) -> &[MarketEntry] {
        &self.markets
    }

    pub fn market_names(&self) -> Vec<&str> {
        self.markets.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn price_min(&self) -> &Target {
        &self.prices.min
    }

    pub fn price_max(&self) -> &Target {
        &self.prices.max
    }

    pub fn sort_dropdown(&self) -> &Target {
        &self.sort.dropdown
    }

    pub fn sort_option(&self, key: &str) -> Option<&Target> {
        self.sort.options.get(key)
    }

    pub fn feed_container(&self) -> &Target {
        &self.feed.container
    }

    pub fn feed_item_query(&self) -> &str {
        &self.feed.item_query
    }

    /// Facet coverage counts, for `check-registry` reporting.
    pub fn coverage(&self) -> RegistryCoverage {
        RegistryCoverage {
            markets: self.markets.len(),
            categories: self.categories.len(),
            subcategories: self.categories.values().map(|c| c.subcategories.len()).sum(),
            size_groups: self.sizes.len(),
            size_values: self.sizes.values().map(|c| c.subcategories.len()).sum(),
            locations: self.locations.len(),
            sort_keys: self.sort.options.len(),
        }
    }

    /// Compiled-in default table for the reference listings site.
    pub fn builtin() -> Self {
        let category = |panel: &str, subs: &[(&str, &str)]| CategoryEntry {
            panel: panel.into(),
            subcategories: subs
                .iter()
                .map(|(name, sel)| (name.to_string(), Target::from(*sel)))
                .collect(),
        };
        let market = |name: &str| MarketEntry {
            name: name.to_string(),
            toggle: Target(format!(".browse-markets .market-{}", name)),
            item_count: Target(format!(".browse-markets .market-{} .sub-title.small", name)),
        };

        SelectorRegistry {
            search: SearchSelectors {
                query_input: "input#header_search-input".into(),
                designer_input: ".designer-search input.search".into(),
                designer_result: ".designer-search ul.results li:first-child".into(),
            },
            categories: [
                (
                    "tops".to_string(),
                    category(
                        ".category-filters .category-tops .toggle",
                        &[
                            ("tee", ".category-tops .sub-tee"),
                            ("hoodie", ".category-tops .sub-hoodie"),
                            ("sweater", ".category-tops .sub-sweater"),
                            ("button-up", ".category-tops .sub-button-up"),
                        ],
                    ),
                ),
                (
                    "bottoms".to_string(),
                    category(
                        ".category-filters .category-bottoms .toggle",
                        &[
                            ("denim", ".category-bottoms .sub-denim"),
                            ("sweatpants", ".category-bottoms .sub-sweatpants"),
                            ("shorts", ".category-bottoms .sub-shorts"),
                        ],
                    ),
                ),
                (
                    "footwear".to_string(),
                    category(
                        ".category-filters .category-footwear .toggle",
                        &[
                            ("low-top", ".category-footwear .sub-low-top"),
                            ("high-top", ".category-footwear .sub-high-top"),
                            ("boots", ".category-footwear .sub-boots"),
                        ],
                    ),
                ),
                (
                    "outerwear".to_string(),
                    category(
                        ".category-filters .category-outerwear .toggle",
                        &[
                            ("bomber", ".category-outerwear .sub-bomber"),
                            ("parka", ".category-outerwear .sub-parka"),
                            ("denim-jacket", ".category-outerwear .sub-denim-jacket"),
                        ],
                    ),
                ),
            ]
            .into_iter()
            .collect(),
            sizes: [
                (
                    "tops".to_string(),
                    category(
                        ".size-filters .size-tops .toggle",
                        &[
                            ("s", ".size-tops .option-s"),
                            ("m", ".size-tops .option-m"),
                            ("l", ".size-tops .option-l"),
                            ("xl", ".size-tops .option-xl"),
                        ],
                    ),
                ),
                (
                    "footwear".to_string(),
                    category(
                        ".size-filters .size-footwear .toggle",
                        &[
                            ("9", ".size-footwear .option-9"),
                            ("10", ".size-footwear .option-10"),
                            ("11", ".size-footwear .option-11"),
                        ],
                    ),
                ),
            ]
            .into_iter()
            .collect(),
            locations: [
                ("us", ".location-filters .location-us"),
                ("canada", ".location-filters .location-canada"),
                ("europe", ".location-filters .location-europe"),
                ("asia", ".location-filters .location-asia"),
                ("uk", ".location-filters .location-uk"),
                ("australia", ".location-filters .location-australia"),
            ]
            .into_iter()
            .map(|(name, sel)| (name.to_string(), Target::from(sel)))
            .collect(),
            markets: vec![
                market("grails"),
                market("hype"),
                market("sartorial"),
                market("core"),
            ],
            prices: PriceSelectors {
                min: ".price-filters input.min-price".into(),
                max: ".price-filters input.max-price".into(),
            },
            sort: SortSelectors {
                dropdown: ".sort-filter .dropdown-toggle".into(),
                options: [
                    ("default", ".sort-filter .option-default"),
                    ("new", ".sort-filter .option-new"),
                    ("popular", ".sort-filter .option-popular"),
                    ("price-low-high", ".sort-filter .option-price-asc"),
                    ("price-high-low", ".sort-filter .option-price-desc"),
                ]
                .into_iter()
                .map(|(key, sel)| (key.to_string(), Target::from(sel)))
                .collect(),
            },
            feed: FeedSelectors {
                container: ".feed".into(),
                item_query: "div.feed-item:not(.empty-item)".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryCoverage {
    pub markets: usize,
    pub categories: usize,
    pub subcategories: usize,
    pub size_groups: usize,
    pub size_values: usize,
    pub locations: usize,
    pub sort_keys: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_registry_validates() {
        let registry = SelectorRegistry::builtin();
        registry.validate().expect("builtin registry is valid");
        assert_eq!(
            registry.market_names(),
            vec!["grails", "hype", "sartorial", "core"]
        );
    }

    #[test]
    fn unknown_values_return_none() {
        let registry = SelectorRegistry::builtin();
        assert!(registry.market("vintage").is_none());
        assert!(registry.location("antarctica").is_none());
        assert!(registry.sort_option("random").is_none());
        assert!(registry
            .category(CategoryDomain::Categories, "hats")
            .is_none());
        let tops = registry
            .category(CategoryDomain::Categories, "tops")
            .unwrap();
        assert!(tops.subcategory("tee").is_some());
        assert!(tops.subcategory("cape").is_none());
    }

    #[test]
    fn sizes_and_categories_are_separate_domains() {
        let registry = SelectorRegistry::builtin();
        // Both domains have a "tops" group, with different targets.
        let cat = registry
            .category(CategoryDomain::Categories, "tops")
            .unwrap();
        let size = registry.category(CategoryDomain::Sizes, "tops").unwrap();
        assert_ne!(cat.panel, size.panel);
    }

    #[test]
    fn round_trips_through_json() {
        let registry = SelectorRegistry::builtin();
        let json = serde_json::to_string_pretty(&registry).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = SelectorRegistry::from_path(file.path()).unwrap();
        assert_eq!(loaded.market_names(), registry.market_names());
        assert_eq!(loaded.feed_item_query(), registry.feed_item_query());
    }

    #[test]
    fn from_path_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"search\": 7}").unwrap();
        let err = SelectorRegistry::from_path(file.path()).unwrap_err();
        assert!(format!("{}", err).contains("Invalid registry"));
    }

    #[test]
    fn validate_rejects_empty_markets() {
        let mut registry = SelectorRegistry::builtin();
        registry.markets.clear();
        assert!(registry.validate().is_err());
    }

    #[test]
    fn coverage_counts_facets() {
        let coverage = SelectorRegistry::builtin().coverage();
        assert_eq!(coverage.markets, 4);
        assert_eq!(coverage.categories, 4);
        assert!(coverage.subcategories >= 10);
        assert_eq!(coverage.locations, 6);
        assert_eq!(coverage.sort_keys, 5);
    }
}
