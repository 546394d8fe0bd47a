//! Facet actuators: translate requested facet values into capability calls
//! through the selector registry, recording successfully actuated facets
//! into the filter model.
//!
//! Actuation is fault-contained: a value missing from the registry or a
//! failing page primitive skips that facet with a diagnostic and never
//! aborts configuration of the rest.

use std::str::FromStr;

use thiserror::Error;

use crate::automation::{Automation, TypeOptions};
use crate::config::SettleTimes;
use crate::diagnostics::{report, ProgressFn};
use crate::filter::{FilterModel, FilterUpdate};
use crate::registry::{CategoryDomain, SelectorRegistry, Target};

/// One `name:sub1,sub2` tuple from the CLI, for category or size facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub name: String,
    pub subcategories: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CategorySpecParseError {
    #[error("Invalid facet spec {0:?}: expected name:sub1,sub2")]
    MissingColon(String),
    #[error("Invalid facet spec {0:?}: empty name")]
    EmptyName(String),
    #[error("Invalid facet spec {0:?}: no subcategories")]
    NoSubcategories(String),
}

impl FromStr for CategorySpec {
    type Err = CategorySpecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, subs) = s
            .split_once(':')
            .ok_or_else(|| CategorySpecParseError::MissingColon(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CategorySpecParseError::EmptyName(s.to_string()));
        }
        let subcategories: Vec<String> = subs
            .split(',')
            .map(str::trim)
            .filter(|sub| !sub.is_empty())
            .map(str::to_string)
            .collect();
        if subcategories.is_empty() {
            return Err(CategorySpecParseError::NoSubcategories(s.to_string()));
        }
        Ok(CategorySpec {
            name: name.to_string(),
            subcategories,
        })
    }
}

/// Runs the facet actuators, in the fixed configuration sequence, against
/// one settled page.
pub struct FacetPipeline<'a, A: Automation + ?Sized> {
    automation: &'a A,
    registry: &'a SelectorRegistry,
    filter: &'a mut FilterModel,
    settle: SettleTimes,
    progress: Option<ProgressFn>,
}

impl<'a, A: Automation + ?Sized> FacetPipeline<'a, A> {
    pub fn new(
        automation: &'a A,
        registry: &'a SelectorRegistry,
        filter: &'a mut FilterModel,
        settle: SettleTimes,
        progress: Option<ProgressFn>,
    ) -> Self {
        Self {
            automation,
            registry,
            filter,
            settle,
            progress,
        }
    }

    fn diag(&self, message: &str) {
        report(&self.progress, message);
    }

    async fn click_settled(&self, target: &Target) -> bool {
        match self.automation.click(target).await {
            Ok(()) => {
                self.automation.wait(self.settle.after_click).await;
                true
            }
            Err(err) => {
                self.diag(&format!("skipping {:?}: {}", target.as_str(), err));
                false
            }
        }
    }

    /// Type the search query into the header search box.
    pub async fn apply_query(&mut self, query: &str) {
        let target = self.registry.query_input();
        match self
            .automation
            .type_text(target, query, TypeOptions::default())
            .await
        {
            Ok(()) => {
                self.automation.wait(self.settle.after_click).await;
                self.filter.add(FilterUpdate::query(query));
            }
            Err(err) => self.diag(&format!("query not applied: {}", err)),
        }
    }

    /// Open each requested category panel and select its subcategories.
    /// Unsupported names are skipped; only subcategories whose click landed
    /// are recorded.
    pub async fn apply_categorical(&mut self, domain: CategoryDomain, specs: &[CategorySpec]) {
        for spec in specs {
            let Some(entry) = self.registry.category(domain, &spec.name) else {
                self.diag(&format!(
                    "unsupported {} value {:?}, skipping",
                    domain.key(),
                    spec.name
                ));
                continue;
            };
            // The panel must be open before its subcategories are clickable.
            if !self.click_settled(&entry.panel).await {
                continue;
            }
            let mut actuated = Vec::new();
            for sub in &spec.subcategories {
                let Some(target) = entry.subcategory(sub) else {
                    self.diag(&format!(
                        "unsupported {} value {:?} under {:?}, skipping",
                        domain.key(),
                        sub,
                        spec.name
                    ));
                    continue;
                };
                if self.click_settled(target).await {
                    actuated.push(sub.clone());
                }
            }
            if !actuated.is_empty() {
                self.filter
                    .add(FilterUpdate::category(domain, spec.name.clone(), actuated));
            }
        }
    }

    pub async fn apply_locations(&mut self, locations: &[String]) {
        for location in locations {
            let Some(target) = self.registry.location(location) else {
                self.diag(&format!("unsupported location {:?}, skipping", location));
                continue;
            };
            if self.click_settled(target).await {
                self.filter.add(FilterUpdate::location(location.clone()));
            }
        }
    }

    /// Type price bounds. Focus is kept so the inputs do not commit-on-blur
    /// between min and max.
    pub async fn apply_price(&mut self, min: Option<u32>, max: Option<u32>) {
        let options = TypeOptions {
            clear_first: false,
            keep_focus: true,
        };
        if let Some(min) = min {
            match self
                .automation
                .type_text(self.registry.price_min(), &min.to_string(), options)
                .await
            {
                Ok(()) => {
                    self.automation.wait(self.settle.after_click).await;
                    self.filter.add(FilterUpdate::price_min(min));
                }
                Err(err) => self.diag(&format!("min price not applied: {}", err)),
            }
        }
        if let Some(max) = max {
            match self
                .automation
                .type_text(self.registry.price_max(), &max.to_string(), options)
                .await
            {
                Ok(()) => {
                    self.automation.wait(self.settle.after_click).await;
                    self.filter.add(FilterUpdate::price_max(max));
                }
                Err(err) => self.diag(&format!("max price not applied: {}", err)),
            }
        }
    }

    /// Open the sort dropdown and pick the requested order. Unknown sort
    /// keys are skipped without touching the page.
    pub async fn apply_sort(&mut self, key: &str) {
        let Some(option) = self.registry.sort_option(key) else {
            self.diag(&format!("unsupported sort key {:?}, skipping", key));
            return;
        };
        if let Err(err) = self.automation.click(self.registry.sort_dropdown()).await {
            self.diag(&format!("sort dropdown not opened: {}", err));
            return;
        }
        match self.automation.click(option).await {
            Ok(()) => {
                self.automation.wait(self.settle.after_toggle).await;
                self.filter.add(FilterUpdate::sort(key));
            }
            Err(err) => self.diag(&format!("sort {:?} not applied: {}", key, err)),
        }
    }

    /// Reconcile every market toggle against the requested set: read the
    /// observed active state and click only when it differs from the desired
    /// one. A failed state read skips that market.
    pub async fn apply_markets(&mut self, requested: &[String]) {
        for name in requested {
            if self.registry.market(name).is_none() {
                self.diag(&format!("unsupported market {:?}, skipping", name));
            }
        }

        for market in self.registry.markets() {
            let desired = requested.iter().any(|m| m == &market.name);
            let observed = match self.automation.get_attribute(&market.toggle, "class").await {
                Ok(classes) => classes.split_whitespace().any(|c| c == "active"),
                Err(err) => {
                    self.diag(&format!(
                        "market {:?} state unreadable, skipping: {}",
                        market.name, err
                    ));
                    continue;
                }
            };
            if observed != desired {
                match self.automation.click(&market.toggle).await {
                    Ok(()) => self.automation.wait(self.settle.after_toggle).await,
                    Err(err) => {
                        self.diag(&format!("market {:?} not toggled: {}", market.name, err));
                        continue;
                    }
                }
            }
            if desired {
                self.filter.add(FilterUpdate::market(market.name.clone()));
            }
        }
    }

    /// Decide the loader's target item count. An explicit positive request
    /// wins; otherwise, when designers were requested, sum the advertised
    /// per-market totals; otherwise unbounded (0).
    pub async fn estimate_target_items(
        &mut self,
        explicit: Option<u64>,
        designers_requested: bool,
        requested_markets: &[String],
    ) -> u64 {
        if let Some(count) = explicit {
            if count > 0 {
                return count;
            }
        }
        if !designers_requested {
            return 0;
        }

        let mut total = 0u64;
        for name in requested_markets {
            let Some(market) = self.registry.market(name) else {
                continue;
            };
            match self.automation.get_text(&market.item_count).await {
                Ok(text) => match parse_leading_count(&text) {
                    Some(count) => total += count,
                    None => self.diag(&format!(
                        "market {:?} total {:?} is not a number, ignoring",
                        name, text
                    )),
                },
                Err(err) => self.diag(&format!("market {:?} total unreadable: {}", name, err)),
            }
            self.automation.wait(self.settle.between_reads).await;
        }
        total
    }
}

/// Leading integer of an advertised total like `"12,345 listings"`.
fn parse_leading_count(text: &str) -> Option<u64> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::mock::{Call, MockAutomation};

    fn pipeline_parts() -> (MockAutomation, SelectorRegistry, FilterModel) {
        (
            MockAutomation::new(),
            SelectorRegistry::builtin(),
            FilterModel::new(),
        )
    }

    #[test]
    fn category_spec_parses_tuples() {
        let spec: CategorySpec = "tops:tee,hoodie".parse().unwrap();
        assert_eq!(spec.name, "tops");
        assert_eq!(spec.subcategories, vec!["tee", "hoodie"]);

        let spec: CategorySpec = " footwear : boots , ".parse().unwrap();
        assert_eq!(spec.name, "footwear");
        assert_eq!(spec.subcategories, vec!["boots"]);

        assert!("tops".parse::<CategorySpec>().is_err());
        assert!(":tee".parse::<CategorySpec>().is_err());
        assert!("tops:,".parse::<CategorySpec>().is_err());
    }

    #[tokio::test]
    async fn query_is_typed_and_recorded() {
        let (mock, registry, mut filter) = pipeline_parts();
        let settle = SettleTimes::default();
        let mut pipeline = FacetPipeline::new(&mock, &registry, &mut filter, settle, None);

        pipeline.apply_query("raw denim").await;

        assert_eq!(filter.config().query.as_deref(), Some("raw denim"));
        assert!(mock.calls().iter().any(|c| matches!(
            c,
            Call::Type { target, text, keep_focus: false, .. }
                if target == "input#header_search-input" && text == "raw denim"
        )));
    }

    #[tokio::test]
    async fn panel_opens_before_subcategories() {
        let (mock, registry, mut filter) = pipeline_parts();
        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);

        let specs = vec!["tops:tee,hoodie".parse().unwrap()];
        pipeline
            .apply_categorical(CategoryDomain::Categories, &specs)
            .await;

        let clicks = mock.clicks();
        assert_eq!(
            clicks,
            vec![
                ".category-filters .category-tops .toggle".to_string(),
                ".category-tops .sub-tee".to_string(),
                ".category-tops .sub-hoodie".to_string(),
            ]
        );
        assert_eq!(
            filter.config().categories.get("tops").unwrap(),
            &vec!["tee".to_string(), "hoodie".to_string()]
        );
    }

    #[tokio::test]
    async fn unsupported_category_does_not_abort_the_rest() {
        let (mock, registry, mut filter) = pipeline_parts();
        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);

        let specs = vec![
            "hats:beanie".parse().unwrap(),
            "tops:tee,cape".parse().unwrap(),
        ];
        pipeline
            .apply_categorical(CategoryDomain::Categories, &specs)
            .await;
        pipeline.apply_locations(&["us".to_string()]).await;

        let config = filter.config();
        // Unknown group and unknown subcategory are both absent; the rest
        // of the run still configured.
        assert!(config.categories.get("hats").is_none());
        assert_eq!(
            config.categories.get("tops").unwrap(),
            &vec!["tee".to_string()]
        );
        assert_eq!(config.locations, vec!["us".to_string()]);
    }

    #[tokio::test]
    async fn failed_panel_click_skips_the_group() {
        let (mock, registry, mut filter) = pipeline_parts();
        mock.fail_clicks_on(".category-filters .category-tops .toggle");
        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);

        let specs = vec!["tops:tee".parse().unwrap()];
        pipeline
            .apply_categorical(CategoryDomain::Categories, &specs)
            .await;

        assert!(filter.config().categories.is_empty());
        assert_eq!(mock.click_count(".category-tops .sub-tee"), 0);
    }

    #[tokio::test]
    async fn price_keeps_focus_between_bounds() {
        let (mock, registry, mut filter) = pipeline_parts();
        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);

        pipeline.apply_price(Some(50), Some(200)).await;

        let types: Vec<_> = mock
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Type { .. }))
            .collect();
        assert_eq!(types.len(), 2);
        for call in types {
            let Call::Type { keep_focus, .. } = call else {
                unreachable!()
            };
            assert!(keep_focus);
        }
        assert_eq!(filter.config().price.min, Some(50));
        assert_eq!(filter.config().price.max, Some(200));
    }

    #[tokio::test]
    async fn unknown_sort_key_touches_nothing() {
        let (mock, registry, mut filter) = pipeline_parts();
        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);

        pipeline.apply_sort("random").await;

        assert!(mock.clicks().is_empty());
        assert!(filter.config().sort.is_none());
    }

    #[tokio::test]
    async fn sort_opens_dropdown_then_option() {
        let (mock, registry, mut filter) = pipeline_parts();
        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);

        pipeline.apply_sort("new").await;

        assert_eq!(
            mock.clicks(),
            vec![
                ".sort-filter .dropdown-toggle".to_string(),
                ".sort-filter .option-new".to_string(),
            ]
        );
        assert_eq!(filter.config().sort.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn market_reconciliation_skips_already_correct_toggles() {
        let (mock, registry, mut filter) = pipeline_parts();
        // grails already active (desired), hype inactive (desired active),
        // sartorial active (desired inactive), core inactive (desired
        // inactive).
        mock.set_attribute(".browse-markets .market-grails", "class", "market active");
        mock.set_attribute(".browse-markets .market-hype", "class", "market");
        mock.set_attribute(".browse-markets .market-sartorial", "class", "market active");
        mock.set_attribute(".browse-markets .market-core", "class", "market");

        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);
        pipeline
            .apply_markets(&["grails".to_string(), "hype".to_string()])
            .await;

        assert_eq!(mock.click_count(".browse-markets .market-grails"), 0);
        assert_eq!(mock.click_count(".browse-markets .market-hype"), 1);
        assert_eq!(mock.click_count(".browse-markets .market-sartorial"), 1);
        assert_eq!(mock.click_count(".browse-markets .market-core"), 0);
        assert_eq!(
            filter.config().markets,
            vec!["grails".to_string(), "hype".to_string()]
        );
    }

    #[tokio::test]
    async fn unreadable_market_state_is_skipped_not_fatal() {
        let (mock, registry, mut filter) = pipeline_parts();
        // Only grails readable; the other three reads fail.
        mock.set_attribute(".browse-markets .market-grails", "class", "market");

        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);
        pipeline.apply_markets(&["grails".to_string()]).await;

        assert_eq!(mock.click_count(".browse-markets .market-grails"), 1);
        assert_eq!(mock.click_count(".browse-markets .market-hype"), 0);
        assert_eq!(filter.config().markets, vec!["grails".to_string()]);
    }

    #[tokio::test]
    async fn explicit_target_wins_over_estimation() {
        let (mock, registry, mut filter) = pipeline_parts();
        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);

        let target = pipeline
            .estimate_target_items(Some(45), true, &["grails".to_string()])
            .await;
        assert_eq!(target, 45);
        // No page reads were needed.
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn market_totals_sum_when_designers_requested() {
        let (mock, registry, mut filter) = pipeline_parts();
        mock.set_text(
            ".browse-markets .market-grails .sub-title.small",
            "1,234 listings",
        );
        mock.set_text(".browse-markets .market-hype .sub-title.small", "766");

        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);
        let target = pipeline
            .estimate_target_items(None, true, &["grails".to_string(), "hype".to_string()])
            .await;

        assert_eq!(target, 2000);
    }

    #[tokio::test]
    async fn estimation_is_unbounded_without_designers_or_explicit_count() {
        let (mock, registry, mut filter) = pipeline_parts();
        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);

        let target = pipeline
            .estimate_target_items(Some(0), false, &["grails".to_string()])
            .await;
        assert_eq!(target, 0);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn unparsable_market_total_contributes_nothing() {
        let (mock, registry, mut filter) = pipeline_parts();
        mock.set_text(".browse-markets .market-grails .sub-title.small", "soon");
        mock.set_text(".browse-markets .market-hype .sub-title.small", "20");

        let mut pipeline =
            FacetPipeline::new(&mock, &registry, &mut filter, SettleTimes::default(), None);
        let target = pipeline
            .estimate_target_items(None, true, &["grails".to_string(), "hype".to_string()])
            .await;

        assert_eq!(target, 20);
    }

    #[test]
    fn leading_count_parses_grouped_digits() {
        assert_eq!(parse_leading_count("12,345 listings"), Some(12345));
        assert_eq!(parse_leading_count("  766"), Some(766));
        assert_eq!(parse_leading_count("none"), None);
        assert_eq!(parse_leading_count(""), None);
    }
}
