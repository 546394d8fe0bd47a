//! The declarative filter model: a single accumulated record of every facet
//! that was requested and actuated, independent of how actuation happened.
//!
//! Actuators validate values against the selector registry before calling
//! [`FilterModel::add`]; the model itself is a pure accumulator with no
//! failure mode.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::registry::CategoryDomain;

/// The accumulated, serializable record of all requested facets. Serializes
/// to the persisted `filter.json` artifact; absent facets are omitted.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FilterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "PriceRange::is_empty")]
    pub price: PriceRange,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sizes: BTreeMap<String, Vec<String>>,
    /// Designer names as requested, not as resolved by the site.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub designers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub markets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PriceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl PriceRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// A partial facet record, merged into the accumulated config by
/// [`FilterModel::add`]. All fields optional.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub query: Option<String>,
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    pub categories: Vec<(String, Vec<String>)>,
    pub sizes: Vec<(String, Vec<String>)>,
    pub designers: Vec<String>,
    pub markets: Vec<String>,
    pub locations: Vec<String>,
    pub sort: Option<String>,
}

impl FilterUpdate {
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            query: Some(q.into()),
            ..Self::default()
        }
    }

    pub fn price_min(min: u32) -> Self {
        Self {
            price_min: Some(min),
            ..Self::default()
        }
    }

    pub fn price_max(max: u32) -> Self {
        Self {
            price_max: Some(max),
            ..Self::default()
        }
    }

    pub fn category(domain: CategoryDomain, name: impl Into<String>, subs: Vec<String>) -> Self {
        let entry = vec![(name.into(), subs)];
        match domain {
            CategoryDomain::Categories => Self {
                categories: entry,
                ..Self::default()
            },
            CategoryDomain::Sizes => Self {
                sizes: entry,
                ..Self::default()
            },
        }
    }

    pub fn designer(name: impl Into<String>) -> Self {
        Self {
            designers: vec![name.into()],
            ..Self::default()
        }
    }

    pub fn market(name: impl Into<String>) -> Self {
        Self {
            markets: vec![name.into()],
            ..Self::default()
        }
    }

    pub fn location(name: impl Into<String>) -> Self {
        Self {
            locations: vec![name.into()],
            ..Self::default()
        }
    }

    pub fn sort(key: impl Into<String>) -> Self {
        Self {
            sort: Some(key.into()),
            ..Self::default()
        }
    }
}

/// Owner of the accumulated [`FilterConfig`] during the configuration phase.
/// Append-only: repeated adds merge, never overwrite, except for scalar
/// facets (`query`, `sort`, price bounds) which are last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct FilterModel {
    config: FilterConfig,
}

impl FilterModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-merge a partial facet record. List-valued facets concatenate
    /// with de-duplication preserving first-seen order; scalars overwrite.
    /// Pure accumulation: no validation, no failure mode, idempotent under
    /// repeated identical input.
    pub fn add(&mut self, update: FilterUpdate) {
        let config = &mut self.config;
        if let Some(query) = update.query {
            config.query = Some(query);
        }
        if let Some(min) = update.price_min {
            config.price.min = Some(min);
        }
        if let Some(max) = update.price_max {
            config.price.max = Some(max);
        }
        for (name, subs) in update.categories {
            merge_values(config.categories.entry(name).or_default(), subs);
        }
        for (name, subs) in update.sizes {
            merge_values(config.sizes.entry(name).or_default(), subs);
        }
        merge_values(&mut config.designers, update.designers);
        merge_values(&mut config.markets, update.markets);
        merge_values(&mut config.locations, update.locations);
        if let Some(sort) = update.sort {
            config.sort = Some(sort);
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn into_config(self) -> FilterConfig {
        self.config
    }
}

/// Append `incoming` to `existing`, dropping duplicates, keeping first-seen
/// order.
fn merge_values(existing: &mut Vec<String>, incoming: Vec<String>) {
    for value in incoming {
        if !existing.contains(&value) {
            existing.push(value);
        }
    }
}
