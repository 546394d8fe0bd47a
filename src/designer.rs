//! Designer resolution: each requested designer name goes through the site's
//! autocomplete, which may fuzzy-correct it. Both the requested string and
//! the resolved one are retained; they are never conflated.

use crate::automation::{Automation, TypeOptions};
use crate::config::SettleTimes;
use crate::diagnostics::{report, ProgressFn};
use crate::filter::{FilterModel, FilterUpdate};
use crate::registry::SelectorRegistry;

/// Outcome of resolving one requested designer. Immutable once created;
/// consumed only by final reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDesigner {
    /// The string the user asked for.
    pub requested: String,
    /// The suggestion text the site actually selected (lower-cased), or
    /// `None` when no suggestion appeared within the timeout.
    pub resolved: Option<String>,
}

impl ResolvedDesigner {
    pub fn succeeded(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Resolve each requested designer in order. Designers are independent: a
/// failure is reported and the next one proceeds. Every requested name is
/// recorded in the filter whether or not resolution succeeded.
pub async fn resolve_designers<A: Automation + ?Sized>(
    automation: &A,
    registry: &SelectorRegistry,
    filter: &mut FilterModel,
    designers: &[String],
    settle: &SettleTimes,
    progress: &Option<ProgressFn>,
) -> Vec<ResolvedDesigner> {
    let mut results = Vec::with_capacity(designers.len());
    for designer in designers {
        let resolved = resolve_one(automation, registry, designer, settle).await;
        match &resolved {
            Some(name) => report(
                progress,
                &format!("designer {:?} resolved to {:?}", designer, name),
            ),
            None => report(progress, &format!("failed to select designer {:?}", designer)),
        }
        filter.add(FilterUpdate::designer(designer.clone()));
        results.push(ResolvedDesigner {
            requested: designer.clone(),
            resolved,
        });
    }
    results
}

/// Typing -> AwaitingSuggestion -> Selected | Failed, for one designer.
async fn resolve_one<A: Automation + ?Sized>(
    automation: &A,
    registry: &SelectorRegistry,
    designer: &str,
    settle: &SettleTimes,
) -> Option<String> {
    let typed = automation
        .type_text(
            registry.designer_input(),
            designer,
            TypeOptions {
                clear_first: true,
                keep_focus: true,
            },
        )
        .await;
    if typed.is_err() {
        return None;
    }

    // Bounded wait for the autocomplete to render a suggestion.
    automation.wait(settle.suggestion).await;

    let result = registry.designer_result();
    if automation.click(result).await.is_err() {
        return None;
    }
    let text = automation.get_text(result).await.ok()?;
    automation.wait(settle.suggestion).await;
    Some(text.to_lowercase())
}
