//! The automation capability consumed by the facet actuators and the loader.
//!
//! The core never talks to a browser directly; it issues these primitives
//! against whatever backend implements [`Automation`]. The production backend
//! is [`crate::browser::CdpAutomation`]; tests use a scripted mock.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::registry::Target;

/// Options for typing into an input element.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeOptions {
    /// Clear existing content before typing.
    pub clear_first: bool,
    /// Leave focus on the element afterwards (price inputs commit on blur
    /// otherwise).
    pub keep_focus: bool,
}

/// Sequential browser-session primitives. All calls are issued in program
/// order on a single page; a settle-[`wait`](Automation::wait) must complete
/// before the next state-changing call.
#[async_trait]
pub trait Automation: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn click(&self, target: &Target) -> Result<()>;

    async fn type_text(&self, target: &Target, text: &str, options: TypeOptions) -> Result<()>;

    /// Cooperative timed suspension; the page mutates asynchronously in
    /// response to simulated input.
    async fn wait(&self, duration: Duration);

    async fn get_text(&self, target: &Target) -> Result<String>;

    async fn get_attribute(&self, target: &Target, name: &str) -> Result<String>;

    /// Number of elements currently matching a DOM query.
    async fn evaluate_count(&self, query: &str) -> Result<u64>;

    /// Rendered markup of the element, as an opaque payload.
    async fn get_html(&self, target: &Target) -> Result<String>;

    /// The loader's "load more" trigger.
    async fn scroll_to_bottom(&self) -> Result<()>;
}
