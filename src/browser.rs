//! Live automation backend: one Chromium session driven over CDP.
//!
//! Owns the browser process, its event handler task, and a single page. All
//! capability calls are issued sequentially against that page.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::automation::{Automation, TypeOptions};
use crate::config::BrowserSettings;
use crate::error::{FeedError, Result};
use crate::registry::Target;

pub struct CdpAutomation {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl CdpAutomation {
    /// Launch a Chromium session with the given settings.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.viewport.width, settings.viewport.height);
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(FeedError::config)?;

        let (browser, mut handler) = timeout(settings.launch_timeout, Browser::launch(config))
            .await
            .map_err(|_| {
                FeedError::config(format!(
                    "Browser launch timed out after {:?}",
                    settings.launch_timeout
                ))
            })?
            .map_err(|e| {
                FeedError::config(format!(
                    "Failed to launch browser: {}. Ensure a Chromium/Chrome binary is installed and on PATH.",
                    e
                ))
            })?;

        // Drive CDP events until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FeedError::automation(format!("Failed to open page: {}", e)))?;

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_timeout: settings.navigation_timeout,
        })
    }

    /// Shut the session down. Best effort; the handler task is always
    /// stopped.
    pub async fn close(mut self) -> Result<()> {
        let result = self.browser.close().await;
        self.handler_task.abort();
        result.map_err(|e| FeedError::automation(format!("Failed to close browser: {}", e)))?;
        Ok(())
    }

    async fn element(&self, target: &Target) -> Result<Element> {
        self.page
            .find_element(target.as_str())
            .await
            .map_err(|e| {
                FeedError::automation(format!("element {:?} not found: {}", target.as_str(), e))
            })
    }

    async fn evaluate_unit(&self, expression: String) -> Result<()> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| FeedError::automation(format!("evaluate failed: {}", e)))?;
        Ok(())
    }
}

/// `document.querySelectorAll(<query>).length` with the query quoted as a JS
/// string literal.
fn count_expression(query: &str) -> String {
    format!(
        "document.querySelectorAll({}).length",
        js_string_literal(query)
    )
}

fn outer_html_expression(query: &str) -> String {
    format!(
        "(document.querySelector({}) || {{}}).outerHTML || ''",
        js_string_literal(query)
    )
}

fn clear_value_expression(query: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); if (el) {{ el.value = ''; el.dispatchEvent(new Event('input', {{ bubbles: true }})); }} }})()",
        js_string_literal(query)
    )
}

fn blur_expression(query: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); if (el) el.blur(); }})()",
        js_string_literal(query)
    )
}

/// Selectors come from external registry data; quote them properly instead of
/// splicing raw text into page scripts.
fn js_string_literal(s: &str) -> String {
    serde_json::to_string(s).expect("string serializes")
}

#[async_trait]
impl Automation for CdpAutomation {
    async fn navigate(&self, url: &str) -> Result<()> {
        let goto = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| FeedError::automation(format!("Failed to navigate to {}: {}", url, e)))?;
            self.page.wait_for_navigation().await.map_err(|e| {
                FeedError::automation(format!("Navigation to {} did not settle: {}", url, e))
            })?;
            Ok(())
        };
        timeout(self.navigation_timeout, goto).await.map_err(|_| {
            FeedError::automation(format!(
                "Navigation to {} timed out after {:?}",
                url, self.navigation_timeout
            ))
        })?
    }

    async fn click(&self, target: &Target) -> Result<()> {
        let element = self.element(target).await?;
        element.click().await.map_err(|e| {
            FeedError::automation(format!("click on {:?} failed: {}", target.as_str(), e))
        })?;
        Ok(())
    }

    async fn type_text(&self, target: &Target, text: &str, options: TypeOptions) -> Result<()> {
        if options.clear_first {
            self.evaluate_unit(clear_value_expression(target.as_str()))
                .await?;
        }
        let element = self.element(target).await?;
        element.click().await.map_err(|e| {
            FeedError::automation(format!("focus on {:?} failed: {}", target.as_str(), e))
        })?;
        element.type_str(text).await.map_err(|e| {
            FeedError::automation(format!("typing into {:?} failed: {}", target.as_str(), e))
        })?;
        if !options.keep_focus {
            self.evaluate_unit(blur_expression(target.as_str())).await?;
        }
        Ok(())
    }

    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn get_text(&self, target: &Target) -> Result<String> {
        let element = self.element(target).await?;
        let text = element.inner_text().await.map_err(|e| {
            FeedError::automation(format!("reading text of {:?} failed: {}", target.as_str(), e))
        })?;
        Ok(text.unwrap_or_default())
    }

    async fn get_attribute(&self, target: &Target, name: &str) -> Result<String> {
        let element = self.element(target).await?;
        let value = element.attribute(name).await.map_err(|e| {
            FeedError::automation(format!(
                "reading attribute {:?} of {:?} failed: {}",
                name,
                target.as_str(),
                e
            ))
        })?;
        value.ok_or_else(|| {
            FeedError::automation(format!(
                "element {:?} has no attribute {:?}",
                target.as_str(),
                name
            ))
        })
    }

    async fn evaluate_count(&self, query: &str) -> Result<u64> {
        let result = self
            .page
            .evaluate(count_expression(query))
            .await
            .map_err(|e| FeedError::automation(format!("count query {:?} failed: {}", query, e)))?;
        result
            .into_value::<u64>()
            .map_err(|e| FeedError::automation(format!("count query {:?} returned non-numeric result: {}", query, e)))
    }

    async fn get_html(&self, target: &Target) -> Result<String> {
        let result = self
            .page
            .evaluate(outer_html_expression(target.as_str()))
            .await
            .map_err(|e| {
                FeedError::automation(format!(
                    "reading markup of {:?} failed: {}",
                    target.as_str(),
                    e
                ))
            })?;
        result.into_value::<String>().map_err(|e| {
            FeedError::automation(format!(
                "markup of {:?} was not a string: {}",
                target.as_str(),
                e
            ))
        })
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.evaluate_unit("window.scrollTo(0, document.body.scrollHeight)".to_string())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_expression_quotes_the_query() {
        let expr = count_expression("div.feed-item:not(.empty-item)");
        assert_eq!(
            expr,
            "document.querySelectorAll(\"div.feed-item:not(.empty-item)\").length"
        );
    }

    #[test]
    fn js_string_literal_escapes_quotes() {
        let literal = js_string_literal(r#"a[data-name="x"]"#);
        assert_eq!(literal, r#""a[data-name=\"x\"]""#);
    }

    #[test]
    fn outer_html_expression_defaults_to_empty_string() {
        let expr = outer_html_expression(".feed");
        assert!(expr.contains("outerHTML || ''"));
        assert!(expr.contains("\".feed\""));
    }

    #[test]
    fn clear_and_blur_expressions_target_the_selector() {
        assert!(clear_value_expression("#q").contains("\"#q\""));
        assert!(blur_expression("#q").contains("el.blur()"));
    }
}
