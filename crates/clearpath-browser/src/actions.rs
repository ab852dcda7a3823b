use crate::error::Result;
use std::time::Duration;

/// Page-level actions a source adapter needs to drive a search form.
///
/// Implemented by [`crate::BrowserPage`] for real Chromium tabs; tests
/// provide in-memory fakes.
#[async_trait::async_trait]
pub trait PageActions: Send + Sync {
    /// Navigate to a URL and wait for the load to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait up to `timeout` for a selector; `Ok(false)` if it never appears
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Type into a form field
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, selector: &str) -> Result<()>;

    /// Wait for the page to settle after an action; never fails on timeout
    async fn wait_for_idle(&self, timeout: Duration) -> Result<()>;

    /// Rendered HTML of the current document
    async fn content(&self) -> Result<String>;

    /// Visible text of the current document body
    async fn body_text(&self) -> Result<String>;
}

/// First selector in `candidates` that appears within `per_selector` each.
pub async fn first_present<P>(
    page: &P,
    candidates: &[String],
    per_selector: Duration,
) -> Result<Option<String>>
where
    P: PageActions + ?Sized,
{
    for selector in candidates {
        if page.wait_for_selector(selector, per_selector).await? {
            return Ok(Some(selector.clone()));
        }
    }
    Ok(None)
}
