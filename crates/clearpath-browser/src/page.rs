use crate::actions::PageActions;
use crate::error::{BrowserError, Result};
use chromiumoxide::Page;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How a settle wait ended.
#[derive(Debug, PartialEq, Eq)]
enum Settle {
    Idle,
    TimedOut,
    Failed(String),
}

impl Settle {
    fn from_wait<T, E: std::fmt::Display>(
        outcome: std::result::Result<std::result::Result<T, E>, Elapsed>,
    ) -> Self {
        match outcome {
            Ok(Ok(_)) => Self::Idle,
            Ok(Err(e)) => Self::Failed(e.to_string()),
            Err(_) => Self::TimedOut,
        }
    }
}

/// A Chromium tab implementing [`PageActions`]
pub struct BrowserPage {
    page: Page,
    navigation_timeout: Duration,
}

impl BrowserPage {
    pub(crate) fn new(page: Page, navigation_timeout: Duration) -> Self {
        Self {
            page,
            navigation_timeout,
        }
    }

    /// Close the tab
    pub async fn close(self) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PageActions for BrowserPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        url::Url::parse(url)
            .map_err(|e| BrowserError::NavigationError(format!("invalid URL {url}: {e}")))?;
        debug!(url, "navigating");

        match timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(e.to_string())),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {url} exceeded {}s",
                self.navigation_timeout.as_secs()
            ))),
        }
    }

    async fn wait_for_selector(&self, selector: &str, wait: Duration) -> Result<bool> {
        let deadline = Instant::now() + wait;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element.click().await?;
        element.type_str(value).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element.click().await?;
        Ok(())
    }

    async fn wait_for_idle(&self, wait: Duration) -> Result<()> {
        // Settling is best effort; slow pages are read as they are.
        match Settle::from_wait(timeout(wait, self.page.wait_for_navigation()).await) {
            Settle::Idle => debug!("page settled"),
            Settle::TimedOut => {
                debug!(timeout_ms = wait.as_millis(), "page did not settle in time, reading as is");
            }
            Settle::Failed(error) => debug!(error = %error, "navigation wait failed, reading as is"),
        }
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn body_text(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.body ? document.body.innerText : ''")
            .await?;
        result
            .into_value::<String>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }
}
