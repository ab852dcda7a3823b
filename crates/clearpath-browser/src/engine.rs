use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::page::BrowserPage;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Launch options for a browser engine
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Upper bound for a single page load
    pub navigation_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

/// One running Chromium instance
pub struct BrowserEngine {
    browser: Browser,
    handler: JoinHandle<()>,
    fingerprint: FingerprintConfig,
    options: BrowserOptions,
}

impl BrowserEngine {
    /// Launch a browser with default options
    pub async fn new() -> Result<Self> {
        Self::launch(BrowserOptions::default()).await
    }

    /// Launch a browser with a randomized fingerprint
    pub async fn launch(options: BrowserOptions) -> Result<Self> {
        let fingerprint = FingerprintConfig::randomized();
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-blink-features=AutomationControlled")
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .request_timeout(options.navigation_timeout);
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The CDP handler must be polled for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        debug!(headless = options.headless, "browser launched");
        Ok(Self {
            browser,
            handler,
            fingerprint,
            options,
        })
    }

    /// Open a blank tab with the engine's user agent
    pub async fn open_page(&self) -> Result<BrowserPage> {
        let page = self.browser.new_page("about:blank").await?;
        page.set_user_agent(self.fingerprint.user_agent.as_str()).await?;
        Ok(BrowserPage::new(page, self.options.navigation_timeout))
    }

    /// Shut the browser down
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "waiting for browser exit failed");
        }
        self.handler.abort();
    }
}

impl Drop for BrowserEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
