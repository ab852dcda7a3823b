use thiserror::Error;

/// Result alias for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;

/// Failures while driving Chromium.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// CDP or launch failure
    #[error("chromium error: {0}")]
    ChromiumError(String),

    /// Page load failed or the URL was invalid
    #[error("navigation failed: {0}")]
    NavigationError(String),

    /// Element required for an action is absent
    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    /// In-page script failed or returned an unexpected type
    #[error("script evaluation failed: {0}")]
    ScriptError(String),

    /// Operation ran past its deadline
    #[error("timeout: {0}")]
    Timeout(String),

    /// Pool semaphore was closed
    #[error("browser pool closed")]
    PoolClosed,
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::ChromiumError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("page not found".to_string());
        assert_eq!(err.to_string(), "navigation failed: page not found");
    }

    #[test]
    fn test_selector_error() {
        let err = BrowserError::SelectorNotFound("#tblResults".to_string());
        assert!(err.to_string().contains("#tblResults"));
    }
}
