//! Federal trademark-office check.

use async_trait::async_trait;
use clearpath_core::{RiskLevel, Timestamp, TrademarkResult};

/// Official trademark search.
pub const TRADEMARK_SEARCH_URL: &str = "https://tmsearch.uspto.gov";

/// The fixed trademark task run alongside every job. Never fails.
#[async_trait]
pub trait TrademarkCheck: Send + Sync {
    /// Check `mark` against the trademark register.
    async fn check(&self, mark: &str) -> TrademarkResult;
}

/// Trademark check that directs the user to the official search.
///
/// The public trademark search has no stable programmatic access, so this
/// records a manual-review result.
#[derive(Debug, Clone, Default)]
pub struct UsptoManualCheck;

#[async_trait]
impl TrademarkCheck for UsptoManualCheck {
    async fn check(&self, mark: &str) -> TrademarkResult {
        TrademarkResult {
            exact_matches: Vec::new(),
            similar_marks: Vec::new(),
            risk_level: RiskLevel::Unknown,
            notes: format!(
                "Automated USPTO trademark search is unavailable. Search manually at \
                 {TRADEMARK_SEARCH_URL} using the mark name: \"{}\".",
                mark.trim()
            ),
            checked_at: Timestamp::now(),
        }
    }
}
