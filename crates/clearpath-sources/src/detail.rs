//! Entity detail lookups by file number.

use async_trait::async_trait;
use clearpath_core::{DetailOutcome, EntityDetail, SourceId};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Fetches registry detail for one entity. Never fails; errors are outcomes.
#[async_trait]
pub trait EntityDetailFetcher: Send + Sync {
    /// Detail for `file_number` in the registry behind `source_id`.
    async fn fetch_detail(&self, source_id: &SourceId, file_number: &str) -> DetailOutcome;
}

/// OpenCorporates company lookup.
pub struct OpenCorporatesFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyEnvelope {
    #[serde(default)]
    results: CompanyResults,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyResults {
    #[serde(default)]
    company: Company,
}

#[derive(Debug, Default, Deserialize)]
struct Company {
    name: Option<String>,
    company_type: Option<String>,
    incorporation_date: Option<String>,
    opencorporates_url: Option<String>,
    #[serde(default)]
    officers: Vec<OfficerEntry>,
}

#[derive(Debug, Deserialize)]
struct OfficerEntry {
    officer: Officer,
}

#[derive(Debug, Deserialize)]
struct Officer {
    name: Option<String>,
    position: Option<String>,
}

impl OpenCorporatesFetcher {
    /// Fetcher against `base_url` (e.g. `https://api.opencorporates.com/v0.4`).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    fn api_url(&self, jurisdiction: &str, file_number: &str) -> Option<Url> {
        let mut url = Url::parse(&self.base_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["companies", jurisdiction, file_number]);
        Some(url)
    }

    async fn request(&self, url: Url) -> Result<reqwest::Response, String> {
        self.client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| describe(&e))
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Request to OpenCorporates timed out.".to_string()
    } else {
        format!("OpenCorporates request failed: {err}")
    }
}

#[async_trait]
impl EntityDetailFetcher for OpenCorporatesFetcher {
    async fn fetch_detail(&self, source_id: &SourceId, file_number: &str) -> DetailOutcome {
        let file_number = file_number.trim();
        let jurisdiction = format!("us_{}", source_id.as_str().to_lowercase());
        let reference_url = format!("https://opencorporates.com/companies/{jurisdiction}/{file_number}");
        let failed = |error: String| DetailOutcome::Failed {
            error,
            reference_url: reference_url.clone(),
        };

        let Some(url) = self.api_url(&jurisdiction, file_number) else {
            return failed(format!("Invalid OpenCorporates base URL: {}", self.base_url));
        };
        debug!(source_id = %source_id, file_number, "fetching entity detail");

        let response = match self.request(url).await {
            Ok(response) => response,
            Err(error) => {
                warn!(source_id = %source_id, file_number, %error, "detail request failed");
                return failed(error);
            }
        };

        match response.status().as_u16() {
            200 => {}
            404 => return failed(format!("Entity #{file_number} not found on OpenCorporates.")),
            code => return failed(format!("OpenCorporates returned HTTP {code}.")),
        }

        let company = match response.json::<CompanyEnvelope>().await {
            Ok(envelope) => envelope.results.company,
            Err(e) => return failed(describe(&e)),
        };

        let registered_agent = company
            .officers
            .iter()
            .find(|entry| {
                entry
                    .officer
                    .position
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains("agent"))
            })
            .and_then(|entry| entry.officer.name.clone());

        DetailOutcome::Found(EntityDetail {
            source_id: source_id.clone(),
            file_number: file_number.to_string(),
            entity_name: company.name,
            entity_kind: company.company_type,
            formation_date: company.incorporation_date,
            registered_agent,
            reference_url: company.opencorporates_url.unwrap_or(reference_url.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(server: &MockServer) -> OpenCorporatesFetcher {
        OpenCorporatesFetcher::new(reqwest::Client::new(), server.uri(), Duration::from_secs(5))
    }

    fn delaware() -> SourceId {
        SourceId::new("DE").expect("valid source ID")
    }

    #[tokio::test]
    async fn test_found_with_registered_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/us_de/5551234"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": {"company": {
                    "name": "ACME VENTURES LLC",
                    "company_type": "Limited Liability Company",
                    "incorporation_date": "2019-04-02",
                    "opencorporates_url": "https://opencorporates.com/companies/us_de/5551234",
                    "officers": [
                        {"officer": {"name": "JANE DOE", "position": "manager"}},
                        {"officer": {"name": "THE CORPORATION TRUST COMPANY", "position": "Registered Agent"}}
                    ]
                }}
            })))
            .mount(&server)
            .await;

        let outcome = fetcher(&server).fetch_detail(&delaware(), "5551234").await;
        let DetailOutcome::Found(detail) = outcome else {
            panic!("expected detail, got {outcome:?}");
        };
        assert_eq!(detail.entity_name.as_deref(), Some("ACME VENTURES LLC"));
        assert_eq!(
            detail.registered_agent.as_deref(),
            Some("THE CORPORATION TRUST COMPANY")
        );
        assert_eq!(detail.formation_date.as_deref(), Some("2019-04-02"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = fetcher(&server).fetch_detail(&delaware(), "999").await;
        assert_eq!(
            outcome,
            DetailOutcome::Failed {
                error: "Entity #999 not found on OpenCorporates.".to_string(),
                reference_url: "https://opencorporates.com/companies/us_de/999".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_other_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let outcome = fetcher(&server).fetch_detail(&delaware(), "1").await;
        let DetailOutcome::Failed { error, .. } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error, "OpenCorporates returned HTTP 503.");
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = OpenCorporatesFetcher::new(
            reqwest::Client::new(),
            server.uri(),
            Duration::from_millis(100),
        );
        let outcome = fetcher.fetch_detail(&delaware(), "1").await;
        let DetailOutcome::Failed { error, .. } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error, "Request to OpenCorporates timed out.");
    }
}
