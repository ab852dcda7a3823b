//! Structured API sources.
//!
//! Two dialects are supported: Socrata open-data queries (New York) and the
//! subscription-key keyword search (California). Both produce match lists
//! that go through the same classification as scraped sources.

use crate::adapter::{SourceAdapter, SourceContext};
use crate::definition::{ApiDialect, SourceDefinition};
use crate::error::{Result, SourceError};
use async_trait::async_trait;
use clearpath_core::{
    classify_matches, EntityMatch, EntityType, ExtractionTier, SourceDescriptor, SourceResult,
};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

const EXACT_LIMIT: u32 = 10;
const PREFIX_LIMIT: u32 = 100;

/// Adapter for a direct structured API.
pub struct ApiAdapter {
    descriptor: SourceDescriptor,
    endpoint: String,
    dialect: ApiDialect,
    label: String,
    credential: Option<(String, Option<String>)>,
    inactive_statuses: Vec<String>,
    request_timeout: Duration,
    budget: Duration,
    client: reqwest::Client,
}

impl ApiAdapter {
    /// Build from a definition whose access method is `api`.
    pub fn from_definition(definition: &SourceDefinition, ctx: &SourceContext) -> Result<Self> {
        let crate::definition::AccessMethod::Api {
            endpoint,
            dialect,
            label,
            credential,
            timeout_secs,
        } = &definition.access
        else {
            return Err(SourceError::Definition {
                source_id: definition.id().to_string(),
                reason: "not an api source".to_string(),
            });
        };

        let credential = credential.as_ref().map(|name| {
            (
                name.clone(),
                ctx.credentials.get(name).map(ToString::to_string),
            )
        });

        Ok(Self {
            descriptor: definition.descriptor(),
            endpoint: endpoint.clone(),
            dialect: *dialect,
            label: label
                .clone()
                .unwrap_or_else(|| format!("{} API", definition.name())),
            credential,
            inactive_statuses: definition.cascade.inactive_statuses.clone(),
            request_timeout: Duration::from_secs(*timeout_secs),
            budget: ctx.budget,
            client: ctx.http.clone(),
        })
    }

    fn status_error(&self, status: reqwest::StatusCode) -> SourceError {
        let message = match status.as_u16() {
            401 => format!("{} key is invalid or expired.", self.label),
            429 => format!("{} rate limit exceeded. Try again shortly.", self.label),
            code => format!("{} returned HTTP {code}.", self.label),
        };
        SourceError::Http {
            status: status.as_u16(),
            message,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                message: format!("{} request timed out.", self.label),
            }
        } else {
            SourceError::Network(err)
        }
    }

    async fn get_json(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                SourceError::Decode(format!("{} response is not JSON: {e}", self.label))
            }
        })
    }

    async fn soda_matches(&self, name: &str, entity_type: EntityType) -> Result<Vec<EntityMatch>> {
        let upper = name.trim().to_uppercase();
        let escaped = escape_soql(&upper);
        let suffixed = escape_soql(&format!("{upper} {}", entity_type.as_str().to_uppercase()));

        let exact = self
            .soda_query(format!("upper(current_entity_name)='{escaped}'"), EXACT_LIMIT, None)
            .await?;
        let exact_suffixed = self
            .soda_query(format!("upper(current_entity_name)='{suffixed}'"), EXACT_LIMIT, None)
            .await?;
        let prefix = self
            .soda_query(
                format!("upper(current_entity_name) like '{escaped}%'"),
                PREFIX_LIMIT,
                Some("current_entity_name"),
            )
            .await?;

        let mut seen = HashSet::new();
        let matches = exact
            .into_iter()
            .chain(exact_suffixed)
            .chain(prefix)
            .filter_map(|row| soda_match(&row))
            .filter(|m| seen.insert((m.name.to_uppercase(), m.file_number.clone())))
            .collect::<Vec<_>>();
        debug!(source_id = %self.descriptor.id, count = matches.len(), "soda rows");
        Ok(matches)
    }

    async fn soda_query(&self, filter: String, limit: u32, order: Option<&str>) -> Result<Vec<Value>> {
        let mut params = vec![("$where", filter), ("$limit", limit.to_string())];
        if let Some(order) = order {
            params.push(("$order", order.to_string()));
        }
        let body = self
            .get_json(self.client.get(&self.endpoint).query(&params))
            .await?;
        match body {
            Value::Array(rows) => Ok(rows),
            other => Err(SourceError::Decode(format!(
                "{} returned {} instead of a row list",
                self.label,
                json_kind(&other)
            ))),
        }
    }

    async fn calico_matches(&self, name: &str) -> Result<Vec<EntityMatch>> {
        let key = match &self.credential {
            Some((_, Some(key))) => key.clone(),
            Some((credential, None)) => {
                return Err(SourceError::MissingCredential {
                    credential: credential.clone(),
                    message: format!(
                        "{} key not configured. Set the {credential} environment variable.",
                        self.label
                    ),
                })
            }
            None => String::new(),
        };

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("search-term", name.trim().to_uppercase())]);
        if !key.is_empty() {
            request = request.header("Ocp-Apim-Subscription-Key", key);
        }
        let body = self.get_json(request).await?;
        Ok(parse_calico_rows(&body))
    }
}

#[async_trait]
impl SourceAdapter for ApiAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn lookup(&self, name: &str, entity_type: EntityType) -> Result<SourceResult> {
        let matches = match self.dialect {
            ApiDialect::Soda => self.soda_matches(name, entity_type).await?,
            ApiDialect::Calico => self.calico_matches(name).await?,
        };

        let mut classification = classify_matches(name, matches, &self.inactive_statuses);
        if classification.matches.is_empty() && classification.similar_names.is_empty() {
            classification.notes = format!(
                "No matching entities found in {} registry.",
                self.descriptor.name
            );
        }
        Ok(SourceResult::from_classification(
            &self.descriptor,
            classification,
            ExtractionTier::Primary,
        ))
    }
}

/// Escape single quotes for SoQL string literals.
fn escape_soql(value: &str) -> String {
    value.replace('\'', "''")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn string_field(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Open-data rows only ever describe active entities.
fn soda_match(row: &Value) -> Option<EntityMatch> {
    let name = string_field(row, "current_entity_name");
    if name.is_empty() {
        return None;
    }
    let filed = string_field(row, "initial_dos_filing_date");
    Some(EntityMatch {
        name,
        entity_type: string_field(row, "entity_type"),
        status: "active".to_string(),
        file_number: string_field(row, "dos_id"),
        registered_date: filed.chars().take(10).collect(),
    })
}

/// First non-empty value among `keys`, rendering numbers as text.
fn first_field(row: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let value = match row.get(*key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    })
}

/// Rows from a top-level list or a `results`/`entities` wrapper.
fn parse_calico_rows(body: &Value) -> Vec<EntityMatch> {
    let rows: &[Value] = match body {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(map) => ["results", "Results", "entities", "Entities"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    };

    rows.iter()
        .filter(|row| row.is_object())
        .filter_map(|row| {
            let name = first_field(row, &["EntityName", "entityName", "Name", "name"])?;
            Some(EntityMatch {
                name,
                entity_type: first_field(
                    row,
                    &["EntityType", "entityType", "EntityTypeName", "entityTypeName"],
                )
                .unwrap_or_default(),
                status: first_field(
                    row,
                    &[
                        "Status",
                        "status",
                        "StatusType",
                        "statusType",
                        "EntityStatus",
                        "entityStatus",
                    ],
                )
                .unwrap_or_else(|| "unknown".to_string()),
                file_number: first_field(
                    row,
                    &["EntityNumber", "entityNumber", "FileNumber", "fileNumber"],
                )
                .unwrap_or_default(),
                registered_date: first_field(
                    row,
                    &[
                        "FormationDate",
                        "formationDate",
                        "RegistrationDate",
                        "registrationDate",
                        "InitialFilingDate",
                        "initialFilingDate",
                    ],
                )
                .unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_soql() {
        assert_eq!(escape_soql("O'BRIEN'S"), "O''BRIEN''S");
    }

    #[test]
    fn test_soda_row_mapping() {
        let row = json!({
            "current_entity_name": "ACME VENTURES LLC",
            "dos_id": "5012345",
            "entity_type": "DOMESTIC LIMITED LIABILITY COMPANY",
            "initial_dos_filing_date": "2019-04-02T00:00:00.000"
        });
        let m = soda_match(&row).expect("match");
        assert_eq!(m.status, "active");
        assert_eq!(m.file_number, "5012345");
        assert_eq!(m.registered_date, "2019-04-02");
        assert!(soda_match(&json!({"dos_id": "1"})).is_none());
    }

    #[test]
    fn test_calico_shapes() {
        let wrapped = json!({
            "Results": [
                {"EntityName": "ACME VENTURES", "Status": "Dissolved", "EntityNumber": 201912345},
                {"entityName": "ACME VENTURES GROUP", "statusType": "Active"},
                {"Name": ""},
                "junk"
            ]
        });
        let matches = parse_calico_rows(&wrapped);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].file_number, "201912345");
        assert_eq!(matches[0].status, "Dissolved");
        assert_eq!(matches[1].status, "Active");

        let list = json!([{ "name": "ACME" }]);
        let matches = parse_calico_rows(&list);
        assert_eq!(matches[0].status, "unknown");

        assert!(parse_calico_rows(&json!({"unexpected": true})).is_empty());
        assert!(parse_calico_rows(&json!(42)).is_empty());
    }
}
