use clearpath_core::{Availability, EntityType, ExtractionTier, SourceId, INACTIVE_ADVISORY};
use clearpath_sources::{Credentials, SourceContext, SourceDefinition, SourceRegistry};
use std::collections::BTreeMap;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn definition(toml_text: &str) -> SourceDefinition {
    toml::from_str(toml_text).expect("valid definition")
}

fn registry(definition: SourceDefinition, credentials: &[(&str, &str)]) -> SourceRegistry {
    let credentials = credentials
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect::<BTreeMap<_, _>>();
    let ctx = SourceContext::new(reqwest::Client::new())
        .with_credentials(Credentials::new(credentials));
    SourceRegistry::from_definitions(&[definition], &ctx).expect("registry")
}

fn id(code: &str) -> SourceId {
    SourceId::new(code).expect("valid source ID")
}

fn new_york(server: &MockServer) -> SourceDefinition {
    definition(&format!(
        r#"
[source]
id = "NY"
name = "New York"
source_weight = 0.95

[access]
method = "api"
endpoint = "{}/resource/entities.json"
dialect = "soda"
label = "NY Open Data API"
timeout_secs = 5
"#,
        server.uri()
    ))
}

fn california(server: &MockServer) -> SourceDefinition {
    definition(&format!(
        r#"
[source]
id = "CA"
name = "California"
source_weight = 0.95

[access]
method = "api"
endpoint = "{}/keyword"
dialect = "calico"
label = "CA SOS API"
credential = "CA_SOS_API_KEY"
timeout_secs = 5

[cascade]
inactive_statuses = ["dissolved", "cancelled"]
"#,
        server.uri()
    ))
}

fn florida(server: &MockServer) -> SourceDefinition {
    definition(&format!(
        r##"
[source]
id = "FL"
name = "Florida"

[access]
method = "session-form"
form_url = "{}/inquiry"
query_field = "SearchTerm"
timeout_secs = 5

[access.extra_fields]
InquiryType = "EntityName"

[cascade]
negative_phrases = ["no records"]
on_missing_container = "escalate"
on_empty_container = "available"
inactive_statuses = ["inactive"]

[cascade.primary]
containers = ["#search-results table"]
rows = "tbody tr"
cells = "td"
min_cells = 2
layout = {{ kind = "fixed", name = 0, file_number = 1, status = 2 }}
"##,
        server.uri()
    ))
}

const FORM_PAGE: &str = r#"
<html><body>
  <form method="post" action="/inquiry/results">
    <input type="hidden" name="__RequestVerificationToken" value="tok123">
    <input type="text" name="SearchTerm">
    <button type="submit">Search</button>
  </form>
</body></html>
"#;

#[tokio::test]
async fn test_soda_exact_match_is_taken() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resource/entities.json"))
        .and(query_param("$where", "upper(current_entity_name)='ACME VENTURES'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"current_entity_name": "ACME VENTURES", "dos_id": "5551234", "initial_dos_filing_date": "2019-03-01T00:00:00.000"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/resource/entities.json"))
        .and(query_param("$limit", "100"))
        .and(query_param("$order", "current_entity_name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"current_entity_name": "ACME VENTURES", "dos_id": "5551234"},
            {"current_entity_name": "ACME VENTURES GROUP LLC", "dos_id": "5559999"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/resource/entities.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let registry = registry(new_york(&server), &[]);
    let result = registry
        .get(&id("NY"))
        .expect("adapter")
        .search("Acme Ventures", EntityType::Llc)
        .await;

    assert_eq!(result.availability, Availability::Taken);
    assert_eq!(result.extraction_tier, ExtractionTier::Primary);
    assert!((result.confidence - 0.99).abs() < 1e-9);
    assert_eq!(result.raw_matches.len(), 1);
    assert_eq!(result.raw_matches[0].file_number, "5551234");
    assert_eq!(result.raw_matches[0].registered_date, "2019-03-01");
    assert_eq!(result.similar_names, vec!["ACME VENTURES GROUP LLC"]);
}

#[tokio::test]
async fn test_soda_escapes_quotes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resource/entities.json"))
        .and(query_param("$where", "upper(current_entity_name)='O''BRIEN PARTNERS'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/resource/entities.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let registry = registry(new_york(&server), &[]);
    let result = registry
        .get(&id("NY"))
        .expect("adapter")
        .search("O'Brien Partners", EntityType::Llc)
        .await;

    assert_eq!(result.availability, Availability::Available);
    assert_eq!(result.notes, "No matching entities found in New York registry.");
}

#[tokio::test]
async fn test_calico_without_key_is_configuration_error() {
    let server = MockServer::start().await;
    let registry = registry(california(&server), &[]);
    let result = registry
        .get(&id("CA"))
        .expect("adapter")
        .search("Acme Ventures", EntityType::Llc)
        .await;

    assert_eq!(result.availability, Availability::Error);
    assert_eq!(result.extraction_tier, ExtractionTier::Failed);
    assert!(result.notes.contains("CA_SOS_API_KEY"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_calico_inactive_exact_match_keeps_taken() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keyword"))
        .and(query_param("search-term", "ACME VENTURES"))
        .and(header("Ocp-Apim-Subscription-Key", "ca-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Results": [
                {"EntityName": "ACME VENTURES", "EntityNumber": 201912345, "Status": "Dissolved"}
            ]
        })))
        .mount(&server)
        .await;

    let registry = registry(california(&server), &[("CA_SOS_API_KEY", "ca-key")]);
    let result = registry
        .get(&id("CA"))
        .expect("adapter")
        .search("Acme Ventures", EntityType::Llc)
        .await;

    assert_eq!(result.availability, Availability::Taken);
    assert!(result.notes.ends_with(INACTIVE_ADVISORY));
    assert_eq!(result.raw_matches[0].file_number, "201912345");
}

#[tokio::test]
async fn test_calico_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keyword"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let registry = registry(california(&server), &[("CA_SOS_API_KEY", "stale")]);
    let result = registry
        .get(&id("CA"))
        .expect("adapter")
        .search("Acme Ventures", EntityType::Llc)
        .await;

    assert_eq!(result.availability, Availability::Error);
    assert_eq!(result.notes, "CA SOS API key is invalid or expired.");
}

#[tokio::test]
async fn test_session_form_submits_hidden_fields_with_referer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inquiry"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORM_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/inquiry/results"))
        .and(header("referer", format!("{}/inquiry", server.uri()).as_str()))
        .and(body_string_contains("__RequestVerificationToken=tok123"))
        .and(body_string_contains("InquiryType=EntityName"))
        .and(body_string_contains("SearchTerm=Acme+Ventures+LLC"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div id="search-results"><table>
                 <thead><tr><th>Corporate Name</th><th>Document Number</th><th>Status</th></tr></thead>
                 <tbody>
                   <tr><td>ACME VENTURES LLC</td><td>L19000123</td><td>Active</td></tr>
                   <tr><td>ACME VENTURES HOLDINGS LLC</td><td>L20000456</td><td>Active</td></tr>
                 </tbody>
               </table></div></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(florida(&server), &[]);
    let result = registry
        .get(&id("FL"))
        .expect("adapter")
        .search("Acme Ventures LLC", EntityType::Llc)
        .await;

    assert_eq!(result.availability, Availability::Taken);
    assert_eq!(result.extraction_tier, ExtractionTier::Primary);
    assert!((result.confidence - 0.96).abs() < 1e-9);
    assert_eq!(result.raw_matches[0].file_number, "L19000123");
    assert_eq!(result.similar_names, vec!["ACME VENTURES HOLDINGS LLC"]);
}

#[tokio::test]
async fn test_session_form_negative_phrase_is_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inquiry"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORM_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/inquiry/results"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>No records found for that name.</p></body></html>"),
        )
        .mount(&server)
        .await;

    let registry = registry(florida(&server), &[]);
    let result = registry
        .get(&id("FL"))
        .expect("adapter")
        .search("Zyxwv Holdings", EntityType::Llc)
        .await;

    assert_eq!(result.availability, Availability::Available);
    assert!((result.confidence - 0.96).abs() < 1e-9);
}

#[tokio::test]
async fn test_session_form_missing_form_is_structural_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inquiry"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Maintenance</body></html>"))
        .mount(&server)
        .await;

    let registry = registry(florida(&server), &[]);
    let result = registry
        .get(&id("FL"))
        .expect("adapter")
        .search("Acme", EntityType::Llc)
        .await;

    assert_eq!(result.availability, Availability::Error);
    assert!(result.notes.contains("site structure may have changed"));
}
