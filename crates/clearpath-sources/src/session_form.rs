//! Session-based web forms.
//!
//! The form page is fetched first with a cookie-enabled client so the
//! registry issues its session cookie and anti-forgery tokens. The query is
//! then submitted with those hidden fields and a `Referer` pointing back at
//! the form, and the returned HTML goes through the shared cascade.

use crate::adapter::{SourceAdapter, SourceContext};
use crate::cascade::{CascadeExecutor, PageCapture};
use crate::definition::{AccessMethod, CascadeProfile, SourceDefinition};
use crate::error::{Result, SourceError};
use async_trait::async_trait;
use clearpath_core::{EntityType, SourceDescriptor, SourceResult};
use clearpath_llm::TextInterpreter;
use once_cell::sync::Lazy;
use reqwest::header::{HeaderValue, REFERER};
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

static FORM: Lazy<Selector> = Lazy::new(|| Selector::parse("form").expect("valid selector"));
static INPUTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[name]").expect("valid selector"));

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Parsed search form.
#[derive(Debug, Clone, PartialEq)]
struct FormSpec {
    action: Url,
    post: bool,
    hidden: Vec<(String, String)>,
}

/// Adapter for a session-based form.
pub struct SessionFormAdapter {
    descriptor: SourceDescriptor,
    form_url: String,
    query_field: String,
    submit_url: Option<String>,
    extra_fields: BTreeMap<String, String>,
    profile: CascadeProfile,
    interpreter: Option<Arc<dyn TextInterpreter>>,
    excerpt_chars: usize,
    request_timeout: Duration,
    budget: Duration,
}

impl SessionFormAdapter {
    /// Build from a definition whose access method is `session-form`.
    pub fn from_definition(definition: &SourceDefinition, ctx: &SourceContext) -> Result<Self> {
        let AccessMethod::SessionForm {
            form_url,
            query_field,
            submit_url,
            extra_fields,
            timeout_secs,
        } = &definition.access
        else {
            return Err(SourceError::Definition {
                source_id: definition.id().to_string(),
                reason: "not a session-form source".to_string(),
            });
        };

        Ok(Self {
            descriptor: definition.descriptor(),
            form_url: form_url.clone(),
            query_field: query_field.clone(),
            submit_url: submit_url.clone(),
            extra_fields: extra_fields.clone(),
            profile: definition.cascade.clone(),
            interpreter: ctx.interpreter.clone(),
            excerpt_chars: ctx.excerpt_chars,
            request_timeout: Duration::from_secs(*timeout_secs),
            budget: ctx.budget,
        })
    }

    fn session_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(self.request_timeout)
            .build()?)
    }

    async fn fetch(&self, request: reqwest::RequestBuilder, what: &str) -> Result<String> {
        let response = request.send().await.map_err(|e| self.transport_error(e, what))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: format!("{} {what} returned HTTP {}.", self.descriptor.name, status.as_u16()),
            });
        }
        response.text().await.map_err(|e| self.transport_error(e, what))
    }

    fn transport_error(&self, err: reqwest::Error, what: &str) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                message: format!("{} {what} timed out.", self.descriptor.name),
            }
        } else {
            SourceError::Network(err)
        }
    }
}

#[async_trait]
impl SourceAdapter for SessionFormAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn lookup(&self, name: &str, entity_type: EntityType) -> Result<SourceResult> {
        let client = self.session_client()?;
        let form_url = Url::parse(&self.form_url)
            .map_err(|e| SourceError::Decode(format!("invalid form URL: {e}")))?;

        let form_html = self.fetch(client.get(form_url.clone()), "form page").await?;
        let Some(form) = parse_form(&form_html, &self.query_field, &form_url) else {
            return Err(SourceError::StructuralChange {
                reason: format!(
                    "{} search form not found. The site structure may have changed.",
                    self.descriptor.name
                ),
            });
        };

        let action = match &self.submit_url {
            Some(url) => Url::parse(url)
                .map_err(|e| SourceError::Decode(format!("invalid submit URL: {e}")))?,
            None => form.action,
        };
        let mut fields = form.hidden;
        fields.extend(self.extra_fields.clone());
        fields.push((self.query_field.clone(), name.trim().to_string()));
        debug!(source_id = %self.descriptor.id, action = %action, fields = fields.len(), "submitting search form");

        let referer = HeaderValue::from_str(form_url.as_str())
            .map_err(|e| SourceError::Decode(format!("invalid referer: {e}")))?;
        let request = if form.post {
            client.post(action).form(&fields)
        } else {
            client.get(action).query(&fields)
        };
        let html = self
            .fetch(request.header(REFERER, referer), "search request")
            .await?;

        let page = PageCapture::from_html(html);
        Ok(CascadeExecutor::new(&self.descriptor, &self.profile)
            .with_interpreter(self.interpreter.as_deref())
            .with_excerpt_chars(self.excerpt_chars)
            .run(name, entity_type, &page)
            .await)
    }
}

/// Locate the form holding `query_field` and collect its hidden inputs.
fn parse_form(html: &str, query_field: &str, base: &Url) -> Option<FormSpec> {
    let document = Html::parse_document(html);
    let form = document.select(&FORM).find(|form| {
        form.select(&INPUTS)
            .any(|input| input.value().attr("name") == Some(query_field))
    })?;

    let action = match form.value().attr("action").map(str::trim) {
        Some(action) if !action.is_empty() => base.join(action).ok()?,
        _ => base.clone(),
    };
    let post = form
        .value()
        .attr("method")
        .is_some_and(|m| m.eq_ignore_ascii_case("post"));

    let hidden = form
        .select(&INPUTS)
        .filter(|input| {
            input
                .value()
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        })
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    Some(FormSpec {
        action,
        post,
        hidden,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    #[test]
    fn test_parse_form_collects_hidden_fields() {
        let base = Url::parse("https://search.example.gov/Inquiry/ByName").expect("url");
        let html = r#"
            <form action="/Other" method="get"><input name="q"></form>
            <form action="/Inquiry/Results" method="POST">
                <input type="hidden" name="__RequestVerificationToken" value="tok123">
                <input type="HIDDEN" name="InquiryType" value="EntityName">
                <input type="text" name="SearchTerm">
                <input type="submit" value="Search">
            </form>"#;

        let form = parse_form(html, "SearchTerm", &base).expect("form");
        assert_eq!(form.action.as_str(), "https://search.example.gov/Inquiry/Results");
        assert!(form.post);
        assert_eq!(
            form.hidden,
            vec![
                ("__RequestVerificationToken".to_string(), "tok123".to_string()),
                ("InquiryType".to_string(), "EntityName".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_form_missing_field() {
        let base = Url::parse("https://search.example.gov/").expect("url");
        assert!(parse_form("<form><input name='other'></form>", "SearchTerm", &base).is_none());
    }

    #[test]
    fn test_from_definition_rejects_other_methods() {
        let def: SourceDefinition = toml::from_str(
            r#"
[source]
id = "WA"
name = "Washington"

[access]
method = "manual"
url = "https://ccfs.sos.wa.gov/#/AdvancedSearch"
"#,
        )
        .expect("definition");
        let ctx = SourceContext::new(Client::new());
        assert!(SessionFormAdapter::from_definition(&def, &ctx).is_err());
    }
}
