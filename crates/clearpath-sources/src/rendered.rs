//! Client-rendered registries driven through the browser pool.

use crate::adapter::{RenderTimings, SourceAdapter, SourceContext};
use crate::cascade::{CascadeExecutor, PageCapture};
use crate::definition::{AccessMethod, CascadeProfile, SourceDefinition};
use crate::error::{Result, SourceError};
use async_trait::async_trait;
use clearpath_browser::{first_present, BrowserPool, PageActions};
use clearpath_core::{EntityType, SourceDescriptor, SourceResult};
use clearpath_llm::TextInterpreter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Adapter for a client-rendered registry.
pub struct RenderedAdapter {
    descriptor: SourceDescriptor,
    url: String,
    input_selectors: Vec<String>,
    submit_selectors: Vec<String>,
    profile: CascadeProfile,
    pool: Option<Arc<BrowserPool>>,
    interpreter: Option<Arc<dyn TextInterpreter>>,
    excerpt_chars: usize,
    timings: RenderTimings,
    budget: Duration,
}

impl RenderedAdapter {
    /// Build from a definition whose access method is `rendered`.
    pub fn from_definition(definition: &SourceDefinition, ctx: &SourceContext) -> Result<Self> {
        let AccessMethod::Rendered {
            url,
            input_selectors,
            submit_selectors,
        } = &definition.access
        else {
            return Err(SourceError::Definition {
                source_id: definition.id().to_string(),
                reason: "not a rendered source".to_string(),
            });
        };

        Ok(Self {
            descriptor: definition.descriptor(),
            url: url.clone(),
            input_selectors: input_selectors.clone(),
            submit_selectors: submit_selectors.clone(),
            profile: definition.cascade.clone(),
            pool: ctx.browser_pool.clone(),
            interpreter: ctx.interpreter.clone(),
            excerpt_chars: ctx.excerpt_chars,
            timings: ctx.render,
            budget: ctx.budget,
        })
    }

    /// Drive the search on an already open page.
    pub async fn run_on<P>(&self, page: &P, name: &str, entity_type: EntityType) -> Result<SourceResult>
    where
        P: PageActions + ?Sized,
    {
        page.navigate(&self.url).await?;

        let per_selector = self.timings.selector_timeout;
        let Some(input) = first_present(page, &self.input_selectors, per_selector).await? else {
            warn!(source_id = %self.descriptor.id, "name input not found");
            return Ok(SourceResult::error(
                &self.descriptor,
                format!(
                    "Name input field not found. {} site structure may have changed.",
                    self.descriptor.name
                ),
            ));
        };
        page.fill_field(&input, name.trim()).await?;

        let Some(submit) = first_present(page, &self.submit_selectors, per_selector).await? else {
            warn!(source_id = %self.descriptor.id, "submit control not found");
            return Ok(SourceResult::error(
                &self.descriptor,
                format!("{} search submit button not found.", self.descriptor.name),
            ));
        };
        page.click(&submit).await?;
        // Settling is best-effort; whatever loaded gets parsed.
        page.wait_for_idle(self.timings.settle_timeout).await?;

        let capture = PageCapture::new(page.content().await?, page.body_text().await?);
        debug!(source_id = %self.descriptor.id, chars = capture.text.len(), "results page captured");

        Ok(CascadeExecutor::new(&self.descriptor, &self.profile)
            .with_interpreter(self.interpreter.as_deref())
            .with_excerpt_chars(self.excerpt_chars)
            .run(name, entity_type, &capture)
            .await)
    }
}

#[async_trait]
impl SourceAdapter for RenderedAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn lookup(&self, name: &str, entity_type: EntityType) -> Result<SourceResult> {
        let Some(pool) = &self.pool else {
            return Ok(SourceResult::error(
                &self.descriptor,
                "Browser engine unavailable. This source requires a headless browser.",
            ));
        };

        let lease = pool.acquire().await?;
        let outcome = match lease.open_page().await {
            Ok(page) => {
                let outcome = self.run_on(&page, name, entity_type).await;
                if let Err(e) = page.close().await {
                    debug!(source_id = %self.descriptor.id, error = %e, "page close failed");
                }
                outcome
            }
            Err(e) => Err(e.into()),
        };
        lease.close().await;
        outcome
    }
}
