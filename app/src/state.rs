//! Dependency wiring for the command-line shell.

use anyhow::Context;
use clearpath_browser::{BrowserOptions, BrowserPool};
use clearpath_core::AppConfig;
use clearpath_db::{Database, DetailCache, JobStore};
use clearpath_llm::{AnthropicProvider, LlmInterpreter, TextInterpreter};
use clearpath_rules::RuleEngine;
use clearpath_search::{DetailService, Orchestrator, SimilarityAnalyzer};
use clearpath_sources::{
    Credentials, OpenCorporatesFetcher, RenderTimings, SourceContext, SourceDefinition,
    SourceLoader, SourceRegistry, UsptoManualCheck,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Everything a command needs, built once from configuration.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub details: DetailService,
    pub database: Database,
}

impl AppState {
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("clearpath/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let interpreter = build_interpreter(config)?;
        let browser_pool = Arc::new(BrowserPool::new(
            config.browser.pool_size,
            BrowserOptions {
                headless: config.browser.headless,
                navigation_timeout: Duration::from_secs(config.browser.navigation_timeout_secs),
            },
        ));

        let mut ctx = SourceContext::new(http.clone())
            .with_browser_pool(browser_pool)
            .with_credentials(Credentials::new(config.sources.credentials.clone()))
            .with_budget(config.search.source_timeout());
        ctx.excerpt_chars = config.search.page_excerpt_chars;
        ctx.render = RenderTimings {
            selector_timeout: Duration::from_millis(config.browser.selector_timeout_ms),
            settle_timeout: Duration::from_millis(config.browser.settle_timeout_ms),
        };
        if let Some(interpreter) = &interpreter {
            ctx = ctx.with_interpreter(Arc::clone(interpreter));
        }

        let definitions = load_definitions(config)?;
        let registry = SourceRegistry::from_definitions(&definitions, &ctx)
            .context("failed to build source registry")?;
        info!(sources = registry.len(), "source registry ready");

        let database_path = config.database_path()?;
        let database = Database::open(&database_path)
            .await
            .with_context(|| format!("failed to open database at {}", database_path.display()))?;
        info!(path = %database_path.display(), "database ready");

        let store: Arc<dyn JobStore> = Arc::new(database.clone());
        let cache: Arc<dyn DetailCache> = Arc::new(database.clone());

        let analyzer = SimilarityAnalyzer::new(interpreter)
            .with_name_limit(config.search.similarity_name_limit);
        let orchestrator = Orchestrator::new(
            registry,
            RuleEngine::builtin().context("failed to load naming rules")?,
            analyzer,
            Arc::new(UsptoManualCheck),
            store,
        )
        .with_default_sources(config.search.default_sources.clone());

        let fetcher = OpenCorporatesFetcher::new(
            http,
            config.detail.opencorporates_url.clone(),
            Duration::from_secs(config.detail.timeout_secs),
        );
        let details = DetailService::new(Arc::new(fetcher), cache);

        Ok(Self {
            orchestrator,
            details,
            database,
        })
    }

    pub async fn shutdown(self) {
        let Self { database, .. } = self;
        database.close().await;
    }
}

fn build_interpreter(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn TextInterpreter>>> {
    if !config.llm.enabled {
        info!("text interpretation disabled");
        return Ok(None);
    }
    let Some(api_key) = config.llm.api_key.as_deref() else {
        warn!("ANTHROPIC_API_KEY not set, ambiguous pages and similarity analysis will degrade");
        return Ok(None);
    };

    let provider = AnthropicProvider::new(api_key)?.with_timeout(config.llm.timeout_secs)?;
    let interpreter = LlmInterpreter::from_config(Arc::new(provider), &config.llm);
    Ok(Some(Arc::new(interpreter)))
}

/// Embedded definitions, replaced or extended by the configured directory.
fn load_definitions(config: &AppConfig) -> anyhow::Result<Vec<SourceDefinition>> {
    let mut definitions = SourceLoader::builtin().context("invalid embedded source definitions")?;

    if let Some(dir) = &config.sources.definitions_dir {
        let overrides = SourceLoader::new(dir)?.load_all()?;
        for definition in overrides {
            match definitions.iter_mut().find(|d| d.id() == definition.id()) {
                Some(existing) => *existing = definition,
                None => definitions.push(definition),
            }
        }
    }

    Ok(definitions)
}
