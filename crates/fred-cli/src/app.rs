//! Wiring of providers, data source and orchestrator from flags and environment

use crate::cli::{AgentArgs, GlobalArgs, ProviderKind};
use anyhow::{Context, Result};
use fred_agent::{AgentConfig, ToolOrchestrator};
use fred_data::{CachingSource, DataSource, FredClient, FredConfig, MetadataCatalog};
use fred_llm::LLMProvider;
use fred_llm::providers::{OllamaConfig, OllamaProvider, OpenAIConfig, OpenAIProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub fn provider(kind: ProviderKind) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match kind {
        ProviderKind::Ollama => Arc::new(OllamaProvider::with_config(OllamaConfig::from_env())?),
        ProviderKind::Openai => Arc::new(OpenAIProvider::with_config(
            OpenAIConfig::from_env().context("OpenAI provider needs OPENAI_API_KEY")?,
        )?),
    };
    info!(provider = provider.name(), "Chat provider ready");
    Ok(provider)
}

/// FRED client, behind a response cache unless the TTL is disabled
pub fn data_source() -> Result<Arc<dyn DataSource>> {
    let config = FredConfig::from_env()?;
    let ttl = config.cache_ttl;
    let client = FredClient::new(config)?;
    Ok(match ttl {
        Some(ttl) => Arc::new(CachingSource::new(client, ttl)),
        None => Arc::new(client),
    })
}

pub fn catalog(global: &GlobalArgs) -> Result<Arc<MetadataCatalog>> {
    let catalog = MetadataCatalog::load(&global.metadata)
        .with_context(|| format!("loading metadata from {}", global.metadata.display()))?;
    info!(indicators = catalog.len(), "Metadata loaded");
    Ok(Arc::new(catalog))
}

/// Environment first, then flags on top
pub fn agent_config(global: &GlobalArgs, args: &AgentArgs) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder().with_env()?;
    if let Some(model) = &global.model {
        builder = builder.model(model.clone());
    }
    if let Some(threshold) = args.compact_threshold {
        builder = builder.compact_threshold(threshold);
    }
    if let Some(attempts) = args.fallback_attempts {
        builder = builder.fallback_attempts(attempts);
    }
    if args.sequential {
        builder = builder.parallel_fetch(false);
    }
    if let Some(secs) = args.timeout_secs {
        builder = builder.question_timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

pub fn orchestrator(global: &GlobalArgs, args: &AgentArgs) -> Result<ToolOrchestrator> {
    let config = agent_config(global, args)?;
    info!(
        model = %config.model,
        compact_threshold = config.compact_threshold,
        fallback_attempts = config.fallback_attempts,
        parallel_fetch = config.parallel_fetch,
        "Agent configured"
    );
    Ok(ToolOrchestrator::new(
        provider(global.provider)?,
        data_source()?,
        catalog(global)?,
        config,
    ))
}
