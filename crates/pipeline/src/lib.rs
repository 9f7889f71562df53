//! The query pipeline — the heart of CareTutor.
//!
//! A query flows through four stages:
//!
//! 1. **Load** the framework catalog from the store (`catalog`)
//! 2. **Route** the query to the best-matching framework (`matcher`)
//! 3. **Assemble** patient and guideline context (`context`, `selector`)
//! 4. **Compose** the prompts and ask the answering model (`compose`)
//!
//! The stages run strictly in sequence; the filtered assembly strategy
//! makes one extra model call of its own. The pipeline holds no state
//! across queries, so every answer reflects the store as it is right now.

pub mod catalog;
pub mod compose;
pub mod context;
pub mod matcher;
pub mod selector;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use catalog::{CatalogReport, FrameworkEntry, FrameworkLoader, SkipReason, SkippedDocument};
pub use context::{
    AssembleAll, AssembleFiltered, ContextBundle, ContextMetadata, ContextSection,
    ContextStrategy, StrategyKind,
};
pub use matcher::choose_framework;

use std::sync::Arc;

use caretutor_core::{CompletionRequest, DocumentStore, Error, Provider};
use tracing::info;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Model used for the final answer and the selection sub-call.
    pub model: String,
    /// Store folder holding the framework documents.
    pub framework_folder: String,
    /// Output token budget for the final answer call.
    pub answer_max_tokens: u32,
    /// Output token budget for the guideline-selection sub-call.
    pub selection_max_tokens: u32,
    /// Which context assembly strategy to run.
    pub strategy: StrategyKind,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".into(),
            framework_folder: String::new(),
            answer_max_tokens: 1500,
            selection_max_tokens: 512,
            strategy: StrategyKind::All,
        }
    }
}

/// Everything one query produced, for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The model's answer, verbatim.
    pub answer: String,
    /// Name of the framework that routed the query.
    pub framework: String,
    /// What the catalog build saw and skipped.
    pub report: CatalogReport,
    /// What the context assembly did.
    pub context: ContextMetadata,
}

/// The assembled pipeline. Construction wires a store, a provider, and
/// the configured assembly strategy together; `generate_response` is the
/// sole entry point the serving layers call.
pub struct TutorPipeline {
    provider: Arc<dyn Provider>,
    strategy: Arc<dyn ContextStrategy>,
    loader: FrameworkLoader,
    settings: PipelineSettings,
}

impl TutorPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn Provider>,
        settings: PipelineSettings,
    ) -> Self {
        let strategy: Arc<dyn ContextStrategy> = match settings.strategy {
            StrategyKind::All => Arc::new(AssembleAll::new(store.clone())),
            StrategyKind::Filtered => Arc::new(AssembleFiltered::new(
                store.clone(),
                provider.clone(),
                settings.model.clone(),
                settings.selection_max_tokens,
            )),
        };
        let loader = FrameworkLoader::new(store, &settings.framework_folder);

        Self {
            provider,
            strategy,
            loader,
            settings,
        }
    }

    /// Swap in a custom assembly strategy.
    pub fn with_strategy(mut self, strategy: Arc<dyn ContextStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run the full pipeline for one query.
    pub async fn run(&self, query: &str) -> Result<PipelineOutcome, Error> {
        info!(strategy = self.strategy.name(), "handling query");

        // ── Step 1: load the framework catalog ──
        let (catalog, report) = self.loader.load().await?;

        // ── Step 2: route the query ──
        let framework = matcher::choose_framework(query, &catalog)?;

        // ── Step 3: assemble context ──
        let context = self.strategy.assemble(query).await?;

        // ── Step 4: compose and answer ──
        let request = CompletionRequest::new(
            &self.settings.model,
            compose::user_message(&context, query),
            self.settings.answer_max_tokens,
        )
        .with_system(compose::system_prompt(framework));

        let response = self.provider.complete(request).await?;

        info!(
            framework = %framework.name,
            answer_len = response.text.len(),
            "query answered"
        );

        Ok(PipelineOutcome {
            answer: response.text,
            framework: framework.name.clone(),
            report,
            context: context.metadata,
        })
    }

    /// Answer a query, returning only the model's text.
    pub async fn generate_response(&self, query: &str) -> Result<String, Error> {
        Ok(self.run(query).await?.answer)
    }
}
