//! CLI subcommands.

pub mod ask;
pub mod chat;
pub mod documents;
pub mod frameworks;
pub mod onboard;
pub mod serve;
pub mod status;

use std::sync::Arc;

use caretutor_config::AppConfig;
use caretutor_core::{DocumentStore, Provider};
use caretutor_pipeline::{PipelineSettings, StrategyKind, TutorPipeline};
use caretutor_providers::AnthropicProvider;
use caretutor_store::{DriveFolders, DriveStore};

/// Build the Drive-backed store from configuration.
pub(crate) fn build_store(config: &AppConfig) -> Arc<dyn DocumentStore> {
    let folders = DriveFolders::new(
        &config.store.folders.patient_data,
        &config.store.folders.guidelines,
        &config.store.folders.prompt_framework,
    );

    let mut drive = DriveStore::new(folders).with_base_url(&config.store.base_url);
    if let Some(key) = &config.store.api_key {
        drive = drive.with_api_key(key);
    }
    if let Some(token) = &config.store.access_token {
        drive = drive.with_access_token(token);
    }

    Arc::new(drive)
}

/// Build the full pipeline. Requires a model API key.
pub(crate) fn build_pipeline(config: &AppConfig) -> Result<TutorPipeline, Box<dyn std::error::Error>> {
    let api_key = config
        .api_key
        .clone()
        .ok_or("no model API key configured")?;

    let store = build_store(config);
    let provider: Arc<dyn Provider> = Arc::new(AnthropicProvider::new(api_key));

    let strategy: StrategyKind = config
        .context_strategy
        .parse()
        .map_err(|message| caretutor_core::Error::Config { message })?;
    tracing::debug!(strategy = %config.context_strategy, model = %config.model, "pipeline configured");

    let settings = PipelineSettings {
        model: config.model.clone(),
        framework_folder: config.store.folders.prompt_framework.clone(),
        answer_max_tokens: config.answer_max_tokens,
        selection_max_tokens: config.selection_max_tokens,
        strategy,
    };

    Ok(TutorPipeline::new(store, provider, settings))
}

/// Print API-key setup guidance when none is configured.
pub(crate) fn print_api_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    ANTHROPIC_API_KEY='sk-ant-...'");
    eprintln!("    CARETUTOR_API_KEY='sk-ant-...'");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!(
        "    {}",
        AppConfig::config_dir().join("config.toml").display()
    );
    eprintln!();
    eprintln!("  Get a key at: https://console.anthropic.com/");
    eprintln!();
}

/// Warn when the three well-known store folders are not all configured.
pub(crate) fn warn_if_folders_incomplete(config: &AppConfig) {
    if !config.store.folders.is_complete() {
        eprintln!(
            "  ⚠️  Store folders are not fully configured — edit {}",
            AppConfig::config_dir().join("config.toml").display()
        );
    }
}
