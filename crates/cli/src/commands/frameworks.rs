//! `caretutor frameworks` — Show the framework catalog and its skip report.

use caretutor_config::AppConfig;
use caretutor_pipeline::FrameworkLoader;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    super::warn_if_folders_incomplete(&config);

    let store = super::build_store(&config);
    let loader = FrameworkLoader::new(store, &config.store.folders.prompt_framework);
    let (catalog, report) = loader.load().await?;

    println!(
        "  Frameworks ({} loaded of {} seen):",
        report.loaded, report.documents_seen
    );
    for entry in &catalog {
        println!("    - {}", entry.name);
    }

    if !report.skipped.is_empty() {
        println!();
        println!("  Skipped:");
        for skipped in &report.skipped {
            println!("    - {} ({:?})", skipped.name, skipped.reason);
        }
    }

    Ok(())
}
