//! `caretutor ask` — Answer a single question and exit.

use caretutor_config::AppConfig;

pub async fn run(query: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if config.api_key.is_none() {
        super::print_api_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }
    super::warn_if_folders_incomplete(&config);

    let pipeline = super::build_pipeline(&config)?;

    eprint!("  Thinking...");
    let answer = pipeline.generate_response(&query).await?;
    eprint!("\r             \r");

    println!("{answer}");

    Ok(())
}
