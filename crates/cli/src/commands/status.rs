//! `caretutor status` — Show the resolved configuration.

use caretutor_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("CareTutor Status");
    println!("================");
    println!("  Config dir:    {}", AppConfig::config_dir().display());
    println!("  Model:         {}", config.model);
    println!(
        "  Budgets:       {} answer / {} selection tokens",
        config.answer_max_tokens, config.selection_max_tokens
    );
    println!("  Strategy:      {}", config.context_strategy);
    println!("  Store:         {}", config.store.base_url);
    println!(
        "  Store auth:    {}",
        match (&config.store.api_key, &config.store.access_token) {
            (_, Some(_)) => "access token",
            (Some(_), None) => "api key",
            (None, None) => "none",
        }
    );
    println!(
        "  Folders:       {}",
        if config.store.folders.is_complete() {
            "configured"
        } else {
            "incomplete"
        }
    );
    println!(
        "  Gateway:       {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!(
        "  Model API key: {}",
        if config.has_api_key() {
            "configured"
        } else {
            "missing"
        }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `caretutor onboard` first");
    }

    Ok(())
}
