//! `caretutor onboard` — First-time setup.

use caretutor_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("CareTutor — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    let default_toml = AppConfig::default_toml();
    std::fs::write(&config_path, &default_toml)?;
    println!("✅ Created config.toml at: {}", config_path.display());

    println!("\n📝 Next steps:");
    println!("   1. Add your Anthropic API key (api_key) to the config");
    println!("   2. Fill in the three [store.folders] ids for your Drive data");
    println!("   3. Add a Drive api_key or access_token under [store]");
    println!("   4. Run: caretutor chat");
    println!();

    Ok(())
}
