//! `caretutor chat` — Interactive chat mode.

use caretutor_config::AppConfig;
use caretutor_core::PRESET_QUERIES;
use tokio::io::AsyncBufReadExt;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if config.api_key.is_none() {
        super::print_api_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }
    super::warn_if_folders_incomplete(&config);

    let pipeline = super::build_pipeline(&config)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         CareTutor — Interactive Chat         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Strategy:  {}", config.context_strategy);
    println!("  Store:     {}", config.store.base_url);
    println!();
    println!("  Try one of these to get started:");
    for (i, preset) in PRESET_QUERIES.iter().enumerate() {
        println!("    {}. {preset}", i + 1);
    }
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    print!("  You > ");
    use std::io::Write;
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let query = line.trim();

        if query.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }

        // Numbered shortcut: "2" asks the second preset question.
        let query = match query.parse::<usize>() {
            Ok(n) if n >= 1 && n <= PRESET_QUERIES.len() => PRESET_QUERIES[n - 1].to_string(),
            _ => query.to_string(),
        };

        eprint!("  Thinking...");

        match pipeline.generate_response(&query).await {
            Ok(answer) => {
                eprint!("\r             \r");
                println!();
                for line in answer.lines() {
                    println!("  CareTutor > {line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r             \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Take care! 👋");
    println!();

    Ok(())
}
