//! `caretutor documents` — List the store's patient-data and guideline documents.

use caretutor_config::AppConfig;
use caretutor_core::DocumentSource;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    super::warn_if_folders_incomplete(&config);

    let store = super::build_store(&config);
    let documents = store.list_data_files().await?;

    if documents.is_empty() {
        println!("  No documents listed. Check the folder ids in your config.");
        return Ok(());
    }

    let patient: Vec<_> = documents
        .iter()
        .filter(|d| d.source == DocumentSource::PatientData)
        .collect();
    let guidelines: Vec<_> = documents
        .iter()
        .filter(|d| d.source == DocumentSource::Guidelines)
        .collect();

    println!("  Patient data:");
    for doc in &patient {
        println!("    {:<40} {}", doc.name, doc.mime_type);
    }
    println!();
    println!("  Guidelines:");
    for doc in &guidelines {
        println!("    {:<40} {}", doc.name, doc.mime_type);
    }
    println!();
    println!(
        "  {} documents ({} patient data, {} guidelines)",
        documents.len(),
        patient.len(),
        guidelines.len()
    );

    Ok(())
}
