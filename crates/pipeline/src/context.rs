//! Context assembly — gathering the documents that accompany a query.
//!
//! Two interchangeable strategies produce the context bundle. `AssembleAll`
//! pulls every patient and guideline document in full. `AssembleFiltered`
//! always pulls patient data but asks the model to narrow the guideline set
//! first: guideline documents are large, and sending all of them on every
//! query would blow the context budget, while patient data is small enough
//! to include whole and doubles as the filtering signal.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use caretutor_core::{
    CompletionRequest, DocumentRef, DocumentSource, DocumentStore, Error, Provider,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::selector;

/// Heading over the merged section the all-documents strategy emits.
pub const HEADING_ALL: &str = "Here is the user's health data and relevant guidelines:";
/// Heading over the patient block in the filtered strategy.
pub const HEADING_PATIENT: &str = "Here is the patient's health data:";
/// Heading over the selected-guideline block in the filtered strategy.
pub const HEADING_GUIDELINES: &str = "Relevant clinical guidelines:";

// ── Types ─────────────────────────────────────────────────────────────────

/// One labeled block of assembled context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSection {
    pub heading: String,
    pub body: String,
}

/// Diagnostics from one assembly run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextMetadata {
    /// How many patient-data documents went in.
    pub patient_docs: usize,
    /// How many guideline documents went in.
    pub guideline_docs: usize,
    /// Filenames the selection step settled on (filtered strategy only).
    pub selected_guidelines: Vec<String>,
    /// True when the model's selection was unusable and the fixed
    /// first-three fallback was applied.
    pub selection_fallback: bool,
}

/// Assembled context: ordered labeled sections plus diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextBundle {
    pub sections: Vec<ContextSection>,
    pub metadata: ContextMetadata,
}

/// Which assembly strategy a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Every patient and guideline document, in full.
    All,
    /// Patient data in full; guidelines narrowed by a model sub-call.
    Filtered,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::All => "all",
            StrategyKind::Filtered => "filtered",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "assemble_all" => Ok(StrategyKind::All),
            "filtered" | "assemble_filtered" => Ok(StrategyKind::Filtered),
            other => Err(format!("unknown context strategy: {other}")),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A context assembly strategy.
#[async_trait]
pub trait ContextStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn assemble(&self, query: &str) -> Result<ContextBundle, Error>;
}

/// Concatenate document contents with the separator convention: each
/// document prefixed by a divider line and its display name. Fetches run
/// sequentially; document counts are small.
async fn concat_documents(
    store: &Arc<dyn DocumentStore>,
    documents: &[DocumentRef],
) -> Result<String, Error> {
    let mut block = String::new();
    for doc in documents {
        let content = store.get_file_content(doc).await?;
        block.push_str(&format!("\n\n---\nDocument: {}\n{}", doc.name, content));
    }
    Ok(block)
}

// ── AssembleAll ───────────────────────────────────────────────────────────

/// Pulls every patient and guideline document in full, merged into a
/// single section in store-listing order. No size limiting, truncation,
/// or deduplication.
pub struct AssembleAll {
    store: Arc<dyn DocumentStore>,
}

impl AssembleAll {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ContextStrategy for AssembleAll {
    fn name(&self) -> &str {
        "assemble_all"
    }

    async fn assemble(&self, _query: &str) -> Result<ContextBundle, Error> {
        let documents = self.store.list_data_files().await?;
        let relevant: Vec<DocumentRef> = documents
            .into_iter()
            .filter(|d| {
                matches!(
                    d.source,
                    DocumentSource::PatientData | DocumentSource::Guidelines
                )
            })
            .collect();

        let patient_docs = relevant
            .iter()
            .filter(|d| d.source == DocumentSource::PatientData)
            .count();
        let guideline_docs = relevant.len() - patient_docs;

        let body = concat_documents(&self.store, &relevant).await?;
        debug!(patient_docs, guideline_docs, "assembled full context");

        Ok(ContextBundle {
            sections: vec![ContextSection {
                heading: HEADING_ALL.to_string(),
                body,
            }],
            metadata: ContextMetadata {
                patient_docs,
                guideline_docs,
                ..ContextMetadata::default()
            },
        })
    }
}

// ── AssembleFiltered ──────────────────────────────────────────────────────

/// Always pulls patient data in full, then asks the model which guideline
/// files matter and fetches only those, in catalog listing order.
pub struct AssembleFiltered {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn Provider>,
    model: String,
    selection_max_tokens: u32,
}

impl AssembleFiltered {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        selection_max_tokens: u32,
    ) -> Self {
        Self {
            store,
            provider,
            model: model.into(),
            selection_max_tokens,
        }
    }
}

#[async_trait]
impl ContextStrategy for AssembleFiltered {
    fn name(&self) -> &str {
        "assemble_filtered"
    }

    async fn assemble(&self, query: &str) -> Result<ContextBundle, Error> {
        // ── Step 1: patient context, always included whole ──
        let documents = self.store.list_data_files().await?;
        let patient: Vec<DocumentRef> = documents
            .into_iter()
            .filter(|d| d.source == DocumentSource::PatientData)
            .collect();
        let patient_block = concat_documents(&self.store, &patient).await?;

        // ── Step 2: guideline filenames only, content not fetched yet ──
        let guidelines = self.store.guideline_files().await?;
        let filenames: Vec<String> = guidelines.iter().map(|d| d.name.clone()).collect();

        // ── Step 3: ask the model which guidelines matter ──
        let request = CompletionRequest::new(
            &self.model,
            selector::selection_prompt(&patient_block, query, &filenames),
            self.selection_max_tokens,
        );
        let response = self.provider.complete(request).await?;
        let (selected, selection_fallback) =
            selector::resolve_selection(&response.text, &filenames);

        // ── Step 4: fetch only the selected guidelines ──
        // Membership is exact name equality; unknown filenames match
        // nothing. Iterating the catalog pins listing order.
        let chosen: Vec<DocumentRef> = guidelines
            .iter()
            .filter(|d| selected.iter().any(|name| name == &d.name))
            .cloned()
            .collect();
        let guideline_block = concat_documents(&self.store, &chosen).await?;

        info!(
            patient_docs = patient.len(),
            selected = chosen.len(),
            fallback = selection_fallback,
            "assembled filtered context"
        );

        Ok(ContextBundle {
            sections: vec![
                ContextSection {
                    heading: HEADING_PATIENT.to_string(),
                    body: patient_block,
                },
                ContextSection {
                    heading: HEADING_GUIDELINES.to_string(),
                    body: guideline_block,
                },
            ],
            metadata: ContextMetadata {
                patient_docs: patient.len(),
                guideline_docs: chosen.len(),
                selected_guidelines: selected,
                selection_fallback,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use caretutor_store::InMemoryStore;

    async fn store_with_guidelines() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.add_patient_document("vitals.txt", "BP 150/95").await;
        store.add_guideline("A.pdf", "guideline A").await;
        store.add_guideline("B.pdf", "guideline B").await;
        store.add_guideline("C.pdf", "guideline C").await;
        store.add_guideline("D.pdf", "guideline D").await;
        store
    }

    #[tokio::test]
    async fn assemble_all_merges_everything_in_listing_order() {
        let store = Arc::new(InMemoryStore::new());
        store.add_patient_document("vitals.txt", "BP 150/95").await;
        store.add_guideline("bp.pdf", "target under 130/80").await;
        let strategy = AssembleAll::new(store);

        let bundle = strategy.assemble("any").await.unwrap();
        assert_eq!(bundle.sections.len(), 1);
        assert_eq!(bundle.sections[0].heading, HEADING_ALL);
        assert_eq!(
            bundle.sections[0].body,
            "\n\n---\nDocument: vitals.txt\nBP 150/95\n\n---\nDocument: bp.pdf\ntarget under 130/80"
        );
        assert_eq!(bundle.metadata.patient_docs, 1);
        assert_eq!(bundle.metadata.guideline_docs, 1);
    }

    #[tokio::test]
    async fn assemble_all_with_empty_store_yields_empty_section() {
        let strategy = AssembleAll::new(Arc::new(InMemoryStore::new()));

        let bundle = strategy.assemble("any").await.unwrap();
        assert_eq!(bundle.sections.len(), 1);
        assert_eq!(bundle.sections[0].body, "");
        assert_eq!(bundle.metadata.patient_docs, 0);
    }

    #[tokio::test]
    async fn filtered_fetches_only_the_selected_guidelines() {
        let store = store_with_guidelines().await;
        let provider = Arc::new(ScriptedProvider::single_text(r#"["B.pdf", "D.pdf"]"#));
        let strategy = AssembleFiltered::new(store.clone(), provider, "m", 512);

        let bundle = strategy.assemble("Explain my alerts").await.unwrap();

        let guideline_body = &bundle.sections[1].body;
        assert!(guideline_body.contains("guideline B"));
        assert!(guideline_body.contains("guideline D"));
        assert!(!guideline_body.contains("guideline A"));
        assert!(!guideline_body.contains("guideline C"));
        // Catalog order is pinned even if the model answers out of order.
        assert!(guideline_body.find("guideline B").unwrap() < guideline_body.find("guideline D").unwrap());

        assert_eq!(store.fetched_names().await, vec!["vitals.txt", "B.pdf", "D.pdf"]);
        assert_eq!(bundle.metadata.selected_guidelines, vec!["B.pdf", "D.pdf"]);
        assert!(!bundle.metadata.selection_fallback);
    }

    #[tokio::test]
    async fn filtered_selection_prompt_carries_patient_context() {
        let store = store_with_guidelines().await;
        let provider = Arc::new(ScriptedProvider::single_text(r#"["A.pdf"]"#));
        let strategy = AssembleFiltered::new(store, provider.clone(), "m", 512);

        strategy.assemble("Explain my alerts").await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 512);
        assert!(requests[0].user.contains("BP 150/95"));
        assert!(requests[0].user.contains("1. A.pdf"));
        assert!(requests[0].user.contains("4. D.pdf"));
    }

    #[tokio::test]
    async fn filtered_falls_back_to_first_three_on_bad_output() {
        let store = store_with_guidelines().await;
        let provider = Arc::new(ScriptedProvider::single_text("B and D look relevant"));
        let strategy = AssembleFiltered::new(store.clone(), provider, "m", 512);

        let bundle = strategy.assemble("Explain my alerts").await.unwrap();

        assert!(bundle.metadata.selection_fallback);
        assert_eq!(bundle.metadata.selected_guidelines, vec!["A.pdf", "B.pdf", "C.pdf"]);
        assert_eq!(
            store.fetched_names().await,
            vec!["vitals.txt", "A.pdf", "B.pdf", "C.pdf"]
        );
    }

    #[tokio::test]
    async fn filtered_tolerates_unknown_filenames_in_selection() {
        let store = store_with_guidelines().await;
        let provider = Arc::new(ScriptedProvider::single_text(r#"["B.pdf", "renamed.pdf"]"#));
        let strategy = AssembleFiltered::new(store.clone(), provider, "m", 512);

        let bundle = strategy.assemble("q").await.unwrap();
        assert_eq!(bundle.metadata.guideline_docs, 1);
        assert!(bundle.sections[1].body.contains("guideline B"));
    }

    #[tokio::test]
    async fn filtered_without_patient_data_still_assembles() {
        let store = Arc::new(InMemoryStore::new());
        store.add_guideline("A.pdf", "guideline A").await;
        let provider = Arc::new(ScriptedProvider::single_text(r#"["A.pdf"]"#));
        let strategy = AssembleFiltered::new(store, provider, "m", 512);

        let bundle = strategy.assemble("q").await.unwrap();
        assert_eq!(bundle.sections[0].heading, HEADING_PATIENT);
        assert_eq!(bundle.sections[0].body, "");
        assert!(bundle.sections[1].body.contains("guideline A"));
    }

    #[test]
    fn strategy_kind_parses_config_values() {
        assert_eq!("all".parse::<StrategyKind>().unwrap(), StrategyKind::All);
        assert_eq!("Filtered".parse::<StrategyKind>().unwrap(), StrategyKind::Filtered);
        assert_eq!("assemble_all".parse::<StrategyKind>().unwrap(), StrategyKind::All);
        assert!("both".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::Filtered.to_string(), "filtered");
    }
}
