//! Framework catalog loading.
//!
//! Framework documents live in a designated store folder. Each starts with
//! a `Function: <name>` marker line; the name drives query routing and the
//! full document text (marker line included) becomes the system-prompt
//! payload. Documents without the marker, or without readable text, are
//! skipped and recorded in a report instead of failing the whole load. A
//! partial catalog is acceptable.

use std::sync::Arc;

use caretutor_core::DocumentStore;
use caretutor_core::error::StoreError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Marker a framework document's first line must carry.
const FUNCTION_MARKER: &str = "Function:";

/// A routable framework: a name to match queries against and the full
/// document text to inject into the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkEntry {
    pub name: String,
    pub content: String,
}

/// Why a document listed in the framework folder was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Content was empty or whitespace-only.
    EmptyContent,
    /// First line does not carry the `Function:` marker.
    MissingHeader,
    /// The store failed to produce content for this document.
    Unreadable,
}

/// A document the loader saw but did not admit into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: SkipReason,
}

/// What one catalog build saw and decided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogReport {
    /// How many documents the framework folder listed.
    pub documents_seen: usize,
    /// How many made it into the catalog.
    pub loaded: usize,
    /// The ones that did not, with reasons.
    pub skipped: Vec<SkippedDocument>,
}

/// Builds the framework catalog from the store.
///
/// Stateless: every load lists and fetches afresh, so the catalog always
/// tracks the store's current contents.
pub struct FrameworkLoader {
    store: Arc<dyn DocumentStore>,
    folder_id: String,
}

impl FrameworkLoader {
    pub fn new(store: Arc<dyn DocumentStore>, folder_id: impl Into<String>) -> Self {
        Self {
            store,
            folder_id: folder_id.into(),
        }
    }

    /// Load the catalog, in store-listing order.
    ///
    /// A listing failure propagates. Per-document problems (empty content,
    /// missing marker, fetch failure) skip that document and land in the
    /// report.
    pub async fn load(&self) -> std::result::Result<(Vec<FrameworkEntry>, CatalogReport), StoreError>
    {
        let documents = self.store.list_files_in_folder(&self.folder_id).await?;

        let mut report = CatalogReport {
            documents_seen: documents.len(),
            ..CatalogReport::default()
        };
        let mut catalog = Vec::new();

        for doc in &documents {
            let content = match self.store.get_file_content(doc).await {
                Ok(content) => content,
                Err(err) => {
                    debug!(name = %doc.name, error = %err, "framework document unreadable, skipped");
                    report.skipped.push(SkippedDocument {
                        name: doc.name.clone(),
                        reason: SkipReason::Unreadable,
                    });
                    continue;
                }
            };

            if content.trim().is_empty() {
                debug!(name = %doc.name, "framework document empty, skipped");
                report.skipped.push(SkippedDocument {
                    name: doc.name.clone(),
                    reason: SkipReason::EmptyContent,
                });
                continue;
            }

            match parse_function_header(&content) {
                Some(function) => {
                    debug!(name = %doc.name, function = %function, "framework loaded");
                    catalog.push(FrameworkEntry {
                        name: function,
                        content,
                    });
                }
                None => {
                    debug!(name = %doc.name, "first line has no Function: marker, skipped");
                    report.skipped.push(SkippedDocument {
                        name: doc.name.clone(),
                        reason: SkipReason::MissingHeader,
                    });
                }
            }
        }

        report.loaded = catalog.len();
        info!(
            seen = report.documents_seen,
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "framework catalog built"
        );

        Ok((catalog, report))
    }
}

/// Extract the framework name from a document's first meaningful line.
///
/// The line is cleaned of a leading byte-order mark and surrounding
/// whitespace, then checked for a case-insensitive `Function:` prefix.
/// The remainder, trimmed, is the name. `None` when the marker is absent.
fn parse_function_header(content: &str) -> Option<String> {
    let first_line = content.trim().lines().next().unwrap_or("");
    let cleaned = first_line.trim_start_matches('\u{feff}').trim();

    let prefix = cleaned.get(..FUNCTION_MARKER.len())?;
    if !prefix.eq_ignore_ascii_case(FUNCTION_MARKER) {
        return None;
    }
    Some(cleaned[FUNCTION_MARKER.len()..].trim().to_string())
}
