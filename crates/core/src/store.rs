//! DocumentStore trait — the abstraction over the external file store.
//!
//! The store exposes three well-known folders (patient data, clinical
//! guidelines, prompt frameworks) plus content fetch with text extraction
//! already performed. Content that cannot be extracted comes back as an
//! empty string rather than an error; callers tolerate empties.

use async_trait::async_trait;

use crate::document::DocumentRef;
use crate::error::StoreError;

/// The core DocumentStore trait.
///
/// Implementations: the Drive REST client, in-memory (for testing).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The store name (e.g., "drive", "in_memory").
    fn name(&self) -> &str;

    /// List every patient-data and guideline document, source tags
    /// resolved, patient data first, each set in store-listing order.
    async fn list_data_files(&self) -> std::result::Result<Vec<DocumentRef>, StoreError>;

    /// List documents in an arbitrary folder. Source tags are resolved
    /// when the folder id matches one of the well-known folders.
    async fn list_files_in_folder(
        &self,
        folder_id: &str,
    ) -> std::result::Result<Vec<DocumentRef>, StoreError>;

    /// Fetch a document's plain-text content. Returns an empty string when
    /// the document exists but its text cannot be extracted.
    async fn get_file_content(
        &self,
        doc: &DocumentRef,
    ) -> std::result::Result<String, StoreError>;

    /// List the guideline documents only, in store-listing order.
    async fn guideline_files(&self) -> std::result::Result<Vec<DocumentRef>, StoreError>;

    /// The guideline filenames, in store-listing order. These are what the
    /// model-assisted selector sees and what its output is matched against.
    async fn guideline_filenames(&self) -> std::result::Result<Vec<String>, StoreError> {
        Ok(self
            .guideline_files()
            .await?
            .into_iter()
            .map(|doc| doc.name)
            .collect())
    }
}
