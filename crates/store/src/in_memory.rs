//! In-memory store — folder-keyed maps, useful for testing and offline runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use caretutor_core::error::StoreError;
use caretutor_core::{DocumentRef, DocumentSource, DocumentStore};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const PATIENT_FOLDER: &str = "patient-data";
pub const GUIDELINE_FOLDER: &str = "guidelines";
pub const FRAMEWORK_FOLDER: &str = "frameworks";

/// An in-memory store keyed by folder id. Listing order is insertion
/// order. Every content fetch is recorded by document name so tests can
/// assert exactly which documents were pulled.
pub struct InMemoryStore {
    folders: Arc<RwLock<HashMap<String, Vec<DocumentRef>>>>,
    contents: Arc<RwLock<HashMap<String, String>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            folders: Arc::new(RwLock::new(HashMap::new())),
            contents: Arc::new(RwLock::new(HashMap::new())),
            fetched: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a document to a folder; the source tag is resolved from the
    /// folder id the same way the Drive client resolves it.
    pub async fn add_document(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        content: &str,
    ) -> DocumentRef {
        let source = match folder_id {
            PATIENT_FOLDER => DocumentSource::PatientData,
            GUIDELINE_FOLDER => DocumentSource::Guidelines,
            FRAMEWORK_FOLDER => DocumentSource::PromptFramework,
            _ => DocumentSource::Unclassified,
        };
        let doc = DocumentRef::new(Uuid::new_v4().to_string(), name, mime_type, source);

        self.contents
            .write()
            .await
            .insert(doc.id.clone(), content.to_string());
        self.folders
            .write()
            .await
            .entry(folder_id.to_string())
            .or_default()
            .push(doc.clone());

        doc
    }

    pub async fn add_patient_document(&self, name: &str, content: &str) -> DocumentRef {
        self.add_document(PATIENT_FOLDER, name, "text/plain", content).await
    }

    pub async fn add_guideline(&self, name: &str, content: &str) -> DocumentRef {
        self.add_document(GUIDELINE_FOLDER, name, "text/plain", content).await
    }

    pub async fn add_framework(&self, name: &str, content: &str) -> DocumentRef {
        self.add_document(FRAMEWORK_FOLDER, name, "text/plain", content).await
    }

    /// Names of every document fetched through `get_file_content`, in
    /// fetch order.
    pub async fn fetched_names(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn list_data_files(&self) -> std::result::Result<Vec<DocumentRef>, StoreError> {
        let mut documents = self.list_files_in_folder(PATIENT_FOLDER).await?;
        documents.extend(self.list_files_in_folder(GUIDELINE_FOLDER).await?);
        Ok(documents)
    }

    async fn list_files_in_folder(
        &self,
        folder_id: &str,
    ) -> std::result::Result<Vec<DocumentRef>, StoreError> {
        let folders = self.folders.read().await;
        Ok(folders.get(folder_id).cloned().unwrap_or_default())
    }

    async fn get_file_content(
        &self,
        doc: &DocumentRef,
    ) -> std::result::Result<String, StoreError> {
        self.fetched.write().await.push(doc.name.clone());
        let contents = self.contents.read().await;
        Ok(contents.get(&doc.id).cloned().unwrap_or_default())
    }

    async fn guideline_files(&self) -> std::result::Result<Vec<DocumentRef>, StoreError> {
        self.list_files_in_folder(GUIDELINE_FOLDER).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_name() {
        assert_eq!(InMemoryStore::new().name(), "in_memory");
    }

    #[tokio::test]
    async fn listing_preserves_insertion_order() {
        let store = InMemoryStore::new();
        store.add_guideline("alpha.txt", "a").await;
        store.add_guideline("beta.txt", "b").await;
        store.add_guideline("gamma.txt", "c").await;

        let names = store.guideline_filenames().await.unwrap();
        assert_eq!(names, vec!["alpha.txt", "beta.txt", "gamma.txt"]);
    }

    #[tokio::test]
    async fn data_files_list_patient_records_first() {
        let store = InMemoryStore::new();
        store.add_guideline("guide.txt", "g").await;
        store.add_patient_document("vitals.txt", "v").await;

        let docs = store.list_data_files().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "vitals.txt");
        assert_eq!(docs[0].source, DocumentSource::PatientData);
        assert_eq!(docs[1].name, "guide.txt");
        assert_eq!(docs[1].source, DocumentSource::Guidelines);
    }

    #[tokio::test]
    async fn content_fetches_are_recorded() {
        let store = InMemoryStore::new();
        let doc = store.add_patient_document("labs.txt", "LDL 120").await;

        let content = store.get_file_content(&doc).await.unwrap();
        assert_eq!(content, "LDL 120");
        assert_eq!(store.fetched_names().await, vec!["labs.txt"]);
    }

    #[tokio::test]
    async fn unknown_document_yields_empty_content() {
        let store = InMemoryStore::new();
        let ghost = DocumentRef::new("nope", "ghost.txt", "text/plain", DocumentSource::Guidelines);

        let content = store.get_file_content(&ghost).await.unwrap();
        assert_eq!(content, "");
    }

    #[tokio::test]
    async fn framework_folder_resolves_source() {
        let store = InMemoryStore::new();
        let doc = store.add_framework("router.txt", "Function: Router").await;
        assert_eq!(doc.source, DocumentSource::PromptFramework);

        let listed = store.list_files_in_folder(FRAMEWORK_FOLDER).await.unwrap();
        assert_eq!(listed, vec![doc]);
    }
}
