//! Document domain types.
//!
//! A `DocumentRef` is an opaque handle into the external document store.
//! Identity is the store-assigned id; the name is a display and matching
//! key, assumed unique in practice but not guaranteed by the data model.

use serde::{Deserialize, Serialize};

/// Which well-known document set a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    /// Patient-specific records; always included in full.
    PatientData,
    /// Clinical guideline documents; filtered before inclusion.
    Guidelines,
    /// Instructional framework documents for query routing.
    PromptFramework,
    /// Listed from a folder outside the three well-known sets.
    Unclassified,
}

impl DocumentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSource::PatientData => "patient_data",
            DocumentSource::Guidelines => "guidelines",
            DocumentSource::PromptFramework => "prompt_framework",
            DocumentSource::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference to a document held by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Store-assigned identifier.
    pub id: String,

    /// Display name (filename), used for selection matching.
    pub name: String,

    /// MIME type as reported by the store.
    pub mime_type: String,

    /// Which document set this reference was listed from.
    pub source: DocumentSource,
}

impl DocumentRef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        source: DocumentSource,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_tags_serialize_snake_case() {
        let json = serde_json::to_string(&DocumentSource::PatientData).unwrap();
        assert_eq!(json, "\"patient_data\"");
        let json = serde_json::to_string(&DocumentSource::PromptFramework).unwrap();
        assert_eq!(json, "\"prompt_framework\"");
    }

    #[test]
    fn document_ref_roundtrip() {
        let doc = DocumentRef::new("abc123", "report.txt", "text/plain", DocumentSource::Guidelines);
        let json = serde_json::to_string(&doc).unwrap();
        let back: DocumentRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.source.as_str(), "guidelines");
    }
}
