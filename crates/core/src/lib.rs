//! # CareTutor Core
//!
//! Domain types, traits, and error definitions for the CareTutor health
//! assistant. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Both external collaborators — the document store and the answering
//! model — are defined as traits here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod document;
pub mod error;
pub mod provider;
pub mod session;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use document::{DocumentRef, DocumentSource};
pub use error::{Error, Result};
pub use provider::{CompletionRequest, CompletionResponse, Provider, Usage};
pub use session::{ChatMessage, ChatSession, PRESET_QUERIES, Role};
pub use store::DocumentStore;
