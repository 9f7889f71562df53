//! Model provider implementation for CareTutor.
//!
//! Providers implement the `caretutor_core::Provider` trait. The pipeline
//! holds an `Arc<dyn Provider>`, so tests swap in scripted mocks.

pub mod anthropic;

pub use anthropic::AnthropicProvider;
