//! Shared test helpers for pipeline tests.

use std::sync::Mutex;

use async_trait::async_trait;
use caretutor_core::error::ProviderError;
use caretutor_core::{CompletionRequest, CompletionResponse, Provider, Usage};

/// A provider that returns scripted responses in order.
///
/// Every request is recorded so tests can assert on the prompts the
/// pipeline actually sent. Panics when more calls arrive than responses
/// were scripted.
pub struct ScriptedProvider {
    responses: Mutex<Vec<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        }
    }

    /// Script a single text response.
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_response(text)])
    }

    /// Script a sequence of text responses, one per expected call.
    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| make_response(t)).collect())
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    /// The requests received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *calls >= responses.len() {
            panic!(
                "ScriptedProvider: no response scripted for call #{} (have {})",
                *calls + 1,
                responses.len()
            );
        }

        let response = responses[*calls].clone();
        *calls += 1;
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}

/// Build a plain text response with nominal usage numbers.
pub fn make_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        text: text.to_string(),
        model: "scripted-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}
