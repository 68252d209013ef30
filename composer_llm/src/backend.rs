// The completion-backend contract.
//
// A backend takes one fully composed request and returns the raw text of a
// single completion. It makes no promises about the shape of that text;
// see `extract.rs` for the defensive parsing applied afterwards.
//
// Backends are `Send + Sync` so a single instance can be shared by whatever
// request-handling layer sits above the composer.

use crate::error::LlmError;

/// Everything a backend needs to produce one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier passed through to the service.
    pub model: String,
    /// Instruction establishing the assistant's role.
    pub system_prompt: String,
    /// The task itself.
    pub user_prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A source of text completions.
pub trait CompletionBackend: Send + Sync {
    /// Run one completion and return its text content. An empty or absent
    /// completion is returned as `"[]"`.
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for Box<B> {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        (**self).complete(request)
    }
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for std::sync::Arc<B> {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        (**self).complete(request)
    }
}
