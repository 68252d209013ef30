// Error type for completion backends and output extraction.
//
// Transport and service failures (`MissingCredential`, `Request`, `Status`,
// `Decode`) are kept apart from `MalformedOutput`, which means the service
// answered but the answer held no usable JSON. Callers map the two groups to
// different user-facing failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// The credential environment variable is unset or empty.
    #[error("missing API credential: set the {0} environment variable")]
    MissingCredential(&'static str),

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("completion request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status code.
    #[error("completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP body was not a chat-completions response.
    #[error("could not decode completion response: {0}")]
    Decode(String),

    /// The completion text contained no parseable JSON array.
    #[error("malformed AI output: {0}")]
    MalformedOutput(String),
}

impl LlmError {
    /// True for the transport/service family of errors, false for
    /// `MalformedOutput`.
    pub fn is_generation_failure(&self) -> bool {
        !matches!(self, LlmError::MalformedOutput(_))
    }
}
