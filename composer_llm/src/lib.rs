// composer_llm — completion-backend seam for the melody composer.
//
// This crate is deliberately music-agnostic. It owns the contract between the
// composer and an external text-generation service, plus the tolerant
// parsing needed to pull structured data out of free-form model output.
//
// Module overview:
// - `backend.rs`: `CompletionRequest` and the `CompletionBackend` trait. The
//                 orchestrator in `composer_music` only ever talks to this
//                 trait, so tests can swap in a stub.
// - `openai.rs`:  `OpenAiBackend`, a blocking chat-completions client over
//                 HTTPS (`ureq`). Reads its credential from the process
//                 environment at call time.
// - `extract.rs`: First-`[`-to-last-`]` JSON array extraction and typed
//                 parsing of that substring.
// - `error.rs`:   `LlmError`, shared by all of the above.

pub mod backend;
pub mod error;
pub mod extract;
pub mod openai;

pub use backend::{CompletionBackend, CompletionRequest};
pub use error::LlmError;
pub use openai::{OpenAiBackend, OpenAiConfig};
