// Backend adapter: prompt in, note candidates out.
//
// Wraps a `CompletionBackend` call with the fixed system prompt and the
// configured model/temperature, then pulls the first-`[`-to-last-`]` JSON
// array out of the reply and parses it as `NoteCandidate`s. Service errors
// become `ComposeError::Generation`; replies without a usable array become
// `ComposeError::MalformedOutput`.

use composer_llm::extract::parse_json_array;
use composer_llm::{CompletionBackend, CompletionRequest};
use tracing::info;

use crate::config::ComposerConfig;
use crate::error::ComposeError;
use crate::note::NoteCandidate;
use crate::prompt::SYSTEM_PROMPT;

/// Build the completion request for a composed prompt.
pub fn completion_request(config: &ComposerConfig, prompt: &str) -> CompletionRequest {
    CompletionRequest {
        model: config.model.clone(),
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: prompt.to_string(),
        temperature: config.temperature,
    }
}

/// Ask the backend for a melody and parse its reply.
pub fn generate_candidates<B: CompletionBackend + ?Sized>(
    backend: &B,
    config: &ComposerConfig,
    prompt: &str,
) -> Result<Vec<NoteCandidate>, ComposeError> {
    let request = completion_request(config, prompt);
    let reply = backend.complete(&request)?;
    let candidates: Vec<NoteCandidate> = parse_json_array(&reply)?;
    info!(candidates = candidates.len(), "parsed AI note candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_llm::LlmError;

    struct Canned(&'static str);

    impl CompletionBackend for Canned {
        fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct Down;

    impl CompletionBackend for Down {
        fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            Err(LlmError::Request("connection refused".into()))
        }
    }

    #[test]
    fn request_carries_config_and_prompts() {
        let config = ComposerConfig::default();
        let request = completion_request(&config, "make music");
        assert_eq!(request.model, config.model);
        assert_eq!(request.temperature, 1.0);
        assert_eq!(request.system_prompt, SYSTEM_PROMPT);
        assert_eq!(request.user_prompt, "make music");
    }

    #[test]
    fn parses_array_inside_prose() {
        let backend = Canned("Sure! [{\"pitch\": 60, \"duration\": 1, \"velocity\": 70}] Done.");
        let notes = generate_candidates(&backend, &ComposerConfig::default(), "p").unwrap();
        assert_eq!(notes, vec![NoteCandidate::new(60.0, 1.0, 70.0)]);
    }

    #[test]
    fn prose_only_is_malformed() {
        let backend = Canned("I'd rather not.");
        let err = generate_candidates(&backend, &ComposerConfig::default(), "p").unwrap_err();
        assert!(matches!(err, ComposeError::MalformedOutput(_)));
        assert!(err.to_string().contains("malformed AI output"));
    }

    #[test]
    fn service_failure_is_generation_error() {
        let err = generate_candidates(&Down, &ComposerConfig::default(), "p").unwrap_err();
        assert!(matches!(err, ComposeError::Generation(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
