// Blocking chat-completions client.
//
// Speaks the OpenAI-compatible `/v1/chat/completions` wire format: a system
// message plus a user message in, `choices[0].message.content` out. The
// request blocks the calling thread until the service answers; there is no
// retry. A timeout is applied only when `OpenAiConfig::timeout_secs` is set.
//
// The API key is process-wide state taken from `OPENAI_API_KEY` when the
// backend is built. A missing key is not an error until `complete` is
// actually called, so constructing a backend never fails.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{CompletionBackend, CompletionRequest};
use crate::error::LlmError;

/// Environment variable holding the service credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Connection settings for `OpenAiBackend`.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenAiConfig {
    pub endpoint: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

impl<'a> ChatRequest<'a> {
    fn from_completion(request: &'a CompletionRequest) -> Self {
        ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, or `"[]"` when the service returned nothing.
    fn into_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "[]".to_string())
    }
}

/// Chat-completions backend over HTTPS.
pub struct OpenAiBackend {
    config: OpenAiConfig,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl OpenAiBackend {
    /// Build a backend with an explicit key. `None` makes every call fail
    /// with `LlmError::MissingCredential`.
    pub fn new(config: OpenAiConfig, api_key: Option<String>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(secs) = config.timeout_secs.filter(|&s| s > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self {
            config,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            agent: builder.build(),
        }
    }

    /// Build a backend whose key is read from `OPENAI_API_KEY`.
    pub fn from_env(config: OpenAiConfig) -> Self {
        Self::new(config, std::env::var(API_KEY_ENV).ok())
    }
}

impl CompletionBackend for OpenAiBackend {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingCredential(API_KEY_ENV))?;

        info!(
            model = %request.model,
            temperature = request.temperature,
            prompt_chars = request.user_prompt.len(),
            "submitting completion request"
        );

        let response = self
            .agent
            .post(&self.config.endpoint)
            .set("Authorization", &format!("Bearer {api_key}"))
            .send_json(ChatRequest::from_completion(request))
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => LlmError::Status {
                    status,
                    body: response.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => LlmError::Request(t.to_string()),
            })?;

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|e| LlmError::Decode(e.to_string()))?;
        let content = parsed.into_content();

        info!(response_chars = content.len(), "completion received");
        debug!(%content, "completion text");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".into(),
            system_prompt: "be terse".into(),
            user_prompt: "compose".into(),
            temperature: 1.0,
        }
    }

    #[test]
    fn request_body_has_system_then_user() {
        let request = sample_request();
        let body = serde_json::to_value(ChatRequest::from_completion(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 1.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be terse");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "compose");
    }

    #[test]
    fn response_content_is_first_choice() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"[1]"}},
                       {"message":{"role":"assistant","content":"[2]"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_content(), "[1]");
    }

    #[test]
    fn empty_response_defaults_to_empty_array() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(parsed.into_content(), "[]");

        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(parsed.into_content(), "[]");
    }

    #[test]
    fn missing_key_fails_without_network() {
        let backend = OpenAiBackend::new(
            OpenAiConfig {
                endpoint: "http://127.0.0.1:9/unreachable".into(),
                timeout_secs: Some(1),
            },
            Some("   ".into()),
        );
        let err = backend.complete(&sample_request()).unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential(API_KEY_ENV)));
        assert!(err.is_generation_failure());
    }
}
