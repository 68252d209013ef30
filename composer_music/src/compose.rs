// Orchestration of one composition request.
//
// The pipeline is strictly linear, one stage feeding the next:
//
//   parse command -> enumerate scale -> compose prompt -> generate
//     -> repair to scale -> clamp to piano range -> write MIDI
//
// Each stage returns `Result<_, ComposeError>` and `try_compose` chains them
// with `?`. `compose_from_command` is the only place errors are caught: every
// failure becomes a `CompositionResult` with `success = false` and a message,
// so callers never see an `Err`. A result only claims success once the MIDI
// file is on disk.
//
// The composer holds no per-request state. The backend call is the only
// blocking step; concurrent requests share nothing but the output directory.

use chrono::Utc;
use composer_llm::{CompletionBackend, OpenAiBackend};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::command::parse_command;
use crate::config::ComposerConfig;
use crate::error::ComposeError;
use crate::generate::generate_candidates;
use crate::midi::{MidiOptions, generate_filename, write_melody};
use crate::prompt::compose_prompt;
use crate::theory::enumerate_scale;
use crate::validate::{clamp_to_piano_range, repair_to_scale};

/// Tempo of every composition.
pub const TEMPO_BPM: u16 = 120;
/// Time signature of every composition.
pub const TIME_SIGNATURE: (u8, u8) = (4, 4);
/// Octaves spanned by the allowed pitch set.
pub const SCALE_OCTAVES: u8 = 2;

/// Summary of a successful composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionDetails {
    pub root: String,
    pub scale: String,
    pub bars: u32,
    pub tempo: u16,
    pub note_count: usize,
}

/// Outcome of `compose_from_command`, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CompositionDetails>,
}

impl CompositionResult {
    fn failure(message: String) -> Self {
        CompositionResult {
            success: false,
            filepath: None,
            filename: None,
            message,
            details: None,
        }
    }
}

/// Runs composition requests against a completion backend.
pub struct Composer<B> {
    backend: B,
    config: ComposerConfig,
}

impl Composer<OpenAiBackend> {
    /// A composer backed by the HTTP chat-completions client, keyed from
    /// `OPENAI_API_KEY`.
    pub fn from_config(config: ComposerConfig) -> Self {
        let backend = OpenAiBackend::from_env(config.openai_config());
        Composer::new(backend, config)
    }
}

impl<B: CompletionBackend> Composer<B> {
    pub fn new(backend: B, config: ComposerConfig) -> Self {
        Composer { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Parse a command, generate a melody and write it to disk. Never fails;
    /// errors are reported through the returned result.
    pub fn compose_from_command(&self, command: &str) -> CompositionResult {
        match self.try_compose(command) {
            Ok(result) => result,
            Err(ComposeError::CommandSyntax) => {
                info!(command, "rejected command");
                CompositionResult::failure(ComposeError::CommandSyntax.to_string())
            }
            Err(err @ ComposeError::EmptyGeneration) => {
                error!(error = %err, "composition failed");
                CompositionResult::failure(err.to_string())
            }
            Err(err) => {
                error!(error = %err, "composition failed");
                CompositionResult::failure(format!("Error composing melody: {err}"))
            }
        }
    }

    fn try_compose(&self, command: &str) -> Result<CompositionResult, ComposeError> {
        let request = parse_command(command)?;
        let scale_notes = enumerate_scale(&request.root, request.scale.name(), SCALE_OCTAVES)?;
        let prompt = compose_prompt(&request, &scale_notes);

        info!(
            root = %request.root,
            scale = %request.scale,
            bars = request.bars,
            "asking AI to compose melody"
        );
        let candidates = generate_candidates(&self.backend, &self.config, &prompt)?;
        if candidates.is_empty() {
            return Err(ComposeError::EmptyGeneration);
        }

        let mut notes = repair_to_scale(&candidates, &scale_notes);
        clamp_to_piano_range(&mut notes);
        info!(notes = notes.len(), "AI generated melody");

        let filename = generate_filename(&request.root, request.scale.name(), Utc::now());
        let options = MidiOptions {
            tempo_bpm: TEMPO_BPM,
            time_signature: TIME_SIGNATURE,
        };
        let path = write_melody(&notes, &filename, &options, &self.config.output_dir)?;

        Ok(CompositionResult {
            success: true,
            filepath: Some(path.display().to_string()),
            filename: Some(filename),
            message: format!(
                "Successfully composed a {}-bar AI-generated melody in {} {}!",
                request.bars, request.root, request.scale
            ),
            details: Some(CompositionDetails {
                root: request.root,
                scale: request.scale.name().to_string(),
                bars: request.bars,
                tempo: TEMPO_BPM,
                note_count: notes.len(),
            }),
        })
    }
}

/// Compose with the default configuration and the HTTP backend.
pub fn compose_from_command(command: &str) -> CompositionResult {
    Composer::from_config(ComposerConfig::default()).compose_from_command(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_llm::{CompletionRequest, LlmError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl Counting {
        fn new(reply: &'static str) -> Self {
            Counting {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CompletionBackend for Counting {
        fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    fn composer(reply: &'static str, dir: &std::path::Path) -> Composer<Counting> {
        let config = ComposerConfig {
            output_dir: dir.to_path_buf(),
            ..ComposerConfig::default()
        };
        Composer::new(Counting::new(reply), config)
    }

    #[test]
    fn syntax_error_returns_usage_without_backend_call() {
        let dir = tempfile::tempdir().unwrap();
        let composer = composer("[]", dir.path());
        let result = composer.compose_from_command("play C minor");
        assert!(!result.success);
        assert!(result.message.contains("Available scales"));
        assert_eq!(composer.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_spelling_fails_before_generation() {
        let dir = tempfile::tempdir().unwrap();
        let composer = composer("[]", dir.path());
        let result = composer.compose_from_command("compose cb major");
        assert!(!result.success);
        assert!(result.message.contains("unknown note"));
        assert_eq!(composer.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_array_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let composer = composer("[]", dir.path());
        let result = composer.compose_from_command("compose c major");
        assert!(!result.success);
        assert_eq!(result.message, "AI failed to generate a melody");
        assert_eq!(composer.backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failure_result_serializes_without_optional_fields() {
        let result = CompositionResult::failure("nope".into());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "nope" }));
    }

    #[test]
    fn details_use_camel_case() {
        let details = CompositionDetails {
            root: "c".into(),
            scale: "minor".into(),
            bars: 8,
            tempo: 120,
            note_count: 3,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["noteCount"], 3);
    }
}
