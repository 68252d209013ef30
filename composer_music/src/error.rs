// The composer's error type.
//
// One variant per failure kind a composition request can hit. None of these
// reach the caller of `compose_from_command` directly; the orchestrator turns
// each into a failed `CompositionResult` carrying its message.

use composer_llm::LlmError;
use thiserror::Error;

use crate::command::usage;
use crate::midi::WriteError;
use crate::theory::TheoryError;

#[derive(Debug, Error)]
pub enum ComposeError {
    /// The command did not match `compose <note> <scale>`.
    #[error("{}", usage())]
    CommandSyntax,

    /// Note or scale lookup failed after parsing (e.g. "cb", "e#").
    #[error(transparent)]
    Theory(#[from] TheoryError),

    /// The completion service could not be reached or refused the request.
    #[error("generation failed: {0}")]
    Generation(LlmError),

    /// The service answered without a usable JSON array.
    #[error("{0}")]
    MalformedOutput(LlmError),

    /// The service returned an empty array.
    #[error("AI failed to generate a melody")]
    EmptyGeneration,

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl From<LlmError> for ComposeError {
    fn from(err: LlmError) -> Self {
        if err.is_generation_failure() {
            ComposeError::Generation(err)
        } else {
            ComposeError::MalformedOutput(err)
        }
    }
}
