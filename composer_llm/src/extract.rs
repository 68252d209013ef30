// Tolerant extraction of JSON arrays from model output.
//
// Models frequently wrap the requested JSON in commentary or code fences.
// Rather than demand a clean payload, we take the substring from the first
// `[` to the last `]` and parse only that. Anything that still fails to
// parse is reported as `LlmError::MalformedOutput`, never a panic.

use serde::de::DeserializeOwned;

use crate::error::LlmError;

/// Return the substring spanning the first `[` through the last `]`, or
/// `None` if the text holds no such span.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract the embedded JSON array and deserialize it as a `Vec<T>`.
pub fn parse_json_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, LlmError> {
    let json = extract_json_array(text)
        .ok_or_else(|| LlmError::MalformedOutput("no JSON array in response".into()))?;
    serde_json::from_str(json).map_err(|e| LlmError::MalformedOutput(e.to_string()))
}
