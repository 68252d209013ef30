// Command parsing.
//
// Accepts commands of the form `compose <note> <scale>`, case-insensitively,
// e.g. "compose C minor" or "Compose f# harmonic-minor". The note token is a
// letter A-G with an optional `#` or `b`; the scale token must be one of the
// six supported scales. Surrounding text is tolerated, so "please compose d
// blues" parses too.
//
// The bar count is not part of the grammar: every request is `DEFAULT_BARS`
// long.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ComposeError;
use crate::theory::Scale;

/// Bars per composition.
pub const DEFAULT_BARS: u32 = 8;

static COMPOSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bcompose\s+([a-g][#b]?)\s+(harmonic-minor|melodic-minor|major|minor|pentatonic|blues)\b",
    )
    .expect("compose pattern is a valid regex")
});

/// A parsed composition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionRequest {
    /// Root note as typed, lowercased (e.g. "c#", "bb").
    pub root: String,
    pub scale: Scale,
    pub bars: u32,
}

/// Usage hint returned for commands that do not parse.
pub fn usage() -> String {
    format!(
        "Invalid command. Use format: \"compose [note] [scale]\"\n\
         Example: \"compose C minor\" or \"compose D major\"\n\n\
         Available scales: {}",
        Scale::names_list()
    )
}

/// Parse a command string. Fails with `ComposeError::CommandSyntax` when the
/// grammar does not match.
pub fn parse_command(command: &str) -> Result<CompositionRequest, ComposeError> {
    let lowered = command.trim().to_lowercase();
    let captures = COMPOSE_PATTERN
        .captures(&lowered)
        .ok_or(ComposeError::CommandSyntax)?;

    let root = captures[1].to_string();
    let scale = Scale::from_name(&captures[2]).ok_or(ComposeError::CommandSyntax)?;

    Ok(CompositionRequest {
        root,
        scale,
        bars: DEFAULT_BARS,
    })
}
