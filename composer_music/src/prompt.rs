// Prompt composition.
//
// Turns a parsed request and its scale-note set into the user prompt sent to
// the model. The prompt spells out every constraint the validator later
// enforces (allowed pitches, root at both ends, note count, duration and
// velocity conventions) so well-behaved output needs no repair. It also
// carries a per-scale style hint and a short JSON example of the expected
// shape; the example is guidance only and is never parsed back.

use std::fmt::Write;

use crate::command::CompositionRequest;
use crate::theory::{ScaleNotes, character_of};

/// Role instruction sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a professional music composer who creates beautiful, \
    scale-accurate melodies. Always return valid JSON only.";

/// Inclusive note-count range requested for `bars` bars.
pub fn note_count_range(bars: u32) -> (u32, u32) {
    (bars * 3, bars * 4)
}

/// Build the user prompt for a request.
pub fn compose_prompt(request: &CompositionRequest, notes: &ScaleNotes) -> String {
    let root = notes.root();
    let scale = request.scale.name();
    let bars = request.bars;
    let (min_notes, max_notes) = note_count_range(bars);
    let allowed = notes
        .pitches()
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let second = notes.pitches().get(1).copied().unwrap_or(root);
    let third = notes.pitches().get(2).copied().unwrap_or(second);

    let mut prompt = String::new();
    let _ = write!(
        prompt,
        "You are a professional music composer. Create a beautiful {bars}-bar melody in {} {scale}.

CRITICAL RULES - YOU MUST FOLLOW THESE:
1. Use ONLY these MIDI note numbers (these are the {} {scale} scale notes):
   {allowed}

2. Start on the root note: {root}
3. End on the root note: {root}
4. Create {min_notes} to {max_notes} notes total
5. Make it MUSICAL:
   - Use mostly stepwise motion (move to adjacent notes in the list above)
   - Add occasional leaps for interest (jump by 3-4 notes in the scale)
   - Create a clear phrase structure with a climax in the middle
   - Use longer notes (duration 2-4) for phrase endings
   - Use shorter notes (duration 0.5-1) for movement

6. Duration in beats, between 0.25 and 4: 0.25 = sixteenth, 0.5 = eighth, 1 = quarter, 2 = half, 4 = whole
7. Velocity, between 50 and 100: 60-70 = soft, 75-85 = medium, 90-100 = loud
8. Make sure the character matches the scale:
   {}
",
        request.root,
        request.root,
        character_of(scale),
    );

    let _ = write!(
        prompt,
        "
EXAMPLE OF GOOD MELODY STRUCTURE:
- Opening bars: introduce the theme, mostly stepwise, medium velocity
- Middle bars: development, add some leaps, build intensity
- Climax: highest notes, loudest velocity
- Final bars: resolve back to the root, slower rhythm, softer

Return ONLY a valid JSON array (no explanation):
[
  {{\"pitch\": {root}, \"duration\": 1, \"velocity\": 75}},
  {{\"pitch\": {second}, \"duration\": 1, \"velocity\": 80}},
  {{\"pitch\": {third}, \"duration\": 0.5, \"velocity\": 75}}
]

Generate the melody now:"
    );

    prompt
}
