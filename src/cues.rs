/*!
 * Visual cue extraction.
 *
 * A best-effort, line-oriented text matcher for `[VISUAL: <description>]`
 * tags in a video script. It is not a parser: a tag never spans lines and
 * the description ends at the first `]`. Every tag on a line is collected
 * in order of appearance, and duplicates are kept.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static CUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[VISUAL:\s*(.*?)\s*\]").unwrap()
});

/// One visual cue found in a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualCue {
    /// Position in the cue sequence, starting at 0
    pub index: usize,
    /// 1-based script line the cue was found on
    pub line: usize,
    /// Text between `[VISUAL:` and `]`, trimmed
    pub description: String,
}

impl fmt::Display for VisualCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Scan `script` line by line and collect every visual cue in order
pub fn extract_cues(script: &str) -> Vec<VisualCue> {
    let mut cues = Vec::new();
    for (line_idx, line) in script.lines().enumerate() {
        for caps in CUE_REGEX.captures_iter(line) {
            let description = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            cues.push(VisualCue {
                index: cues.len(),
                line: line_idx + 1,
                description: description.to_string(),
            });
        }
    }
    cues
}

/// Just the descriptions, in order
pub fn cue_descriptions(cues: &[VisualCue]) -> Vec<String> {
    cues.iter().map(|c| c.description.clone()).collect()
}
