/*!
 * Prompt templates for content generation.
 *
 * Templates use `{name}` placeholders. Rendering is single-pass, so
 * generated text that happens to contain a placeholder is never expanded
 * a second time.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::app_config::PromptOverrides;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap()
});

/// A prompt template with `{name}` placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Map-reduce summarisation prompt, used for both map and combine steps.
    pub const SUMMARY: &'static str = "Write a concise summary of the following:


\"{text}\"


CONCISE SUMMARY:";

    pub const KEY_IDEAS: &'static str = "Identify the key contributions, methodologies, and the central thesis of the following research paper:
{text}

Provide a concise summary of each of the following:
- Key Contributions:
- Methodologies:
- Central Thesis:";

    pub const BLOG_POST: &'static str = "Write a blog post explaining the following research paper in an accessible way for a general audience with some technical background.

Here is a summary of the research paper:

{summary}

Here are the key ideas and methodology from the paper:

{key_ideas}

The post should open with why the problem matters, walk through the approach in plain language, present the main results, and close with the limitations and what comes next. Use short sections with headings. Do not invent results that are not in the summary.

Blog Post:";

    pub const VIDEO_SCRIPT: &'static str = "You are a scriptwriter for educational videos. Your task is to create a script for a 3-5 minute explainer video about a research paper. The video is aimed at a general audience with some technical background.

Here is a summary of the research paper:

{summary}

Here are the key ideas and methodology from the paper:

{key_ideas}

Your script MUST follow this structure EXACTLY:

1. **INTRODUCTION (0:00-0:30):**
   - Start with a hook to grab the viewer's attention (e.g., a surprising fact, a relevant question, a real-world problem).
   - Briefly introduce the topic of the research paper.
   - State the main finding of the paper in a single sentence.

2. **CORE CONCEPTS (0:30-2:00):**
   - Explain the core concepts and methods used in the research.
   - Use clear, simple language. Avoid jargon as much as possible.
   - Break down complex ideas into smaller, digestible steps.
   - Use analogies and real-world examples.
   - Include specific cues for visuals. Use the following format for visual cues: `[VISUAL: description of visual]`. For instance:
     - `[VISUAL: Diagram of the model architecture]`
     - `[VISUAL: Animation showing the algorithm in action]`
     - `[VISUAL: Graph showing the results]`
     - `[VISUAL: Equation for X]`

3. **RESULTS AND IMPLICATIONS (2:00-3:30):**
   - Describe the main results of the research.
   - Explain the implications of these results. Why are they important?
   - Discuss any limitations of the research.
   - Include visual cues.

4. **CONCLUSION (3:30-4:00):**
   - Briefly summarize the key takeaways.
   - Suggest potential future research directions.
   - End with a call to action (e.g., \"Read the full paper here: [link]\", \"Subscribe for more science videos!\").

5. **END SCREEN (4:00-4:30):**
   - [VISUAL: End screen with title, author, and call to subscribe/follow]

Write the script, including the narration text and the visual cues. Be concise, engaging, and informative. Maintain an objective tone. Do NOT include timings in your output; ONLY include the narration text and visual cues.

Video Script:";

    pub const SCENE: &'static str = "You are a Manim code generator. Your ONLY task is to generate Manim Community Edition code that visualizes the following visual cue:

Visual Cue: {concept_description}

Generate Manim code that:
- Starts with the import `from manim import *`.
- Creates a class called `TempScene` that inherits from `Scene`.
- Implements the `construct` method.
- Uses the `Text` class to display a short caption for the cue, centered with `text.move_to(ORIGIN)` and colored with `color=BLUE`.
- Adds simple shapes or equations when the cue asks for them.
- Includes `self.add(text)` and ends with `self.wait(1)`.

Example:

from manim import *

class TempScene(Scene):
    def construct(self):
        text = Text(\"Hello, Manim!\", color=BLUE)
        text.move_to(ORIGIN)
        self.add(text)
        self.wait(1)

Return ONLY the Python source code, with no explanation and no Markdown.

Manim Code:";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Raw template text
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Render the template, replacing each known `{name}` exactly once.
    /// Unknown placeholders are left untouched.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        PLACEHOLDER_REGEX
            .replace_all(&self.template, |caps: &Captures| {
                let name = &caps[1];
                vars.iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Every template used by a session
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub summary: PromptTemplate,
    pub key_ideas: PromptTemplate,
    pub blog_post: PromptTemplate,
    pub video_script: PromptTemplate,
    pub scene: PromptTemplate,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            summary: PromptTemplate::new(PromptTemplate::SUMMARY),
            key_ideas: PromptTemplate::new(PromptTemplate::KEY_IDEAS),
            blog_post: PromptTemplate::new(PromptTemplate::BLOG_POST),
            video_script: PromptTemplate::new(PromptTemplate::VIDEO_SCRIPT),
            scene: PromptTemplate::new(PromptTemplate::SCENE),
        }
    }
}

impl PromptSet {
    /// Built-in templates with any caller-supplied ones swapped in
    pub fn from_overrides(overrides: &PromptOverrides) -> Self {
        let pick = |custom: &Option<String>, builtin: &str| {
            PromptTemplate::new(custom.as_deref().unwrap_or(builtin))
        };

        Self {
            summary: pick(&overrides.summary, PromptTemplate::SUMMARY),
            key_ideas: pick(&overrides.key_ideas, PromptTemplate::KEY_IDEAS),
            blog_post: pick(&overrides.blog_post, PromptTemplate::BLOG_POST),
            video_script: pick(&overrides.video_script, PromptTemplate::VIDEO_SCRIPT),
            scene: pick(&overrides.scene, PromptTemplate::SCENE),
        }
    }
}
