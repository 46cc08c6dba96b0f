/*!
 * Scene compiler.
 *
 * Asks the language model for renderer source code for one cue, cleans the
 * answer up and finds the declared scene class. Both cleanup and class
 * detection are text matchers, not a Python parser: the first import line
 * starts the code and the first `class X(...Scene...):` line names it.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::content::PromptTemplate;
use crate::cues::VisualCue;
use crate::errors::CompileError;
use crate::providers::{CompletionRequest, Provider};

static IMPORT_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(from\s+[A-Za-z_][\w.]*\s+import\b|import\s+[A-Za-z_])").unwrap()
});

static SCENE_CLASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"class\s+([a-zA-Z0-9_]+)\s*\(.*Scene.*\):").unwrap()
});

/// Renderable source for one cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSource {
    /// Index of the cue this scene belongs to
    pub cue_index: usize,
    /// The cue description
    pub cue: String,
    /// Declared scene class name
    pub scene_name: String,
    /// Sanitized program text
    pub code: String,
}

/// Remove Markdown fences and anything before the first import line.
///
/// Returns an empty string when no import line exists. The operation is
/// idempotent.
pub fn sanitize_code(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();

    match lines.iter().position(|line| IMPORT_LINE_REGEX.is_match(line)) {
        Some(start) => lines[start..].join("\n").trim_end().to_string(),
        None => String::new(),
    }
}

/// Name of the first class deriving from something called `*Scene*`
pub fn find_scene_name(code: &str) -> Option<String> {
    SCENE_CLASS_REGEX
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Turns cues into scene sources with the language model
pub struct SceneCompiler {
    provider: Arc<dyn Provider>,
    template: PromptTemplate,
    temperature: f32,
    max_tokens: u32,
}

impl SceneCompiler {
    pub fn new(provider: Arc<dyn Provider>, template: PromptTemplate, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            template,
            temperature,
            max_tokens,
        }
    }

    /// Generate, sanitize and identify the scene for one cue.
    ///
    /// A model failure is `CompileError::Provider`; a response without a
    /// scene class is `CompileError::MissingSceneIdentifier`.
    pub async fn compile(&self, cue: &VisualCue) -> Result<SceneSource, CompileError> {
        let prompt = self.template.render(&[("concept_description", &cue.description)]);
        let request = CompletionRequest::new(prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);
        let generation = self.provider.complete(request).await?;

        let code = sanitize_code(&generation.text);
        debug!("Scene code for cue '{}':\n{}", cue.description, code);

        let scene_name = find_scene_name(&code).ok_or_else(|| CompileError::MissingSceneIdentifier {
            cue: cue.description.clone(),
        })?;

        Ok(SceneSource {
            cue_index: cue.index,
            cue: cue.description.clone(),
            scene_name,
            code,
        })
    }
}
