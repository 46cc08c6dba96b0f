/*!
 * Common test utilities for the papercast test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use tempfile::TempDir;

use papercast::app_config::{Config, PromptOverrides};
use papercast::app_controller::Controller;
use papercast::assembler::VideoAssembler;
use papercast::errors::{AssemblyError, LoaderError, RenderError};
use papercast::paper_loader::PaperSource;
use papercast::providers::mock::MockProvider;
use papercast::providers::CompletionRequest;
use papercast::scene::{SceneRenderer, SceneSource};

/// Script returned for the video script prompt
pub const TEST_SCRIPT: &str = "Welcome to the show.\n\
[VISUAL: a red circle] and [VISUAL: a blue square]\n\
Thanks for watching.";

/// Scene code returned for the scene prompt, wrapped the way models answer
pub const TEST_SCENE_CODE: &str = "Here you go:\n```python\nfrom manim import *\n\nclass TempScene(Scene):\n    def construct(self):\n        self.play(Create(Circle()))\n        self.wait(1)\n```";

static INIT: Once = Once::new();

/// Route library logs to the test output once per test binary
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Warn)
            .is_test(true)
            .try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Config whose prompts start with a recognisable tag per stage
pub fn tagged_config() -> Config {
    let mut config = Config::default();
    config.prompts = PromptOverrides {
        summary: Some("SUMMARIZE: {text}".to_string()),
        key_ideas: Some("KEYIDEAS: {text}".to_string()),
        blog_post: Some("BLOG: {summary} | {key_ideas}".to_string()),
        video_script: Some("SCRIPT: {summary} | {key_ideas}".to_string()),
        scene: Some("SCENE: {concept_description}".to_string()),
    };
    config
}

/// Answers each tagged prompt with canned content
pub fn tagged_response(request: &CompletionRequest) -> String {
    let prompt = request.prompt.as_str();
    if prompt.starts_with("SUMMARIZE:") {
        "A short summary.".to_string()
    } else if prompt.starts_with("KEYIDEAS:") {
        "Attention replaces recurrence.".to_string()
    } else if prompt.starts_with("BLOG:") {
        "# A blog post".to_string()
    } else if prompt.starts_with("SCRIPT:") {
        TEST_SCRIPT.to_string()
    } else if prompt.starts_with("SCENE:") {
        if prompt.contains("nonsense") {
            "I cannot draw that.".to_string()
        } else {
            TEST_SCENE_CODE.to_string()
        }
    } else {
        String::new()
    }
}

/// Mock provider answering the tagged prompts
pub fn tagged_provider() -> MockProvider {
    MockProvider::scripted(tagged_response)
}

/// Paper source returning fixed text, or a not-found error when empty
#[derive(Debug, Clone, Default)]
pub struct StaticPaperSource {
    pub text: Option<String>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl StaticPaperSource {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaperSource for StaticPaperSource {
    async fn load_text(&self, url_or_title: &str) -> Result<String, LoaderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url_or_title.to_string());
        }
        self.text
            .clone()
            .ok_or_else(|| LoaderError::NotFound(format!("No paper found for title: '{}'", url_or_title)))
    }
}

/// Renderer that records scenes and fails on cues containing a marker
#[derive(Debug, Clone, Default)]
pub struct FakeRenderer {
    pub fail_on: Option<&'static str>,
    pub rendered: Arc<Mutex<Vec<SceneSource>>>,
}

impl FakeRenderer {
    pub fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_on: Some(marker),
            ..Default::default()
        }
    }

    pub fn rendered(&self) -> Vec<SceneSource> {
        self.rendered.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SceneRenderer for FakeRenderer {
    async fn render(&self, scene: &SceneSource) -> Result<PathBuf, RenderError> {
        if let Ok(mut rendered) = self.rendered.lock() {
            rendered.push(scene.clone());
        }
        if self.fail_on.is_some_and(|marker| scene.cue.contains(marker)) {
            return Err(RenderError::ProcessFailed {
                command: format!("manim scene.py {}", scene.scene_name),
                status: Some(1),
                stdout: String::new(),
                stderr: "NameError: name 'Circl' is not defined".to_string(),
            });
        }
        Ok(PathBuf::from(format!("media/{:03}_{}.mp4", scene.cue_index, scene.scene_name)))
    }
}

/// Assembler that records the clips it was given
#[derive(Debug, Clone, Default)]
pub struct RecordingAssembler {
    pub calls: Arc<Mutex<Vec<(Vec<PathBuf>, String)>>>,
}

impl RecordingAssembler {
    pub fn calls(&self) -> Vec<(Vec<PathBuf>, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VideoAssembler for RecordingAssembler {
    async fn assemble(&self, clips: &[PathBuf], narration_text: &str) -> Result<Option<PathBuf>, AssemblyError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((clips.to_vec(), narration_text.to_string()));
        }
        if clips.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from("final_video.mp4")))
    }
}

/// Controller wired to fakes, with handles to inspect them afterwards
pub struct TestHarness {
    pub controller: Controller,
    pub provider: MockProvider,
    pub loader: StaticPaperSource,
    pub renderer: FakeRenderer,
    pub assembler: RecordingAssembler,
}

/// Build a controller around the given fakes
pub fn harness(
    config: Config,
    provider: MockProvider,
    loader: StaticPaperSource,
    renderer: FakeRenderer,
) -> TestHarness {
    init_test_logging();
    let assembler = RecordingAssembler::default();
    let controller = Controller::with_components(
        config,
        Arc::new(provider.clone()),
        Box::new(loader.clone()),
        Box::new(renderer.clone()),
        Box::new(assembler.clone()),
    );

    TestHarness {
        controller,
        provider,
        loader,
        renderer,
        assembler,
    }
}
