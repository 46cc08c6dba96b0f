/*!
 * Tests for scene code generation
 */

use std::sync::Arc;
use papercast::content::PromptTemplate;
use papercast::cues::extract_cues;
use papercast::errors::{CompileError, ProviderError};
use papercast::providers::mock::MockProvider;
use papercast::scene::{find_scene_name, sanitize_code, SceneCompiler};
use crate::common;

fn compiler(provider: &MockProvider) -> SceneCompiler {
    SceneCompiler::new(
        Arc::new(provider.clone()),
        PromptTemplate::new(PromptTemplate::SCENE),
        0.0,
        1024,
    )
}

/// Test a full compile of a fenced model answer
#[tokio::test]
async fn test_compile_withFencedAnswer_shouldReturnCleanScene() {
    let provider = MockProvider::scripted(|_| common::TEST_SCENE_CODE.to_string());
    let cues = extract_cues("[VISUAL: a red circle]");

    let scene = compiler(&provider).compile(&cues[0]).await.expect("scene");
    assert_eq!(scene.scene_name, "TempScene");
    assert_eq!(scene.cue, "a red circle");
    assert_eq!(scene.cue_index, 0);
    assert!(scene.code.starts_with("from manim import *"));
    assert!(!scene.code.contains("```"));
    assert!(!scene.code.contains("Here you go"));

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Visual Cue: a red circle"));
}

/// Test that an answer without a scene class is rejected
#[tokio::test]
async fn test_compile_withoutSceneClass_shouldReturnMissingIdentifier() {
    let provider = MockProvider::scripted(|_| "from manim import *\n\nprint('no scene')".to_string());
    let cues = extract_cues("[VISUAL: nothing to see]");

    match compiler(&provider).compile(&cues[0]).await {
        Err(CompileError::MissingSceneIdentifier { cue }) => assert_eq!(cue, "nothing to see"),
        other => panic!("expected MissingSceneIdentifier, got {:?}", other),
    }
}

/// Test that a model failure is surfaced as a provider error
#[tokio::test]
async fn test_compile_withFailingProvider_shouldReturnProviderError() {
    let provider = MockProvider::failing();
    let cues = extract_cues("[VISUAL: a red circle]");

    let result = compiler(&provider).compile(&cues[0]).await;
    assert!(matches!(result, Err(CompileError::Provider(ProviderError::ConnectionError(_)))));
}

/// Test scene detection on a few base class spellings
#[test]
fn test_findSceneName_withSceneSubclasses_shouldMatch() {
    assert_eq!(find_scene_name("class Demo(ThreeDScene):"), Some("Demo".to_string()));
    assert_eq!(find_scene_name("class Demo2 (Scene):"), Some("Demo2".to_string()));
    assert_eq!(find_scene_name("class Demo(manim.Scene):"), Some("Demo".to_string()));
    assert_eq!(find_scene_name("def Scene(): pass"), None);
}

/// Test that sanitizing keeps everything after the first import
#[test]
fn test_sanitizeCode_withTrailingProse_shouldKeepCodeAfterImport() {
    let raw = "```python\nimport numpy as np\nfrom manim import *\nclass S(Scene):\n    pass\n```\n";
    assert_eq!(sanitize_code(raw), "import numpy as np\nfrom manim import *\nclass S(Scene):\n    pass");
}
