/*!
 * End-to-end session tests with fake pipeline stages
 */

use std::path::PathBuf;
use papercast::cues::cue_descriptions;
use papercast::errors::{AppError, LoaderError, ProviderError};
use papercast::providers::mock::MockProvider;
use papercast::providers::CompletionRequest;
use crate::common::{self, FakeRenderer, StaticPaperSource};

const PAPER: &str = "We propose the Transformer, a model based solely on attention.";

/// Test the whole pipeline with every stage succeeding
#[tokio::test]
async fn test_produce_withWorkingStages_shouldRenderEveryCueInOrder() {
    let h = common::harness(
        common::tagged_config(),
        common::tagged_provider(),
        StaticPaperSource::with_text(PAPER),
        FakeRenderer::default(),
    );

    let artifacts = h.controller.produce("Attention Is All You Need").await.expect("artifacts");

    assert_eq!(artifacts.summary.text, "A short summary.");
    assert_eq!(artifacts.key_ideas.text, "Attention replaces recurrence.");
    assert_eq!(artifacts.blog_post.text, "# A blog post");
    assert_eq!(cue_descriptions(&artifacts.cues), vec!["a red circle", "a blue square"]);
    assert_eq!(
        artifacts.clips,
        vec![PathBuf::from("media/000_TempScene.mp4"), PathBuf::from("media/001_TempScene.mp4")]
    );
    assert!(artifacts.failures.is_empty());
    assert_eq!(artifacts.final_video, Some(PathBuf::from("final_video.mp4")));

    // One summary map, one combine, key ideas, blog, script, two scenes
    assert_eq!(h.provider.call_count(), 7);
    let prompts = h.provider.prompts();
    assert!(prompts[2].starts_with("KEYIDEAS:") && prompts[2].contains(PAPER));
    assert_eq!(prompts[3], "BLOG: A short summary. | Attention replaces recurrence.");
    assert_eq!(prompts[5], "SCENE: a red circle");
    assert_eq!(prompts[6], "SCENE: a blue square");

    let rendered = h.renderer.rendered();
    assert_eq!(rendered.len(), 2);
    assert!(rendered.iter().all(|s| s.code.starts_with("from manim import *")));

    let calls = h.assembler.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, artifacts.clips);
    assert_eq!(calls[0].1, common::TEST_SCRIPT);
}

/// Test that a failing render skips only that cue
#[tokio::test]
async fn test_produce_withOneFailingRender_shouldKeepOtherClips() {
    let h = common::harness(
        common::tagged_config(),
        common::tagged_provider(),
        StaticPaperSource::with_text(PAPER),
        FakeRenderer::failing_on("red"),
    );

    let artifacts = h.controller.produce("paper").await.expect("artifacts");

    assert_eq!(artifacts.clips, vec![PathBuf::from("media/001_TempScene.mp4")]);
    assert_eq!(artifacts.failures.len(), 1);
    assert_eq!(artifacts.failures[0].cue.description, "a red circle");
    assert_eq!(h.renderer.rendered().len(), 2, "the second cue is still attempted");
    assert_eq!(h.assembler.calls()[0].0, artifacts.clips);
}

fn script_with_unusable_cue(request: &CompletionRequest) -> String {
    if request.prompt.starts_with("SCRIPT:") {
        "[VISUAL: nonsense] then [VISUAL: a blue square]".to_string()
    } else {
        common::tagged_response(request)
    }
}

/// Test that scene code without a scene class skips that cue without rendering
#[tokio::test]
async fn test_produce_withMissingSceneClass_shouldSkipCueBeforeRendering() {
    let h = common::harness(
        common::tagged_config(),
        MockProvider::scripted(script_with_unusable_cue),
        StaticPaperSource::with_text(PAPER),
        FakeRenderer::default(),
    );

    let artifacts = h.controller.produce("paper").await.expect("artifacts");

    assert_eq!(artifacts.cues.len(), 2);
    assert_eq!(artifacts.failures.len(), 1);
    assert_eq!(artifacts.failures[0].cue.description, "nonsense");
    let rendered = h.renderer.rendered();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].cue, "a blue square");
    assert_eq!(rendered[0].cue_index, 1);
    assert_eq!(artifacts.clips, vec![PathBuf::from("media/001_TempScene.mp4")]);
}

fn script_without_cues(request: &CompletionRequest) -> String {
    if request.prompt.starts_with("SCRIPT:") {
        "Just narration, nothing to draw.".to_string()
    } else {
        common::tagged_response(request)
    }
}

/// Test that a script without cues produces no clips and no video
#[tokio::test]
async fn test_produce_withNoCues_shouldSkipRenderingAndVideo() {
    let h = common::harness(
        common::tagged_config(),
        MockProvider::scripted(script_without_cues),
        StaticPaperSource::with_text(PAPER),
        FakeRenderer::default(),
    );

    let artifacts = h.controller.produce("paper").await.expect("artifacts");

    assert!(artifacts.cues.is_empty());
    assert!(artifacts.clips.is_empty());
    assert!(artifacts.final_video.is_none());
    assert!(h.renderer.rendered().is_empty());
    assert_eq!(h.provider.call_count(), 5, "no scene prompts");
}

/// Test that a paper that cannot be found stops before any model call
#[tokio::test]
async fn test_produce_withUnknownPaper_shouldAbortBeforeGeneration() {
    let h = common::harness(
        common::tagged_config(),
        common::tagged_provider(),
        StaticPaperSource::not_found(),
        FakeRenderer::default(),
    );

    let result = h.controller.produce("A Paper That Does Not Exist").await;

    assert!(matches!(result, Err(AppError::Loader(LoaderError::NotFound(_)))));
    assert_eq!(h.provider.call_count(), 0);
    assert!(h.assembler.calls().is_empty());
}

/// Test that a model failure aborts the session
#[tokio::test]
async fn test_produce_withFailingProvider_shouldReturnProviderError() {
    let h = common::harness(
        common::tagged_config(),
        MockProvider::failing(),
        StaticPaperSource::with_text(PAPER),
        FakeRenderer::default(),
    );

    let result = h.controller.produce("paper").await;

    assert!(matches!(result, Err(AppError::Provider(ProviderError::ConnectionError(_)))));
    assert_eq!(h.provider.call_count(), 1);
    assert!(h.renderer.rendered().is_empty());
}

/// Test that a model failure while compiling one scene only skips that cue
#[tokio::test]
async fn test_renderCues_withProviderFailureOnOneScene_shouldSkipThatCue() {
    // Calls: summary map, combine, key ideas, blog, script succeed; first scene fails
    let h = common::harness(
        common::tagged_config(),
        MockProvider::intermittent(6).with_custom_response(common::tagged_response),
        StaticPaperSource::with_text(PAPER),
        FakeRenderer::default(),
    );

    let artifacts = h.controller.produce("paper").await.expect("session should complete");

    assert_eq!(h.provider.call_count(), 7);
    assert_eq!(artifacts.failures.len(), 1);
    assert_eq!(artifacts.failures[0].cue.description, "a red circle");
    assert!(artifacts.failures[0].reason.contains("Simulated failure"));

    let rendered = h.renderer.rendered();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].cue, "a blue square");
    assert_eq!(artifacts.clips.len(), 1);
    assert_eq!(artifacts.final_video, Some(PathBuf::from("final_video.mp4")));
}
