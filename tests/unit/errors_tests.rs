/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use papercast::errors::{AppError, CompileError, LoaderError, ProviderError, RenderError};

/// Test that provider errors carry status and message
#[test]
fn test_providerError_display_shouldIncludeStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "rate limited".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 429 - rate limited");
}

/// Test that loader errors keep the user-facing reason
#[test]
fn test_loaderError_notFound_shouldMentionTitle() {
    let error = LoaderError::NotFound("No paper found for title: 'Nothing'".to_string());
    assert!(error.to_string().contains("No paper found for title: 'Nothing'"));
}

/// Test that compile errors wrap provider errors transparently
#[test]
fn test_compileError_fromProviderError_shouldBeProviderVariant() {
    let error: CompileError = ProviderError::ConnectionError("down".to_string()).into();
    assert!(matches!(error, CompileError::Provider(_)));

    let missing = CompileError::MissingSceneIdentifier { cue: "a red circle".to_string() };
    assert!(missing.to_string().contains("a red circle"));
}

/// Test that render errors expose the expected clip path
#[test]
fn test_renderError_outputNotFound_shouldShowPaths() {
    let error = RenderError::OutputNotFound {
        expected: PathBuf::from("media/videos/s/480p15/TempScene.mp4"),
        searched: PathBuf::from("media"),
    };
    let text = error.to_string();
    assert!(text.contains("TempScene.mp4"));
    assert!(text.contains("media"));
}

/// Test conversions into the application error
#[test]
fn test_appError_conversions_shouldPickMatchingVariant() {
    let from_loader: AppError = LoaderError::Extraction("empty".to_string()).into();
    assert!(matches!(from_loader, AppError::Loader(_)));

    let from_render: AppError = RenderError::Timeout(5).into();
    assert!(matches!(from_render, AppError::Render(_)));

    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(from_io, AppError::File(_)));

    let from_anyhow: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(from_anyhow, AppError::Unknown(ref m) if m == "boom"));
}
