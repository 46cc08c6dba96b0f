/*!
 * Tests for provider construction, wire formats and the mock provider
 */

use anyhow::Result;
use papercast::app_config::{LlmConfig, LlmProvider};
use papercast::errors::ProviderError;
use papercast::providers::anthropic::{Anthropic, AnthropicRequest, AnthropicResponse};
use papercast::providers::mock::MockProvider;
use papercast::providers::ollama::{ChatRequest, Ollama};
use papercast::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};
use papercast::providers::{self, CompletionRequest, Provider};

fn llm_config(provider: LlmProvider, api_key: &str) -> LlmConfig {
    LlmConfig {
        provider,
        api_key: api_key.to_string(),
        ..Default::default()
    }
}

/// Test that hosted providers refuse to start without a key
#[test]
fn test_fromConfig_withHostedProviderAndNoKey_shouldFailAuthentication() {
    for provider in [LlmProvider::OpenAI, LlmProvider::Anthropic] {
        let result = providers::from_config(&llm_config(provider, ""));
        assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
    }
}

/// Test that each provider type builds the matching client
#[test]
fn test_fromConfig_withValidConfig_shouldBuildMatchingClient() -> Result<()> {
    assert_eq!(providers::from_config(&llm_config(LlmProvider::OpenAI, "sk-test"))?.name(), "OpenAI");
    assert_eq!(providers::from_config(&llm_config(LlmProvider::Anthropic, "ak-test"))?.name(), "Anthropic");
    assert_eq!(providers::from_config(&llm_config(LlmProvider::Ollama, ""))?.name(), "Ollama");
    Ok(())
}

/// Test the OpenAI request body
#[test]
fn test_openAIRequest_fromCompletion_shouldCarrySystemAndUserMessages() -> Result<()> {
    let request = CompletionRequest::new("Summarize this")
        .system("You are terse")
        .temperature(0.3)
        .max_tokens(256);
    let body = serde_json::to_value(OpenAIRequest::from_completion("gpt-4o", &request))?;

    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Summarize this");
    assert_eq!(body["max_tokens"], 256);
    Ok(())
}

/// Test OpenAI response text extraction
#[test]
fn test_openAIResponse_extractText_shouldReturnFirstChoice() -> Result<()> {
    let json = r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}],"usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#;
    let response: OpenAIResponse = serde_json::from_str(json)?;
    assert_eq!(OpenAI::extract_text_from_response(&response), "Hello");
    Ok(())
}

/// Test the Anthropic request body and response parsing
#[test]
fn test_anthropic_wireFormat_shouldUseMessagesApiShape() -> Result<()> {
    let request = CompletionRequest::new("Explain attention").max_tokens(512);
    let body = serde_json::to_value(AnthropicRequest::from_completion("claude-3-5-sonnet-latest", &request))?;
    assert_eq!(body["model"], "claude-3-5-sonnet-latest");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["max_tokens"], 512);

    let json = r#"{"content":[{"type":"text","text":"Attention "},{"type":"text","text":"weighs tokens."}],"usage":{"input_tokens":5,"output_tokens":4}}"#;
    let response: AnthropicResponse = serde_json::from_str(json)?;
    assert!(Anthropic::extract_text_from_response(&response).contains("weighs tokens."));
    Ok(())
}

/// Test the Ollama request body and URL normalisation
#[test]
fn test_ollama_chatRequest_shouldDisableStreaming() -> Result<()> {
    let request = CompletionRequest::new("Hi").temperature(0.0);
    let body = serde_json::to_value(ChatRequest::from_completion("llama3.1", &request))?;
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["content"], "Hi");

    assert_eq!(Ollama::new("localhost:11434/", "llama3.1", 5).base_url(), "http://localhost:11434");
    Ok(())
}

/// Test that an unreachable service is an error, not a panic
#[tokio::test]
async fn test_complete_withUnreachableEndpoint_shouldReturnError() {
    let client = OpenAI::new("sk-test", "http://127.0.0.1:9/v1", "gpt-4o", 5);
    assert!(client.complete(CompletionRequest::new("Hi")).await.is_err());
}

/// Test the mock provider bookkeeping
#[tokio::test]
async fn test_mockProvider_shouldCountCallsAcrossClones() -> Result<()> {
    let provider = MockProvider::working();
    let clone = provider.clone();

    let generation = clone.complete(CompletionRequest::new("ping")).await?;
    assert_eq!(generation.text, "[GENERATED] ping");
    assert_eq!(provider.call_count(), 1);
    assert_eq!(provider.prompts(), vec!["ping"]);
    assert!(provider.test_connection().await.is_ok());
    assert!(MockProvider::failing().test_connection().await.is_err());
    Ok(())
}
