/*!
 * Provider implementations for the language-model backends.
 *
 * This module contains client implementations for:
 * - OpenAI: chat completions API (default)
 * - Anthropic: messages API
 * - Ollama: local LLM server
 * - Mock: scripted provider used by tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{LlmConfig, LlmProvider};
use crate::errors::ProviderError;

/// A single prompt sent to a language model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Optional system message
    pub system: Option<String>,
    /// The user prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request with default sampling parameters
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.0,
            max_tokens: 4096,
        }
    }

    /// Set the system message
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the token limit
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text produced by one language-model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// The generated text
    pub text: String,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the content generator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Generation, ProviderError>` - The generated text or an error
    async fn complete(&self, request: CompletionRequest) -> Result<Generation, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Human-readable provider name, for logs
    fn name(&self) -> &str;
}

/// Build the configured provider.
///
/// The API key must already be resolved into `config`.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let model = config.get_model();
    let endpoint = config.get_endpoint();

    let provider: Arc<dyn Provider> = match config.provider {
        LlmProvider::OpenAI => {
            if config.api_key.is_empty() {
                return Err(ProviderError::AuthenticationError("OpenAI API key is missing".to_string()));
            }
            Arc::new(openai::OpenAI::new(&config.api_key, endpoint, model, config.timeout_secs))
        }
        LlmProvider::Anthropic => {
            if config.api_key.is_empty() {
                return Err(ProviderError::AuthenticationError("Anthropic API key is missing".to_string()));
            }
            Arc::new(anthropic::Anthropic::new(&config.api_key, endpoint, model, config.timeout_secs))
        }
        LlmProvider::Ollama => Arc::new(ollama::Ollama::new(endpoint, model, config.timeout_secs)),
    };

    Ok(provider)
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
