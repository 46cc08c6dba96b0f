use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Language-model backend
    #[serde(default)]
    pub llm: LlmConfig,

    /// Paper acquisition and chunking
    #[serde(default)]
    pub paper: PaperConfig,

    /// Scene rendering
    #[serde(default)]
    pub render: RenderConfig,

    /// Final video assembly
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// Caller-supplied prompt templates
    #[serde(default)]
    pub prompts: PromptOverrides,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Language-model provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    // @provider: OpenAI chat completions
    #[default]
    OpenAI,
    // @provider: Anthropic messages
    Anthropic,
    // @provider: Ollama local server
    Ollama,
}

impl LlmProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    /// Environment variable holding the API key, for hosted providers
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }

    fn default_model(&self) -> String {
        match self {
            Self::OpenAI => "gpt-4o".to_string(),
            Self::Anthropic => "claude-3-5-sonnet-latest".to_string(),
            Self::Ollama => "llama3.1".to_string(),
        }
    }

    fn default_endpoint(&self) -> String {
        match self {
            Self::OpenAI => "https://api.openai.com/v1".to_string(),
            Self::Anthropic => "https://api.anthropic.com".to_string(),
            Self::Ollama => "http://localhost:11434".to_string(),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Language-model configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model name, empty for the provider default
    #[serde(default = "String::new")]
    pub model: String,

    /// API key, normally left empty and read from the environment
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL, empty for the provider default
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: String::new(),
            api_key: String::new(),
            endpoint: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            self.model.clone()
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.is_empty() {
            self.provider.default_endpoint()
        } else {
            self.endpoint.clone()
        }
    }

    /// Fill an empty API key from the provider's environment variable.
    ///
    /// The lookup is injected so callers decide where the environment comes from.
    pub fn resolve_api_key<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.api_key.is_empty() {
            return;
        }
        if let Some(var) = self.provider.api_key_env_var() {
            if let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) {
                self.api_key = key.trim().to_string();
            }
        }
    }
}

/// Paper acquisition and summarisation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaperConfig {
    /// Characters per summarisation chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Combined partial summaries above this size are collapsed first
    #[serde(default = "default_max_combine_chars")]
    pub max_combine_chars: usize,

    /// arXiv Atom API endpoint
    #[serde(default = "default_arxiv_endpoint")]
    pub arxiv_endpoint: String,

    /// External PDF-to-text tool
    #[serde(default = "default_pdftotext_command")]
    pub pdftotext_command: String,

    /// Fetch timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_combine_chars: default_max_combine_chars(),
            arxiv_endpoint: default_arxiv_endpoint(),
            pdftotext_command: default_pdftotext_command(),
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

/// Render quality preset passed to the renderer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    #[default]
    Low,
    Medium,
    High,
    Production,
}

impl RenderQuality {
    /// Command-line flag selecting this preset
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Low => "-ql",
            Self::Medium => "-qm",
            Self::High => "-qh",
            Self::Production => "-qp",
        }
    }

    /// Directory name the renderer writes clips of this preset into
    pub fn output_dir_name(&self) -> &'static str {
        match self {
            Self::Low => "480p15",
            Self::Medium => "720p30",
            Self::High => "1080p60",
            Self::Production => "1440p60",
        }
    }
}

/// Scene rendering settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Renderer executable
    #[serde(default = "default_manim_command")]
    pub manim_command: String,

    /// Quality preset
    #[serde(default)]
    pub quality: RenderQuality,

    /// Renderer media output directory
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// Directory for temporary scene scripts
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Per-scene render timeout in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            manim_command: default_manim_command(),
            quality: RenderQuality::default(),
            media_dir: default_media_dir(),
            work_dir: default_work_dir(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}

/// Final video assembly settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssemblyConfig {
    /// Final video path
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Whether to synthesize and attach a narration track
    #[serde(default = "default_true")]
    pub narration: bool,

    /// ISO 639-1 narration language
    #[serde(default = "default_narration_language")]
    pub narration_language: String,

    /// Text-to-speech endpoint
    #[serde(default = "default_tts_endpoint")]
    pub tts_endpoint: String,

    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_command")]
    pub ffmpeg_command: String,

    /// Output video codec
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Output audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// ffmpeg timeout in seconds
    #[serde(default = "default_assembly_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            narration: true,
            narration_language: default_narration_language(),
            tts_endpoint: default_tts_endpoint(),
            ffmpeg_command: default_ffmpeg_command(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            timeout_secs: default_assembly_timeout_secs(),
        }
    }
}

/// Optional prompt templates replacing the built-in ones.
///
/// Placeholders: `{text}` for summary and key ideas, `{summary}` and
/// `{key_ideas}` for blog post and video script, `{concept_description}`
/// for scenes.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PromptOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ideas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_post: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_llm_timeout_secs() -> u64 {
    120
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_max_combine_chars() -> usize {
    12_000
}

fn default_arxiv_endpoint() -> String {
    "http://export.arxiv.org/api/query".to_string()
}

fn default_pdftotext_command() -> String {
    "pdftotext".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    60
}

fn default_manim_command() -> String {
    "manim".to_string()
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("./media")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_render_timeout_secs() -> u64 {
    300
}

fn default_output_path() -> PathBuf {
    PathBuf::from("final_video.mp4")
}

fn default_true() -> bool {
    true
}

fn default_narration_language() -> String {
    "en".to_string()
}

fn default_tts_endpoint() -> String {
    "https://translate.google.com/translate_tts".to_string()
}

fn default_ffmpeg_command() -> String {
    "ffmpeg".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_assembly_timeout_secs() -> u64 {
    600
}

impl Config {
    /// Load the configuration file, writing a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.llm.provider.api_key_env_var().is_some() && self.llm.api_key.is_empty() {
            return Err(anyhow!(
                "API key is required for the {} provider (set {} or llm.api_key)",
                self.llm.provider.display_name(),
                self.llm.provider.api_key_env_var().unwrap_or_default()
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", self.llm.temperature));
        }

        if self.paper.chunk_size == 0 {
            return Err(anyhow!("paper.chunk_size must be greater than zero"));
        }
        if self.paper.chunk_overlap >= self.paper.chunk_size {
            return Err(anyhow!(
                "paper.chunk_overlap ({}) must be smaller than paper.chunk_size ({})",
                self.paper.chunk_overlap, self.paper.chunk_size
            ));
        }

        if self.assembly.narration
            && isolang::Language::from_639_1(&self.assembly.narration_language).is_none()
        {
            return Err(anyhow!(
                "Invalid narration language code: {}",
                self.assembly.narration_language
            ));
        }

        Ok(())
    }
}
