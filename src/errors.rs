/*!
 * Error types for the papercast application.
 *
 * Each pipeline stage has its own error enum, defined with the thiserror
 * crate. `AppError` wraps all of them for callers that only need a single
 * error type.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with language-model provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised while acquiring a paper
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Network failure, bad status or an empty search result
    #[error("Paper not found: {0}")]
    NotFound(String),

    /// The server answered with something that is neither PDF nor HTML
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Text could not be pulled out of the fetched document
    #[error("Failed to extract paper text: {0}")]
    Extraction(String),
}

/// Errors raised while turning a cue into scene source
#[derive(Error, Debug)]
pub enum CompileError {
    /// The model call itself failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The generated source has no `class X(...Scene...):` declaration
    #[error("Could not find Scene class name in generated code for cue '{cue}'")]
    MissingSceneIdentifier {
        /// Cue the source was generated for
        cue: String,
    },
}

/// Errors raised by the external scene renderer
#[derive(Error, Debug)]
pub enum RenderError {
    /// The renderer binary could not be started
    #[error("Failed to launch renderer '{command}': {message}")]
    Launch {
        command: String,
        message: String,
    },

    /// The renderer exited with a non-zero status
    #[error("Renderer failed ({command}) with status {status:?}")]
    ProcessFailed {
        /// Full command line, for diagnostics
        command: String,
        /// Exit code, if the process was not killed by a signal
        status: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// The renderer succeeded but the clip is not where it should be
    #[error("Rendered video not found at {expected:?} or anywhere below {searched:?}")]
    OutputNotFound {
        expected: PathBuf,
        searched: PathBuf,
    },

    /// The renderer did not finish in time
    #[error("Renderer timed out after {0} seconds")]
    Timeout(u64),

    /// Temporary script handling failed
    #[error("Render I/O error: {0}")]
    Io(String),
}

/// Errors raised while building the final video
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// ffmpeg could not be started
    #[error("Failed to launch '{command}': {message}")]
    Launch {
        command: String,
        message: String,
    },

    /// ffmpeg exited with a non-zero status
    #[error("Video assembly failed with status {status:?}: {stderr}")]
    ProcessFailed {
        status: Option<i32>,
        stderr: String,
    },

    /// Narration synthesis failed
    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    /// ffmpeg did not finish in time
    #[error("Video assembly timed out after {0} seconds")]
    Timeout(u64),

    /// Writing intermediate files failed
    #[error("Assembly I/O error: {0}")]
    Io(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error while acquiring the paper
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    /// Error while compiling a scene
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Error while rendering a scene
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Error while assembling the final video
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
