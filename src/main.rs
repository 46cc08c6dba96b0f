// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use papercast::app_config::{self, Config, LlmProvider};
use papercast::{Controller, SessionOutcome};

/// CLI Wrapper for LlmProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLlmProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl From<CliLlmProvider> for LlmProvider {
    fn from(cli_provider: CliLlmProvider) -> Self {
        match cli_provider {
            CliLlmProvider::OpenAI => LlmProvider::OpenAI,
            CliLlmProvider::Anthropic => LlmProvider::Anthropic,
            CliLlmProvider::Ollama => LlmProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for papercast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Papercast - research papers to blog posts and explainer videos
///
/// Fetches a paper, summarizes it, writes a blog post and a video script,
/// renders the script's visual cues as animations and assembles them into
/// a narrated video.
#[derive(Parser, Debug)]
#[command(name = "papercast")]
#[command(author = "Papercast Team")]
#[command(version = "0.1.0")]
#[command(about = "Turn research papers into blog posts and explainer videos")]
#[command(long_about = "Papercast fetches a research paper by URL or arXiv title and turns it into a
summary, a blog post, a video script and an animated explainer video.

EXAMPLES:
    papercast                                        # Prompt for the paper interactively
    papercast https://arxiv.org/pdf/1706.03762       # Use a paper URL
    papercast \"Attention Is All You Need\"            # Search arXiv by title
    papercast -p anthropic -m claude-3-5-haiku-latest \"Attention Is All You Need\"
    papercast --no-narration -o out/video.mp4 URL    # Silent video to a custom path
    papercast completions bash > papercast.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. API keys are read from OPENAI_API_KEY or
    ANTHROPIC_API_KEY, including from a .env file in the working directory.

EXTERNAL TOOLS:
    manim      - renders the scenes
    ffmpeg     - assembles the final video
    pdftotext  - extracts text from PDF papers (poppler-utils)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Paper URL or title; prompted for when omitted
    #[arg(value_name = "PAPER")]
    paper: Option<String>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Language model provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliLlmProvider>,

    /// Model name to use
    #[arg(short, long)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Assemble the video without narration
    #[arg(long)]
    no_narration: bool,

    /// Final video path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with trace so the max level alone decides
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "papercast", &mut std::io::stdout());
        return Ok(());
    }

    run(cli).await
}

async fn run(options: CommandLineOptions) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    if dotenvy::dotenv().is_ok() {
        debug!("Loaded environment from .env");
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.llm.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.llm.model = model.clone();
    }
    if options.no_narration {
        config.assembly.narration = false;
    }
    if let Some(output) = &options.output {
        config.assembly.output_path = output.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.llm.resolve_api_key(|var| std::env::var(var).ok());

    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    info!(
        "Using {} with model {}",
        config.llm.provider.display_name(),
        config.llm.get_model()
    );

    let controller = Controller::with_config(config)?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let outcome = controller.run_session(options.paper, &mut input, &mut output).await?;

    debug!("Session ended: {:?}", outcome);
    if outcome == SessionOutcome::Aborted {
        std::process::exit(1);
    }

    Ok(())
}
