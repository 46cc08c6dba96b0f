use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, log, Level};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::assembler::{FfmpegAssembler, VideoAssembler};
use crate::content::ContentGenerator;
use crate::cues::{cue_descriptions, extract_cues, VisualCue};
use crate::errors::{AppError, RenderError};
use crate::paper_loader::{PaperLoader, PaperSource};
use crate::providers::{self, Generation, Provider};
use crate::scene::{ManimRenderer, SceneCompiler, SceneRenderer};

// @module: Session driver tying the pipeline stages together

/// A cue that produced no clip, and why
#[derive(Debug, Clone)]
pub struct CueFailure {
    pub cue: VisualCue,
    pub reason: String,
}

/// Log lines held back while the progress bar owns the terminal
#[derive(Debug, Default)]
pub struct DeferredLog {
    entries: Vec<(Level, String)>,
}

impl DeferredLog {
    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.entries.push((level, message.into()));
    }

    pub fn entries(&self) -> &[(Level, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emit everything held back, in order
    pub fn flush(&mut self) {
        for (level, message) in self.entries.drain(..) {
            log!(level, "{}", message);
        }
    }
}

/// Outcome of the per-cue compile/render loop
#[derive(Debug, Default)]
pub struct RenderBatch {
    /// Clips in cue order
    pub clips: Vec<PathBuf>,
    /// Cues that were skipped
    pub failures: Vec<CueFailure>,
}

/// Everything a session produced before asking for approval
#[derive(Debug)]
pub struct SessionArtifacts {
    pub summary: Generation,
    pub key_ideas: Generation,
    pub blog_post: Generation,
    pub video_script: Generation,
    pub cues: Vec<VisualCue>,
    pub clips: Vec<PathBuf>,
    pub failures: Vec<CueFailure>,
    pub final_video: Option<PathBuf>,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The paper could not be acquired; nothing else ran
    Aborted,
    /// The user approved the content
    Published,
    /// The user declined the content
    NotPublished,
}

/// Main application controller for a paper-to-video session
pub struct Controller {
    // @field: App configuration
    config: Config,
    loader: Box<dyn PaperSource>,
    generator: ContentGenerator,
    compiler: SceneCompiler,
    renderer: Box<dyn SceneRenderer>,
    assembler: Box<dyn VideoAssembler>,
}

impl Controller {
    // @method: Create a controller wired to the real collaborators
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = providers::from_config(&config.llm)
            .map_err(|e| anyhow!("Failed to create language model client: {}", e))?;
        let loader = Box::new(PaperLoader::new(config.paper.clone()));
        let renderer = Box::new(ManimRenderer::new(&config.render));
        let assembler = Box::new(FfmpegAssembler::new(
            config.assembly.clone(),
            config.render.work_dir.clone(),
        ));

        Ok(Self::with_components(config, provider, loader, renderer, assembler))
    }

    /// Create a controller from explicit collaborators
    pub fn with_components(
        config: Config,
        provider: Arc<dyn Provider>,
        loader: Box<dyn PaperSource>,
        renderer: Box<dyn SceneRenderer>,
        assembler: Box<dyn VideoAssembler>,
    ) -> Self {
        let generator = ContentGenerator::new(Arc::clone(&provider), &config);
        let compiler = SceneCompiler::new(
            provider,
            generator.prompts().scene.clone(),
            config.llm.temperature,
            config.llm.max_tokens,
        );

        Self {
            config,
            loader,
            generator,
            compiler,
            renderer,
            assembler,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage from paper acquisition to the final video
    pub async fn produce(&self, paper_input: &str) -> Result<SessionArtifacts, AppError> {
        let start_time = Instant::now();

        let paper_text = self.loader.load_text(paper_input).await?;
        info!("Loaded paper: {} characters", paper_text.chars().count());

        let summary = self.generator.summarize(&paper_text).await?;
        let key_ideas = self.generator.extract_key_ideas(&paper_text).await?;
        let blog_post = self.generator.generate_blog_post(&summary.text, &key_ideas.text).await?;
        let video_script = self.generator.generate_video_script(&summary.text, &key_ideas.text).await?;

        let cues = extract_cues(&video_script.text);
        info!("Extracted {} visual cue(s): {:?}", cues.len(), cue_descriptions(&cues));

        let batch = self.render_cues(&cues).await?;

        let final_video = match self.assembler.assemble(&batch.clips, &video_script.text).await {
            Ok(path) => path,
            Err(e) => {
                error!("Video assembly failed: {}", e);
                None
            }
        };

        info!("Session finished in {:.1}s", start_time.elapsed().as_secs_f64());

        Ok(SessionArtifacts {
            summary,
            key_ideas,
            blog_post,
            video_script,
            cues,
            clips: batch.clips,
            failures: batch.failures,
            final_video,
        })
    }

    /// Compile and render each cue in order.
    ///
    /// A cue that fails to compile or render is logged and skipped.
    pub async fn render_cues(&self, cues: &[VisualCue]) -> Result<RenderBatch, AppError> {
        let mut batch = RenderBatch::default();
        if cues.is_empty() {
            return Ok(batch);
        }

        let progress_bar = ProgressBar::new(cues.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scenes {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let mut deferred = DeferredLog::default();
        for cue in cues {
            progress_bar.set_message(cue.description.clone());

            let scene = match self.compiler.compile(cue).await {
                Ok(scene) => scene,
                Err(e) => {
                    deferred.push(Level::Warn, format!("Skipping cue '{}': {}", cue.description, e));
                    batch.failures.push(CueFailure { cue: cue.clone(), reason: e.to_string() });
                    progress_bar.inc(1);
                    continue;
                }
            };

            match self.renderer.render(&scene).await {
                Ok(path) => {
                    deferred.push(Level::Info, format!("Scene video generated: {:?}", path));
                    batch.clips.push(path);
                }
                Err(e) => {
                    Self::defer_render_failure(&mut deferred, cue, &e);
                    batch.failures.push(CueFailure { cue: cue.clone(), reason: e.to_string() });
                }
            }
            progress_bar.inc(1);
        }

        // Held-back lines go out once the bar is cleared
        progress_bar.finish_and_clear();
        deferred.flush();
        info!("Rendered {}/{} scene(s)", batch.clips.len(), cues.len());
        Ok(batch)
    }

    /// Queue the diagnostics for a failed render, including captured output
    pub fn defer_render_failure(deferred: &mut DeferredLog, cue: &VisualCue, e: &RenderError) {
        match e {
            RenderError::ProcessFailed { command, status, stdout, stderr } => {
                deferred.push(Level::Error, format!("Error running renderer for cue '{}' (status {:?}):", cue.description, status));
                deferred.push(Level::Error, format!("  Renderer command: {}", command));
                deferred.push(Level::Error, format!("  Renderer stdout: {}", stdout.trim()));
                deferred.push(Level::Error, format!("  Renderer stderr: {}", stderr.trim()));
            }
            other => deferred.push(Level::Error, format!("Error running renderer for cue '{}': {}", cue.description, other)),
        }
    }

    /// Interactive session: ask for a paper, produce everything, show it and
    /// ask for approval
    pub async fn run_session<R: BufRead, W: Write>(
        &self,
        paper_input: Option<String>,
        input: &mut R,
        output: &mut W,
    ) -> Result<SessionOutcome> {
        let paper_input = match paper_input {
            Some(paper) => paper,
            None => prompt_line(input, output, "Enter the URL or title of the research paper: ")?,
        };

        let artifacts = match self.produce(paper_input.trim()).await {
            Ok(artifacts) => artifacts,
            Err(AppError::Loader(e)) => {
                writeln!(output, "Error fetching/processing paper: {}", e)?;
                return Ok(SessionOutcome::Aborted);
            }
            Err(e) => return Err(e.into()),
        };

        Self::present(&artifacts, output)?;

        let approval = prompt_line(input, output, "Approve content? (y/n): ")?;
        if approval.trim().eq_ignore_ascii_case("y") {
            writeln!(output, "Content published!")?;
            Ok(SessionOutcome::Published)
        } else {
            writeln!(output, "Content not published.")?;
            Ok(SessionOutcome::NotPublished)
        }
    }

    fn present<W: Write>(artifacts: &SessionArtifacts, output: &mut W) -> Result<()> {
        writeln!(output, "\nSummary:\n{}", artifacts.summary.text)?;
        writeln!(output, "\nExtracted Visual Cues:\n{:?}", cue_descriptions(&artifacts.cues))?;
        if let Some(path) = &artifacts.final_video {
            writeln!(output, "\nFinal video generated: {}", path.display())?;
        }
        if !artifacts.failures.is_empty() {
            writeln!(output, "\nSkipped {} cue(s):", artifacts.failures.len())?;
            for failure in &artifacts.failures {
                writeln!(output, "  - {}: {}", failure.cue.description, failure.reason)?;
            }
        }
        writeln!(output, "\nBlog Post:\n{}", artifacts.blog_post.text)?;
        writeln!(output, "\nVideo Script:\n{}", artifacts.video_script.text)?;
        Ok(())
    }
}

fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
