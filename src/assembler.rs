/*!
 * Final video assembly.
 *
 * Concatenates rendered clips in cue order with ffmpeg's concat demuxer
 * and, when narration is enabled, muxes a synthesized narration track
 * padded or cut to the video length.
 */

use async_trait::async_trait;
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::AssemblyConfig;
use crate::errors::AssemblyError;
use crate::file_utils::FileManager;
use crate::speech::{SpeechSynthesizer, TranslateTts};

const NARRATION_FILE: &str = "narration.mp3";

/// Anything that can join clips into the final video
#[async_trait]
pub trait VideoAssembler: Send + Sync {
    /// Build the final video from `clips` in order.
    ///
    /// Returns `Ok(None)` without doing anything when `clips` is empty.
    async fn assemble(&self, clips: &[PathBuf], narration_text: &str) -> Result<Option<PathBuf>, AssemblyError>;
}

/// ffmpeg-backed assembler
pub struct FfmpegAssembler {
    config: AssemblyConfig,
    work_dir: PathBuf,
    speech: Option<Box<dyn SpeechSynthesizer>>,
}

impl FfmpegAssembler {
    /// Create an assembler; narration uses the configured TTS endpoint
    pub fn new(config: AssemblyConfig, work_dir: impl Into<PathBuf>) -> Self {
        let speech: Option<Box<dyn SpeechSynthesizer>> = if config.narration {
            Some(Box::new(TranslateTts::new(&config.tts_endpoint, &config.narration_language)))
        } else {
            None
        };

        Self {
            config,
            work_dir: work_dir.into(),
            speech,
        }
    }

    /// Replace the speech synthesizer, or disable narration with `None`
    pub fn with_speech(mut self, speech: Option<Box<dyn SpeechSynthesizer>>) -> Self {
        self.speech = speech;
        self
    }

    /// ffmpeg arguments for a concat list, optional narration and output
    pub fn ffmpeg_args(&self, list_file: &Path, narration: Option<&Path>, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y", "-hide_banner", "-loglevel", "error",
            "-f", "concat", "-safe", "0",
            "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(list_file.to_string_lossy().into_owned());

        if let Some(narration) = narration {
            args.push("-i".to_string());
            args.push(narration.to_string_lossy().into_owned());
            args.extend(["-map", "0:v:0", "-map", "1:a:0"].iter().map(|s| s.to_string()));
        }

        args.push("-c:v".to_string());
        args.push(self.config.video_codec.clone());
        args.push("-c:a".to_string());
        args.push(self.config.audio_codec.clone());

        if narration.is_some() {
            // Pad short narration with silence, then stop at the end of the video
            args.extend(["-af", "apad", "-shortest"].iter().map(|s| s.to_string()));
        }

        args.push(output.to_string_lossy().into_owned());
        args
    }

    async fn synthesize_narration(&self, text: &str) -> Option<PathBuf> {
        let speech = self.speech.as_ref()?;
        if text.trim().is_empty() {
            return None;
        }

        let path = self.work_dir.join(NARRATION_FILE);
        match speech.save(text, &path).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Narration skipped: {}", e);
                FileManager::remove_file_best_effort(&path);
                None
            }
        }
    }

    fn write_concat_list(&self, clips: &[PathBuf]) -> Result<tempfile::NamedTempFile, AssemblyError> {
        FileManager::ensure_dir(&self.work_dir).map_err(|e| AssemblyError::Io(e.to_string()))?;
        let mut list = tempfile::Builder::new()
            .prefix("concat_")
            .suffix(".txt")
            .tempfile_in(&self.work_dir)
            .map_err(|e| AssemblyError::Io(e.to_string()))?;
        list.write_all(concat_list(clips).as_bytes())
            .and_then(|_| list.flush())
            .map_err(|e| AssemblyError::Io(e.to_string()))?;
        Ok(list)
    }

    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), AssemblyError> {
        debug!("Running: {} {}", self.config.ffmpeg_command, args.join(" "));

        let ffmpeg_future = Command::new(&self.config.ffmpeg_command)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| AssemblyError::Launch {
                    command: self.config.ffmpeg_command.clone(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(AssemblyError::Timeout(self.config.timeout_secs));
            }
        };

        if !output.status.success() {
            return Err(AssemblyError::ProcessFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VideoAssembler for FfmpegAssembler {
    async fn assemble(&self, clips: &[PathBuf], narration_text: &str) -> Result<Option<PathBuf>, AssemblyError> {
        if clips.is_empty() {
            info!("No clips rendered, skipping video assembly");
            return Ok(None);
        }

        let output = self.config.output_path.clone();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            FileManager::ensure_dir(parent).map_err(|e| AssemblyError::Io(e.to_string()))?;
        }

        let list = self.write_concat_list(clips)?;
        let narration = self.synthesize_narration(narration_text).await;

        info!("Assembling {} clip(s) into {:?}", clips.len(), output);
        let args = self.ffmpeg_args(list.path(), narration.as_deref(), &output);
        let result = self.run_ffmpeg(&args).await;

        if let Some(path) = &narration {
            FileManager::remove_file_best_effort(path);
        }
        result?;

        Ok(Some(output))
    }
}

/// Concat demuxer list for `clips`, with absolute, quoted paths
pub fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| {
            let path = std::fs::canonicalize(clip).unwrap_or_else(|_| clip.clone());
            let quoted = path.to_string_lossy().replace('\'', r"'\''");
            format!("file '{}'\n", quoted)
        })
        .collect()
}
