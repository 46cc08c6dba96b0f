/*!
 * Scene renderer.
 *
 * Writes scene source to a temporary script, runs the external renderer on
 * it and locates the produced clip. The script is named after the cue index
 * and scene class, plus a random suffix, so clips of different cues never
 * share an output directory. The script is removed when rendering finishes,
 * whether it succeeded or not.
 */

use async_trait::async_trait;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::compiler::SceneSource;
use crate::app_config::{RenderConfig, RenderQuality};
use crate::errors::RenderError;
use crate::file_utils::FileManager;

/// Anything that can turn scene source into a clip on disk
#[async_trait]
pub trait SceneRenderer: Send + Sync {
    /// Render `scene` and return the path of the produced clip
    async fn render(&self, scene: &SceneSource) -> Result<PathBuf, RenderError>;
}

/// Renderer backed by the `manim` command-line tool
#[derive(Debug, Clone)]
pub struct ManimRenderer {
    command: String,
    quality: RenderQuality,
    media_dir: PathBuf,
    work_dir: PathBuf,
    timeout_secs: u64,
}

impl ManimRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            command: config.manim_command.clone(),
            quality: config.quality,
            media_dir: config.media_dir.clone(),
            work_dir: config.work_dir.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Arguments passed to the renderer for one script
    pub fn render_args(&self, script: &Path, scene_name: &str) -> Vec<String> {
        vec![
            script.to_string_lossy().into_owned(),
            scene_name.to_string(),
            self.quality.flag().to_string(),
            "--media_dir".to_string(),
            self.media_dir.to_string_lossy().into_owned(),
        ]
    }

    /// Path the renderer is expected to write the clip to
    pub fn expected_output(&self, script_stem: &str, scene_name: &str) -> PathBuf {
        self.media_dir
            .join("videos")
            .join(script_stem)
            .join(self.quality.output_dir_name())
            .join(format!("{}.mp4", scene_name))
    }

    /// Find the clip: exact path first, then anywhere below the media
    /// directory inside a folder named after the script
    pub fn locate_output(&self, script_stem: &str, scene_name: &str) -> Result<PathBuf, RenderError> {
        let expected = self.expected_output(script_stem, scene_name);
        if FileManager::file_exists(&expected) {
            return Ok(expected);
        }

        let file_name = format!("{}.mp4", scene_name);
        let found = FileManager::find_files_named(&self.media_dir, &file_name, Some(script_stem))
            .into_iter()
            .find(|p| !p.components().any(|c| c.as_os_str() == "partial_movie_files"));

        match found {
            Some(path) => {
                debug!("Clip not at {:?}, found {:?} instead", expected, path);
                Ok(path)
            }
            None => Err(RenderError::OutputNotFound {
                expected,
                searched: self.media_dir.clone(),
            }),
        }
    }

    fn write_script(&self, scene: &SceneSource) -> Result<tempfile::NamedTempFile, RenderError> {
        FileManager::ensure_dir(&self.work_dir).map_err(|e| RenderError::Io(e.to_string()))?;

        let prefix = format!("scene_{:03}_{}_", scene.cue_index, scene.scene_name);
        let mut script = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".py")
            .tempfile_in(&self.work_dir)
            .map_err(|e| RenderError::Io(format!("Failed to create scene script: {}", e)))?;
        script.write_all(scene.code.as_bytes())
            .and_then(|_| script.flush())
            .map_err(|e| RenderError::Io(format!("Failed to write scene script: {}", e)))?;
        Ok(script)
    }

    async fn run(&self, script: &Path, scene_name: &str) -> Result<(), RenderError> {
        let args = self.render_args(script, scene_name);
        let command_line = format!("{} {}", self.command, args.join(" "));
        debug!("Rendering {}", scene_name);
        debug!("Running: {}", command_line);

        let child = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = child => {
                result.map_err(|e| RenderError::Launch {
                    command: self.command.clone(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(RenderError::Timeout(self.timeout_secs));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(RenderError::ProcessFailed {
                command: command_line,
                status: output.status.code(),
                stdout,
                stderr,
            });
        }

        debug!("Renderer output:\n{}", stdout);
        Ok(())
    }
}

#[async_trait]
impl SceneRenderer for ManimRenderer {
    async fn render(&self, scene: &SceneSource) -> Result<PathBuf, RenderError> {
        let script = self.write_script(scene)?;
        let script_stem = script.path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let result = match self.run(script.path(), &scene.scene_name).await {
            Ok(()) => self.locate_output(&script_stem, &scene.scene_name),
            Err(e) => Err(e),
        };

        if let Err(e) = script.close() {
            debug!("Could not remove scene script: {}", e);
        }
        result
    }
}
