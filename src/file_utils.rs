use anyhow::{Context, Result};
use log::debug;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Write bytes to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, content: C) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Find files called `file_name` below `root`.
    ///
    /// When `within` is given, only files with an ancestor directory of that
    /// name (below `root`) are returned. Results are sorted for determinism.
    pub fn find_files_named<P: AsRef<Path>>(root: P, file_name: &str, within: Option<&str>) -> Vec<PathBuf> {
        let root = root.as_ref();
        let mut result: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == OsStr::new(file_name))
            .map(|e| e.into_path())
            .filter(|path| match within {
                Some(dir) => path
                    .strip_prefix(root)
                    .map(|rel| rel.components().any(|c| c.as_os_str() == OsStr::new(dir)))
                    .unwrap_or(false),
                None => true,
            })
            .collect();
        result.sort();
        result
    }

    /// Remove a file, ignoring failures
    pub fn remove_file_best_effort<P: AsRef<Path>>(path: P) {
        let path = path.as_ref();
        if let Err(e) = fs::remove_file(path) {
            debug!("Could not remove {:?}: {}", path, e);
        }
    }
}
