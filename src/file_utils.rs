use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::errors::AppError;
use crate::subtitle_processor::SubtitleFormat;

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
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !Self::dir_exists(path) {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a UTF-8 subtitle file
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, AppError> {
        let path = path.as_ref();
        fs::read_to_string(path).map_err(|e| AppError::read(path, e))
    }

    /// Write `content` to `path` through a temporary file in the same directory.
    ///
    /// The destination either keeps its previous state or holds the whole
    /// new content; a failed write never leaves a truncated file behind.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<(), AppError> {
        let path = path.as_ref();
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        Self::ensure_dir(parent).map_err(|e| AppError::write(path, e))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| AppError::write(path, e))?;
        tmp.write_all(content.as_bytes()).map_err(|e| AppError::write(path, e))?;
        tmp.flush().map_err(|e| AppError::write(path, e))?;
        tmp.persist(path).map_err(|e| AppError::write(path, e.error))?;

        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    /// Find subtitle files (srt, ass, ssa) below a directory, sorted by path
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> std::io::Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && SubtitleFormat::from_path(path).is_some() {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    // @generates: Output path mirroring `input` below `output_root`
    // @params: input_file, input_root, output_root, target format
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>, P3: AsRef<Path>>(
        input_file: P1,
        input_root: P2,
        output_root: P3,
        target: SubtitleFormat,
    ) -> PathBuf {
        let input_file = input_file.as_ref();

        let relative = input_file
            .strip_prefix(input_root.as_ref())
            .unwrap_or_else(|_| Path::new(input_file.file_name().unwrap_or_default()));

        output_root.as_ref().join(relative).with_extension(target.extension())
    }

    /// Determine the format of a file from its extension, then its content
    pub fn detect_format<P: AsRef<Path>>(path: P, content: &str) -> Option<SubtitleFormat> {
        SubtitleFormat::from_path(path.as_ref()).or_else(|| SubtitleFormat::detect(content))
    }
}
