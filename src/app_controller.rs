use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::errors::{AppError, ConvertError};
use crate::file_utils::FileManager;
use crate::pipeline::{ConvertOptions, Conversion, Pipeline};
use crate::resync::ScaleFactor;
use crate::subtitle_processor::SubtitleFormat;

// @module: Application controller for file conversions

/// Per-invocation choices that override the configuration
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// Source format; file extension, then content, when `None`
    pub source: Option<SubtitleFormat>,

    /// Target format; output extension, then config, then SRT, when `None`
    pub target: Option<SubtitleFormat>,

    /// Replace existing output files
    pub force_overwrite: bool,
}

/// Outcome of a folder conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub warnings: usize,
}

/// Main application controller for subtitle conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller with default configuration
    pub fn new() -> Self {
        Self { config: Config::default() }
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pick the output format for `output`
    pub fn resolve_target(&self, output: &Path, explicit: Option<SubtitleFormat>) -> SubtitleFormat {
        explicit
            .or_else(|| SubtitleFormat::from_path(output))
            .or(self.config.target_format)
            .unwrap_or_default()
    }

    /// Build pipeline options from the configuration
    pub fn convert_options(&self, scale_factor: f64, source: Option<SubtitleFormat>, target: SubtitleFormat) -> ConvertOptions {
        ConvertOptions {
            source,
            target,
            scale_factor,
            adjustments: self.config.timing.clone(),
            serialize: self.config.serialize_options(),
        }
    }

    /// Convert one file.
    ///
    /// The scale factor is checked before the input is touched and the output
    /// is only written after the whole conversion succeeded.
    pub fn convert_file(
        &self,
        scale_factor: f64,
        input: &Path,
        output: &Path,
        options: &FileOptions,
    ) -> Result<Conversion, AppError> {
        ScaleFactor::new(scale_factor).map_err(ConvertError::from)?;

        if FileManager::file_exists(output) && !options.force_overwrite {
            return Err(AppError::OutputExists(output.to_path_buf()));
        }

        let content = FileManager::read_to_string(input)?;
        let source = options.source.or_else(|| FileManager::detect_format(input, &content));
        let target = self.resolve_target(output, options.target);
        debug!(
            "Converting {} ({}) to {} ({})",
            input.display(),
            source.map(|f| f.name()).unwrap_or("unknown"),
            output.display(),
            target.name()
        );

        let conversion = Pipeline::new(self.convert_options(scale_factor, source, target)).convert(&content)?;

        for warning in &conversion.warnings {
            warn!("{}", warning);
        }
        if self.config.strict && !conversion.warnings.is_empty() {
            return Err(AppError::Warnings { count: conversion.warnings.len() });
        }

        FileManager::write_atomic(output, &conversion.output)?;
        info!(
            "Converted {} cue(s): {} -> {}",
            conversion.cue_count,
            input.display(),
            output.display()
        );

        Ok(conversion)
    }

    /// Convert every subtitle file below `input_dir` into `output_dir`,
    /// mirroring the directory layout.
    ///
    /// A failing file does not stop the batch; the call fails at the end
    /// if any file failed. An input whose output was already claimed by an
    /// earlier input of the same batch (`ep.srt` and `ep.ass` both giving
    /// `ep.srt`) counts as failed and never replaces it, even when forced.
    pub fn convert_folder(
        &self,
        scale_factor: f64,
        input_dir: &Path,
        output_dir: &Path,
        options: &FileOptions,
    ) -> Result<BatchSummary, AppError> {
        ScaleFactor::new(scale_factor).map_err(ConvertError::from)?;

        let files = FileManager::find_subtitle_files(input_dir).map_err(|e| AppError::read(input_dir, e))?;
        let target = options.target.or(self.config.target_format).unwrap_or_default();

        let mut summary = BatchSummary {
            total: files.len(),
            ..Default::default()
        };
        if files.is_empty() {
            warn!("No subtitle files found in {}", input_dir.display());
            return Ok(summary);
        }
        info!("Converting {} file(s) from {}", files.len(), input_dir.display());

        let folder_pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("#>-"));

        // output path -> input that claimed it
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

        for input in &files {
            let output: PathBuf = FileManager::generate_output_path(input, input_dir, output_dir, target);
            folder_pb.set_message(input.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());

            if let Some(first) = claimed.get(&output) {
                let e = AppError::OutputCollision {
                    input: input.clone(),
                    output: output.clone(),
                    first: first.to_path_buf(),
                };
                folder_pb.suspend(|| error!("{} failed at {} stage: {}", input.display(), e.stage(), e));
                summary.failed += 1;
                folder_pb.inc(1);
                continue;
            }
            claimed.insert(output.clone(), input.as_path());

            let file_options = FileOptions {
                target: Some(target),
                ..options.clone()
            };
            match self.convert_file(scale_factor, input, &output, &file_options) {
                Ok(conversion) => {
                    summary.converted += 1;
                    summary.warnings += conversion.warnings.len();
                }
                Err(AppError::OutputExists(path)) => {
                    warn!("Skipping {}: output already exists. Use -f to force overwrite.", path.display());
                    summary.skipped += 1;
                }
                Err(e) => {
                    folder_pb.suspend(|| error!("{} failed at {} stage: {}", input.display(), e.stage(), e));
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_and_clear();

        info!(
            "Finished: {} converted, {} skipped, {} failed, {} warning(s)",
            summary.converted, summary.skipped, summary.failed, summary.warnings
        );

        if summary.failed > 0 {
            return Err(AppError::Batch {
                failed: summary.failed,
                total: summary.total,
            });
        }
        Ok(summary)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
