use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::formats::{AssDefaults, LineEnding, SerializeOptions};
use crate::resync::TimingAdjustments;
use crate::subtitle_processor::SubtitleFormat;

/// Application configuration module
/// This module handles the conversion defaults: output format and line
/// ending, timing fixes, ASS header values and logging. The file is only
/// ever read; command-line options override every value in it.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Output format used when neither `--to` nor the output extension decide
    #[serde(default)]
    pub target_format: Option<SubtitleFormat>,

    /// Line terminator of written files
    #[serde(default)]
    pub eol: LineEnding,

    /// Refuse to write output when styling had to be dropped
    #[serde(default)]
    pub strict: bool,

    /// Timing fixes applied after rescaling
    #[serde(default)]
    pub timing: TimingAdjustments,

    /// Header values for ASS output
    #[serde(default)]
    pub ass: AssDefaults,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ass.play_res_x == 0 || self.ass.play_res_y == 0 {
            return Err(anyhow!("ASS PlayResX/PlayResY must be greater than zero"));
        }

        if self.ass.font_size == 0 {
            return Err(anyhow!("ASS font size must be greater than zero"));
        }

        // The style line is comma-separated
        if self.ass.font_name.trim().is_empty() || self.ass.font_name.contains(',') {
            return Err(anyhow!("Invalid ASS font name: {:?}", self.ass.font_name));
        }

        if self.timing.max_duration_ms == Some(0) {
            return Err(anyhow!("Maximum cue duration must be greater than zero"));
        }

        Ok(())
    }

    /// Serializer options derived from this configuration
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            eol: self.eol,
            ass: self.ass.clone(),
        }
    }
}
