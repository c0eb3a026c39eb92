use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// @module: Subtitle document model

// @const: Loose SRT timing line, used for format sniffing only
static SRT_TIMING_SNIFF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*\d+:\d{2}:\d{2}[,.]\d{1,3}\s*-->\s*\d+:\d{2}:\d{2}[,.]\d{1,3}").unwrap()
});

/// Point in time within a subtitle track, in whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    /// Latest representable time, `i64::MAX` milliseconds.
    ///
    /// Parsers and timing transforms reject anything later.
    pub const MAX: Timestamp = Timestamp(i64::MAX as u64);

    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Build from hour/minute/second/millisecond components.
    ///
    /// Returns `None` when minutes or seconds are out of range, or when the
    /// total lies past [`Timestamp::MAX`].
    pub fn from_parts(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<Self> {
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return None;
        }
        let total = hours
            .checked_mul(3_600_000)?
            .checked_add(minutes * 60_000 + seconds * 1_000 + millis)?;
        (total <= Self::MAX.0).then_some(Timestamp(total))
    }

    /// Format as an SRT timestamp (HH:MM:SS,mmm)
    pub fn format_srt(self) -> String {
        let ms = self.0;
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Format as an ASS timestamp (H:MM:SS.cc), rounded to the nearest centisecond
    pub fn format_ass(self) -> String {
        let cs = self.0.saturating_add(5) / 10;
        let hours = cs / 360_000;
        let minutes = (cs % 360_000) / 6_000;
        let seconds = (cs % 6_000) / 100;
        let centis = cs % 100;

        format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format_srt())
    }
}

/// Supported subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip
    #[default]
    Srt,
    /// Advanced SubStation Alpha (v4+), also reads SSA v4
    Ass,
}

impl SubtitleFormat {
    // @returns: Display name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Srt => "SRT",
            Self::Ass => "ASS",
        }
    }

    // @returns: Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "srt" => Some(Self::Srt),
            "ass" | "ssa" => Some(Self::Ass),
            _ => None,
        }
    }

    /// Best-effort content sniffing.
    ///
    /// ASS markers win over SRT timing lines since ASS files never contain
    /// `-->` timing lines, while SRT text may quote anything.
    pub fn detect(text: &str) -> Option<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let looks_like_ass = text.lines().take(200).any(|line| {
            let line = line.trim().to_ascii_lowercase();
            line == "[script info]" || line == "[events]" || line.starts_with("dialogue:")
        });
        if looks_like_ass {
            return Some(Self::Ass);
        }

        if SRT_TIMING_SNIFF.is_match(text) {
            return Some(Self::Srt);
        }

        None
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "srt" | "subrip" => Ok(Self::Srt),
            "ass" | "ssa" => Ok(Self::Ass),
            _ => Err(anyhow!("Unsupported subtitle format: {}", s)),
        }
    }
}

/// Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start: Timestamp,
    pub end: Timestamp,

    /// Text lines in display order, in the markup of the source format
    pub text: Vec<String>,

    /// Format-specific styling fields (ASS: Layer, Style, Name, margins, Effect)
    pub style: Option<BTreeMap<String, String>>,
}

impl Cue {
    /// Creates a cue without styling - used by tests and external consumers
    pub fn new(start_ms: u64, end_ms: u64, text: &str) -> Self {
        Cue {
            start: Timestamp::from_millis(start_ms),
            end: Timestamp::from_millis(end_ms),
            text: text.lines().map(str::to_string).collect(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: BTreeMap<String, String>) -> Self {
        self.style = Some(style);
        self
    }

    /// Holds the `start <= end` invariant
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn duration_ms(&self) -> u64 {
        self.end.as_millis().saturating_sub(self.start.as_millis())
    }

    /// Text lines joined with `\n`
    pub fn joined_text(&self) -> String {
        self.text.join("\n")
    }
}

/// `[Script Info]` and style sections of an ASS script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssHeader {
    /// `Key: value` pairs of `[Script Info]`, in source order
    pub script_info: Vec<(String, String)>,

    /// Field list of the styles `Format:` line
    pub style_format: Option<String>,

    /// Body of each `Style:` line
    pub styles: Vec<String>,
}

impl AssHeader {
    pub fn info(&self, key: &str) -> Option<&str> {
        self.script_info
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Parsed subtitle document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Cues in source order
    pub cues: Vec<Cue>,

    /// Format the document was parsed from
    pub format: SubtitleFormat,

    /// ASS header sections, when parsed from ASS
    pub header: Option<AssHeader>,
}

impl Document {
    /// Create an empty document
    pub fn new(format: SubtitleFormat) -> Self {
        Document {
            cues: Vec::new(),
            format,
            header: None,
        }
    }

    pub fn with_cues(format: SubtitleFormat, cues: Vec<Cue>) -> Self {
        Document {
            cues,
            format,
            header: None,
        }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Number of adjacent cue pairs that overlap in time
    pub fn overlap_count(&self) -> usize {
        self.cues
            .windows(2)
            .filter(|pair| pair[0].end > pair[1].start)
            .count()
    }
}
