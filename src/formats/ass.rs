use std::collections::BTreeMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::markup;
use super::srt::fraction_to_millis;
use super::{SerializeOptions, Serialized};
use crate::errors::{FormatError, UnsupportedFeatureError};
use crate::subtitle_processor::{AssHeader, Cue, Document, SubtitleFormat, Timestamp};

// @module: Advanced SubStation Alpha parsing and serialization

// @const: ASS timestamp (H:MM:SS.cc)
static ASS_TIMESTAMP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})\.(\d{1,3})$").unwrap());

// @const: Hard and soft line breaks inside dialogue text
static LINE_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[Nn]").unwrap());

/// Event fields assumed when `[Events]` has no `Format:` line
const DEFAULT_EVENT_FORMAT: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

const STYLE_FORMAT: &str = "Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, \
Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

/// Header values used when a document carries no ASS header of its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssDefaults {
    /// Script resolution width
    #[serde(default = "default_play_res_x")]
    pub play_res_x: u32,

    /// Script resolution height
    #[serde(default = "default_play_res_y")]
    pub play_res_y: u32,

    /// Font of the `Default` style
    #[serde(default = "default_font_name")]
    pub font_name: String,

    /// Font size of the `Default` style
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

impl Default for AssDefaults {
    fn default() -> Self {
        Self {
            play_res_x: default_play_res_x(),
            play_res_y: default_play_res_y(),
            font_name: default_font_name(),
            font_size: default_font_size(),
        }
    }
}

fn default_play_res_x() -> u32 {
    384
}

fn default_play_res_y() -> u32 {
    288
}

fn default_font_name() -> String {
    "Arial".to_string()
}

fn default_font_size() -> u32 {
    20
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    ScriptInfo,
    Styles,
    Events,
    Other,
}

impl Section {
    fn from_header(line: &str) -> Self {
        match line.to_ascii_lowercase().as_str() {
            "[script info]" => Self::ScriptInfo,
            "[v4+ styles]" | "[v4 styles]" | "[v4 styles+]" => Self::Styles,
            "[events]" => Self::Events,
            _ => Self::Other,
        }
    }
}

/// Parse an ASS/SSA script into a document
pub fn parse(text: &str) -> Result<Document, FormatError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut header = AssHeader::default();
    let mut cues = Vec::new();
    let mut section = Section::Preamble;
    let mut saw_events = false;
    let mut event_format: Vec<String> = DEFAULT_EVENT_FORMAT.iter().map(|f| f.to_string()).collect();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with("!:") {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = Section::from_header(line);
            saw_events |= section == Section::Events;
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            debug!("Skipping line {} without a key: {}", line_no, line);
            continue;
        };
        let key = key.trim();

        match section {
            Section::ScriptInfo => {
                header.script_info.push((key.to_string(), value.trim().to_string()));
            }
            Section::Styles => {
                if key.eq_ignore_ascii_case("format") {
                    header.style_format = Some(value.trim().to_string());
                } else if key.eq_ignore_ascii_case("style") {
                    header.styles.push(value.trim().to_string());
                }
            }
            Section::Events => {
                if key.eq_ignore_ascii_case("format") {
                    event_format = parse_event_format(line_no, line, value)?;
                } else if key.eq_ignore_ascii_case("dialogue") {
                    cues.push(parse_dialogue(line_no, line, value.trim_start(), &event_format)?);
                }
                // Comment, Picture, Sound, Movie and Command events carry no cue
            }
            Section::Preamble | Section::Other => {}
        }
    }

    if !saw_events {
        let first = text.lines().next().unwrap_or_default();
        return Err(FormatError::new(1, first, "missing [Events] section"));
    }

    Ok(Document {
        cues,
        format: SubtitleFormat::Ass,
        header: Some(header),
    })
}

/// Parse the field list of an `[Events]` `Format:` line
fn parse_event_format(line_no: usize, line: &str, value: &str) -> Result<Vec<String>, FormatError> {
    let fields: Vec<String> = value.split(',').map(|f| f.trim().to_string()).collect();

    for required in ["Start", "End", "Text"] {
        if !fields.iter().any(|f| f.eq_ignore_ascii_case(required)) {
            return Err(FormatError::new(
                line_no,
                line,
                format!("event format has no {} field", required),
            ));
        }
    }

    if !fields.last().is_some_and(|f| f.eq_ignore_ascii_case("text")) {
        return Err(FormatError::new(line_no, line, "Text must be the last event field"));
    }

    Ok(fields)
}

/// Parse the body of a `Dialogue:` line
fn parse_dialogue(line_no: usize, line: &str, value: &str, format: &[String]) -> Result<Cue, FormatError> {
    // Text is last and may itself contain commas
    let fields: Vec<&str> = value.splitn(format.len(), ',').collect();
    if fields.len() < format.len() {
        return Err(FormatError::new(
            line_no,
            line,
            format!("expected {} fields, found {}", format.len(), fields.len()),
        ));
    }

    let mut start = None;
    let mut end = None;
    let mut text = "";
    let mut style = BTreeMap::new();

    for (name, field) in format.iter().zip(fields) {
        match name.to_ascii_lowercase().as_str() {
            "start" => {
                start = Some(
                    parse_timestamp(field.trim())
                        .ok_or_else(|| FormatError::new(line_no, line, "malformed start timestamp"))?,
                );
            }
            "end" => {
                end = Some(
                    parse_timestamp(field.trim())
                        .ok_or_else(|| FormatError::new(line_no, line, "malformed end timestamp"))?,
                );
            }
            "text" => text = field,
            _ => {
                style.insert(name.clone(), field.trim().to_string());
            }
        }
    }

    let (Some(start), Some(end)) = (start, end) else {
        return Err(FormatError::new(line_no, line, "dialogue has no timing"));
    };
    if start > end {
        return Err(FormatError::new(line_no, line, "cue ends before it starts"));
    }

    Ok(Cue {
        start,
        end,
        text: LINE_BREAK_REGEX.split(text).map(str::to_string).collect(),
        style: Some(style),
    })
}

/// Parse an ASS timestamp (H:MM:SS.cc) into milliseconds
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let caps = ASS_TIMESTAMP_REGEX.captures(s)?;

    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;
    let millis = fraction_to_millis(&caps[4])?;

    Timestamp::from_parts(hours, minutes, seconds, millis)
}

/// Serialize a document as an ASS script
pub fn serialize(doc: &Document, options: &SerializeOptions) -> Serialized {
    let eol = options.eol.as_str();
    let mut lines: Vec<String> = Vec::new();
    let mut warnings = Vec::new();
    let header = doc.header.as_ref();

    lines.push("[Script Info]".to_string());
    match header.filter(|h| !h.script_info.is_empty()) {
        Some(h) => {
            if h.info("ScriptType").is_none() {
                lines.push("ScriptType: v4.00+".to_string());
            }
            for (key, value) in &h.script_info {
                if key.eq_ignore_ascii_case("ScriptType") {
                    // Styles are always written as V4+
                    lines.push(format!("{}: v4.00+", key));
                } else {
                    lines.push(format!("{}: {}", key, value));
                }
            }
        }
        None => {
            lines.push("; Script generated by subresync".to_string());
            lines.push("ScriptType: v4.00+".to_string());
            lines.push("WrapStyle: 0".to_string());
            lines.push(format!("PlayResX: {}", options.ass.play_res_x));
            lines.push(format!("PlayResY: {}", options.ass.play_res_y));
            lines.push("ScaledBorderAndShadow: yes".to_string());
        }
    }
    lines.push(String::new());

    lines.push("[V4+ Styles]".to_string());
    let source_styles = header.filter(|h| {
        !h.styles.is_empty() && h.style_format.as_deref().is_some_and(|f| f.contains("OutlineColour"))
    });
    match source_styles {
        Some(h) => {
            lines.push(format!("Format: {}", h.style_format.as_deref().unwrap_or(STYLE_FORMAT)));
            lines.extend(h.styles.iter().map(|s| format!("Style: {}", s)));
        }
        None => {
            if header.is_some_and(|h| !h.styles.is_empty()) {
                debug!("Source styles are not in V4+ layout, writing the default style instead");
            }
            lines.push(format!("Format: {}", STYLE_FORMAT));
            lines.push(format!("Style: {}", default_style(&options.ass)));
        }
    }
    lines.push(String::new());

    lines.push("[Events]".to_string());
    lines.push(format!("Format: {}", DEFAULT_EVENT_FORMAT.join(", ")));

    for (idx, cue) in doc.cues.iter().enumerate() {
        let text = match doc.format {
            SubtitleFormat::Ass => cue.joined_text(),
            SubtitleFormat::Srt => {
                let (converted, dropped) = markup::srt_to_ass(&cue.joined_text());
                for feature in dropped {
                    let warning = UnsupportedFeatureError {
                        cue: idx + 1,
                        feature,
                        target: SubtitleFormat::Ass.name(),
                    };
                    if !warnings.contains(&warning) {
                        warnings.push(warning);
                    }
                }
                converted
            }
        };

        lines.push(format!(
            "Dialogue: {},{},{},{},{},{},{},{},{},{}",
            style_field(cue, "Layer").unwrap_or("0"),
            cue.start.format_ass(),
            cue.end.format_ass(),
            style_field(cue, "Style").unwrap_or("Default"),
            style_field(cue, "Name").or_else(|| style_field(cue, "Actor")).unwrap_or(""),
            style_field(cue, "MarginL").unwrap_or("0"),
            style_field(cue, "MarginR").unwrap_or("0"),
            style_field(cue, "MarginV").unwrap_or("0"),
            style_field(cue, "Effect").unwrap_or(""),
            text.replace('\n', "\\N"),
        ));
    }

    let mut text = lines.join(eol);
    text.push_str(eol);

    Serialized { text, warnings }
}

/// Case-insensitive lookup of a cue style field
fn style_field<'a>(cue: &'a Cue, key: &str) -> Option<&'a str> {
    cue.style
        .as_ref()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

fn default_style(defaults: &AssDefaults) -> String {
    format!(
        "Default,{},{},&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1",
        defaults.font_name, defaults.font_size
    )
}
