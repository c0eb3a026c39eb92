use std::fmt::Write as _;

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::markup;
use super::{SerializeOptions, Serialized};
use crate::errors::{FormatError, UnsupportedFeatureError};
use crate::subtitle_processor::{Cue, Document, SubtitleFormat, Timestamp};

// @module: SubRip parsing and serialization

// @const: SRT timing line; trailing position coordinates are ignored
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})(?:\s.*)?$").unwrap()
});

enum State {
    /// Between blocks
    Idle,
    /// Saw a cue number, timing line must follow
    ExpectTiming { line: usize, content: String },
    /// Collecting text lines of a cue
    InText(Cue),
}

/// Parse SRT text into a document
pub fn parse(text: &str) -> Result<Document, FormatError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut cues = Vec::new();
    let mut state = State::Idle;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();

        state = match state {
            State::Idle if line.trim().is_empty() => State::Idle,
            State::Idle => {
                if line.trim().parse::<u64>().is_ok() {
                    State::ExpectTiming { line: line_no, content: line.to_string() }
                } else if line.contains("-->") {
                    // Some writers omit the cue number
                    debug!("Cue without number at line {}", line_no);
                    State::InText(parse_timing_line(line_no, line)?)
                } else {
                    return Err(FormatError::new(line_no, line, "expected a cue number"));
                }
            }
            State::ExpectTiming { line: number_line, content } => {
                if line.contains("-->") {
                    State::InText(parse_timing_line(line_no, line)?)
                } else {
                    return Err(FormatError::new(
                        number_line,
                        &content,
                        "unterminated cue block: cue number is not followed by a timing line",
                    ));
                }
            }
            State::InText(cue) if line.trim().is_empty() => {
                cues.push(cue);
                State::Idle
            }
            State::InText(mut cue) => {
                cue.text.push(line.to_string());
                State::InText(cue)
            }
        };
    }

    match state {
        State::Idle => {}
        State::InText(cue) => cues.push(cue),
        State::ExpectTiming { line, content } => {
            return Err(FormatError::new(
                line,
                &content,
                "unterminated cue block: input ends before the timing line",
            ));
        }
    }

    Ok(Document::with_cues(SubtitleFormat::Srt, cues))
}

/// Parse a `start --> end` line into an empty cue
fn parse_timing_line(line_no: usize, line: &str) -> Result<Cue, FormatError> {
    let caps = TIMESTAMP_REGEX
        .captures(line)
        .ok_or_else(|| FormatError::new(line_no, line, "malformed timing line"))?;

    let start = timestamp_from_captures(&caps, 1)
        .ok_or_else(|| FormatError::new(line_no, line, "start timestamp out of range"))?;
    let end = timestamp_from_captures(&caps, 5)
        .ok_or_else(|| FormatError::new(line_no, line, "end timestamp out of range"))?;

    if start > end {
        return Err(FormatError::new(line_no, line, "cue ends before it starts"));
    }

    Ok(Cue {
        start,
        end,
        text: Vec::new(),
        style: None,
    })
}

/// Build a timestamp from four consecutive capture groups
fn timestamp_from_captures(caps: &Captures, start_idx: usize) -> Option<Timestamp> {
    let field = |i: usize| caps.get(start_idx + i).map(|m| m.as_str()).unwrap_or("0");

    let hours: u64 = field(0).parse().ok()?;
    let minutes: u64 = field(1).parse().ok()?;
    let seconds: u64 = field(2).parse().ok()?;
    let millis = fraction_to_millis(field(3))?;

    Timestamp::from_parts(hours, minutes, seconds, millis)
}

/// `5` -> 500, `05` -> 50, `005` -> 5
pub(crate) fn fraction_to_millis(digits: &str) -> Option<u64> {
    let value: u64 = digits.parse().ok()?;
    match digits.len() {
        1 => Some(value * 100),
        2 => Some(value * 10),
        3 => Some(value),
        _ => None,
    }
}

/// Serialize a document as SRT, renumbering cues from 1
pub fn serialize(doc: &Document, options: &SerializeOptions) -> Serialized {
    let eol = options.eol.as_str();
    let mut text = String::new();
    let mut warnings = Vec::new();

    for (idx, cue) in doc.cues.iter().enumerate() {
        let number = idx + 1;

        let body = match doc.format {
            SubtitleFormat::Srt => cue.joined_text(),
            SubtitleFormat::Ass => {
                for feature in markup::ass_style_features(cue) {
                    push_warning(&mut warnings, number, feature);
                }
                let (converted, dropped) = markup::ass_to_srt(&cue.joined_text());
                for feature in dropped {
                    push_warning(&mut warnings, number, feature);
                }
                converted
            }
        };

        let _ = write!(
            text,
            "{}{eol}{} --> {}{eol}",
            number,
            cue.start.format_srt(),
            cue.end.format_srt()
        );
        // A blank line would end the block early
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            text.push_str(line);
            text.push_str(eol);
        }
        text.push_str(eol);
    }

    Serialized { text, warnings }
}

fn push_warning(warnings: &mut Vec<UnsupportedFeatureError>, cue: usize, feature: String) {
    let warning = UnsupportedFeatureError {
        cue,
        feature,
        target: SubtitleFormat::Srt.name(),
    };
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}
