/*!
 * Subtitle parsers and serializers.
 *
 * One parser and one serializer per `SubtitleFormat` variant, selected by an
 * explicit format. Content sniffing is only used when no format is given.
 *
 * - `srt`: SubRip numbered blocks
 * - `ass`: Advanced SubStation Alpha scripts
 * - `markup`: inline styling translation between the two
 */

pub mod ass;
pub mod markup;
pub mod srt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{FormatError, UnsupportedFeatureError};
use crate::subtitle_processor::{Document, SubtitleFormat};

pub use ass::AssDefaults;

/// Line terminator written by serializers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

/// Serializer options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializeOptions {
    pub eol: LineEnding,

    /// Header used for ASS output when the document carries none
    pub ass: AssDefaults,
}

/// Serializer output: the text plus styling that had to be dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Serialized {
    pub text: String,
    pub warnings: Vec<UnsupportedFeatureError>,
}

/// Parse subtitle text.
///
/// With a format hint the text must follow that format's grammar. Without
/// one the format is sniffed; text that matches no known format yields an
/// empty document. Blank text always yields an empty document.
pub fn parse(text: &str, format_hint: Option<SubtitleFormat>) -> Result<Document, FormatError> {
    if text.trim_start_matches('\u{feff}').trim().is_empty() {
        debug!("Input is empty, producing an empty document");
        return Ok(Document::new(format_hint.unwrap_or_default()));
    }

    let format = match format_hint.or_else(|| SubtitleFormat::detect(text)) {
        Some(format) => format,
        None => {
            warn!("Input does not look like any supported subtitle format, producing an empty document");
            return Ok(Document::new(SubtitleFormat::default()));
        }
    };

    let document = match format {
        SubtitleFormat::Srt => srt::parse(text)?,
        SubtitleFormat::Ass => ass::parse(text)?,
    };

    debug!("Parsed {} {} cue(s)", document.len(), format.name());
    let overlaps = document.overlap_count();
    if overlaps > 0 {
        debug!("Found {} overlapping cue pair(s)", overlaps);
    }

    Ok(document)
}

/// Serialize a document into the target format
pub fn serialize(doc: &Document, target: SubtitleFormat, options: &SerializeOptions) -> Serialized {
    let serialized = match target {
        SubtitleFormat::Srt => srt::serialize(doc, options),
        SubtitleFormat::Ass => ass::serialize(doc, options),
    };

    for warning in &serialized.warnings {
        debug!("{}", warning);
    }

    serialized
}
