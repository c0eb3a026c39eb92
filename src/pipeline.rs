/*!
 * In-memory conversion pipeline: parse, rescale, adjust, serialize.
 *
 * The pipeline is a pure function of its input text and options. It fails
 * fast: the first parse or timing error aborts the conversion and is
 * returned unchanged. Dropped styling does not abort; it is returned as
 * warnings next to the output.
 */

use log::{debug, warn};

use crate::errors::{ConvertError, UnsupportedFeatureError};
use crate::formats::{self, SerializeOptions, Serialized};
use crate::resync::{self, ScaleFactor, TimingAdjustments};
use crate::subtitle_processor::SubtitleFormat;

/// Everything a conversion needs besides the input text
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Source format; sniffed from the input when `None`
    pub source: Option<SubtitleFormat>,

    pub target: SubtitleFormat,

    /// Every timestamp is divided by this value
    pub scale_factor: f64,

    pub adjustments: TimingAdjustments,

    pub serialize: SerializeOptions,
}

impl ConvertOptions {
    pub fn new(target: SubtitleFormat, scale_factor: f64) -> Self {
        Self {
            source: None,
            target,
            scale_factor,
            adjustments: TimingAdjustments::default(),
            serialize: SerializeOptions::default(),
        }
    }

    pub fn with_source(mut self, source: Option<SubtitleFormat>) -> Self {
        self.source = source;
        self
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Serialized document in the target format
    pub output: String,

    /// Styling dropped because the target cannot represent it
    pub warnings: Vec<UnsupportedFeatureError>,

    pub cue_count: usize,
    pub source_format: SubtitleFormat,
    pub target_format: SubtitleFormat,
}

/// Parser, timing transform and serializer composed
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: ConvertOptions,
}

impl Pipeline {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Run the whole conversion on `input`
    pub fn convert(&self, input: &str) -> Result<Conversion, ConvertError> {
        // Checked before parsing so a bad factor never costs a parse
        let factor = ScaleFactor::new(self.options.scale_factor)?;

        let document = formats::parse(input, self.options.source)?;
        let source_format = document.format;
        let cue_count = document.len();

        let document = resync::rescale(document, factor)?;
        let document = resync::apply_adjustments(document, &self.options.adjustments)?;

        let target = self.options.target;
        let Serialized { text, warnings } = formats::serialize(&document, target, &self.options.serialize);

        if !warnings.is_empty() {
            warn!(
                "{} styling feature(s) not supported by {} were dropped",
                warnings.len(),
                target.name()
            );
        }
        debug!(
            "Converted {} cue(s) from {} to {}",
            cue_count,
            source_format.name(),
            target.name()
        );

        Ok(Conversion {
            output: text,
            warnings,
            cue_count,
            source_format,
            target_format: target,
        })
    }
}

/// Convert `input` from `source` to `target`, dividing timestamps by `scale_factor`
pub fn convert(
    input: &str,
    source: SubtitleFormat,
    target: SubtitleFormat,
    scale_factor: f64,
) -> Result<Conversion, ConvertError> {
    Pipeline::new(ConvertOptions::new(target, scale_factor).with_source(Some(source))).convert(input)
}
