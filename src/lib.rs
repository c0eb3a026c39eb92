/*!
 * # subresync - subtitle timing rescaler and converter
 *
 * A Rust library for rescaling subtitle timing by a constant factor while
 * converting between subtitle formats.
 *
 * ## Features
 *
 * - Parse SRT and ASS/SSA subtitles, with best-effort format detection
 * - Divide every timestamp by a scale factor (frame-rate or speed fixes)
 * - Optional offset, maximum cue duration and track end clamping
 * - Write SRT or ASS, translating inline styling where the target allows it
 *   and reporting what had to be dropped
 * - Atomic file output and whole-folder batch conversion
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle_processor`: Document model (`Timestamp`, `Cue`, `Document`, `SubtitleFormat`)
 * - `formats`: Parsers and serializers:
 *   - `formats::srt`: SubRip
 *   - `formats::ass`: Advanced SubStation Alpha
 *   - `formats::markup`: Inline styling translation
 * - `resync`: Timing transforms
 * - `pipeline`: Parse, rescale and serialize composed into one conversion
 * - `app_controller`: File and folder conversions
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod pipeline;
pub mod resync;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ConvertError, FormatError, TimingError, UnsupportedFeatureError};
pub use formats::{parse, serialize, LineEnding, SerializeOptions, Serialized};
pub use pipeline::{convert, ConvertOptions, Conversion, Pipeline};
pub use resync::{rescale, resync, ScaleFactor, TimingAdjustments};
pub use subtitle_processor::{AssHeader, Cue, Document, SubtitleFormat, Timestamp};
