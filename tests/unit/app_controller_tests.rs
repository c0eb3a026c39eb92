/*!
 * Tests for application controller functionality
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use subresync::app_config::Config;
use subresync::app_controller::{Controller, FileOptions};
use subresync::errors::{AppError, ConvertError, TimingError};
use subresync::subtitle_processor::SubtitleFormat;
use crate::common;

/// Test creating a controller with the default configuration
#[test]
fn test_new_withDefaultConfig_shouldSucceed() {
    let controller = Controller::new();
    assert_eq!(controller.config(), &Config::default());
}

#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.ass.font_size = 0;
    assert!(Controller::with_config(config).is_err());
}

/// Target format precedence: explicit, output extension, config, SRT
#[test]
fn test_resolve_target_shouldFollowPrecedence() -> Result<()> {
    let controller = Controller::new();
    assert_eq!(controller.resolve_target(Path::new("out.txt"), None), SubtitleFormat::Srt);
    assert_eq!(controller.resolve_target(Path::new("out.ass"), None), SubtitleFormat::Ass);
    assert_eq!(
        controller.resolve_target(Path::new("out.ass"), Some(SubtitleFormat::Srt)),
        SubtitleFormat::Srt
    );

    let mut config = Config::default();
    config.target_format = Some(SubtitleFormat::Ass);
    let controller = Controller::with_config(config)?;
    assert_eq!(controller.resolve_target(Path::new("out.txt"), None), SubtitleFormat::Ass);
    assert_eq!(controller.resolve_target(Path::new("out.srt"), None), SubtitleFormat::Srt);
    Ok(())
}

#[test]
fn test_convert_file_withSrtToAss_shouldWriteScript() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("movie.ass");

    let conversion = Controller::new().convert_file(2.0, &input, &output, &FileOptions::default())?;

    assert_eq!(conversion.cue_count, 3);
    assert_eq!(conversion.target_format, SubtitleFormat::Ass);
    let written = fs::read_to_string(&output)?;
    assert_eq!(written, conversion.output);
    assert!(written.contains("Dialogue: 0,0:00:00.50,0:00:02.00,Default,,0,0,0,,This is a test subtitle."));
    Ok(())
}

/// An invalid factor fails before the input is read or the output touched
#[test]
fn test_convert_file_withZeroFactor_shouldFailWithoutTouchingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("missing.srt");
    let output = temp_dir.path().join("out.srt");

    let err = Controller::new()
        .convert_file(0.0, &input, &output, &FileOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Convert(ConvertError::Timing(TimingError::InvalidScaleFactor(_)))
    ));
    assert_eq!(err.stage(), "timing");
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_convert_file_withMissingInput_shouldFailAtReadStage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let err = Controller::new()
        .convert_file(
            1.0,
            &temp_dir.path().join("missing.srt"),
            &temp_dir.path().join("out.srt"),
            &FileOptions::default(),
        )
        .unwrap_err();

    assert_eq!(err.stage(), "read");
    Ok(())
}

#[test]
fn test_convert_file_withParseError_shouldNotCreateOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "bad.srt", "1\n99:99:99,999 --> bad\nText\n")?;
    let output = temp_dir.path().join("bad.ass");

    let err = Controller::new()
        .convert_file(1.0, &input, &output, &FileOptions::default())
        .unwrap_err();

    assert_eq!(err.stage(), "parse");
    assert!(err.to_string().contains("line 2"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_convert_file_withExistingOutput_shouldRequireForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "in.srt")?;
    let output = common::create_test_file(temp_dir.path(), "out.srt", "keep me")?;
    let controller = Controller::new();

    let err = controller
        .convert_file(1.0, &input, &output, &FileOptions::default())
        .unwrap_err();
    assert!(matches!(err, AppError::OutputExists(_)));
    assert_eq!(fs::read_to_string(&output)?, "keep me");

    let options = FileOptions {
        force_overwrite: true,
        ..Default::default()
    };
    controller.convert_file(1.0, &input, &output, &options)?;
    assert_eq!(fs::read_to_string(&output)?, common::SAMPLE_SRT.to_string() + "\n");
    Ok(())
}

/// Strict mode refuses to write lossy output
#[test]
fn test_convert_file_withStrictAndDroppedStyling_shouldNotWrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "styled.ass", common::STYLED_ASS)?;
    let output = temp_dir.path().join("styled.srt");

    let mut config = Config::default();
    config.strict = true;
    let err = Controller::with_config(config)?
        .convert_file(1.0, &input, &output, &FileOptions::default())
        .unwrap_err();

    assert!(matches!(err, AppError::Warnings { count: 4 }));
    assert!(!output.exists());

    // Without strict the same file converts with warnings
    let conversion = Controller::new().convert_file(1.0, &input, &output, &FileOptions::default())?;
    assert_eq!(conversion.warnings.len(), 4);
    assert!(output.exists());
    Ok(())
}

#[test]
fn test_convert_file_withUnknownExtension_shouldDetectSource() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "subs.txt", common::SAMPLE_ASS)?;
    let output = temp_dir.path().join("subs.srt");

    let conversion = Controller::new().convert_file(1.0, &input, &output, &FileOptions::default())?;

    assert_eq!(conversion.source_format, SubtitleFormat::Ass);
    assert_eq!(conversion.cue_count, 2);
    Ok(())
}

#[test]
fn test_convert_file_withExplicitSource_shouldOverrideExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    // Misnamed: SRT content in a .ass file
    let input = common::create_test_file(temp_dir.path(), "wrong.ass", common::SAMPLE_SRT)?;
    let output = temp_dir.path().join("right.srt");

    let options = FileOptions {
        source: Some(SubtitleFormat::Srt),
        ..Default::default()
    };
    let conversion = Controller::new().convert_file(1.0, &input, &output, &options)?;
    assert_eq!(conversion.cue_count, 3);
    Ok(())
}
