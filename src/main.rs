// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use subresync::app_config::{Config, LogLevel};
use subresync::app_controller::{Controller, FileOptions};
use subresync::errors::AppError;
use subresync::formats::LineEnding;
use subresync::subtitle_processor::SubtitleFormat;

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Srt,
    Ass,
}

impl From<CliFormat> for SubtitleFormat {
    fn from(cli_format: CliFormat) -> Self {
        match cli_format {
            CliFormat::Srt => SubtitleFormat::Srt,
            CliFormat::Ass => SubtitleFormat::Ass,
        }
    }
}

/// CLI Wrapper for LineEnding to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLineEnding {
    Lf,
    Crlf,
}

impl From<CliLineEnding> for LineEnding {
    fn from(cli_eol: CliLineEnding) -> Self {
        match cli_eol {
            CliLineEnding::Lf => LineEnding::Lf,
            CliLineEnding::Crlf => LineEnding::Crlf,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// Options shared by single-file and folder conversion
#[derive(Args, Debug, Clone, Default)]
struct ConversionFlags {
    /// Source format (default: input extension, then content detection)
    #[arg(long, value_enum)]
    from: Option<CliFormat>,

    /// Target format (default: output extension, then config, then srt)
    #[arg(long, value_enum)]
    to: Option<CliFormat>,

    /// Line ending of the written file
    #[arg(long, value_enum)]
    eol: Option<CliLineEnding>,

    /// Shift applied to every timestamp after rescaling, in milliseconds
    #[arg(long, allow_negative_numbers = true)]
    offset_ms: Option<i64>,

    /// Trim cues longer than this many milliseconds
    #[arg(long)]
    max_duration_ms: Option<u64>,

    /// Clamp timestamps to this track end, in milliseconds
    #[arg(long)]
    end_time_ms: Option<u64>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Do not write output when styling had to be dropped
    #[arg(long)]
    strict: bool,

    /// Configuration file path (JSON)
    #[arg(short, long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, env = "SUBRESYNC_LOG_LEVEL")]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Every timestamp is divided by this factor
    #[arg(value_name = "SCALE", allow_negative_numbers = true)]
    scale: f64,

    /// Subtitle file to read
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Subtitle file to write
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    flags: ConversionFlags,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Every timestamp is divided by this factor
    #[arg(value_name = "SCALE", allow_negative_numbers = true)]
    scale: f64,

    /// Directory searched recursively for .srt, .ass and .ssa files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory receiving the converted files, mirroring the input layout
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    #[command(flatten)]
    flags: ConversionFlags,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rescale and convert one subtitle file (default command)
    Convert(ConvertArgs),

    /// Rescale and convert every subtitle file in a directory
    Batch(BatchArgs),

    /// Generate shell completions for subresync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subresync - rescale subtitle timing and convert between SRT and ASS
#[derive(Parser, Debug)]
#[command(name = "subresync")]
#[command(version)]
#[command(about = "Rescale subtitle timing and convert between SRT and ASS")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "subresync divides every subtitle timestamp by SCALE and writes the result in the target format.

EXAMPLES:
    subresync 1.04270 movie.ass movie.srt          # 25 fps timing to 23.976 fps, ASS to SRT
    subresync 2 fast.srt slow.srt                  # Halve every timestamp
    subresync --to ass 1 in.srt out.txt            # Plain SRT to ASS conversion
    subresync --max-duration-ms 7000 1.5 a.srt b.srt
    subresync batch 1.04270 ./subs ./fixed         # Convert a whole folder
    subresync completions bash > subresync.bash    # Generate bash completions

CONFIGURATION:
    A JSON configuration can be passed with --config. It is never written.
    Command line options override its values.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Every timestamp is divided by this factor
    #[arg(value_name = "SCALE", allow_negative_numbers = true)]
    scale: Option<f64>,

    /// Subtitle file to read
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Subtitle file to write
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    flags: ConversionFlags,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and label for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> ExitCode {
    // The filter allows everything; log::set_max_level does the gating
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subresync", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Batch(args)) => run_batch(args),
        None => match (cli.scale, cli.input, cli.output) {
            // Default behavior - top-level args mean `convert`
            (Some(scale), Some(input), Some(output)) => run_convert(ConvertArgs {
                scale,
                input,
                output,
                flags: cli.flags,
            }),
            _ => {
                let _ = CommandLineOptions::command().print_help();
                Err(anyhow::anyhow!("SCALE, INPUT and OUTPUT are required when no subcommand is specified"))
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the configuration and apply command-line overrides
fn load_config(flags: &ConversionFlags) -> Result<Config> {
    let mut config = match &flags.config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(eol) = flags.eol {
        config.eol = eol.into();
    }
    if let Some(offset) = flags.offset_ms {
        config.timing.offset_ms = offset;
    }
    if flags.max_duration_ms.is_some() {
        config.timing.max_duration_ms = flags.max_duration_ms;
    }
    if flags.end_time_ms.is_some() {
        config.timing.end_time_ms = flags.end_time_ms;
    }
    if flags.strict {
        config.strict = true;
    }
    if let Some(level) = flags.log_level {
        config.log_level = level.into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());
    debug!("Effective configuration: {:?}", config);

    Ok(config)
}

fn file_options(flags: &ConversionFlags) -> FileOptions {
    FileOptions {
        source: flags.from.map(Into::into),
        target: flags.to.map(Into::into),
        force_overwrite: flags.force_overwrite,
    }
}

/// Attach the failing stage to an application error
fn stage_error(e: AppError) -> anyhow::Error {
    let stage = e.stage();
    anyhow::Error::new(e).context(format!("{} stage failed", stage))
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let config = load_config(&args.flags)?;
    let controller = Controller::with_config(config)?;

    let conversion = controller
        .convert_file(args.scale, &args.input, &args.output, &file_options(&args.flags))
        .map_err(stage_error)?;

    if !conversion.warnings.is_empty() {
        info!(
            "Done with {} warning(s): styling not supported by {} was dropped",
            conversion.warnings.len(),
            conversion.target_format.name()
        );
    }
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<()> {
    let config = load_config(&args.flags)?;
    let controller = Controller::with_config(config)?;

    controller
        .convert_folder(args.scale, &args.input_dir, &args.output_dir, &file_options(&args.flags))
        .map_err(stage_error)?;
    Ok(())
}
