// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{debug, error, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap::error::ErrorKind;
use clap_complete::{generate, Shell};

use srtcombine::app_config::{self, Config, NegativeTimePolicy};
use srtcombine::{AppError, CombineRequest, Controller};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for NegativeTimePolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliNegativeTime {
    Error,
    Clamp,
}

impl From<CliNegativeTime> for NegativeTimePolicy {
    fn from(cli_policy: CliNegativeTime) -> Self {
        match cli_policy {
            CliNegativeTime::Error => NegativeTimePolicy::Error,
            CliNegativeTime::Clamp => NegativeTimePolicy::Clamp,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for srtcombine
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// srtcombine - combine multiple SRT subtitle files with proper timing adjustments
///
/// Each subtitle file is a segment. Segments are appended in the given order,
/// each shifted by the total duration of the segments before it.
#[derive(Parser, Debug)]
#[command(name = "srtcombine")]
#[command(version)]
#[command(about = "Combine multiple SRT subtitle files with proper timing adjustments")]
#[command(long_about = "Combine multiple SRT subtitle files with proper timing adjustments.

EXAMPLES:
    srtcombine -s a.srt b.srt -d 2000 1500 -o all.srt        # Explicit durations (ms)
    srtcombine -s a.srt b.srt -v a.mp4 b.mp4 -o all.srt      # Durations from videos (ffprobe)
    srtcombine -s a.srt b.srt --use-srt-duration -o all.srt  # Durations from last subtitle
    srtcombine completions bash > srtcombine.bash            # Generate bash completions

Exactly one of --durations, --videos or --use-srt-duration must be given.")]
#[command(subcommand_negates_reqs = true, args_conflicts_with_subcommands = true)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// List of SRT files in the desired order
    #[arg(short = 's', long = "subtitles", value_name = "SRT", num_args = 1.., required = true)]
    subtitles: Vec<PathBuf>,

    /// List of durations in milliseconds for each subtitle segment
    #[arg(short = 'd', long = "durations", value_name = "MS", num_args = 1..)]
    durations: Option<Vec<u64>>,

    /// List of video files to extract durations from
    #[arg(short = 'v', long = "videos", value_name = "VIDEO", num_args = 1..)]
    videos: Option<Vec<PathBuf>>,

    /// Use the last subtitle time as the duration of each segment
    #[arg(long)]
    use_srt_duration: bool,

    /// Output SRT file path
    #[arg(short = 'o', long = "output", value_name = "OUTPUT", required = true)]
    output: Option<PathBuf>,

    /// Configuration file path (JSON)
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short = 'l', long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// What to do when a shifted timestamp would be negative
    #[arg(long = "negative-time", value_enum)]
    negative_time: Option<CliNegativeTime>,
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

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }

    // @returns: Prefix for log level
    fn get_prefix_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "Error: ",
            Level::Warn => "Warning: ",
            _ => "",
        }
    }

    // Errors and warnings go to stderr, progress to stdout
    fn write_line<W: Write + IsTerminal>(mut out: W, level: Level, line: &str) {
        let _ = if out.is_terminal() {
            writeln!(out, "{}{}\x1B[0m", Self::get_color_for_level(level), line)
        } else {
            writeln!(out, "{}", line)
        };
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.min(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let line = format!("{} {}{}", now, Self::get_prefix_for_level(record.level()), record.args());

            match record.level() {
                Level::Error | Level::Warn => Self::write_line(std::io::stderr().lock(), record.level(), &line),
                _ => Self::write_line(std::io::stdout().lock(), record.level(), &line),
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Error: failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }
    log::set_max_level(LevelFilter::Info);

    // Usage errors exit with 1 like every other handled failure
    let cli = match CommandLineOptions::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "srtcombine", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run_combine(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let app_error = AppError::from(e);
            error!("{}", app_error);
            ExitCode::FAILURE
        }
    }
}

async fn run_combine(options: CommandLineOptions) -> Result<()> {
    let config = load_config(&options)?;
    log::set_max_level(config.log_level.to_level_filter());
    debug!("Effective configuration: {}", serde_json::to_string(&config)?);

    let output = options.output
        .ok_or_else(|| anyhow!("the following required arguments were not provided: --output <OUTPUT>"))?;

    let request = CombineRequest {
        subtitles: options.subtitles,
        durations: options.durations,
        videos: options.videos,
        use_srt_duration: options.use_srt_duration,
        output,
    };

    let controller = Controller::with_config(config)?;
    let summary = controller.run(request).await?;

    info!(
        "Wrote {} entries from {} segments ({} ms total)",
        summary.entries,
        summary.segments,
        summary.total_duration_ms()
    );
    info!("Done!");

    Ok(())
}

// Defaults, then the optional config file, then command line overrides
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let mut config = match &options.config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    if let Some(policy) = &options.negative_time {
        config.negative_time_policy = policy.clone().into();
    }

    Ok(config)
}
