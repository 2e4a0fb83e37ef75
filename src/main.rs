// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use smisync::app_config::{self, Config};
use smisync::{AppError, Controller, OperationOutcome};

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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List subtitle lines containing a text, with their sync times
    Search {
        /// SMI file to search
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Text to look for (case-sensitive)
        #[arg(value_name = "QUERY")]
        query: String,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Shift every sync time by a number of seconds
    Shift {
        /// SMI file to adjust
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Offset in seconds, e.g. 1.5 or -2
        #[arg(value_name = "OFFSET_SECONDS", allow_hyphen_values = true)]
        offset: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Shift every sync time so the sync at --at lands on --to
    Anchor {
        /// SMI file to adjust
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Current sync time of the reference subtitle, in milliseconds
        #[arg(long = "at", value_name = "MS")]
        anchor_ms: u64,

        /// Where the reference subtitle should be, in seconds
        #[arg(long = "to", value_name = "SECONDS", allow_hyphen_values = true)]
        target_seconds: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate shell completions for smisync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output file (defaults to <name>.<suffix>.smi next to the input)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Overwrite the input file instead of writing a new one
    #[arg(long, conflicts_with = "output")]
    in_place: bool,
}

/// smisync - shift SAMI subtitle timings
///
/// Moves the <Sync Start=...> times of .smi subtitles, keeping the rest of the
/// file and its encoding untouched.
#[derive(Parser, Debug)]
#[command(name = "smisync")]
#[command(version)]
#[command(about = "Shift SAMI (.smi) subtitle sync times")]
#[command(long_about = "smisync shifts the <Sync Start=...> times of SAMI subtitles. The file's encoding
(UTF-16, UTF-8 or CP949) is detected automatically and kept on output.

EXAMPLES:
    smisync search movie.smi \"Hello\"               # Find a line and its sync time
    smisync shift movie.smi 1.5                      # Delay everything by 1.5 s
    smisync shift movie.smi -2 -o fixed.smi          # Advance everything by 2 s
    smisync anchor movie.smi --at 5000 --to 3.0      # Move the line at 5000 ms to 3 s
    smisync completions bash > smisync.bash          # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> ExitCode {
    // Info until the config says otherwise
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: CommandLineOptions) -> Result<bool, AppError> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "smisync", &mut std::io::stdout());
        return Ok(true);
    }

    let controller = build_controller(&cli.config_path, cli.log_level.clone())?;

    match cli.command {
        Commands::Search { file, query, json } => {
            let occurrences = controller.search(&file, &query)?;
            if occurrences.is_empty() {
                info!("No subtitle line contains '{}'", query);
            }
            // A closed pipe surfaces as a file error instead of a panic
            let mut stdout = std::io::stdout().lock();
            if json {
                let rendered = serde_json::to_string_pretty(&occurrences)
                    .map_err(|e| AppError::Unknown(e.to_string()))?;
                writeln!(stdout, "{}", rendered)?;
            } else {
                for occurrence in &occurrences {
                    writeln!(stdout, "{}\t{}\t{}", occurrence.ms, occurrence.format_time(), occurrence.text)?;
                }
            }
            Ok(true)
        }
        Commands::Shift { file, offset, output } => {
            let destination = resolve_destination(&controller, &file, &output);
            let result = controller.batch_adjust(&file, &destination, &offset);
            Ok(report(OperationOutcome::from_result(&result)))
        }
        Commands::Anchor { file, anchor_ms, target_seconds, output } => {
            let destination = resolve_destination(&controller, &file, &output);
            let result = controller.anchor_adjust(&file, &destination, anchor_ms, &target_seconds);
            Ok(report(OperationOutcome::from_result(&result)))
        }
        Commands::Completions { .. } => Ok(true),
    }
}

// @creates: Controller from the config file, with the command line log level applied
fn build_controller(config_path: &Path, cli_log_level: Option<CliLogLevel>) -> Result<Controller, AppError> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli_log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    let mut config = Config::load_or_create(config_path)
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    if let Some(log_level) = cli_log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(level_filter(&config.log_level));

    Controller::with_config(config).map_err(|e| AppError::Config(format!("{:#}", e)))
}

fn resolve_destination(controller: &Controller, file: &Path, output: &OutputArgs) -> PathBuf {
    if output.in_place {
        return file.to_path_buf();
    }
    output
        .output
        .clone()
        .unwrap_or_else(|| controller.default_destination(file))
}

// The controller has already logged the failure itself
fn report(outcome: OperationOutcome) -> bool {
    if outcome.success {
        info!("Done.");
    } else {
        debug!("Operation failed: {}", outcome.message);
    }
    outcome.success
}
