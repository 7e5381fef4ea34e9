mod cli;

use clap::{Parser, ValueEnum};
use cli::output::OutputFormat;
use stackdio::config::{Config, ENV_URL, ENV_USERNAME};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command line client for the stackdio API
#[derive(Parser, Debug)]
#[command(name = "stackdio", version, about, long_about = None)]
struct Args {
    /// API base URL (overrides STACKDIO_URL and the saved config)
    #[arg(long, global = true, env = ENV_URL)]
    url: Option<String>,

    /// Username (overrides STACKDIO_USERNAME and the saved config)
    #[arg(short, long, global = true, env = ENV_USERNAME)]
    username: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "json", global = true)]
    format: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: cli::Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Open `path` for appending behind a non-blocking writer. Buffered lines
/// reach the file when the guard is dropped.
fn open_log_writer(path: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    Ok(tracing_appender::non_blocking(file))
}

fn setup_logging(level: LogLevel) -> Option<WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    let (non_blocking, guard) = match open_log_writer(&log_path) {
        Ok(writer) => writer,
        Err(err) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, err);
            return None;
        },
    };

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("stackdio {} started with log level: {:?}", stackdio::CLIENT_VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = Config::config_dir() {
        return config_dir.join("stackdio.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".stackdio").join("stackdio.log");
    }
    PathBuf::from("stackdio.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level);

    // Effective config: CLI > environment > config file. clap already
    // folds STACKDIO_URL/STACKDIO_USERNAME into the arguments.
    let mut config = Config::load().with_env();
    if let Some(url) = args.url {
        config.url = Some(url);
    }
    if let Some(username) = args.username {
        config.username = Some(username);
    }

    let code = match cli::run(args.command, config, args.format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Command failed: {:?}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        },
    };

    // Flush the log file
    drop(log_guard);
    code
}
