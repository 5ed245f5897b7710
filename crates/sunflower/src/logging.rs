use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Crates whose events follow `--log-level`. Everything else stays at warn.
const LINK_TARGETS: [&str; 5] = [
    "sunflower",
    "sunflower_transport",
    "sunflower_frame",
    "sunflower_link",
    "sunflower_control",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// One line per event, without module paths.
    Text,
    /// One JSON object per event, with the emitting module as `target`.
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    /// Adds one event per poll cycle.
    Debug,
    /// Includes every frame and every byte dropped while resyncing.
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn log_targets(level: LogLevel) -> Targets {
    let level = level.as_filter();
    Targets::new()
        .with_default(level.min(LevelFilter::WARN))
        .with_targets(LINK_TARGETS.map(|target| (target, level)))
}

/// Log to stderr. Thread names are kept so receiver, alert and console
/// events can be told apart.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_thread_names(true);
    let targets = log_targets(level);

    let installed = match format {
        LogFormat::Text => builder
            .with_target(false)
            .finish()
            .with(targets)
            .try_init(),
        LogFormat::Json => builder.json().finish().with(targets).try_init(),
    };
    if let Err(err) = installed {
        eprintln!("warning: logging not initialized: {err}");
    }
}
