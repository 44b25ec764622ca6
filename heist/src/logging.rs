// Logging for the heist simulation
//
// Built on the `tracing` ecosystem. Log output always goes to stderr so that
// stdout carries nothing but the appraisal tokens and the final report.
//
// # Usage Examples
//
// ```rust
// use heist::logging;
//
// // INFO level, human-readable
// logging::init(logging::LogConfig::default());
//
// // Or a custom configuration
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     json_format: true,
//     ..Default::default()
// };
// logging::init(config);
// ```
//
// ## Actor spans
//
// ```rust
// let span = heist::thief_span!("ordinary", 3);
// let _guard = span.enter();
// heist::log_state!("ordinary", 3, "CRAWLING_INWARDS");
// ```

use std::io;
use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id; actor threads are named after the actor
    pub show_thread_info: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: false,
            show_thread_info: true,
            target_filters: None,
        }
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

fn env_filter(config: &LogConfig) -> EnvFilter {
    let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    if let Some(filters) = &config.target_filters {
        for filter in filters.split(',') {
            if let Ok(directive) = filter.parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }
    env_filter
}

/// Initialize the logging system with the given configuration.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(&config));

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(
                registry.with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_writer(io::stderr)
                        .with_thread_names(config.show_thread_info),
                ),
            )
        } else {
            Box::new(
                registry.with(
                    fmt::layer()
                        .with_ansi(atty::is(atty::Stream::Stderr))
                        .with_writer(io::stderr)
                        .with_file(config.show_file_line)
                        .with_line_number(config.show_file_line)
                        .with_thread_names(config.show_thread_info),
                ),
            )
        };

        set_global_subscriber(subscriber);
    });
}

// Helper function to set the global subscriber
fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Opens `path` in append mode, creating it if needed.
pub fn file_writer(path: &str) -> io::Result<Box<dyn io::Write + Send + Sync + 'static>> {
    use std::fs::OpenOptions;

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Box::new(file))
}

/// Initialize logging to stderr and to `log_file`.
///
/// The file is opened up front so a bad path is reported to the caller.
pub fn init_with_file(config: LogConfig, log_file: &str) -> io::Result<()> {
    // fail early on an unusable path
    file_writer(log_file)?;

    INIT.call_once(|| {
        let console_layer = fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stderr))
            .with_writer(io::stderr)
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info);

        let log_file_path = log_file.to_string();
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(move || match file_writer(&log_file_path) {
                Ok(writer) => writer,
                Err(_) => Box::new(io::stderr()),
            })
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter(&config))
            .with(console_layer)
            .with(file_layer);

        set_global_subscriber(subscriber);
    });

    Ok(())
}

/// Warnings and errors only, to keep test output clean.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        target_filters: None,
    });
}

/// Create a span for an actor thread.
///
/// ```rust
/// let span = heist::thief_span!("master", 0);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! thief_span {
    ($role:expr, $id:expr) => {
        $crate::tracing::info_span!("thief", role = $role, id = $id)
    };
    ($role:expr, $id:expr, $($fields:tt)*) => {
        $crate::tracing::info_span!("thief", role = $role, id = $id, $($fields)*)
    };
}

/// Log an actor state transition.
#[macro_export]
macro_rules! log_state {
    ($role:expr, $id:expr, $state:expr) => {
        $crate::tracing::debug!(role = $role, id = $id, state = %$state, "state change");
    };
    ($role:expr, $id:expr, $state:expr, $($fields:tt)*) => {
        $crate::tracing::debug!(role = $role, id = $id, state = %$state, $($fields)*, "state change");
    };
}

/// Log a region event at TRACE level, tagged with the region name.
#[macro_export]
macro_rules! log_region {
    ($region:expr, $event:literal) => {
        $crate::tracing::trace!(region = $region, $event);
    };
    ($region:expr, $event:literal, $($fields:tt)*) => {
        $crate::tracing::trace!(region = $region, $($fields)*, $event);
    };
}

/// Log error events
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {
        $crate::tracing::error!(error = %$error);
    };
    ($error:expr, $($fields:tt)*) => {
        $crate::tracing::error!(error = %$error, $($fields)*);
    };
}

// Re-export the most commonly used tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
