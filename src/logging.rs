// Logging for epsagon-wrap
use std::fmt;
use std::io::{self, IsTerminal};
use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, EnvFilter};

use crate::error::{CliError, Result, WrapError};

/// Prefix stamped on every plugin notice, matching the host's plugin log channel.
pub const PLUGIN_PREFIX: &str = "[serverless-plugin-epsagon]";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Level,
    /// Output format
    pub format: LogFormat,
    /// Color output configuration
    pub color: ColorConfig,
    /// Whether to show targets (module names)
    pub show_targets: bool,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human readable output for terminals
    Pretty,
    /// JSON lines for CI log collectors
    Json,
    /// Single-line compact output
    Compact,
}

/// Color output configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ColorConfig {
    Auto,
    Always,
    Never,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            color: ColorConfig::Auto,
            show_targets: false,
        }
    }
}

impl LogConfig {
    /// Create logging configuration from CLI arguments
    pub fn from_cli(verbose: bool, quiet: bool, color: Option<&str>, format: LogFormat) -> Self {
        let level = if quiet {
            Level::ERROR
        } else if verbose {
            Level::DEBUG
        } else {
            Level::INFO
        };

        let color = match color {
            Some("always") => ColorConfig::Always,
            Some("never") => ColorConfig::Never,
            _ => ColorConfig::Auto,
        };

        Self {
            level,
            format,
            color,
            show_targets: verbose,
        }
    }

    /// Check if colors should be used based on configuration and terminal
    pub fn should_use_colors(&self) -> bool {
        match self.color {
            ColorConfig::Always => true,
            ColorConfig::Never => false,
            ColorConfig::Auto => {
                io::stderr().is_terminal()
                    && std::env::var("TERM").map_or(true, |term| term != "dumb")
                    && std::env::var("NO_COLOR").is_err()
            }
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("epsagon_wrap={}", self.level)))
    }
}

/// Initialize the logging system. Log lines go to stderr; stdout carries the
/// rewritten manifest.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let ansi = config.should_use_colors();
    let builder = subscriber_fmt()
        .with_env_filter(config.env_filter())
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(config.show_targets);

    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed.map_err(|e| {
        WrapError::Cli(Box::new(CliError::InvalidArgument {
            argument: "--log-format".to_string(),
            message: format!("Failed to install log subscriber: {e}"),
            suggestion: None,
        }))
    })
}

/// Severity of a non-fatal condition reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A skip-with-notice or degrade-with-warning condition. Notices never change
/// the outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == NoticeLevel::Warning
    }

    /// Send the notice to the log channel
    pub fn emit(&self) {
        match self.level {
            NoticeLevel::Info => tracing::info!("{}", self),
            NoticeLevel::Warning => tracing::warn!("{}", self),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", PLUGIN_PREFIX, self.message)
    }
}

/// Collects notices for a run while forwarding each one to the log
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Vec<Notice>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        notice.emit();
        self.notices.push(notice);
    }

    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.push(notice);
        }
    }

    pub fn into_vec(self) -> Vec<Notice> {
        self.notices
    }
}

/// Spans for the packaging stages
pub mod utils {
    use std::path::Path;
    use tracing::{span, Level, Span};

    /// Span covering one lifecycle hook invocation
    pub fn hook_span(event: &str) -> Span {
        span!(Level::INFO, "lifecycle_hook", event = %event)
    }

    /// Span covering manifest loading
    pub fn manifest_loading_span(manifest_path: &Path) -> Span {
        span!(Level::DEBUG, "manifest_loading", path = %manifest_path.display())
    }
}
