// Error handling for epsagon-wrap
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WrapError>;

/// Fatal errors. Anything that only skips a function or degrades a check is a
/// [`crate::logging::Notice`] instead.
#[derive(Debug, Error)]
pub enum WrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<ConfigError>),

    #[error("Dependency check failed: {0}")]
    Dependency(#[from] Box<DependencyError>),

    #[error("Handler generation failed: {0}")]
    Generation(#[from] Box<GenerationError>),

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI argument error: {0}")]
    Cli(#[from] Box<CliError>),
}

/// Manifest and plugin configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid YAML syntax: {message}")]
    InvalidYaml {
        message: String,
        line: Option<u32>,
        column: Option<u32>,
        file_path: Option<PathBuf>,
    },

    #[error("Manifest not found: {path}")]
    NotFound {
        path: PathBuf,
        suggestion: Option<String>,
    },

    #[error("Invalid configuration value for {field}: {message}")]
    InvalidValue {
        message: String,
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed {
        message: String,
        file_path: Option<PathBuf>,
        errors: Vec<String>,
    },
}

/// Monitoring library presence errors
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("Epsagon's {language} library must be installed in order to use this plugin!")]
    LibraryMissing {
        library: String,
        language: String,
        manifest_path: PathBuf,
        suggestion: Option<String>,
    },
}

/// Errors raised while rendering or writing wrapper handlers
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid {language} identifier '{value}' for {field} of function {function}")]
    InvalidIdentifier {
        function: String,
        field: String,
        value: String,
        language: String,
    },

    #[error("Missing token for function {function}")]
    MissingToken { function: String },

    #[error("Failed to create handlers directory: {path}")]
    OutputDirectory { path: PathBuf, error: String },

    #[error("Failed to write handler: {path}")]
    WriteFailed { path: PathBuf, error: String },

    #[error("Concurrent {stage} task failed: {error}")]
    TaskFailed { stage: String, error: String },
}

/// CLI argument and command-line interface errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid argument: {argument}")]
    InvalidArgument {
        argument: String,
        message: String,
        suggestion: Option<String>,
    },

    #[error("Conflicting arguments: {first} and {second}")]
    ConflictingArguments {
        first: String,
        second: String,
        suggestion: String,
    },

    #[error("Unknown lifecycle event: {event}")]
    UnknownLifecycleEvent {
        event: String,
        available: Vec<String>,
    },
}

/// Format errors with colors and context
pub struct ErrorFormatter {
    use_colors: bool,
}

impl ErrorFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Format an error with context and colors
    pub fn format_error(&self, error: &WrapError) -> String {
        use tracing::error;

        let error_type = match error {
            WrapError::Config(_) => "config",
            WrapError::Dependency(_) => "dependency",
            WrapError::Generation(_) => "generation",
            WrapError::Io(_) => "io",
            WrapError::Cli(_) => "cli",
        };
        error!(error_type = error_type, error = %error, "Packaging run aborted");

        let mut output = String::new();

        if self.use_colors {
            output.push_str("\x1b[31m");
        }
        output.push_str("Error: ");
        if self.use_colors {
            output.push_str("\x1b[0m");
        }

        output.push_str(&error.to_string());

        match error {
            WrapError::Config(config_err) => {
                self.add_config_context(&mut output, config_err.as_ref());
            }
            WrapError::Dependency(dependency_err) => {
                self.add_dependency_context(&mut output, dependency_err.as_ref());
            }
            WrapError::Generation(generation_err) => {
                self.add_generation_context(&mut output, generation_err.as_ref());
            }
            WrapError::Cli(cli_err) => {
                self.add_cli_context(&mut output, cli_err.as_ref());
            }
            WrapError::Io(_) => {}
        }

        output
    }

    fn add_config_context(&self, output: &mut String, error: &ConfigError) {
        match error {
            ConfigError::InvalidYaml {
                file_path: Some(path),
                line: Some(line),
                ..
            } => {
                output.push_str(&format!("\n  --> {}:{}", path.display(), line));
            }
            ConfigError::NotFound {
                suggestion: Some(suggestion),
                ..
            } => {
                output.push_str(&format!("\n  Help: {suggestion}"));
            }
            ConfigError::InvalidValue { expected, .. } => {
                output.push_str(&format!("\n  Expected: {expected}"));
            }
            ConfigError::ValidationFailed { errors, .. } => {
                for (i, error) in errors.iter().enumerate() {
                    output.push_str(&format!("\n    {}: {}", i + 1, error));
                }
            }
            _ => {}
        }
    }

    fn add_dependency_context(&self, output: &mut String, error: &DependencyError) {
        let DependencyError::LibraryMissing {
            manifest_path,
            suggestion,
            ..
        } = error;
        output.push_str(&format!("\n  Checked: {}", manifest_path.display()));
        if let Some(suggestion) = suggestion {
            output.push_str(&format!("\n  Help: {suggestion}"));
        }
    }

    fn add_generation_context(&self, output: &mut String, error: &GenerationError) {
        match error {
            GenerationError::OutputDirectory { error, .. }
            | GenerationError::WriteFailed { error, .. } => {
                output.push_str(&format!("\n  Cause: {error}"));
            }
            _ => {}
        }
    }

    fn add_cli_context(&self, output: &mut String, error: &CliError) {
        match error {
            CliError::InvalidArgument {
                suggestion: Some(suggestion),
                ..
            } => {
                output.push_str(&format!("\n  Help: {suggestion}"));
            }
            CliError::ConflictingArguments { suggestion, .. } => {
                output.push_str(&format!("\n  Help: {suggestion}"));
            }
            CliError::UnknownLifecycleEvent { available, .. } => {
                output.push_str(&format!("\n  Known events: {}", available.join(", ")));
            }
            _ => {}
        }
    }
}

/// Process exit codes surfaced to the host
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const DEPENDENCY_ERROR: i32 = 3;
    pub const GENERATION_ERROR: i32 = 4;
    pub const CLI_ERROR: i32 = 7;
}

impl WrapError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            WrapError::Config(_) => exit_codes::CONFIG_ERROR,
            WrapError::Dependency(_) => exit_codes::DEPENDENCY_ERROR,
            WrapError::Generation(_) => exit_codes::GENERATION_ERROR,
            WrapError::Cli(_) => exit_codes::CLI_ERROR,
            WrapError::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }

    /// Create a user-friendly error message with context
    pub fn user_message(&self, use_colors: bool) -> String {
        ErrorFormatter::new(use_colors).format_error(self)
    }

    pub(crate) fn task_failed(stage: &str, error: impl std::fmt::Display) -> Self {
        WrapError::Generation(Box::new(GenerationError::TaskFailed {
            stage: stage.to_string(),
            error: error.to_string(),
        }))
    }
}

// Conversion from serde_yaml::Error to ConfigError
impl From<serde_yaml::Error> for Box<ConfigError> {
    fn from(error: serde_yaml::Error) -> Self {
        let location = error.location();
        Box::new(ConfigError::InvalidYaml {
            message: error.to_string(),
            line: location.as_ref().map(|l| l.line() as u32),
            column: location.as_ref().map(|l| l.column() as u32),
            file_path: None,
        })
    }
}

impl From<serde_yaml::Error> for WrapError {
    fn from(error: serde_yaml::Error) -> Self {
        WrapError::Config(Box::<ConfigError>::from(error))
    }
}
