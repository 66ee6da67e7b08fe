// epsagon-wrap - Library module
// Generates monitoring wrappers for serverless function handlers

pub mod cli;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod language;
pub mod library;
pub mod lifecycle;
pub mod logging;
pub mod manifest;
pub mod plugin;
pub mod rewriter;
pub mod template;
pub mod validation;
pub mod writer;

// Re-export main types for easier access
pub use config::{Labels, PluginConfig, ResolvedConfig, Toggle};
pub use descriptor::{DiscoveredFunction, HandlerRef, RenderedHandler, ResolvedFunction};
pub use discovery::{discover_functions, Discovery};
pub use error::{
    exit_codes, CliError, ConfigError, DependencyError, GenerationError, Result, WrapError,
};
pub use language::Language;
pub use lifecycle::{HookAction, LifecycleEvent};
pub use logging::{ColorConfig, LogConfig, LogFormat, Notice, NoticeLevel};
pub use manifest::ServiceManifest;
pub use plugin::{HookOutcome, RunOutcome, RunReport, SkipReason, WrapPlugin};
pub use rewriter::RewriteSummary;
pub use template::{render, render_handler, TemplateParams};
pub use validation::{BlockScope, SchemaValidator, ValidationResult};
pub use writer::HandlerWriter;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

// Build information (set by build script)
pub const BUILD_DATE: &str = env!("BUILD_DATE");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// Get formatted version string with build information
pub fn version_info() -> String {
    format!("{NAME} {VERSION} (commit: {GIT_COMMIT}, built: {BUILD_DATE})")
}
