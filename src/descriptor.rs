// Function descriptors at each stage of the packaging pipeline:
// manifest entry -> DiscoveredFunction -> ResolvedFunction -> RenderedHandler

use crate::config::{PluginConfig, ResolvedConfig};
use crate::language::Language;

/// Suffix appended to a function key to name its generated wrapper
pub const HANDLER_SUFFIX: &str = "epsagon";

/// A `path.method` handler reference split at its last dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRef {
    /// Module path relative to the service root, e.g. `src/handlers`
    pub relative_path: String,
    /// Exported function name, e.g. `hello`
    pub method: String,
}

impl HandlerRef {
    pub fn parse(handler: &str) -> Option<Self> {
        let (relative_path, method) = handler.rsplit_once('.')?;
        if relative_path.is_empty() || method.is_empty() {
            return None;
        }
        Some(Self {
            relative_path: relative_path.to_string(),
            method: method.to_string(),
        })
    }
}

/// `<key>-epsagon`
pub fn generated_handler_name(key: &str) -> String {
    format!("{key}-{HANDLER_SUFFIX}")
}

/// A function that survived discovery
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredFunction {
    pub key: String,
    pub handler: HandlerRef,
    pub language: Language,
    pub overrides: PluginConfig,
}

impl DiscoveredFunction {
    /// Same function classified as `language` (dialect refinement)
    pub fn with_language(self, language: Language) -> Self {
        Self { language, ..self }
    }

    pub fn generated_handler_name(&self) -> String {
        generated_handler_name(&self.key)
    }
}

/// A function with its final language and per-function configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFunction {
    pub key: String,
    pub handler: HandlerRef,
    pub language: Language,
    pub config: ResolvedConfig,
    /// Output directory of the run, forward-slash separated
    pub handlers_dir: String,
}

impl ResolvedFunction {
    /// Layer the function's overrides on the global block. The output
    /// directory is a property of the run, not of the function.
    pub fn resolve(function: DiscoveredFunction, global: &PluginConfig, handlers_dir: &str) -> Self {
        let config = ResolvedConfig::resolve(global, Some(&function.overrides));
        Self {
            key: function.key,
            handler: function.handler,
            language: function.language,
            config,
            handlers_dir: handlers_dir.to_string(),
        }
    }

    pub fn generated_handler_name(&self) -> String {
        generated_handler_name(&self.key)
    }

    pub fn file_name(&self) -> String {
        self.language
            .wrapper_file_name(&self.generated_handler_name())
    }

    /// Module path of the wrapper, e.g. `epsagon_handlers/hello-epsagon`
    pub fn module_path(&self) -> String {
        format!("{}/{}", self.handlers_dir, self.generated_handler_name())
    }

    /// New handler reference for the manifest
    pub fn handler_reference(&self) -> String {
        format!("{}.{}", self.module_path(), self.handler.method)
    }

    /// Per-function wrapper, then global wrapper, then the language default
    pub fn wrapper_name(&self) -> &str {
        self.config
            .wrapper
            .as_deref()
            .unwrap_or_else(|| self.language.default_wrapper())
    }
}

/// Generated source for one function, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHandler {
    pub key: String,
    pub file_name: String,
    pub module_path: String,
    pub handler_reference: String,
    pub source: String,
}
