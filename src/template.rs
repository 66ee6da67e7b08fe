// Wrapper source rendering
//
// Every value taken from configuration is emitted through a literal helper;
// nothing is spliced into generated source as raw text except the explicit
// label expression, which is documented as verbatim.

use crate::config::Labels;
use crate::descriptor::{RenderedHandler, ResolvedFunction};
use crate::error::{GenerationError, Result, WrapError};
use crate::language::{nodejs, python, Language};

/// Environment variables holding the three cross-cutting filters
pub const IGNORED_KEYS_ENV: &str = "EPSAGON_IGNORED_KEYS";
pub const URLS_TO_IGNORE_ENV: &str = "EPSAGON_URLS_TO_IGNORE";
pub const PAYLOADS_TO_IGNORE_ENV: &str = "EPSAGON_PAYLOADS_TO_IGNORE";

/// Everything a language template consumes
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParams<'a> {
    pub relative_path: &'a str,
    pub handlers_dir: &'a str,
    pub method: &'a str,
    pub wrapper: &'a str,
    pub token: &'a str,
    pub app_name: Option<&'a str>,
    pub collector_url: Option<&'a str>,
    pub metadata_only: bool,
    pub ignored_keys: Option<&'a str>,
    pub urls_to_ignore: Option<&'a str>,
    /// JSON array text
    pub payloads_to_ignore: Option<String>,
    pub labels: Option<&'a Labels>,
}

impl<'a> TemplateParams<'a> {
    pub fn from_function(function: &'a ResolvedFunction) -> Result<Self> {
        let token = function.config.token.as_deref().ok_or_else(|| {
            WrapError::Generation(Box::new(GenerationError::MissingToken {
                function: function.key.clone(),
            }))
        })?;

        let method = function.handler.method.as_str();
        let wrapper = function.wrapper_name();
        for (field, value) in [("handler method", method), ("wrapper", wrapper)] {
            if !function.language.is_identifier(value) {
                return Err(WrapError::Generation(Box::new(
                    GenerationError::InvalidIdentifier {
                        function: function.key.clone(),
                        field: field.to_string(),
                        value: value.to_string(),
                        language: function.language.display_name().to_string(),
                    },
                )));
            }
        }

        let payloads_to_ignore = function
            .config
            .payloads_to_ignore
            .as_ref()
            .map(|payloads| serde_json::Value::Array(payloads.clone()).to_string());

        Ok(Self {
            relative_path: &function.handler.relative_path,
            handlers_dir: &function.handlers_dir,
            method,
            wrapper,
            token,
            app_name: function.config.app_name.as_deref(),
            collector_url: function.config.collector_url.as_deref(),
            metadata_only: function.config.metadata_only,
            ignored_keys: function.config.ignored_keys.as_deref(),
            urls_to_ignore: function.config.urls_to_ignore.as_deref(),
            payloads_to_ignore,
            labels: function.config.labels.as_ref(),
        })
    }

    /// `../` once per segment of the handlers directory, so wrappers can reach
    /// modules relative to the service root
    pub fn service_root_prefix(&self) -> String {
        let depth = self
            .handlers_dir
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .count();
        "../".repeat(depth.max(1))
    }

    /// The three filters that are configured, as `(variable, value)` pairs
    pub fn filters(&self) -> Vec<(&'static str, &str)> {
        let mut filters = Vec::new();
        if let Some(urls) = self.urls_to_ignore {
            filters.push((URLS_TO_IGNORE_ENV, urls));
        }
        if let Some(keys) = self.ignored_keys {
            filters.push((IGNORED_KEYS_ENV, keys));
        }
        if let Some(payloads) = self.payloads_to_ignore.as_deref() {
            filters.push((PAYLOADS_TO_IGNORE_ENV, payloads));
        }
        filters
    }
}

/// Render the wrapper source for `function`. Pure: identical input gives
/// byte-identical output.
pub fn render(function: &ResolvedFunction) -> Result<String> {
    let params = TemplateParams::from_function(function)?;
    Ok(match function.language {
        Language::Python => python::render_wrapper(&params),
        Language::Node => nodejs::render_commonjs_wrapper(&params),
        Language::TsNode => nodejs::render_typescript_wrapper(&params),
    })
}

/// Render `function` together with its output name and new handler reference
pub fn render_handler(function: &ResolvedFunction) -> Result<RenderedHandler> {
    Ok(RenderedHandler {
        key: function.key.clone(),
        file_name: function.file_name(),
        module_path: function.module_path(),
        handler_reference: function.handler_reference(),
        source: render(function)?,
    })
}

/// Double-quoted, escaped string literal. JSON string syntax is valid in
/// JavaScript, TypeScript and Python.
pub fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// JavaScript literal for structured data
pub fn js_literal(value: &serde_json::Value) -> String {
    value.to_string()
}

/// Python literal for structured data
pub fn python_literal(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => string_literal(text),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", string_literal(key), python_literal(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}
