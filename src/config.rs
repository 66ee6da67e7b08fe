// Plugin configuration: partial blocks and their layered resolution
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{ConfigError, Result, WrapError};
use crate::validation::{BlockScope, SchemaValidator};

pub const DEFAULT_HANDLERS_DIR: &str = "epsagon_handlers";

/// A boolean that also accepts boolean strings (`"true"`, `"TRUE"`, `"false"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "ToggleRepr")]
pub struct Toggle(pub bool);

#[derive(Deserialize)]
#[serde(untagged)]
enum ToggleRepr {
    Flag(bool),
    Text(String),
}

impl From<ToggleRepr> for Toggle {
    fn from(repr: ToggleRepr) -> Self {
        match repr {
            ToggleRepr::Flag(flag) => Toggle(flag),
            ToggleRepr::Text(text) => Toggle(text.trim().eq_ignore_ascii_case("true")),
        }
    }
}

/// Labels attached to every trace
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Labels {
    /// Passed through verbatim as an expression in the generated source
    Expression(String),
    /// Serialized as a literal of the target language
    Structured(serde_json::Value),
}

/// One plugin configuration block with every key optional.
/// Used for the global `custom.epsagon` block and per-function overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub token: Option<String>,
    pub app_name: Option<String>,
    pub disable: Option<Toggle>,
    pub metadata_only: Option<Toggle>,
    pub handlers_dir_name: Option<String>,
    pub package_json_path: Option<String>,
    #[serde(rename = "collectorURL")]
    pub collector_url: Option<String>,
    pub ignored_keys: Option<String>,
    pub urls_to_ignore: Option<String>,
    pub payloads_to_ignore: Option<Vec<serde_json::Value>>,
    pub labels: Option<Labels>,
    pub wrapper: Option<String>,
}

/// A parsed block together with the non-fatal schema warnings it produced
#[derive(Debug, Default)]
pub struct ParsedBlock {
    pub config: PluginConfig,
    pub warnings: Vec<String>,
}

impl PluginConfig {
    /// Validate and parse the block found at `field_path`. A missing block
    /// yields an empty configuration. Service-only keys are dropped from
    /// function blocks.
    pub fn parse_block(
        field_path: &str,
        scope: BlockScope,
        block: Option<&Value>,
    ) -> Result<ParsedBlock> {
        let Some(block) = block.filter(|value| !value.is_null()) else {
            return Ok(ParsedBlock::default());
        };

        let validation = SchemaValidator::validate_block(field_path, scope, block);
        if !validation.is_valid() {
            return Err(WrapError::Config(Box::new(ConfigError::ValidationFailed {
                message: format!("{field_path} does not match the plugin schema"),
                file_path: None,
                errors: validation.errors,
            })));
        }

        let mut config: PluginConfig = serde_yaml::from_value(block.clone()).map_err(|e| {
            WrapError::Config(Box::new(ConfigError::InvalidValue {
                message: e.to_string(),
                field: field_path.to_string(),
                value: serde_yaml::to_string(block).unwrap_or_default(),
                expected: "a plugin configuration block".to_string(),
            }))
        })?;

        if scope == BlockScope::Function {
            config.handlers_dir_name = None;
            config.package_json_path = None;
        }

        Ok(ParsedBlock {
            config,
            warnings: validation.warnings,
        })
    }

    /// Layer `self` on top of `base`: every key set here wins.
    pub fn layered_over(&self, base: &PluginConfig) -> PluginConfig {
        fn pick<T: Clone>(top: &Option<T>, base: &Option<T>) -> Option<T> {
            top.clone().or_else(|| base.clone())
        }

        PluginConfig {
            token: pick(&self.token, &base.token),
            app_name: pick(&self.app_name, &base.app_name),
            disable: pick(&self.disable, &base.disable),
            metadata_only: pick(&self.metadata_only, &base.metadata_only),
            handlers_dir_name: pick(&self.handlers_dir_name, &base.handlers_dir_name),
            package_json_path: pick(&self.package_json_path, &base.package_json_path),
            collector_url: pick(&self.collector_url, &base.collector_url),
            ignored_keys: pick(&self.ignored_keys, &base.ignored_keys),
            urls_to_ignore: pick(&self.urls_to_ignore, &base.urls_to_ignore),
            payloads_to_ignore: pick(&self.payloads_to_ignore, &base.payloads_to_ignore),
            labels: pick(&self.labels, &base.labels),
            wrapper: pick(&self.wrapper, &base.wrapper),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disable.map(|toggle| toggle.0).unwrap_or(false)
    }
}

/// Configuration for one function after layering defaults < global < function
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub token: Option<String>,
    pub app_name: Option<String>,
    pub disable: bool,
    pub metadata_only: bool,
    pub handlers_dir_name: String,
    pub package_json_path: Option<String>,
    pub collector_url: Option<String>,
    pub ignored_keys: Option<String>,
    pub urls_to_ignore: Option<String>,
    pub payloads_to_ignore: Option<Vec<serde_json::Value>>,
    pub labels: Option<Labels>,
    /// Explicit wrapper override; the language default applies when unset
    pub wrapper: Option<String>,
}

impl ResolvedConfig {
    /// Resolve the configuration for one function. Pass `None` to resolve the
    /// service-wide view used for run gating and the output directory.
    pub fn resolve(global: &PluginConfig, function: Option<&PluginConfig>) -> Self {
        let merged = match function {
            Some(function) => function.layered_over(global),
            None => global.clone(),
        };

        ResolvedConfig {
            token: merged.token.filter(|token| !token.is_empty()),
            app_name: merged.app_name,
            disable: merged.disable.map(|toggle| toggle.0).unwrap_or(false),
            metadata_only: merged.metadata_only.map(|toggle| toggle.0).unwrap_or(false),
            handlers_dir_name: merged
                .handlers_dir_name
                .unwrap_or_else(|| DEFAULT_HANDLERS_DIR.to_string()),
            package_json_path: merged.package_json_path,
            collector_url: merged.collector_url.filter(|url| !url.is_empty()),
            ignored_keys: merged.ignored_keys,
            urls_to_ignore: merged.urls_to_ignore,
            payloads_to_ignore: merged.payloads_to_ignore,
            labels: merged.labels,
            wrapper: merged.wrapper,
        }
    }

    /// Handlers directory with forward slashes, as the deployment format expects
    pub fn handlers_dir(&self) -> String {
        normalize_separators(&self.handlers_dir_name)
    }
}

/// Convert every `\` to `/` and drop trailing separators
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/").trim_end_matches('/').to_string()
}
