// Function discovery: which manifest entries get wrapped
use serde_yaml::Value;
use tracing::debug;

use crate::config::PluginConfig;
use crate::descriptor::{DiscoveredFunction, HandlerRef};
use crate::error::Result;
use crate::language::Language;
use crate::logging::Notice;
use crate::manifest::{ServiceManifest, PLUGIN_KEY};
use crate::validation::BlockScope;

/// Functions selected for wrapping plus the notices explaining every skip
#[derive(Debug, Default)]
pub struct Discovery {
    pub functions: Vec<DiscoveredFunction>,
    pub notices: Vec<Notice>,
}

/// Walk the manifest's functions in order and keep those that can be wrapped.
///
/// Exclusions are never errors: a function without a string runtime (own or
/// provider default) is dropped silently, a disabled or unsupported one with a
/// notice. Only a malformed per-function plugin block fails discovery.
pub fn discover_functions(manifest: &ServiceManifest) -> Result<Discovery> {
    let provider_runtime = manifest.provider_runtime().filter(|value| is_set(value));
    let mut discovery = Discovery::default();

    for (key, spec) in manifest.functions() {
        let runtime = spec.get("runtime").filter(|value| is_set(value));
        let Some(runtime) = runtime.or(provider_runtime).and_then(Value::as_str) else {
            debug!(function = %key, "No runtime string, skipping");
            continue;
        };

        let parsed = PluginConfig::parse_block(
            &format!("functions.{key}.{PLUGIN_KEY}"),
            BlockScope::Function,
            manifest.function_plugin_block(key),
        )?;
        discovery
            .notices
            .extend(parsed.warnings.into_iter().map(Notice::warning));
        let overrides = parsed.config;

        if overrides.is_disabled() {
            discovery.notices.push(Notice::info(format!(
                "Epsagon is disabled for function {key}, skipping."
            )));
            continue;
        }

        let Some(language) = Language::from_runtime(runtime) else {
            discovery.notices.push(Notice::info(format!(
                "Runtime \"{runtime}\" is not supported yet, skipping function {key}"
            )));
            continue;
        };

        let Some(handler) = spec
            .get("handler")
            .and_then(Value::as_str)
            .and_then(HandlerRef::parse)
        else {
            discovery.notices.push(Notice::info(format!(
                "Function {key} has no handler in the form path.method, skipping."
            )));
            continue;
        };

        discovery.functions.push(DiscoveredFunction {
            key: key.to_string(),
            handler,
            language,
            overrides,
        });
    }

    Ok(discovery)
}

// A blank `runtime:` means "inherit", not "no runtime"
fn is_set(value: &Value) -> bool {
    !value.is_null() && value.as_str() != Some("")
}
