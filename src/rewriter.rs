// Manifest rewriter: point functions at their wrappers
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::descriptor::RenderedHandler;
use crate::manifest::{append_to_package_lists, PackageEntries, ServiceManifest};

/// What a rewrite changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Function keys whose handler now points at a wrapper
    pub rewritten: Vec<String>,
    /// Function-level packaging lists extended
    pub function_lists: usize,
    /// Service-level packaging lists extended
    pub service_lists: usize,
}

/// Glob covering the whole output directory
pub fn output_dir_glob(handlers_dir: &str) -> String {
    format!("{handlers_dir}/**")
}

/// Rewrite the manifest for handlers that are already on disk. Existing
/// packaging entries are kept; new ones are only appended to lists that exist.
pub fn rewrite_manifest(
    manifest: &mut ServiceManifest,
    handlers: &[RenderedHandler],
    handlers_dir: &str,
) -> RewriteSummary {
    let mut summary = RewriteSummary::default();

    for handler in handlers {
        let Some(function) = manifest.function_mut(&handler.key) else {
            warn!(function = %handler.key, "Function vanished from manifest, not rewritten");
            continue;
        };

        function.insert(
            Value::from("handler"),
            Value::from(handler.handler_reference.as_str()),
        );
        if let Some(package) = function.get_mut("package").and_then(Value::as_mapping_mut) {
            let wrapper_file = format!("{handlers_dir}/{}", handler.file_name);
            let entries = PackageEntries {
                include: &handler.module_path,
                patterns: &wrapper_file,
            };
            summary.function_lists += append_to_package_lists(package, entries);
        }

        debug!(function = %handler.key, handler = %handler.handler_reference, "Rewrote handler");
        summary.rewritten.push(handler.key.clone());
    }

    if let Some(package) = manifest.service_package_mut() {
        let glob = output_dir_glob(handlers_dir);
        summary.service_lists = append_to_package_lists(package, PackageEntries::uniform(&glob));
    }

    summary
}
