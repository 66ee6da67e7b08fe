// Dialect refinement: Node functions whose source is TypeScript
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Language;
use crate::descriptor::DiscoveredFunction;
use crate::error::{Result, WrapError};

const JAVASCRIPT_EXTENSIONS: [&str; 3] = ["js", "mjs", "cjs"];
const TYPESCRIPT_EXTENSIONS: [&str; 2] = ["ts", "tsx"];

/// Files next to the handler module: `<service>/<relative_path>.*`
fn sibling_files(service_path: &Path, relative_path: &str) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/{}.*",
        glob::Pattern::escape(&service_path.to_string_lossy()),
        glob::Pattern::escape(relative_path)
    );

    match glob::glob(&pattern) {
        Ok(paths) => paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            debug!(pattern = %pattern, error = %e, "Skipping dialect probe");
            Vec::new()
        }
    }
}

/// Classify a function by the source files found on disk. A JavaScript
/// sibling keeps the function on Node even when a TypeScript source sits next
/// to it; TypeScript is chosen only when it is the sole source.
pub fn detect_dialect(language: Language, service_path: &Path, relative_path: &str) -> Language {
    if language.base() != Language::Node {
        return language;
    }

    let extensions: Vec<String> = sibling_files(service_path, relative_path)
        .iter()
        .filter_map(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .collect();

    let has = |candidates: &[&str]| extensions.iter().any(|ext| candidates.contains(&ext.as_str()));

    if has(&JAVASCRIPT_EXTENSIONS[..]) {
        Language::Node
    } else if has(&TYPESCRIPT_EXTENSIONS[..]) {
        Language::TsNode
    } else {
        language
    }
}

/// Refine every function concurrently. Functions come back in input order.
pub async fn refine_dialects(
    functions: Vec<DiscoveredFunction>,
    service_path: &Path,
) -> Result<Vec<DiscoveredFunction>> {
    let probes = functions.into_iter().map(|function| {
        let service_path = service_path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let language = detect_dialect(
                function.language,
                &service_path,
                &function.handler.relative_path,
            );
            if language != function.language {
                debug!(
                    function = %function.key,
                    from = %function.language,
                    to = %language,
                    "Reclassified dialect"
                );
            }
            function.with_language(language)
        })
    });

    futures::future::try_join_all(probes)
        .await
        .map_err(|e| WrapError::task_failed("dialect detection", e))
}
