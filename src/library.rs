// Library presence check, one probe per language family
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::error::{DependencyError, Result, WrapError};
use crate::language::nodejs::{self, PackageCheck};
use crate::language::{python, Language, NODE_LIBRARY};
use crate::logging::Notice;

pub const DEFAULT_PACKAGE_JSON: &str = "package.json";

/// Where the Node dependency manifest lives: `packageJsonPath` relative to the
/// service path, or `<service>/package.json`
pub fn package_json_path(service_path: &Path, config: &ResolvedConfig) -> PathBuf {
    match config.package_json_path.as_deref() {
        Some(path) => service_path.join(path),
        None => service_path.join(DEFAULT_PACKAGE_JSON),
    }
}

/// Language families present in `languages`, in first-seen order. Node and
/// its TypeScript dialect share one dependency manifest.
fn distinct_bases(languages: &[Language]) -> Vec<Language> {
    let mut bases: Vec<Language> = Vec::new();
    for language in languages {
        let base = language.base();
        if !bases.contains(&base) {
            bases.push(base);
        }
    }
    bases
}

async fn check_language(
    language: Language,
    service_path: &Path,
    config: &ResolvedConfig,
) -> Result<Option<Notice>> {
    match language {
        Language::Python => Ok(Some(python::library_reminder())),
        Language::Node | Language::TsNode => {
            let path = package_json_path(service_path, config);
            match nodejs::check_package_manifest(&path).await {
                PackageCheck::Declared => Ok(None),
                PackageCheck::Unreadable(reason) => {
                    debug!(path = %path.display(), reason = %reason, "package.json unreadable");
                    Ok(Some(Notice::warning(
                        "Could not read package.json. Skipping Epsagon library validation - \
                         please make sure you have it installed!",
                    )))
                }
                PackageCheck::Missing => Err(WrapError::Dependency(Box::new(
                    DependencyError::LibraryMissing {
                        library: NODE_LIBRARY.to_string(),
                        language: language.display_name().to_string(),
                        manifest_path: path,
                        suggestion: Some(format!("npm install {NODE_LIBRARY}")),
                    },
                ))),
            }
        }
    }
}

/// Verify the monitoring library for every language family in use. Checks run
/// concurrently; the first confirmed-missing dependency fails the batch.
pub async fn check_libraries(
    languages: &[Language],
    service_path: &Path,
    config: &ResolvedConfig,
) -> Result<Vec<Notice>> {
    let checks = distinct_bases(languages)
        .into_iter()
        .map(|language| check_language(language, service_path, config));

    let notices = try_join_all(checks).await?;
    Ok(notices.into_iter().flatten().collect())
}
