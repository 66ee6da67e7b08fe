// Service manifest (serverless.yml) access
//
// The manifest is kept as an untyped YAML tree so every key this crate does not
// own survives a load/rewrite/save cycle unchanged. Typed accessors below cover
// only the parts the packaging pipeline reads or mutates.

use serde_yaml::{Mapping, Sequence, Value};
use std::path::Path;

use crate::error::{ConfigError, Result, WrapError};

/// Key of the plugin block under `custom` and under each function
pub const PLUGIN_KEY: &str = "epsagon";

/// A parsed service manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceManifest {
    document: Value,
}

impl ServiceManifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(WrapError::Config(Box::new(ConfigError::NotFound {
                path: path.to_path_buf(),
                suggestion: Some(
                    "Run from the service directory or pass --service-path / --config".to_string(),
                ),
            })));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            WrapError::Config(config_err) => {
                let mut config_err = *config_err;
                if let ConfigError::InvalidYaml {
                    ref mut file_path, ..
                } = config_err
                {
                    *file_path = Some(path.to_path_buf());
                }
                WrapError::Config(Box::new(config_err))
            }
            other => other,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(yaml)?;
        if !document.is_mapping() {
            return Err(WrapError::Config(Box::new(ConfigError::ValidationFailed {
                message: "Service manifest must be a mapping at the top level".to_string(),
                file_path: None,
                errors: vec![],
            })));
        }
        Ok(Self { document })
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// `provider.runtime`, if present (not necessarily a string)
    pub fn provider_runtime(&self) -> Option<&Value> {
        self.document.get("provider")?.get("runtime")
    }

    /// `custom.epsagon`
    pub fn plugin_block(&self) -> Option<&Value> {
        self.document.get("custom")?.get(PLUGIN_KEY)
    }

    /// Function entries in manifest order. Entries with non-string keys are
    /// not addressable by the host and are left out.
    pub fn functions(&self) -> Vec<(&str, &Value)> {
        self.document
            .get("functions")
            .and_then(Value::as_mapping)
            .map(|functions| {
                functions
                    .iter()
                    .filter_map(|(key, spec)| key.as_str().map(|key| (key, spec)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The per-function plugin block, `functions.<key>.epsagon`
    pub fn function_plugin_block(&self, key: &str) -> Option<&Value> {
        self.document
            .get("functions")?
            .get(key)?
            .get(PLUGIN_KEY)
    }

    pub fn function_mut(&mut self, key: &str) -> Option<&mut Mapping> {
        self.document
            .get_mut("functions")?
            .get_mut(key)?
            .as_mapping_mut()
    }

    /// The service-level `package` block, when it is a mapping
    pub fn service_package_mut(&mut self) -> Option<&mut Mapping> {
        self.document.get_mut("package")?.as_mapping_mut()
    }
}

/// Packaging lists that accept additional entries. Only lists that already
/// exist are extended; a missing list means "everything is included".
pub const PACKAGE_LISTS: [&str; 2] = ["include", "patterns"];

/// Entries to append to a `package` mapping, one per list kind
#[derive(Debug, Clone, Copy)]
pub struct PackageEntries<'a> {
    pub include: &'a str,
    /// `patterns` entries are globs and must name actual files
    pub patterns: &'a str,
}

impl<'a> PackageEntries<'a> {
    /// The same entry for every list
    pub fn uniform(entry: &'a str) -> Self {
        Self {
            include: entry,
            patterns: entry,
        }
    }
}

/// Append to every existing packaging list of a `package` mapping.
/// Returns the number of lists extended.
pub fn append_to_package_lists(package: &mut Mapping, entries: PackageEntries<'_>) -> usize {
    let mut extended = 0;
    for list in PACKAGE_LISTS {
        let entry = match list {
            "patterns" => entries.patterns,
            _ => entries.include,
        };
        if let Some(sequence) = package.get_mut(list).and_then(Value::as_sequence_mut) {
            push_entry(sequence, entry);
            extended += 1;
        }
    }
    extended
}

fn push_entry(sequence: &mut Sequence, entry: &str) {
    sequence.push(Value::String(entry.to_string()));
}
