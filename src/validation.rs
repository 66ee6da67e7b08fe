// Schema validation for plugin configuration blocks
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use std::path::{Component, Path};

/// Value shape a plugin key accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    String,
    /// `true`/`false` or a boolean string such as `"true"`
    Toggle,
    Sequence,
    /// A string expression or structured YAML
    Labels,
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Toggle => value.is_bool() || value.is_string(),
            FieldKind::Sequence => value.is_sequence(),
            FieldKind::Labels => value.is_string() || value.is_sequence() || value.is_mapping(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Toggle => "a boolean",
            FieldKind::Sequence => "an array",
            FieldKind::Labels => "a string or a list of labels",
        }
    }
}

static PLUGIN_SCHEMA: [(&str, FieldKind); 12] = [
    ("token", FieldKind::String),
    ("appName", FieldKind::String),
    ("disable", FieldKind::Toggle),
    ("metadataOnly", FieldKind::Toggle),
    ("handlersDirName", FieldKind::String),
    ("packageJsonPath", FieldKind::String),
    ("collectorURL", FieldKind::String),
    ("ignoredKeys", FieldKind::String),
    ("urlsToIgnore", FieldKind::String),
    ("payloadsToIgnore", FieldKind::Sequence),
    ("labels", FieldKind::Labels),
    ("wrapper", FieldKind::String),
];

/// Keys that only take effect in the service-wide block
pub const SERVICE_ONLY_KEYS: [&str; 2] = ["handlersDirName", "packageJsonPath"];

static WRAPPER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid wrapper regex"));

/// Where a plugin block sits in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockScope {
    /// `custom.epsagon`
    Service,
    /// `functions.<key>.epsagon`
    Function,
}

/// Outcome of validating one plugin block
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add_error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// Validates `custom.epsagon` and `functions.<key>.epsagon` blocks
pub struct SchemaValidator;

impl SchemaValidator {
    /// Check a block at `field_path` (used in messages, e.g. `custom.epsagon`)
    pub fn validate_block(field_path: &str, scope: BlockScope, block: &Value) -> ValidationResult {
        let mut result = ValidationResult::default();

        let mapping = match block {
            Value::Null => return result,
            Value::Mapping(mapping) => mapping,
            _ => {
                result.add_error(format!("{field_path} must be a mapping"));
                return result;
            }
        };

        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                result.add_warning(format!("{field_path} has a non-string key, ignoring it"));
                continue;
            };

            let Some((_, kind)) = PLUGIN_SCHEMA.iter().find(|(name, _)| *name == key) else {
                result.add_warning(format!("Unrecognized property {field_path}.{key}"));
                continue;
            };

            if scope == BlockScope::Function && SERVICE_ONLY_KEYS.contains(&key) {
                result.add_warning(format!(
                    "{field_path}.{key} is only honoured in custom.epsagon, ignoring it"
                ));
                continue;
            }

            if value.is_null() {
                continue;
            }

            if !kind.accepts(value) {
                result.add_error(format!("{field_path}.{key} must be {}", kind.describe()));
                continue;
            }

            match key {
                "wrapper" => Self::check_wrapper(field_path, value, &mut result),
                "handlersDirName" => Self::check_handlers_dir(field_path, value, &mut result),
                _ => {}
            }
        }

        result
    }

    fn check_wrapper(field_path: &str, value: &Value, result: &mut ValidationResult) {
        if let Some(wrapper) = value.as_str() {
            if !WRAPPER_NAME.is_match(wrapper) {
                result.add_error(format!(
                    "{field_path}.wrapper '{wrapper}' is not a valid function name"
                ));
            }
        }
    }

    // The handlers directory is deleted on every run, so it must stay inside
    // the service directory.
    fn check_handlers_dir(field_path: &str, value: &Value, result: &mut ValidationResult) {
        let Some(dir) = value.as_str() else {
            return;
        };
        let normalized = dir.replace('\\', "/");
        let path = Path::new(&normalized);
        let escapes = path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        let has_name = path
            .components()
            .any(|component| matches!(component, Component::Normal(_)));

        if escapes || !has_name {
            result.add_error(format!(
                "{field_path}.handlersDirName '{dir}' must be a relative directory inside the service"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn service(yaml: &str) -> ValidationResult {
        SchemaValidator::validate_block("custom.epsagon", BlockScope::Service, &block(yaml))
    }

    fn function(yaml: &str) -> ValidationResult {
        SchemaValidator::validate_block("functions.hello.epsagon", BlockScope::Function, &block(yaml))
    }

    #[test]
    fn test_valid_block() {
        let result = service(
            r#"
token: abc
appName: demo
disable: "false"
metadataOnly: true
payloadsToIgnore: [{ source: health }]
labels: [[team, core]]
wrapper: stepLambdaWrapper
handlersDirName: generated/epsagon
"#,
        );
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_key_is_warning() {
        let result = service("tokn: abc\n");
        assert!(result.is_valid());
        assert_eq!(result.warnings, vec!["Unrecognized property custom.epsagon.tokn"]);
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let result = function("token: [a]\npayloadsToIgnore: nope\n");
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("functions.hello.epsagon.token must be a string"));
        assert!(result.errors[1].contains("payloadsToIgnore must be an array"));
    }

    #[test]
    fn test_wrapper_must_be_identifier() {
        assert!(!service("wrapper: \"a); evil(\"\n").is_valid());
    }

    #[test]
    fn test_handlers_dir_must_stay_inside_service() {
        for dir in ["..", "../outside", "/tmp/x", ".", "a/../../b"] {
            let result = service(&format!("handlersDirName: \"{dir}\"\n"));
            assert!(!result.is_valid(), "{dir} should be rejected");
        }
    }

    #[test]
    fn test_non_mapping_block_is_error() {
        let result = service("\"token\"\n");
        assert_eq!(result.errors, vec!["custom.epsagon must be a mapping"]);

        let empty = SchemaValidator::validate_block("custom.epsagon", BlockScope::Service, &Value::Null);
        assert!(empty.is_valid());
    }

    #[test]
    fn test_service_only_keys_warn_in_function_blocks() {
        let yaml = "handlersDirName: other\npackageJsonPath: app/package.json\nappName: x\n";

        let result = function(yaml);
        assert!(result.is_valid());
        assert_eq!(
            result.warnings,
            vec![
                "functions.hello.epsagon.handlersDirName is only honoured in custom.epsagon, ignoring it",
                "functions.hello.epsagon.packageJsonPath is only honoured in custom.epsagon, ignoring it",
            ]
        );

        assert!(service(yaml).warnings.is_empty());
    }

    #[test]
    fn test_service_only_keys_skip_checks_in_function_blocks() {
        let result = function("handlersDirName: ../outside\n");
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }
}
