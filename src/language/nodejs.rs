// Node.js and TypeScript wrapper templates, plus the package.json check
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::config::Labels;
use crate::template::{js_literal, string_literal, TemplateParams};

/// npm package name of the monitoring library
pub const NODE_LIBRARY: &str = "epsagon";

const INDENT: &str = "  ";

/// Result of looking for the library in a package.json
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageCheck {
    Declared,
    Missing,
    /// The manifest could not be read or parsed
    Unreadable(String),
}

/// Look for `epsagon` under `dependencies` of the package.json at `path`
pub async fn check_package_manifest(path: &Path) -> PackageCheck {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => return PackageCheck::Unreadable(e.to_string()),
    };

    let package: Value = match serde_json::from_str(&content) {
        Ok(package) => package,
        Err(e) => return PackageCheck::Unreadable(e.to_string()),
    };

    let declared = package
        .get("dependencies")
        .and_then(Value::as_object)
        .is_some_and(|dependencies| dependencies.contains_key(NODE_LIBRARY));

    debug!(path = %path.display(), declared, "Checked package.json");

    if declared {
        PackageCheck::Declared
    } else {
        PackageCheck::Missing
    }
}

fn labels_literal(labels: Option<&Labels>) -> String {
    match labels {
        None => "[]".to_string(),
        Some(Labels::Expression(expression)) => expression.clone(),
        Some(Labels::Structured(value)) => js_literal(value),
    }
}

fn optional_string(value: Option<&str>) -> String {
    value
        .map(string_literal)
        .unwrap_or_else(|| "undefined".to_string())
}

/// Filter defaults and the `epsagon.init` call shared by both module styles
fn init_block(params: &TemplateParams<'_>) -> Vec<String> {
    let mut lines = Vec::new();

    for (variable, value) in params.filters() {
        lines.push(format!("if (!process.env.{variable}) {{"));
        lines.push(format!(
            "{INDENT}process.env.{variable} = {};",
            string_literal(value)
        ));
        lines.push("}".to_string());
        lines.push(String::new());
    }

    lines.push("epsagon.init({".to_string());
    lines.push(format!("{INDENT}token: {},", string_literal(params.token)));
    lines.push(format!("{INDENT}appName: {},", optional_string(params.app_name)));
    lines.push(format!(
        "{INDENT}traceCollectorURL: {},",
        optional_string(params.collector_url)
    ));
    lines.push(format!("{INDENT}metadataOnly: {},", params.metadata_only));
    lines.push(format!("{INDENT}labels: {},", labels_literal(params.labels)));
    lines.push("});".to_string());
    lines
}

fn finish(lines: Vec<String>) -> String {
    let mut source = lines.join("\n");
    source.push('\n');
    source
}

/// CommonJS wrapper for `.js` handlers
pub fn render_commonjs_wrapper(params: &TemplateParams<'_>) -> String {
    let original = format!(
        "{}{}.js",
        params.service_root_prefix(),
        params.relative_path
    );

    let mut lines = vec![
        format!("const epsagon = require({});", string_literal(NODE_LIBRARY)),
        format!(
            "const epsagonHandler = require({});",
            string_literal(&original)
        ),
        String::new(),
    ];
    lines.extend(init_block(params));
    lines.push(String::new());
    lines.push(format!(
        "exports.{method} = epsagon.{wrapper}(epsagonHandler.{method});",
        method = params.method,
        wrapper = params.wrapper
    ));
    finish(lines)
}

/// ES module wrapper for `.ts` handlers
pub fn render_typescript_wrapper(params: &TemplateParams<'_>) -> String {
    let original = format!("{}{}", params.service_root_prefix(), params.relative_path);

    let mut lines = vec![
        format!("import * as epsagon from {};", string_literal(NODE_LIBRARY)),
        format!(
            "import * as epsagonHandler from {};",
            string_literal(&original)
        ),
        String::new(),
    ];
    lines.extend(init_block(params));
    lines.push(String::new());
    lines.push(format!(
        "export const {method} = epsagon.{wrapper}(epsagonHandler.{method});",
        method = params.method,
        wrapper = params.wrapper
    ));
    finish(lines)
}
