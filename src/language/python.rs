// Python wrapper template
//
// Python has no static import ahead of initialisation, so the generated module
// imports the original handler first and only swaps in the wrapped version if
// the monitoring library loads. Any failure leaves the original exported.

use crate::config::Labels;
use crate::logging::Notice;
use crate::template::{python_literal, string_literal, TemplateParams};

const INDENT: &str = "    ";

/// Reminder emitted instead of a dependency check; Python projects have no
/// single dependency manifest to verify.
pub fn library_reminder() -> Notice {
    Notice::info("Python functions found, please make sure to install the Epsagon Python library.")
}

/// Module path in dotted form: `src/api/users` -> `src.api.users`
pub fn module_name(relative_path: &str) -> String {
    relative_path.replace(['/', '\\'], ".")
}

fn labels_argument(labels: &Labels) -> String {
    match labels {
        Labels::Expression(expression) => expression.clone(),
        Labels::Structured(value) => python_literal(value),
    }
}

pub fn render_wrapper(params: &TemplateParams<'_>) -> String {
    let method = params.method;
    let internal = format!("{method}_internal");

    let mut lines = vec![
        format!(
            "from {} import {method} as {internal}",
            module_name(params.relative_path)
        ),
        format!("{method} = {internal}"),
        "try:".to_string(),
        format!("{INDENT}import epsagon"),
        format!("{INDENT}import os"),
        String::new(),
    ];

    for (variable, value) in params.filters() {
        lines.push(format!("{INDENT}if '{variable}' not in os.environ:"));
        lines.push(format!(
            "{INDENT}{INDENT}os.environ['{variable}'] = {}",
            string_literal(value)
        ));
    }

    let mut init_args = vec![
        format!("token={}", string_literal(params.token)),
        format!(
            "app_name={}",
            params.app_name.map(string_literal).unwrap_or_else(|| "None".to_string())
        ),
        format!(
            "collector_url={}",
            params
                .collector_url
                .map(string_literal)
                .unwrap_or_else(|| "None".to_string())
        ),
        format!(
            "metadata_only={}",
            if params.metadata_only { "True" } else { "False" }
        ),
    ];
    if let Some(labels) = params.labels {
        init_args.push(format!("labels={}", labels_argument(labels)));
    }

    lines.push(format!("{INDENT}epsagon.init("));
    for arg in init_args {
        lines.push(format!("{INDENT}{INDENT}{arg},"));
    }
    lines.push(format!("{INDENT})"));
    lines.push(String::new());
    lines.push(format!(
        "{INDENT}{method} = epsagon.{}({internal})",
        params.wrapper
    ));
    lines.push("except:".to_string());
    lines.push(format!(
        "{INDENT}print('Warning: Epsagon package not found. The function will not be monitored')"
    ));

    let mut source = lines.join("\n");
    source.push('\n');
    source
}
