// Target languages for generated wrappers
//
// Each supported runtime is a variant of `Language`; every per-language
// decision (file extension, default wrapper, template, library check) is an
// exhaustive match so a new variant cannot be half supported.

pub mod dialect;
pub mod nodejs;
pub mod python;

use std::fmt;

pub use dialect::{detect_dialect, refine_dialects};
pub use nodejs::NODE_LIBRARY;

/// Language of a generated wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Python,
    Node,
    /// TypeScript sources deployed on a Node runtime
    TsNode,
}

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

// Names an ES module (strict mode) cannot bind with `export const`
const ES_RESERVED_BINDINGS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Languages recognised from a runtime identifier, in match priority order.
/// Dialects are never matched directly; they come out of dialect refinement.
pub const RUNTIME_LANGUAGES: [Language; 2] = [Language::Python, Language::Node];

impl Language {
    /// Name as it appears inside runtime identifiers (`python3.11`, `nodejs18.x`)
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Node => "node",
            Language::TsNode => "tsnode",
        }
    }

    /// First language whose name occurs in `runtime`, case-insensitively
    pub fn from_runtime(runtime: &str) -> Option<Self> {
        let runtime = runtime.to_lowercase();
        RUNTIME_LANGUAGES
            .iter()
            .copied()
            .find(|language| runtime.contains(language.name()))
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Node => "js",
            Language::TsNode => "ts",
        }
    }

    /// Name of the wrapper function exported by the monitoring library
    pub fn default_wrapper(&self) -> &'static str {
        match self {
            Language::Python => "lambda_wrapper",
            Language::Node | Language::TsNode => "lambdaWrapper",
        }
    }

    pub fn wrapper_file_name(&self, generated_handler_name: &str) -> String {
        format!("{generated_handler_name}.{}", self.file_extension())
    }

    /// Base runtime language shared by a family of dialects
    pub fn base(&self) -> Language {
        match self {
            Language::Python => Language::Python,
            Language::Node | Language::TsNode => Language::Node,
        }
    }

    /// Whether `name` can be used as an identifier in generated source.
    ///
    /// CommonJS wrappers only use names as property keys, where reserved
    /// words are legal; Python and TypeScript bind them, where they are not.
    pub fn is_identifier(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        match self {
            Language::Python => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                    && !PYTHON_KEYWORDS.contains(&name)
            }
            Language::Node | Language::TsNode => {
                (first.is_ascii_alphabetic() || first == '_' || first == '$')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
                    && (*self == Language::Node || !ES_RESERVED_BINDINGS.contains(&name))
            }
        }
    }

    /// Label used in user-facing messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Node => "Node",
            Language::TsNode => "TypeScript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_matching() {
        assert_eq!(Language::from_runtime("python3.11"), Some(Language::Python));
        assert_eq!(Language::from_runtime("Python2.7"), Some(Language::Python));
        assert_eq!(Language::from_runtime("nodejs18.x"), Some(Language::Node));
        assert_eq!(Language::from_runtime("NODEJS20.X"), Some(Language::Node));
        assert_eq!(Language::from_runtime("java17"), None);
        assert_eq!(Language::from_runtime("provided.al2"), None);
        assert_eq!(Language::from_runtime(""), None);
    }

    #[test]
    fn test_runtime_matching_is_first_match_wins() {
        assert_eq!(
            Language::from_runtime("custom-python-on-node"),
            Some(Language::Python)
        );
    }

    #[test]
    fn test_tsnode_never_matched_from_runtime() {
        assert_eq!(Language::from_runtime("tsnode"), Some(Language::Node));
    }

    #[test]
    fn test_file_names_and_wrappers() {
        assert_eq!(
            Language::Python.wrapper_file_name("hello-epsagon"),
            "hello-epsagon.py"
        );
        assert_eq!(
            Language::Node.wrapper_file_name("hello-epsagon"),
            "hello-epsagon.js"
        );
        assert_eq!(
            Language::TsNode.wrapper_file_name("hello-epsagon"),
            "hello-epsagon.ts"
        );
        assert_eq!(Language::Python.default_wrapper(), "lambda_wrapper");
        assert_eq!(Language::TsNode.default_wrapper(), "lambdaWrapper");
        assert_eq!(Language::TsNode.base(), Language::Node);
    }

    #[test]
    fn test_identifiers() {
        assert!(Language::Node.is_identifier("$handler_1"));
        assert!(!Language::Python.is_identifier("$handler"));
        assert!(Language::Python.is_identifier("_main"));
        assert!(!Language::Node.is_identifier("1abc"));
        assert!(!Language::Node.is_identifier("a-b"));
        assert!(!Language::Python.is_identifier(""));
    }

    #[test]
    fn test_keywords_are_not_identifiers() {
        for keyword in ["lambda", "class", "None", "def", "import"] {
            assert!(!Language::Python.is_identifier(keyword), "{keyword}");
        }
        assert!(Language::Python.is_identifier("match"));
        assert!(Language::Python.is_identifier("lambda_"));

        for reserved in ["default", "delete", "class", "eval"] {
            assert!(!Language::TsNode.is_identifier(reserved), "{reserved}");
            assert!(Language::Node.is_identifier(reserved), "{reserved}");
        }
    }
}
