// Wrapper rendering across languages and configurations

use epsagon_wrap::{
    render, render_handler, DiscoveredFunction, HandlerRef, Labels, Language, PluginConfig,
    ResolvedFunction,
};

fn resolved(language: Language, handler: &str, global: PluginConfig) -> ResolvedFunction {
    ResolvedFunction::resolve(
        DiscoveredFunction {
            key: "hello".to_string(),
            handler: HandlerRef::parse(handler).unwrap(),
            language,
            overrides: PluginConfig::default(),
        },
        &global,
        "epsagon_handlers",
    )
}

fn global() -> PluginConfig {
    PluginConfig {
        token: Some("T1".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_render_is_pure() {
    let mut config = global();
    config.app_name = Some("shop".to_string());
    config.urls_to_ignore = Some("example.com,health".to_string());
    config.payloads_to_ignore = Some(vec![serde_json::json!({"path": "/ping"})]);
    config.labels = Some(Labels::Structured(serde_json::json!([["team", "core"]])));

    for language in [Language::Python, Language::Node, Language::TsNode] {
        let function = resolved(language, "src/handlers.hello", config.clone());
        let first = render(&function).unwrap();
        let second = render(&function).unwrap();
        assert_eq!(first, second, "{language} rendering is not deterministic");
    }
}

#[test]
fn test_unset_collector_is_never_a_string() {
    for language in [Language::Python, Language::Node, Language::TsNode] {
        let source = render(&resolved(language, "handlers.hello", global())).unwrap();
        assert!(!source.contains("'undefined'"), "{language}: {source}");
        assert!(!source.contains("\"undefined\""), "{language}: {source}");
        assert!(!source.contains("\"None\""), "{language}: {source}");
    }
}

#[test]
fn test_values_are_escaped() {
    let mut config = global();
    config.token = Some("to\"ken".to_string());
    config.app_name = Some("it's".to_string());

    let node = render(&resolved(Language::Node, "handlers.hello", config.clone())).unwrap();
    assert!(node.contains(r#"token: "to\"ken","#));
    assert!(node.contains(r#"appName: "it's","#));

    let python = render(&resolved(Language::Python, "handlers.hello", config)).unwrap();
    assert!(python.contains(r#"token="to\"ken","#));
}

#[test]
fn test_filters_are_guarded_in_every_language() {
    let mut config = global();
    config.urls_to_ignore = Some("example.com".to_string());

    let node = render(&resolved(Language::Node, "handlers.hello", config.clone())).unwrap();
    assert!(node.contains("if (!process.env.EPSAGON_URLS_TO_IGNORE) {"));

    let python = render(&resolved(Language::Python, "handlers.hello", config)).unwrap();
    assert!(python.contains("if 'EPSAGON_URLS_TO_IGNORE' not in os.environ:"));
}

#[test]
fn test_python_imports_dotted_module() {
    let source = render(&resolved(Language::Python, "src/api/users.hello", global())).unwrap();
    assert!(source.starts_with("from src.api.users import hello as hello_internal\n"));
    assert!(source.contains("hello = epsagon.lambda_wrapper(hello_internal)"));
}

#[test]
fn test_label_expression_passes_through() {
    let mut config = global();
    config.labels = Some(Labels::Expression(
        "[['stage', process.env.STAGE]]".to_string(),
    ));
    let source = render(&resolved(Language::Node, "handlers.hello", config)).unwrap();
    assert!(source.contains("labels: [['stage', process.env.STAGE]],"));
}

#[test]
fn test_rendered_handler_naming() {
    let python = render_handler(&resolved(Language::Python, "handlers.hello", global())).unwrap();
    assert_eq!(python.file_name, "hello-epsagon.py");
    assert_eq!(python.handler_reference, "epsagon_handlers/hello-epsagon.hello");

    let node = render_handler(&resolved(Language::Node, "handlers.hello", global())).unwrap();
    assert_eq!(node.file_name, "hello-epsagon.js");
    assert_eq!(node.module_path, "epsagon_handlers/hello-epsagon");
}

#[test]
fn test_invalid_wrapper_identifier_rejected() {
    let mut config = global();
    config.wrapper = Some("$wrap".to_string());

    assert!(render(&resolved(Language::Node, "handlers.hello", config.clone())).is_ok());
    assert!(render(&resolved(Language::Python, "handlers.hello", config)).is_err());
}

#[test]
fn test_keyword_handler_method_rejected() {
    assert!(render(&resolved(Language::Python, "handlers.lambda", global())).is_err());
    assert!(render(&resolved(Language::TsNode, "handlers.delete", global())).is_err());

    let node = render(&resolved(Language::Node, "handlers.delete", global())).unwrap();
    assert!(node.contains("exports.delete = epsagon.lambdaWrapper(epsagonHandler.delete);"));
}
