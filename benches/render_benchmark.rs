use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use epsagon_wrap::{
    discover_functions, render, DiscoveredFunction, HandlerRef, Labels, Language, PluginConfig,
    ResolvedFunction, ServiceManifest,
};

fn resolved(language: Language) -> ResolvedFunction {
    let global = PluginConfig {
        token: Some("bench-token".to_string()),
        app_name: Some("bench".to_string()),
        urls_to_ignore: Some("example.com".to_string()),
        payloads_to_ignore: Some(vec![serde_json::json!({"path": "/health"})]),
        labels: Some(Labels::Structured(serde_json::json!([["team", "core"]]))),
        ..Default::default()
    };

    ResolvedFunction::resolve(
        DiscoveredFunction {
            key: "hello".to_string(),
            handler: HandlerRef::parse("src/api/handlers.hello").unwrap(),
            language,
            overrides: PluginConfig::default(),
        },
        &global,
        "epsagon_handlers",
    )
}

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for language in [Language::Python, Language::Node, Language::TsNode] {
        let function = resolved(language);
        group.bench_with_input(
            BenchmarkId::from_parameter(language.name()),
            &function,
            |b, function| b.iter(|| render(black_box(function)).unwrap()),
        );
    }
    group.finish();
}

fn benchmark_discovery(c: &mut Criterion) {
    let mut manifest = String::from(
        "provider:\n  runtime: nodejs18.x\ncustom:\n  epsagon:\n    token: T1\nfunctions:\n",
    );
    for i in 0..200 {
        manifest.push_str(&format!(
            "  fn{i}:\n    handler: src/fn{i}.handler\n    runtime: {}\n",
            if i % 2 == 0 { "python3.11" } else { "nodejs18.x" }
        ));
    }
    let manifest = ServiceManifest::from_yaml(&manifest).unwrap();

    c.bench_function("discover_200_functions", |b| {
        b.iter(|| discover_functions(black_box(&manifest)).unwrap())
    });
}

criterion_group!(benches, benchmark_render, benchmark_discovery);
criterion_main!(benches);
