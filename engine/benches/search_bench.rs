use criterion::{criterion_group, criterion_main, Criterion};
use sitesearch::pipeline::Pipeline;
use sitesearch::{store, EngineConfig, SearchEngine};

const STORE: &str = include_str!("../tests/fixtures/lunr-store.js");

fn bench_analyze(c: &mut Criterion) {
    let pipeline = Pipeline::english();
    c.bench_function("analyze_store", |b| b.iter(|| pipeline.analyze(STORE).count()));
}

fn bench_build(c: &mut Criterion) {
    let docs = store::load_documents(STORE).expect("fixture parses");
    let engine = SearchEngine::new(EngineConfig::site_defaults()).expect("valid config");
    c.bench_function("build_store", |b| b.iter(|| engine.build(docs.clone()).expect("build")));
}

fn bench_search(c: &mut Criterion) {
    let engine = SearchEngine::new(EngineConfig::site_defaults()).expect("valid config");
    engine.build(store::load_documents(STORE).expect("fixture parses")).expect("build");
    c.bench_function("search_terms", |b| b.iter(|| engine.search("entity framework code").expect("query")));
    c.bench_function("search_prefix_fuzzy", |b| b.iter(|| engine.search("+comp* doxigen~1 -java").expect("query")));
}

criterion_group!(benches, bench_analyze, bench_build, bench_search);
criterion_main!(benches);
