//! Benchmarks for query compilation and result translation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use golr_assoc::compile::QueryCompiler;
use golr_assoc::config::GolrConfig;
use golr_assoc::query::QueryRequest;
use golr_assoc::translate::{self, Doc};

fn bench_compile(c: &mut Criterion) {
    let compiler = QueryCompiler::new(&GolrConfig::default()).unwrap();
    let req = QueryRequest {
        relation: Some("RO:0002200".into()),
        exclude_automatic_assertions: true,
        slim: vec!["HP:0000118".into(), "HP:0000707".into()],
        ..QueryRequest::for_subject(vec!["HGNC:11025".to_string(), "HGNC:1100".to_string()])
            .with_categories("gene", "phenotype")
    };
    let go_req = QueryRequest::for_subject("MGI:97490").with_categories("gene", "function");

    c.bench_function("compile_phenotype", |bench| {
        bench.iter(|| black_box(compiler.compile(black_box(&req))))
    });
    c.bench_function("compile_go_function", |bench| {
        bench.iter(|| black_box(compiler.compile(black_box(&go_req))))
    });
}

fn bench_translate_docs(c: &mut Criterion) {
    let docs: Vec<Doc> = (0..1000)
        .map(|i| {
            let v = json!({
                "id": format!("assoc-{i}"),
                "subject": format!("HGNC:{i}"),
                "subject_label": "SHH",
                "subject_closure": [format!("HGNC:{i}"), format!("NCBIGene:{i}")],
                "relation": "RO:0002200",
                "object": format!("HP:{:07}", i % 50),
                "object_closure": ["HP:0000118", "HP:0000707"],
                "is_defined_by": ["SRC:clinvar"],
                "evidence_graph": "{\"nodes\":[],\"edges\":[]}"
            });
            v.as_object().unwrap().clone()
        })
        .collect();

    c.bench_function("translate_1000_docs", |bench| {
        bench.iter(|| black_box(translate::translate_docs(&docs, None, Some("NCBIGene"))))
    });
    c.bench_function("translate_compact_1000_docs", |bench| {
        bench.iter(|| black_box(translate::translate_compact(&docs, None)))
    });
}

fn bench_facet_array(c: &mut Criterion) {
    let array: Vec<Value> = (0..10_000)
        .flat_map(|i| [json!(format!("HP:{i:07}")), json!(10_000 - i)])
        .collect();

    c.bench_function("facet_array_10k", |bench| {
        bench.iter(|| black_box(translate::translate_facet_array("object", &array)))
    });
}

criterion_group!(benches, bench_compile, bench_translate_docs, bench_facet_array);
criterion_main!(benches);
