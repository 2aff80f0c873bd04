//! Criterion microbenches for oisample collection and manifest writing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Quota-bounded collection over a synthetic box table
//! - Manifest serialization (to_manifest_string)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::collections::HashSet;
use std::hint::black_box;

use oisample::collect::{annotations_from_str, collect_examples, CollectOptions};
use oisample::ir::LabelId;
use oisample::manifest::{records_from_groups, to_manifest_string, DEFAULT_SOURCE_PREFIX};
use oisample::taxonomy::{ClassIdSets, ClassIds};

const ROWS: usize = 20_000;

fn synthetic_table() -> String {
    let labels = ["/m/01x3z", "/m/0jbk", "/m/011k07", "/m/01yrx"];
    let mut csv = String::from("ImageID,Source,LabelName,Confidence,XMin,XMax,YMin,YMax\n");
    for i in 0..ROWS {
        csv.push_str(&format!(
            "{:016x},xclick,{},1,0.1,0.6,0.2,0.7\n",
            i / 3,
            labels[i % labels.len()]
        ));
    }
    csv
}

fn classes() -> ClassIdSets {
    ClassIdSets::from_classes(vec![
        ClassIds {
            class_name: "Boot".into(),
            root_id: LabelId::from("/m/01x3z"),
            ids: [LabelId::from("/m/01x3z")].into_iter().collect(),
        },
        ClassIds {
            class_name: "Cat".into(),
            root_id: LabelId::from("/m/0jbk"),
            ids: [LabelId::from("/m/0jbk"), LabelId::from("/m/01yrx")]
                .into_iter()
                .collect(),
        },
    ])
}

/// Benchmark a collection run that reads most of the table.
fn bench_collect(c: &mut Criterion) {
    let table = synthetic_table();
    let classes = classes();
    let excluded = HashSet::new();
    let opts = CollectOptions {
        quota: 1_000,
        offset: 1,
    };

    let mut group = c.benchmark_group("collect");
    group.throughput(Throughput::Bytes(table.len() as u64));

    group.bench_function("collect_examples", |b| {
        b.iter(|| {
            let collection = collect_examples(
                black_box(&classes),
                annotations_from_str(black_box(&table)),
                &excluded,
                &opts,
            )
            .unwrap();
            black_box(collection)
        })
    });

    group.finish();
}

/// Benchmark manifest serialization of a collected set.
fn bench_manifest_write(c: &mut Criterion) {
    let table = synthetic_table();
    let collection = collect_examples(
        &classes(),
        annotations_from_str(&table),
        &HashSet::new(),
        &CollectOptions {
            quota: 1_000,
            offset: 0,
        },
    )
    .unwrap();
    let records = records_from_groups(&collection.images, DEFAULT_SOURCE_PREFIX);

    let mut group = c.benchmark_group("manifest_write");
    group.throughput(Throughput::Elements(records.len() as u64));

    group.bench_function("to_manifest_string", |b| {
        b.iter(|| {
            let text = to_manifest_string(black_box(&records)).unwrap();
            black_box(text)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_collect, bench_manifest_write);
criterion_main!(benches);
