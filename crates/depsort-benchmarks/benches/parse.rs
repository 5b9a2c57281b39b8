//! Manifest parsing benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use depsort_benchmarks::{criterion_config, package_manifest};
use depsort_config::json::{parse_manifest_json, serialize_manifest_json};
use depsort_config::toml::{parse_manifest_toml, serialize_manifest_toml};
use std::time::Duration;

fn bench_toml_manifest(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_manifest");
    group.measurement_time(Duration::from_secs(5));

    for packages in [5usize, 50] {
        let manifest = package_manifest(packages, 10);
        group.throughput(Throughput::Elements(manifest.items.len() as u64));
        let Ok(content) = serialize_manifest_toml(&manifest) else {
            continue;
        };

        group.bench_with_input(BenchmarkId::new("parse", packages), &content, |b, content| {
            b.iter(|| black_box(parse_manifest_toml(content).map(|m| m.items.len())));
        });
        group.bench_with_input(BenchmarkId::new("serialize", packages), &manifest, |b, manifest| {
            b.iter(|| black_box(serialize_manifest_toml(manifest).map(|s| s.len())));
        });
    }

    group.finish();
}

fn bench_json_manifest(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_manifest");
    group.measurement_time(Duration::from_secs(5));

    for packages in [5usize, 50] {
        let manifest = package_manifest(packages, 10);
        group.throughput(Throughput::Elements(manifest.items.len() as u64));
        let Ok(content) = serialize_manifest_json(&manifest) else {
            continue;
        };

        group.bench_with_input(BenchmarkId::new("parse", packages), &content, |b, content| {
            b.iter(|| black_box(parse_manifest_json(content).map(|m| m.items.len())));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_toml_manifest, bench_json_manifest
}
criterion_main!(benches);
