//! Benchmarks for insight previews and chart suggestion generation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use insight_lens::prelude::*;
use insight_lens::test_fixtures::{
    customers_analysis, customers_table, order_rows, orders_analysis, orders_table,
    sales_by_region_insight, wide_analysis,
};
use std::hint::black_box;
use std::time::Duration;

fn bench_insight_preview(c: &mut Criterion) {
    let table = orders_table();
    let insight = sales_by_region_insight();

    let mut group = c.benchmark_group("insight_preview");
    group.measurement_time(Duration::from_secs(8));

    for size in [1_000usize, 10_000, 50_000] {
        let rows = order_rows(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("sales_by_region", size), &rows, |b, rows| {
            b.iter(|| {
                compute_insight_preview(
                    black_box(&insight),
                    black_box(&table),
                    black_box(rows),
                    DEFAULT_PREVIEW_ROWS,
                )
            });
        });
    }

    let rows = order_rows(10_000);
    let two_keys = sales_by_region_insight().with_selected_fields(["o_region", "o_category"]);
    group.bench_function("region_and_category_10k", |b| {
        b.iter(|| compute_insight_data_frame(black_box(&two_keys), black_box(&table), &rows));
    });

    group.finish();
}

fn bench_suggestions(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_suggestions");

    let (orders, customers) = (orders_table(), customers_table());
    let (oa, ca) = (orders_analysis(), customers_analysis());
    let joined = SuggestionInput::from_tables([(&orders, &oa), (&customers, &ca)]);

    let configs = vec![
        ("default", SuggestionConfig::default()),
        ("focused", SuggestionConfig::focused()),
        ("exploratory", SuggestionConfig::exploratory()),
    ];
    for (name, config) in configs {
        let engine = SuggestionEngine::with_config(config);
        group.bench_function(BenchmarkId::new("joined_orders", name), |b| {
            b.iter(|| engine.suggest(black_box(&joined)));
        });
    }

    let engine = SuggestionEngine::new();
    for width in [8usize, 32, 128] {
        let analysis = wide_analysis(width);
        let input = SuggestionInput::new(&analysis.columns).with_row_count(analysis.row_count);
        group.bench_with_input(BenchmarkId::new("wide_table", width), &input, |b, input| {
            b.iter(|| engine.suggest(black_box(input)));
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let analyses: Vec<DataFrameAnalysis> = (0..8).map(|_| wide_analysis(64)).collect();

    c.bench_function("merge_eight_overlapping_tables", |b| {
        b.iter(|| merge_analyses(black_box(&analyses)).len());
    });
}

criterion_group!(benches, bench_insight_preview, bench_suggestions, bench_merge);
criterion_main!(benches);
