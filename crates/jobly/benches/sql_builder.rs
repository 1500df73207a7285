use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jobly::qb::{FieldValues, SqlQb, select};
use jobly::{FilterOptions, ResourceKind, build_filter_predicate, sql_for_partial_update};

/// A mapping with `n` fields, every third one absent.
fn build_fields(n: usize) -> FieldValues {
    let mut fields = FieldValues::new();
    for i in 0..n {
        let value = (i % 3 != 0).then_some(i as i64);
        fields.set_opt(&format!("col{i}"), value);
    }
    fields
}

fn bench_partial_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/partial_update");

    for n in [1, 5, 10, 50, 100] {
        let fields = build_fields(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &fields, |b, fields| {
            b.iter(|| black_box(sql_for_partial_update("t", fields, "id", 1i64)));
        });
    }

    group.finish();
}

fn bench_build_fields_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_fields_and_render");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let fields = build_fields(n);
                black_box(sql_for_partial_update("t", &fields, "id", 1i64).sql);
            });
        });
    }

    group.finish();
}

fn bench_filter_predicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/filter_predicate");

    let options = FilterOptions {
        search: Some("eng%neer".into()),
        min: Some(10),
        max: Some(1000),
        ..Default::default()
    };
    for kind in [ResourceKind::Company, ResourceKind::Job] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{kind:?}")),
            &options,
            |b, options| {
                b.iter(|| black_box(build_filter_predicate(kind, options)));
            },
        );
    }

    group.finish();
}

fn bench_filtered_select(c: &mut Criterion) {
    c.bench_function("sql_builder/filtered_select", |b| {
        let options = FilterOptions::default();
        b.iter(|| {
            let filter = match jobly::filter_expr(ResourceKind::Job, &options) {
                Ok(filter) => filter,
                Err(e) => panic!("{e}"),
            };
            black_box(select("jobs").and_expr(filter).order_by("id").to_sql());
        });
    });
}

criterion_group!(
    benches,
    bench_partial_update,
    bench_build_fields_and_render,
    bench_filter_predicate,
    bench_filtered_select
);
criterion_main!(benches);
