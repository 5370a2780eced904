//! Routing benchmarks for lql-eval.
//!
//! Measures single-event evaluation at various route counts and the effect
//! of the regex cache on `~`-heavy rule sets.

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use lql_eval::{LogEvent, Router};
use lql_parser::{FieldType, Schema, parse};

fn bench_schema() -> Schema {
    Schema::builder()
        .field("metadata.level", FieldType::String)
        .field("metadata.request.url", FieldType::String)
        .field("metadata.users.source_count", FieldType::Integer)
        .build()
}

fn bench_event() -> LogEvent {
    let ts = Utc.with_ymd_and_hms(2020, 1, 17, 14, 35, 0).unwrap();
    LogEvent::new("error count: 113 while dialing upstream", ts).with_metadata(json!({
        "level": "error",
        "request": {"url": "/api/user/4/sources"},
        "users": {"source_count": 120},
    }))
}

fn router_with_n_routes(n: usize, schema: &Schema) -> Router {
    let mut router = Router::new();
    for i in 0..n {
        // Vary the queries so each route has distinct filters.
        let query = match i % 4 {
            0 => format!("metadata.users.source_count:>{}", i % 500),
            1 => "metadata.level:error".to_string(),
            2 => format!("m.request.url:~sources_{i}$"),
            _ => format!("error metadata.users.source_count:{}..{}", i % 100, 500 + i),
        };
        router.add_route(format!("sink_{i}"), parse(&query, schema).unwrap()).unwrap();
    }
    router
}

// ---------------------------------------------------------------------------
// Benchmark: route 1 event against N routes
// ---------------------------------------------------------------------------

fn bench_route_single_event(c: &mut Criterion) {
    let schema = bench_schema();
    let event = bench_event();
    let mut group = c.benchmark_group("route_single_event");

    for n in [10, 100, 1000] {
        let router = router_with_n_routes(n, &schema);
        group.bench_with_input(BenchmarkId::new("routes", n), &router, |b, router| {
            b.iter(|| {
                let sinks = router.route(black_box(&event));
                black_box(sinks);
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: throughput — many events against a fixed router
// ---------------------------------------------------------------------------

fn bench_route_throughput(c: &mut Criterion) {
    let schema = bench_schema();
    let mut group = c.benchmark_group("route_throughput");
    // Reduce sample size since each iteration processes many events
    group.sample_size(20);

    let router = router_with_n_routes(100, &schema);
    let events: Vec<LogEvent> = (0..1000)
        .map(|i| {
            let ts = Utc.with_ymd_and_hms(2020, 1, 17, 14, 35, 0).unwrap();
            LogEvent::new(format!("event {i} count: {}", i % 1000), ts).with_metadata(json!({
                "level": if i % 3 == 0 { "error" } else { "info" },
                "users": {"source_count": i % 500},
            }))
        })
        .collect();

    group.bench_function("events_1000_routes_100", |b| {
        b.iter(|| {
            let mut matched = 0usize;
            for event in &events {
                matched += router.route(black_box(event)).len();
            }
            black_box(matched);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_route_single_event, bench_route_throughput);
criterion_main!(benches);
