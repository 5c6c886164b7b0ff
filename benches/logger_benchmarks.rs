//! Criterion benchmarks for sawmill

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sawmill::handlers::WriterHandler;
use sawmill::prelude::*;
use sawmill::{destructure, Serialized};
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

#[derive(Serialize)]
struct Order {
    id: u64,
    customer: String,
    items: Vec<Item>,
    tags: HashMap<String, String>,
}

#[derive(Serialize)]
struct Item {
    sku: String,
    quantity: u32,
    price: f64,
}

fn sample_order() -> Order {
    let mut tags = HashMap::new();
    tags.insert("channel".to_string(), "web".to_string());
    tags.insert("region".to_string(), "eu-west".to_string());
    Order {
        id: 91_823,
        customer: "acme".to_string(),
        items: (0..5)
            .map(|i| Item {
                sku: format!("SKU-{}", i),
                quantity: i + 1,
                price: 9.99 * f64::from(i + 1),
            })
            .collect(),
        tags,
    }
}

// ============================================================================
// Destructure Benchmarks
// ============================================================================

fn bench_destructure(c: &mut Criterion) {
    let mut group = c.benchmark_group("destructure");
    group.throughput(Throughput::Elements(1));

    group.bench_function("scalar", |b| {
        b.iter(|| destructure(black_box(&42i64)));
    });

    let fields = fields! { "user" => "alice", "attempt" => 3, "ok" => true };
    group.bench_function("fields_record", |b| {
        b.iter(|| destructure(black_box(&fields)));
    });

    let order = sample_order();
    group.bench_function("serde_struct", |b| {
        b.iter(|| destructure(black_box(&Serialized(&order))));
    });

    let bytes = vec![0u8; 4096];
    group.bench_function("bytes_4k", |b| {
        b.iter(|| destructure(black_box(&bytes)));
    });

    group.finish();
}

// ============================================================================
// Fan-out Benchmarks
// ============================================================================

fn bench_event_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_fan_out");
    group.throughput(Throughput::Elements(1));

    for handlers in [0usize, 1, 4] {
        let logger = Logger::new();
        for i in 0..handlers {
            logger
                .add_handler_with(
                    format!("sink{}", i),
                    WriterHandler::new(io::sink()),
                    HandlerConfig::new().capacity(10_000),
                )
                .unwrap();
        }

        group.bench_with_input(BenchmarkId::new("handlers", handlers), &handlers, |b, _| {
            b.iter(|| logger.info(black_box("request served"), &fields! { "status" => 200 }));
        });
        logger.stop();
    }

    group.finish();
}

fn bench_event_and_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_and_sync");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::new();
    logger.add_handler("null", NullHandler).unwrap();

    group.bench_function("round_trip", |b| {
        b.iter(|| {
            let id = logger.debug(black_box("ping"), &());
            logger.sync(id);
        });
    });

    group.finish();
}

/// Discards events but still goes through the handler contract.
struct NullHandler;

impl Handler for NullHandler {
    fn event(&self, event: &Event) -> sawmill::Result<()> {
        black_box(event.id);
        Ok(())
    }
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    let event = Event::new(
        1,
        Level::Warning,
        "cache miss ratio high",
        &fields! { "ratio" => 0.42, "cache" => "sessions", "node" => 3 },
        false,
    );
    let timestamp = TimestampFormat::default();

    for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Logfmt] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", format)),
            &format,
            |b, format| b.iter(|| format.format(black_box(&event), &timestamp)),
        );
    }

    group.finish();
}

fn bench_concurrent_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_producers");
    group.throughput(Throughput::Elements(400));

    let logger = Arc::new(Logger::new());
    logger
        .add_handler_with(
            "sink",
            WriterHandler::new(io::sink()),
            HandlerConfig::new().capacity(100_000),
        )
        .unwrap();

    group.bench_function("4x100", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        for i in 0..100 {
                            logger.info("work", &fields! { "i" => i });
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
    logger.stop();
}

criterion_group!(
    benches,
    bench_destructure,
    bench_event_fan_out,
    bench_event_and_sync,
    bench_formatting,
    bench_concurrent_producers
);
criterion_main!(benches);
