//! Performance benchmarks for a3s-log
//!
//! Run with: cargo bench

use a3s_log::{
    EngineConfig, FanoutBroker, Ingestor, LogEvent, MemoryLogStore, Priority, PriorityHeap,
    RawLogEvent, Severity,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn engine() -> Ingestor {
    let config = EngineConfig::default().with_subscriber_queue_capacity(4096);
    let broker = Arc::new(FanoutBroker::new(&config));
    Ingestor::new(Arc::new(MemoryLogStore::default()), broker, &config)
}

fn bench_heap(c: &mut Criterion) {
    let priorities: Vec<Priority> = (0..1000u32)
        .map(|i| Priority::new((i * 7 % 5) as u8 + 1).unwrap())
        .collect();
    let event = Arc::new(LogEvent::new("tick", "bench", Severity::Info));

    c.bench_function("PriorityHeap insert 1000", |b| {
        b.iter(|| {
            let mut heap = PriorityHeap::with_capacity(1000);
            for p in &priorities {
                heap.insert(*p, event.clone());
            }
            heap
        });
    });

    c.bench_function("PriorityHeap insert+extract 1000", |b| {
        b.iter(|| {
            let mut heap = PriorityHeap::with_capacity(1000);
            for p in &priorities {
                heap.insert(*p, event.clone());
            }
            while heap.extract_min().is_some() {}
        });
    });
}

fn bench_prepare(c: &mut Criterion) {
    c.bench_function("Ingestor::prepare", |b| {
        b.iter(|| {
            Ingestor::prepare(
                RawLogEvent::new("disk full", "node-3")
                    .with_severity("critical")
                    .with_category("system")
                    .with_metadata("mount", serde_json::json!("/var")),
            )
            .unwrap()
        });
    });
}

fn bench_ingest_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("ingest_throughput");
    for count in [10, 100, 1000] {
        group.bench_function(format!("{} events", count), |b| {
            b.to_async(&rt).iter(|| async {
                let ingestor = engine();
                for i in 0..count {
                    let severity = ["info", "warning", "error", "critical"][i % 4];
                    ingestor
                        .ingest(RawLogEvent::new(format!("event {}", i), "bench").with_severity(severity))
                        .await
                        .unwrap();
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_heap, bench_prepare, bench_ingest_throughput);
criterion_main!(benches);
