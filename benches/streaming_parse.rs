use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Cursor;
use std::sync::Arc;
use styx::{BoundedAsyncParser, PoolConfig, RdfFormat, WorkerPool};

const STATEMENTS: usize = 10_000;

fn generate_ntriples(n: usize) -> String {
    (0..n)
        .map(|i| {
            format!(
                "<http://example.org/sensor/{}> <http://example.org/temperature> \"{}.5\"^^<http://www.w3.org/2001/XMLSchema#decimal> .\n",
                i % 1000,
                i % 40
            )
        })
        .collect()
}

/// Measures the full bridge at several queue capacities: smaller capacities
/// exercise backpressure harder, larger ones let the decoder run ahead.
fn bench_streaming_parse(c: &mut Criterion) {
    let data = generate_ntriples(STATEMENTS);
    let pool = Arc::new(WorkerPool::new(PoolConfig::default()));

    let mut group = c.benchmark_group("streaming_parse");
    group.throughput(Throughput::Elements(STATEMENTS as u64));
    for capacity in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            b.iter(|| {
                let parser = BoundedAsyncParser::with_capacity(Arc::clone(&pool), capacity);
                let statements = parser
                    .parse_format(Cursor::new(data.clone()), RdfFormat::NTriples, None)
                    .unwrap();
                let mut count = 0usize;
                for statement in statements {
                    statement.unwrap();
                    count += 1;
                }
                assert_eq!(count, STATEMENTS);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_streaming_parse);
criterion_main!(benches);
