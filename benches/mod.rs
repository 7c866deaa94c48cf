use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    json::bench_scan_feed,
    json::bench_scan_byte_at_a_time,
    tracking::bench_ingest_feed,
    chart::bench_push_samples
);
criterion_main!(benches);
