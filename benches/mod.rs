use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    submit_bench::bench_submit_throughput,
    submit_bench::bench_hook_overhead
);
criterion_main!(benches);
