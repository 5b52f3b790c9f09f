//! Benchmarks for routed runs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use routeflow::prelude::*;
use tokio::runtime::Runtime;

fn chain(len: usize) -> State<u64> {
    let mut next = transition("last", |mut req: Request<u64>| {
        req.data += 1;
        req.stop()
    });
    for i in 0..len {
        let following = next.clone();
        let name = format!("step_{i}");
        next = transition(name, move |mut req: Request<u64>| {
            req.data += 1;
            req.route_to(following.clone())
        });
    }
    next
}

fn router_benchmark(c: &mut Criterion) {
    routeflow::observability::init_tracing("warn");
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(err) => panic!("failed to build runtime: {err}"),
    };
    let first = chain(16);

    c.bench_function("run_16_steps", |b| {
        b.iter(|| {
            let req = Request::start(RunContext::detached(), 0, first.clone());
            black_box(rt.block_on(run("bench", req, Vec::new())).map(Request::into_data))
        });
    });

    c.bench_function("run_16_steps_cyclic_check", |b| {
        b.iter(|| {
            let req = Request::start(RunContext::detached(), 0, first.clone())
                .defer(|_, data, _| data + 1);
            black_box(
                rt.block_on(run("bench", req, vec![with_cyclic_check()]))
                    .map(Request::into_data),
            )
        });
    });
}

criterion_group!(benches, router_benchmark);
criterion_main!(benches);
