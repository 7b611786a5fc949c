//! Benchmarks for the call adapter hot path.
//!
//! Measures per-call overhead for every dispatch shape:
//! - static with and without arguments
//! - instance with and without arguments (scratch buffer reuse)
//! - multiple results pushed by the member
//! - failed calls under both failure policies
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect scope timings for
//! the instrumented call path:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hostcall::prelude::*;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

#[derive(Debug)]
struct Vector3 {
    x: f64,
    y: f64,
    z: f64,
}

fn silent() -> Arc<DiagnosticLog> {
    Arc::new(DiagnosticLog::new())
}

/// Per-call overhead by dispatch shape.
fn dispatch_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("call/dispatch");
    let mut sink = ReturnValues::with_capacity(4);

    let now = MethodCaller::new(HostMember::from_fn("now", || 42i64), None, false).unwrap();
    group.bench_function("static_no_args", |b| {
        b.iter(|| {
            sink.clear();
            black_box(now.call(None, &mut sink, &[])).unwrap();
            end_profiling_frame();
        });
    });

    let add = MethodCaller::new(HostMember::from_fn("add", |a: i64, b: i64| a + b), None, false)
        .unwrap();
    let args = [Dynamic::Int(3), Dynamic::Int(4)];
    group.bench_function("static_two_args", |b| {
        b.iter(|| {
            sink.clear();
            add.call(None, &mut sink, black_box(&args)).unwrap();
            end_profiling_frame();
        });
    });

    let receiver = Dynamic::object(Vector3 {
        x: 1.0,
        y: 2.0,
        z: 3.0,
    });

    let length = MethodCaller::new(
        HostMember::from_method::<Vector3, _, _>("length", |v: &Vector3| {
            (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
        }),
        None,
        true,
    )
    .unwrap();
    group.bench_function("instance_no_args", |b| {
        b.iter(|| {
            sink.clear();
            length
                .call(Some(black_box(&receiver)), &mut sink, &[])
                .unwrap();
            end_profiling_frame();
        });
    });

    let dot = MethodCaller::new(
        HostMember::from_method::<Vector3, _, _>(
            "dot",
            |v: &Vector3, x: f64, y: f64, z: f64| v.x * x + v.y * y + v.z * z,
        ),
        None,
        true,
    )
    .unwrap();
    let args = [Dynamic::Float(4.0), Dynamic::Float(5.0), Dynamic::Float(6.0)];
    group.bench_function("instance_three_args", |b| {
        b.iter(|| {
            sink.clear();
            dot.call(Some(black_box(&receiver)), &mut sink, black_box(&args))
                .unwrap();
            end_profiling_frame();
        });
    });

    group.finish();
}

/// Members that push their own results.
fn multiple_result_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("call/multiple");

    let range = MethodCaller::new(
        HostMember::builder("range")
            .with_return_values()
            .param(HostType::Int)
            .native(|ctx: &mut CallContext| {
                let n: i64 = ctx.arg(0)?;
                for i in 0..n {
                    ctx.push_return(i)?;
                }
                Ok(())
            }),
        None,
        false,
    )
    .unwrap();

    for n in [1i64, 8, 64] {
        let mut sink = ReturnValues::with_capacity(n as usize);
        let args = [Dynamic::Int(n)];
        group.bench_with_input(BenchmarkId::new("range", n), &args, |b, args| {
            b.iter(|| {
                sink.clear();
                range.call(None, &mut sink, black_box(args)).unwrap();
            });
        });
    }

    group.finish();
}

/// Failed calls, reported to an in-memory channel.
fn failure_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("call/failure");

    let failing = || {
        HostMember::builder("fail")
            .param(HostType::Int)
            .returns(HostType::Int)
            .native(|_: &mut CallContext| Err(NativeError::other("always fails")))
    };
    let args = [Dynamic::Int(1)];
    let mut sink = ReturnValues::new();

    for (label, options) in [
        ("propagate", CallerOptions::default()),
        ("log_and_continue", CallerOptions::legacy()),
    ] {
        let log = silent();
        let caller =
            MethodCaller::with_options(failing(), None, false, options, log.clone()).unwrap();
        group.bench_function(label, |b| {
            b.iter(|| {
                let _ = black_box(caller.call(None, &mut sink, black_box(&args)));
                log.take();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    dispatch_benchmarks,
    multiple_result_benchmarks,
    failure_benchmarks
);
criterion_main!(benches);
