use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use dagrun::{DagRunner, GraphBuilder};

/// Diamond graph: a constant, B and C both depend on it, D depends on
/// both. B and C must overlap in time, so the whole run takes roughly
/// max(B, C) + D rather than B + C + D.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn diamond_branches_run_concurrently() {
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    let mut builder = GraphBuilder::new();
    builder.declare_constant("a", 1_i64).unwrap();
    {
        let order = order.clone();
        builder
            .declare_computed("b", &["a"], move |args| {
                thread::sleep(Duration::from_millis(250));
                order.lock().unwrap().push("b");
                Ok(args[0] + 10)
            })
            .unwrap();
    }
    {
        let order = order.clone();
        builder
            .declare_computed("c", &["a"], move |args| {
                thread::sleep(Duration::from_millis(250));
                order.lock().unwrap().push("c");
                Ok(args[0] + 20)
            })
            .unwrap();
    }
    {
        let order = order.clone();
        builder
            .declare_computed("d", &["b", "c"], move |args| {
                order.lock().unwrap().push("d");
                Ok(args[0] + args[1])
            })
            .unwrap();
    }

    let mut runner = DagRunner::prepare(builder.build()).unwrap();
    let started = Instant::now();
    let report = runner.run().await;
    let elapsed = started.elapsed();

    assert!(report.is_success());
    assert_eq!(*runner.get("d").unwrap(), 32);

    // D strictly after both branches.
    let order = order.lock().unwrap();
    assert_eq!(order.len(), 3);
    assert_eq!(order[2], "d");

    // Concurrency: well under the 500ms a sequential run would need,
    // but at least one branch's worth of work.
    assert!(elapsed >= Duration::from_millis(250), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(450), "elapsed {elapsed:?}");
}

/// A `max_concurrency` of 1 serialises the branches without deadlocking
/// or changing results.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bounded_concurrency_still_completes() {
    let mut builder = GraphBuilder::new();
    builder.declare_constant("a", 1_i64).unwrap();
    builder
        .declare_computed("b", &["a"], |args| {
            thread::sleep(Duration::from_millis(50));
            Ok(args[0] + 1)
        })
        .unwrap();
    builder
        .declare_computed("c", &["a"], |args| {
            thread::sleep(Duration::from_millis(50));
            Ok(args[0] + 2)
        })
        .unwrap();
    builder
        .declare_computed("d", &["b", "c"], |args| Ok(args[0] * args[1]))
        .unwrap();

    let mut runner = DagRunner::prepare_with_options(
        builder.build(),
        dagrun::RunnerOptions {
            max_concurrency: Some(1),
        },
    )
    .unwrap();

    let report = runner.run().await;
    assert!(report.is_success());
    assert_eq!(*runner.get("d").unwrap(), 6);
}
