use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dagrun::{DagError, DagRunner, GraphBuilder};

#[tokio::test]
async fn constants_and_computed_values_flow_through() {
    let mut builder = GraphBuilder::new();
    builder.declare_constant("a", 3_i64).unwrap();
    builder.declare_computed("b", &[], |_args| Ok(2)).unwrap();
    builder
        .declare_computed("c", &["a", "b"], |args| Ok(args[0] + args[1]))
        .unwrap();

    let mut runner = DagRunner::prepare(builder.build()).unwrap();
    let report = runner.run().await;

    assert!(report.is_success());
    assert_eq!(*runner.get("a").unwrap(), 3);
    assert_eq!(*runner.get("b").unwrap(), 2);
    assert_eq!(*runner.get("c").unwrap(), 5);

    // get is read-only and idempotent.
    assert_eq!(*runner.get("c").unwrap(), 5);
}

#[tokio::test]
async fn argument_binding_follows_declared_input_order() {
    let mut builder = GraphBuilder::new();
    builder.declare_constant("ten", 10_i64).unwrap();
    builder.declare_constant("three", 3_i64).unwrap();
    // Subtraction is order-sensitive; inputs bind in declared order.
    builder
        .declare_computed("diff", &["ten", "three"], |args| Ok(args[0] - args[1]))
        .unwrap();
    builder
        .declare_computed("rev", &["three", "ten"], |args| Ok(args[0] - args[1]))
        .unwrap();

    let mut runner = DagRunner::prepare(builder.build()).unwrap();
    let report = runner.run().await;

    assert!(report.is_success());
    assert_eq!(*runner.get("diff").unwrap(), 7);
    assert_eq!(*runner.get("rev").unwrap(), -7);
}

#[tokio::test]
async fn shared_dependency_runs_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut builder = GraphBuilder::new();
    {
        let calls = calls.clone();
        builder
            .declare_computed("base", &[], move |_args| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1_i64)
            })
            .unwrap();
    }
    builder
        .declare_computed("left", &["base"], |args| Ok(args[0] + 1))
        .unwrap();
    builder
        .declare_computed("right", &["base"], |args| Ok(args[0] + 2))
        .unwrap();

    let mut runner = DagRunner::prepare(builder.build()).unwrap();
    let report = runner.run().await;

    assert!(report.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*runner.get("left").unwrap(), 2);
    assert_eq!(*runner.get("right").unwrap(), 3);
}

#[tokio::test]
async fn get_distinguishes_unknown_from_not_ready() {
    let mut builder = GraphBuilder::new();
    builder.declare_constant("a", 1_i64).unwrap();

    let runner = DagRunner::prepare(builder.build()).unwrap();

    // Not run yet: declared node has no value.
    assert!(matches!(
        runner.get("a").unwrap_err(),
        DagError::NotReady(id) if id == "a"
    ));
    // Never declared.
    assert!(matches!(
        runner.get("nope").unwrap_err(),
        DagError::NotFound(id) if id == "nope"
    ));
}

#[tokio::test]
async fn empty_graph_completes_immediately() {
    let builder = GraphBuilder::<i64>::new();
    let mut runner = DagRunner::prepare(builder.build()).unwrap();

    let report = runner.run().await;
    assert!(report.is_success());
}
