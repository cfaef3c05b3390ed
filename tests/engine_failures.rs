use std::time::Duration;

use anyhow::anyhow;
use dagrun::{DagError, DagRunner, GraphBuilder, NodeProgress};
use tokio::time::timeout;

#[tokio::test]
async fn failed_node_poisons_dependents_but_not_siblings() {
    let mut builder = GraphBuilder::new();
    builder.declare_constant("root", 1_i64).unwrap();
    builder
        .declare_computed("bad", &["root"], |_args| Err(anyhow!("boom")))
        .unwrap();
    builder
        .declare_computed("child", &["bad"], |args| Ok(args[0] + 1))
        .unwrap();
    builder
        .declare_computed("grandchild", &["child"], |args| Ok(args[0] + 1))
        .unwrap();
    builder
        .declare_computed("ok", &["root"], |args| Ok(args[0] + 1))
        .unwrap();

    let mut runner = DagRunner::prepare(builder.build()).unwrap();
    let report = runner.run().await;

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed["bad"].contains("boom"));
    assert_eq!(
        report.blocked.iter().cloned().collect::<Vec<_>>(),
        vec!["child", "grandchild"]
    );

    // The independent branch still completed.
    assert_eq!(*runner.get("ok").unwrap(), 2);
    // Blocked nodes have no value.
    assert!(matches!(
        runner.get("child").unwrap_err(),
        DagError::NotReady(_)
    ));
    assert!(matches!(
        runner.get("bad").unwrap_err(),
        DagError::NotReady(_)
    ));
}

#[tokio::test]
async fn final_snapshot_reflects_failure_and_blockage() {
    let mut builder = GraphBuilder::new();
    builder
        .declare_computed("bad", &[], |_args| Err::<i64, _>(anyhow!("nope")))
        .unwrap();
    builder
        .declare_computed("child", &["bad"], |args| Ok(args[0]))
        .unwrap();

    let mut runner = DagRunner::prepare(builder.build()).unwrap();
    let _report = runner.run().await;

    let snapshot = runner.subscribe().borrow().clone();
    assert!(snapshot.finished);

    let progress_of = |id: &str| {
        snapshot
            .nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.progress)
            .expect("node in snapshot")
    };
    assert_eq!(progress_of("bad"), NodeProgress::Failed);
    assert_eq!(progress_of("child"), NodeProgress::Pending);

    // The pending node's dependency annotation shows why it is stuck.
    let child = snapshot.nodes.iter().find(|n| n.id == "child").unwrap();
    assert_eq!(child.deps.len(), 1);
    assert_eq!(child.deps[0].0, "bad");
    assert_eq!(child.deps[0].1, NodeProgress::Failed);
}

#[tokio::test]
async fn panicking_callable_terminates_the_run_as_a_failure() {
    let mut builder = GraphBuilder::new();
    builder
        .declare_computed("boom", &[], |_args| -> anyhow::Result<i64> {
            panic!("callable exploded")
        })
        .unwrap();
    builder
        .declare_computed("child", &["boom"], |args| Ok(args[0]))
        .unwrap();
    builder.declare_computed("ok", &[], |_args| Ok(1)).unwrap();

    let mut runner = DagRunner::prepare(builder.build()).unwrap();

    // A panic must surface as a normal node failure, not hang the loop.
    let report = timeout(Duration::from_secs(2), runner.run())
        .await
        .expect("run terminates after a panicking callable");

    assert!(!report.is_success());
    assert!(report.failed["boom"].contains("panicked"));
    assert!(report.failed["boom"].contains("callable exploded"));
    assert!(report.blocked.contains("child"));
    assert_eq!(*runner.get("ok").unwrap(), 1);
}

#[tokio::test]
async fn multiple_independent_failures_are_all_reported() {
    let mut builder = GraphBuilder::new();
    builder
        .declare_computed("x", &[], |_args| Err::<i64, _>(anyhow!("x failed")))
        .unwrap();
    builder
        .declare_computed("y", &[], |_args| Err::<i64, _>(anyhow!("y failed")))
        .unwrap();
    builder.declare_computed("z", &[], |_args| Ok(9)).unwrap();

    let mut runner = DagRunner::prepare(builder.build()).unwrap();
    let report = runner.run().await;

    assert_eq!(report.failed.len(), 2);
    assert!(report.failed.contains_key("x"));
    assert!(report.failed.contains_key("y"));
    assert!(report.blocked.is_empty());
    assert_eq!(*runner.get("z").unwrap(), 9);
}
