// src/main.rs

use std::fmt;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail};
use dagrun::{cli, logging, ConsoleSink, DagRunner, Graph, GraphBuilder, RunnerOptions};

/// Value type for the demo graph: most nodes produce integers, the final
/// node produces a message.
#[derive(Debug, Clone)]
enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    fn as_int(&self) -> anyhow::Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Text(t) => Err(anyhow!("expected integer, got text '{t}'")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(t) => write!(f, "{t}"),
        }
    }
}

fn int_arg(args: &[Value], idx: usize) -> anyhow::Result<i64> {
    args.get(idx)
        .ok_or_else(|| anyhow!("missing argument {idx}"))
        .and_then(|v| v.as_int())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("dagrun error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;

    let graph = build_example_graph()?;
    let options = RunnerOptions {
        max_concurrency: args.max_concurrency,
    };
    let mut runner = DagRunner::prepare_with_options(graph, options)?;

    let reporter = if args.no_status {
        None
    } else {
        Some(dagrun::spawn_reporter(
            runner.subscribe(),
            ConsoleSink::new(),
            Duration::from_millis(args.interval_ms.max(1)),
        ))
    };

    let report = runner.run().await;
    if let Some(handle) = reporter {
        let _ = handle.await;
    }

    if !report.is_success() {
        for (node, err) in &report.failed {
            eprintln!("node '{node}' failed: {err}");
        }
        for node in &report.blocked {
            eprintln!("node '{node}' blocked by a failed dependency");
        }
        bail!("run finished with failures");
    }

    let h = runner.get("h")?;
    println!("Result h: {h}");
    Ok(())
}

/// The example graph: a constant plus a handful of computed nodes with
/// artificial delays, so the status board has something to show.
fn build_example_graph() -> anyhow::Result<Graph<Value>> {
    let mut builder = GraphBuilder::new();

    builder.declare_constant("a", Value::Int(3))?;

    builder.declare_computed("b", &[], |_args| {
        thread::sleep(Duration::from_secs(2));
        Ok(Value::Int(2))
    })?;

    builder.declare_computed("c", &["a", "b"], |args| {
        Ok(Value::Int(int_arg(args, 0)? + int_arg(args, 1)?))
    })?;

    builder.declare_computed("d", &["a", "b", "c"], |args| {
        thread::sleep(Duration::from_secs(3));
        Ok(Value::Int(
            int_arg(args, 0)? + int_arg(args, 1)? + int_arg(args, 2)?,
        ))
    })?;

    builder.declare_computed("e", &["c"], |args| {
        thread::sleep(Duration::from_secs(5));
        Ok(Value::Int(int_arg(args, 0)? * 2))
    })?;

    builder.declare_computed("f", &["d", "e"], |args| {
        thread::sleep(Duration::from_secs(1));
        Ok(Value::Int(int_arg(args, 0)? + int_arg(args, 1)?))
    })?;

    builder.declare_computed("g", &["a", "b"], |args| {
        thread::sleep(Duration::from_secs(1));
        Ok(Value::Int(int_arg(args, 0)? - int_arg(args, 1)?))
    })?;

    builder.declare_computed("h", &["a", "b", "f", "g"], |_args| {
        thread::sleep(Duration::from_secs(1));
        Ok(Value::Text("all done".to_string()))
    })?;

    Ok(builder.build())
}
