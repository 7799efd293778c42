//! Integration tests for the graph runner.
//!
//! Most tests drive `GraphRunner` with `MockExecutor` so ordering and state
//! propagation can be asserted without compiling modules. The end-to-end
//! tests at the bottom build real WebAssembly modules from WAT into a temp
//! directory and run them through `WasmExecutor`.

use std::path::Path;
use std::sync::Arc;

use nodes::mock::{MockBehaviour, MockExecutor};
use nodes::WasmExecutor;

use crate::input::{InputPolicy, Sum};
use crate::{EngineError, ExecutionRecord, ExecutionState, GraphRunner, GraphSpec, NodeSpec, RunnerConfig};

fn graph(nodes: Vec<NodeSpec>) -> GraphSpec {
    GraphSpec::new(nodes, "/graphs")
}

fn runner(mock: &Arc<MockExecutor>) -> GraphRunner {
    GraphRunner::with_executor(mock.clone())
}

// ============================================================
// Ordering and propagation (MockExecutor)
// ============================================================

#[tokio::test]
async fn three_node_pipeline_output_propagation() {
    let mock = Arc::new(
        MockExecutor::new()
            .returning("fetch.wasm", 1001)
            .computing("discount.wasm", |x| x * 2 - 1)
            .computing("render.wasm", |x| x * 2),
    );

    let spec = graph(vec![
        NodeSpec::new("renderProfile", "render.wasm", &["calcDiscount"]),
        NodeSpec::new("fetchUser", "fetch.wasm", &[]),
        NodeSpec::new("calcDiscount", "discount.wasm", &["fetchUser"]),
    ]);

    let state = runner(&mock).run_spec(&spec).await.expect("run succeeds");

    // Nodes ran in topological order, each exactly once.
    assert_eq!(mock.executed_nodes(), vec!["fetchUser", "calcDiscount", "renderProfile"]);
    assert_eq!(state.node_ids().collect::<Vec<_>>(), vec!["fetchUser", "calcDiscount", "renderProfile"]);

    assert_eq!(
        state.get("calcDiscount"),
        Some(&ExecutionRecord { input: 1001, output: 2001, dependencies: vec!["fetchUser".into()] })
    );
    assert_eq!(state.get("renderProfile").map(|r| (r.input, r.output)), Some((2001, 4002)));
}

#[tokio::test]
async fn roots_always_receive_zero() {
    let mock = Arc::new(
        MockExecutor::new()
            .computing("a.wasm", |x| x + 10)
            .computing("b.wasm", |x| x + 20),
    );
    let spec = graph(vec![
        NodeSpec::new("a", "a.wasm", &[]),
        NodeSpec::new("b", "b.wasm", &[]),
    ]);

    let state = runner(&mock).run_spec(&spec).await.unwrap();
    assert_eq!(mock.inputs_for("a"), vec![0]);
    assert_eq!(mock.inputs_for("b"), vec![0]);
    assert_eq!(state.get("b").map(|r| r.output), Some(20));
}

#[tokio::test]
async fn fan_in_takes_only_the_last_declared_dependency() {
    let mock = Arc::new(
        MockExecutor::new()
            .returning("a.wasm", 1)
            .returning("b.wasm", 2)
            .returning("c.wasm", 3)
            .computing("sink.wasm", |x| x),
    );
    let spec = graph(vec![
        NodeSpec::new("c", "c.wasm", &[]),
        NodeSpec::new("b", "b.wasm", &[]),
        NodeSpec::new("a", "a.wasm", &[]),
        NodeSpec::new("sink", "sink.wasm", &["a", "b", "c"]),
    ]);

    let state = runner(&mock).run_spec(&spec).await.unwrap();
    assert_eq!(mock.inputs_for("sink"), vec![3]);
    assert_eq!(
        state.get("sink").map(|r| r.dependencies.clone()),
        Some(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()])
    );
}

#[tokio::test]
async fn configured_policy_replaces_last_dependency() {
    let mock = Arc::new(
        MockExecutor::new()
            .returning("a.wasm", 1)
            .returning("b.wasm", 2)
            .computing("sink.wasm", |x| x),
    );
    let spec = graph(vec![
        NodeSpec::new("a", "a.wasm", &[]),
        NodeSpec::new("b", "b.wasm", &[]),
        NodeSpec::new("sink", "sink.wasm", &["a", "b"]),
    ]);

    let runner = GraphRunner::new(mock.clone(), RunnerConfig::default().with_input_policy(Sum));
    let state = runner.run_spec(&spec).await.unwrap();
    assert_eq!(state.get("sink").map(|r| r.input), Some(3));
}

#[derive(Debug)]
struct AlwaysSeven;

impl InputPolicy for AlwaysSeven {
    fn resolve(&self, _node: &NodeSpec, _state: &ExecutionState) -> Result<i32, EngineError> {
        Ok(7)
    }
}

#[tokio::test]
async fn custom_policy_never_changes_root_input() {
    let mock = Arc::new(
        MockExecutor::new()
            .computing("a.wasm", |x| x + 1)
            .computing("b.wasm", |x| x),
    );
    let spec = graph(vec![
        NodeSpec::new("a", "a.wasm", &[]),
        NodeSpec::new("b", "b.wasm", &["a"]),
    ]);

    let runner = GraphRunner::new(mock.clone(), RunnerConfig::default().with_input_policy(AlwaysSeven));
    let state = runner.run_spec(&spec).await.unwrap();

    assert_eq!(mock.inputs_for("a"), vec![0]);
    assert_eq!(mock.inputs_for("b"), vec![7]);
    assert_eq!(state.get("a").map(|r| r.output), Some(1));
}

#[tokio::test]
async fn each_run_passes_one_run_id_to_every_node() {
    let mock = Arc::new(MockExecutor::new().returning("a.wasm", 1).computing("b.wasm", |x| x));
    let spec = graph(vec![
        NodeSpec::new("a", "a.wasm", &[]),
        NodeSpec::new("b", "b.wasm", &["a"]),
    ]);

    let runner = runner(&mock);
    runner.run_spec(&spec).await.unwrap();
    assert_eq!(mock.run_ids().len(), 1);

    runner.run_spec(&spec).await.unwrap();
    assert_eq!(mock.call_count(), 4);
    assert_eq!(mock.run_ids().len(), 2);
}

#[tokio::test]
async fn independent_nodes_still_run_one_at_a_time_in_resolved_order() {
    let mock = Arc::new(
        MockExecutor::new()
            .returning("x.wasm", 1)
            .returning("y.wasm", 2)
            .returning("z.wasm", 3),
    );
    let spec = graph(vec![
        NodeSpec::new("z", "z.wasm", &[]),
        NodeSpec::new("x", "x.wasm", &[]),
        NodeSpec::new("y", "y.wasm", &[]),
    ]);

    runner(&mock).run_spec(&spec).await.unwrap();
    assert_eq!(mock.executed_nodes(), vec!["z", "x", "y"]);
}

// ============================================================
// Failure handling (MockExecutor)
// ============================================================

#[tokio::test]
async fn unknown_dependency_fails_before_any_module_runs() {
    let mock = Arc::new(MockExecutor::new().returning("a.wasm", 1));
    let spec = graph(vec![
        NodeSpec::new("a", "a.wasm", &[]),
        NodeSpec::new("b", "a.wasm", &["missing"]),
    ]);

    let err = runner(&mock).run_spec(&spec).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownDependency { dependency, .. } if dependency == "missing"));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn cycle_fails_before_any_module_runs() {
    let mock = Arc::new(MockExecutor::new().returning("a.wasm", 1));
    let spec = graph(vec![
        NodeSpec::new("root", "a.wasm", &[]),
        NodeSpec::new("a", "a.wasm", &["b"]),
        NodeSpec::new("b", "a.wasm", &["a"]),
    ]);

    let err = runner(&mock).run_spec(&spec).await.unwrap_err();
    assert!(matches!(err, EngineError::CyclicGraph(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn duplicate_node_fails_the_run() {
    let mock = Arc::new(MockExecutor::new().returning("a.wasm", 1));
    let spec = graph(vec![
        NodeSpec::new("a", "a.wasm", &[]),
        NodeSpec::new("a", "a.wasm", &[]),
    ]);

    let err = runner(&mock).run_spec(&spec).await.unwrap_err();
    assert!(matches!(err, EngineError::DuplicateNode(id) if id == "a"));
}

#[tokio::test]
async fn fatal_node_error_stops_pipeline() {
    let mock = Arc::new(
        MockExecutor::new()
            .returning("ok.wasm", 1)
            .with_behaviour("boom.wasm", MockBehaviour::Trap("unreachable executed".into()))
            .returning("never.wasm", 3),
    );
    let spec = graph(vec![
        NodeSpec::new("ok", "ok.wasm", &[]),
        NodeSpec::new("boom", "boom.wasm", &["ok"]),
        NodeSpec::new("never", "never.wasm", &["boom"]),
    ]);

    let err = runner(&mock).run_spec(&spec).await.unwrap_err();
    assert!(matches!(err, EngineError::ModuleTrap { node_id, .. } if node_id == "boom"));

    // 'never' was never executed.
    assert_eq!(mock.executed_nodes(), vec!["ok", "boom"]);
}

#[tokio::test]
async fn load_failure_is_tagged_with_node_id() {
    let mock = Arc::new(
        MockExecutor::new().with_behaviour("bad.wasm", MockBehaviour::FailLoad("magic header not detected".into())),
    );
    let spec = graph(vec![NodeSpec::new("bad", "bad.wasm", &[])]);

    let err = runner(&mock).run_spec(&spec).await.unwrap_err();
    match err {
        EngineError::ModuleLoadFailure { node_id, path, message } => {
            assert_eq!(node_id, "bad");
            assert_eq!(path, Path::new("/graphs/bad.wasm"));
            assert_eq!(message, "magic header not detected");
        }
        other => panic!("expected load failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_entry_point_is_tagged_with_node_id() {
    let mock = Arc::new(MockExecutor::new().with_behaviour("lib.wasm", MockBehaviour::MissingEntryPoint));
    let spec = graph(vec![NodeSpec::new("lib", "lib.wasm", &[])]);

    let err = runner(&mock).run_spec(&spec).await.unwrap_err();
    assert!(matches!(err, EngineError::MissingEntryPoint { node_id, entry, .. } if node_id == "lib" && entry == "main"));
}

#[tokio::test]
async fn empty_graph_produces_empty_state() {
    let mock = Arc::new(MockExecutor::new());
    let state = runner(&mock).run_spec(&graph(vec![])).await.unwrap();
    assert!(state.is_empty());
}

// ============================================================
// End-to-end with real modules (WasmExecutor)
// ============================================================

const FETCH_USER: &str = r#"(module (func (export "main") (param i32) (result i32) i32.const 1001))"#;

const CALC_DISCOUNT: &str = r#"
    (module
        (func (export "main") (param i32) (result i32)
            local.get 0
            i32.const 2
            i32.mul
            i32.const 1
            i32.sub))
"#;

const RENDER_PROFILE: &str = r#"
    (module
        (func (export "main") (param i32) (result i32)
            local.get 0
            i32.const 2
            i32.mul))
"#;

fn write_module(dir: &Path, rel: &str, wat_src: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, wat::parse_str(wat_src).expect("valid WAT")).unwrap();
}

fn wasm_runner() -> GraphRunner {
    GraphRunner::with_executor(Arc::new(WasmExecutor::with_defaults()))
}

#[tokio::test]
async fn profile_graph_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "nodes/fetchUser.wasm", FETCH_USER);
    write_module(dir.path(), "nodes/calcDiscount.wasm", CALC_DISCOUNT);
    write_module(dir.path(), "nodes/renderProfile.wasm", RENDER_PROFILE);

    let graph_path = dir.path().join("graph.json");
    std::fs::write(
        &graph_path,
        r#"{
            "nodes": [
                { "id": "fetchUser", "modulePath": "nodes/fetchUser.wasm" },
                { "id": "calcDiscount", "modulePath": "nodes/calcDiscount.wasm", "dependsOn": ["fetchUser"] },
                { "id": "renderProfile", "modulePath": "nodes/renderProfile.wasm", "dependsOn": ["calcDiscount"] }
            ]
        }"#,
    )
    .unwrap();

    let state = wasm_runner().run(&graph_path).await.expect("run succeeds");

    let summary: Vec<(&str, i32, i32)> = state.iter().map(|(id, r)| (id, r.input, r.output)).collect();
    assert_eq!(
        summary,
        vec![
            ("fetchUser", 0, 1001),
            ("calcDiscount", 1001, 2001),
            ("renderProfile", 2001, 4002),
        ]
    );
}

#[tokio::test]
async fn nonexistent_module_file_fails_with_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("graph.json");
    std::fs::write(&graph_path, r#"{ "nodes": [ { "id": "lonely", "modulePath": "nope.wasm" } ] }"#).unwrap();

    let err = wasm_runner().run(&graph_path).await.unwrap_err();
    assert!(matches!(err, EngineError::ModuleLoadFailure { node_id, .. } if node_id == "lonely"));
}

#[tokio::test]
async fn module_without_main_fails_with_missing_entry_point() {
    let dir = tempfile::tempdir().unwrap();
    write_module(
        dir.path(),
        "helper.wasm",
        r#"(module (func (export "helper") (param i32) (result i32) local.get 0))"#,
    );
    let graph_path = dir.path().join("graph.json");
    std::fs::write(&graph_path, r#"{ "nodes": [ { "id": "helper", "modulePath": "helper.wasm" } ] }"#).unwrap();

    let err = wasm_runner().run(&graph_path).await.unwrap_err();
    assert!(matches!(err, EngineError::MissingEntryPoint { node_id, .. } if node_id == "helper"));
}

#[tokio::test]
async fn malformed_graph_file_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("graph.json");
    std::fs::write(&graph_path, r#"{ "nodes": "fetchUser" }"#).unwrap();

    let err = wasm_runner().run(&graph_path).await.unwrap_err();
    assert!(matches!(err, EngineError::MalformedGraph { .. }));
}

#[tokio::test]
async fn shipped_profile_demo_runs() {
    let graph_path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/profile/graph.json"));

    let state = wasm_runner().run(graph_path).await.expect("demo graph runs");

    let summary: Vec<(&str, i32, i32)> = state.iter().map(|(id, r)| (id, r.input, r.output)).collect();
    assert_eq!(
        summary,
        vec![
            ("fetchUser", 0, 1001),
            ("calcDiscount", 1001, 2001),
            ("renderProfile", 2001, 4002),
        ]
    );
}
