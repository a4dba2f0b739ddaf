//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use weave_server::{build_router, AppState};

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    _dir: TempDir,
}

fn app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::with_unordered_dir(dir.path()));
    TestApp {
        router: build_router(state.clone(), "*"),
        state,
        _dir: dir,
    }
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Create the example graph and save it under `name`.
    async fn saved_example(&self, name: &str) -> Value {
        let (status, created) = self.send("POST", "/api/checkpoints/example-graph", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, summary) = self
            .send(
                "POST",
                "/api/projects",
                Some(json!({ "name": name, "checkpoint": created["checkpoint"] })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", summary);
        summary
    }
}

fn small_params() -> Value {
    json!({
        "dimensions": 3,
        "walkLength": 4,
        "contextSize": 2,
        "walksPerNode": 2,
        "iterations": 3,
        "seed": 9,
    })
}

#[tokio::test]
async fn health_reports_counts() {
    let app = app();
    app.saved_example("people").await;

    let (status, body) = app.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["projects"], 1);
    assert_eq!(body["entities"]["entity_count"], 8);
}

#[tokio::test]
async fn discard_all_empties_the_store() {
    let app = app();
    app.saved_example("people").await;
    assert_eq!(app.state.store.read().await.len(), 8);

    let (status, body) = app.send("POST", "/ajax/discardAllReallyIMeanIt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entities"], 8);
    assert_eq!(body["projects"], 1);
    assert!(app.state.store.read().await.is_empty());

    let (status, _) = app.send("GET", "/api/projects/people", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // GET works too and is harmless on an empty store.
    let (status, body) = app.send("GET", "/ajax/discardAllReallyIMeanIt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entities"], 0);
}

#[tokio::test]
async fn missing_project_is_404_with_error_body() {
    let app = app();
    let (status, body) = app.send("GET", "/api/projects/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn saved_project_summary_and_listing() {
    let app = app();
    let summary = app.saved_example("people").await;
    assert_eq!(summary["vertex_count"], 4);
    assert_eq!(summary["edge_count"], 4);

    let (_, names) = app.send("GET", "/api/projects", None).await;
    assert_eq!(names, json!(["people"]));

    let (status, attr) = app
        .send("GET", "/api/projects/people/attributes/name", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attr["kind"], "StringAttribute");
    assert_eq!(attr["data"]["values"][3], "Isolated Joe");

    let (status, _) = app
        .send("GET", "/api/projects/people/attributes/shoe_size", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saving_an_unknown_checkpoint_fails() {
    let app = app();
    let (status, _) = app
        .send(
            "POST",
            "/api/projects",
            Some(json!({ "name": "x", "checkpoint": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn node2vec_adds_an_embedding_attribute() {
    let app = app();
    app.saved_example("people").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/projects/people/node2vec",
            Some(json!({ "params": small_params() })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["attribute"], "embedding");
    assert_eq!(body["epoch_losses"].as_array().unwrap().len(), 3);

    let (_, summary) = app.send("GET", "/api/projects/people", None).await;
    assert!(summary["vertex_attributes"]
        .as_array()
        .unwrap()
        .contains(&json!("embedding")));

    let (status, attr) = app
        .send("GET", "/api/projects/people/attributes/embedding", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attr["kind"], "DoubleVectorAttribute");
    let rows = attr["data"]["values"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.as_array().unwrap().len() == 3));
}

#[tokio::test]
async fn node2vec_with_bad_params_is_400() {
    let app = app();
    app.saved_example("people").await;

    let mut params = small_params();
    params["contextSize"] = json!(10);
    let (status, body) = app
        .send(
            "POST",
            "/api/projects/people/node2vec",
            Some(json!({ "attribute": "emb", "params": params })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(
            "POST",
            "/api/projects/people/node2vec",
            Some(json!({ "params": { "dimensions": 3 } })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn long_params(seed: u64) -> Value {
    json!({
        "dimensions": 8,
        "walkLength": 10,
        "contextSize": 4,
        "walksPerNode": 10,
        "iterations": 300,
        "seed": seed,
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_node2vec_runs_keep_both_attributes() {
    let app = app();
    app.saved_example("people").await;

    let app = &app;
    let run = move |attribute: &'static str, seed: u64| {
        app.send(
            "POST",
            "/api/projects/people/node2vec",
            Some(json!({ "attribute": attribute, "params": long_params(seed) })),
        )
    };
    let ((status_a, body_a), (status_b, body_b)) = tokio::join!(run("a", 1), run("b", 2));
    assert_eq!(status_a, StatusCode::OK, "{}", body_a);
    assert_eq!(status_b, StatusCode::OK, "{}", body_b);

    let (_, summary) = app.send("GET", "/api/projects/people", None).await;
    let attributes = summary["vertex_attributes"].as_array().unwrap();
    assert!(attributes.contains(&json!("a")), "{:?}", attributes);
    assert!(attributes.contains(&json!("b")), "{:?}", attributes);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn discard_during_node2vec_leaves_no_project_behind() {
    let app = app();
    app.saved_example("people").await;

    let train = app.send(
        "POST",
        "/api/projects/people/node2vec",
        Some(json!({ "params": long_params(3) })),
    );
    let discard = async {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        app.send("POST", "/ajax/discardAllReallyIMeanIt", None).await
    };
    let ((status, body), (discard_status, _)) = tokio::join!(train, discard);
    assert_eq!(discard_status, StatusCode::OK);
    // Either training finished before the discard or it found the project gone.
    assert!(
        status == StatusCode::OK || status == StatusCode::NOT_FOUND,
        "{} {}",
        status,
        body
    );

    let (_, names) = app.send("GET", "/api/projects", None).await;
    assert_eq!(names, json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_answers_while_an_operation_trains() {
    let app = app();
    let (_, created) = app.send("POST", "/api/checkpoints/example-graph", None).await;
    let instance = json!({
        "guid": uuid::Uuid::new_v4(),
        "inputs": {
            "vs": created["project"]["vertex_set"],
            "es": created["project"]["edge_bundle"],
        },
        "outputs": { "embedding": uuid::Uuid::new_v4() },
        "operation": { "class": "Node2Vec", "data": long_params(4) },
    });

    let operation = app.send("POST", "/api/operations", Some(instance));
    let health = async {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            app.send("GET", "/health", None),
        )
        .await
    };
    let ((status, body), health) = tokio::join!(operation, health);
    assert_eq!(status, StatusCode::OK, "{}", body);
    let (health_status, _) = health.expect("health blocked behind the operation");
    assert_eq!(health_status, StatusCode::OK);
}

#[tokio::test]
async fn operations_endpoint_runs_example_graph() {
    let app = app();
    let outputs: serde_json::Map<String, Value> =
        ["vs", "es", "name", "age", "gender", "location", "weight", "comment"]
            .iter()
            .map(|n| (n.to_string(), json!(uuid::Uuid::new_v4())))
            .collect();
    let instance = json!({
        "guid": uuid::Uuid::new_v4(),
        "outputs": outputs,
        "operation": { "class": "ExampleGraph" },
    });

    let (status, body) = app.send("POST", "/api/operations", Some(instance)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["outputs"]["vs"], outputs["vs"]);
    assert_eq!(app.state.store.read().await.len(), 8);

    let unknown = json!({
        "guid": uuid::Uuid::new_v4(),
        "operation": { "class": "Nope" },
    });
    let (status, _) = app.send("POST", "/api/operations", Some(unknown)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unordered_round_trip_through_the_api() {
    let app = app();
    let (_, created) = app.send("POST", "/api/checkpoints/example-graph", None).await;
    let vs = created["project"]["vertex_set"].clone();
    let age = created["project"]["vertex_attributes"]["age"].clone();

    let (status, body) = app
        .send("POST", "/api/unordered/write", Some(json!({ "guid": age, "vs1": vs })))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["rows"], 4);

    let before = app.state.store.write().await.remove(&serde_json::from_value(age.clone()).unwrap());
    assert!(before.is_some());

    let (status, body) = app
        .send(
            "POST",
            "/api/unordered/read",
            Some(json!({ "guid": age, "kind": "DoubleAttribute", "vs1": vs })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let guid = serde_json::from_value(age).unwrap();
    assert_eq!(app.state.store.read().await.get(&guid).ok(), before.as_ref());

    let (status, _) = app
        .send(
            "POST",
            "/api/unordered/read",
            Some(json!({ "guid": uuid::Uuid::new_v4(), "kind": "VertexSet" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
