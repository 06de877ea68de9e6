//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use inventory_store::{ClassId, ClassRecord, InMemoryInventoryStore};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryInventoryStore) {
    let store = InMemoryInventoryStore::seeded([
        ClassRecord::new("maths", "Mathematics", 5),
        ClassRecord::new("music", "Music Theory", 4),
    ]);
    let state = api::create_state(Arc::new(store.clone()));
    let app = api::create_app(state, get_metrics_handle());
    (app, store)
}

fn post_order(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn seats(store: &InMemoryInventoryStore, id: &str) -> Option<u32> {
    store.available_seats(&ClassId::new(id)).await
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "reachable");
}

#[tokio::test]
async fn test_list_classes() {
    let (app, _) = setup();

    let response = app.oneshot(get("/classes")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let classes = json.as_array().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0]["id"], "maths");
    assert_eq!(classes[0]["availableSeats"], 5);
}

#[tokio::test]
async fn test_create_order() {
    let (app, store) = setup();

    let response = app
        .oneshot(post_order(json!({
            "name": "Ada Lovelace",
            "phone": "07700900000",
            "lessonIDs": ["maths", "music"],
            "spaces": [2, 4]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Ada Lovelace");
    assert_eq!(json["phone"], "07700900000");
    assert_eq!(json["lessonIDs"], json!(["maths", "music"]));
    assert_eq!(json["spaces"], json!([2, 4]));
    assert!(json["id"].as_str().is_some());
    assert!(json["createdAt"].as_str().is_some());

    assert_eq!(seats(&store, "maths").await, Some(3));
    assert_eq!(seats(&store, "music").await, Some(0));
}

#[tokio::test]
async fn test_missing_spaces_default_to_one() {
    let (app, store) = setup();

    let response = app
        .oneshot(post_order(json!({
            "name": "Ada",
            "phone": 7700900000u64,
            "lessonIDs": ["music"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["phone"], "7700900000");
    assert_eq!(json["spaces"], json!([1]));
    assert_eq!(seats(&store, "music").await, Some(3));
}

#[tokio::test]
async fn test_validation_error_is_bad_request() {
    let (app, store) = setup();

    let response = app
        .oneshot(post_order(json!({ "name": "Ada", "lessonIDs": ["maths"] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "ValidationError");
    assert!(json["error"].as_str().is_some());
    assert_eq!(store.calls().total(), 0);
}

#[tokio::test]
async fn test_insufficient_inventory_is_conflict_and_rolls_back() {
    let (app, store) = setup();

    let response = app
        .oneshot(post_order(json!({
            "name": "Ada",
            "phone": "07700900000",
            "lessonIDs": ["maths", "music"],
            "spaces": [3, 10]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "InsufficientInventory");
    assert_eq!(json["classId"], "music");
    assert_eq!(json["classTitle"], "Music Theory");
    assert_eq!(json["requested"], 10);
    assert_eq!(json["available"], 4);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("Not enough spots for class \"Music Theory\"")
    );

    assert_eq!(seats(&store, "maths").await, Some(5));
    assert_eq!(seats(&store, "music").await, Some(4));
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let (app, store) = setup();
    store.fail_decrement_of("music").await;

    let response = app
        .oneshot(post_order(json!({
            "name": "Ada",
            "phone": "07700900000",
            "lessonIDs": ["maths", "music"],
            "spaces": [1, 1]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "InfrastructureError");
    assert_eq!(json["classId"], "music");
    assert_eq!(seats(&store, "maths").await, Some(5));
}

#[tokio::test]
async fn test_unrecorded_order_reports_granted_seats() {
    let (app, store) = setup();
    store.set_fail_on_insert_order(true).await;

    let response = app
        .oneshot(post_order(json!({
            "name": "Ada",
            "phone": "07700900000",
            "lessonIDs": ["maths"],
            "spaces": [2]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "PersistenceInconsistency");
    assert_eq!(json["granted"][0]["class_id"], "maths");
    assert_eq!(json["granted"][0]["seats"], 2);
    assert_eq!(seats(&store, "maths").await, Some(3));
}

#[tokio::test]
async fn test_create_and_list_orders() {
    let (app, _) = setup();

    let create_response = app
        .clone()
        .oneshot(post_order(json!({
            "name": "Ada",
            "phone": "07700900000",
            "lessonIDs": ["maths"],
            "spaces": [1]
        })))
        .await
        .unwrap();
    assert_eq!(create_response.status(), StatusCode::CREATED);
    let created = body_json(create_response).await;

    let list_response = app.oneshot(get("/orders")).await.unwrap();

    assert_eq!(list_response.status(), StatusCode::OK);
    let json = body_json(list_response).await;
    let orders = json.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], created["id"]);
    assert_eq!(orders[0]["lessonIDs"], json!(["maths"]));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    let response = app
        .clone()
        .oneshot(post_order(json!({
            "name": "Ada",
            "phone": "07700900000",
            "lessonIDs": ["maths"]
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_placed_total"));
}

#[tokio::test]
async fn test_unreadable_bodies_are_validation_errors() {
    let requests = [
        post_order(json!("x")),
        post_order(json!([1, 2])),
        Request::builder()
            .method("POST")
            .uri("/orders")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
        Request::builder()
            .method("POST")
            .uri("/orders")
            .body(Body::from(r#"{"name":"Ada"}"#))
            .unwrap(),
    ];

    for request in requests {
        let (app, store) = setup();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "ValidationError");
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid order data")
        );
        assert_eq!(store.calls().total(), 0);
    }
}
