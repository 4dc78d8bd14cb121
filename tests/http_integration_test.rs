use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use booking_assistant::{
    create_app, start_server, BookingAssistant, DatasetStore, EmbeddingFunction, FlatIndex, RandomEmbedder,
    SimilarityMetric, Vector, VectorIndexWrapper,
};

const DATASET: &str = "\
hotel,is_canceled,lead_time,arrival_date_year,arrival_date_month,adr
Resort Hotel,0,342,2017,July,100.0
City Hotel,1,88,2016,July,80.0
City Hotel,1,14,2017,August,60.0
";

// Mock embedding function with a fixed output
struct MockEmbeddingFunction {
    values: Vec<f64>,
}

impl EmbeddingFunction for MockEmbeddingFunction {
    fn generate_embedding(&self, _text: &str) -> booking_assistant::embeddings::Result<Vec<f64>> {
        Ok(self.values.clone())
    }

    fn dimension(&self) -> usize {
        self.values.len()
    }
}

fn index() -> VectorIndexWrapper {
    VectorIndexWrapper::Flat(FlatIndex::new(
        2,
        SimilarityMetric::Euclidean,
        vec![
            Vector { id: 0, values: vec![1.0, 0.0] },
            Vector { id: 1, values: vec![0.0, 1.0] },
            Vector { id: 2, values: vec![1.0, 1.0] },
        ],
    ))
}

fn app_with(embedder: Box<dyn EmbeddingFunction>, top_k: usize) -> Router {
    let dataset = DatasetStore::from_reader(DATASET.as_bytes()).unwrap();
    let assistant = BookingAssistant::new(dataset, index(), embedder, top_k).unwrap();
    create_app(Arc::new(assistant))
}

fn create_test_app() -> Router {
    app_with(Box::new(RandomEmbedder::new(2).unwrap()), 5)
}

fn post_ask(query: &str) -> Request<Body> {
    Request::builder()
        .uri("/ask")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({ "query": query })).unwrap()))
        .unwrap()
}

fn post_analytics(metric: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/analytics?metric={}", metric))
        .method("POST")
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder()
        .uri("/health")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "booking-assistant");
    assert_eq!(json["rows"], 3);
    assert_eq!(json["vectors"], 3);
}

#[tokio::test]
async fn test_total_revenue_july_2017() {
    let response = create_test_app().oneshot(post_analytics("total_revenue_july_2017")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json, json!({ "total_revenue": 100.0 }));
}

#[tokio::test]
async fn test_highest_cancellations() {
    let response = create_test_app().oneshot(post_analytics("highest_cancellations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json, json!({ "highest_cancellations": { "City Hotel": 2 } }));
}

#[tokio::test]
async fn test_average_booking_price() {
    let response = create_test_app().oneshot(post_analytics("average_booking_price")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json, json!({ "average_price": 80.0 }));
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_invalid_metric() {
    let response = create_test_app().oneshot(post_analytics("revenue_forecast")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = read_json(response).await;
    assert_eq!(json, json!({ "error": "Invalid metric" }));
}

#[tokio::test]
async fn test_missing_metric_parameter() {
    let request = Request::builder()
        .uri("/analytics")
        .method("POST")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_is_idempotent() {
    let app = create_test_app();
    for metric in ["total_revenue_july_2017", "highest_cancellations", "average_booking_price"] {
        let first = read_json(app.clone().oneshot(post_analytics(metric)).await.unwrap()).await;
        let second = read_json(app.clone().oneshot(post_analytics(metric)).await.unwrap()).await;
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_ask_returns_structured_results() {
    let app = create_test_app();

    // Random embeddings: assert shape, not values
    for _ in 0..3 {
        let response = app.clone().oneshot(post_ask("Which hotel had the most cancellations?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = read_json(response).await;
        let results = json["retrieved_results"].as_array().unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 5);
        assert!(results.iter().all(|row| row.get("hotel").is_some() && row.get("adr").is_some()));

        let response_time = json["response_time"].as_str().unwrap();
        let seconds = response_time.strip_suffix(" seconds").unwrap();
        assert!(seconds.parse::<f64>().is_ok());
    }
}

#[tokio::test]
async fn test_ask_with_top_k_above_index_size() {
    let app = app_with(Box::new(RandomEmbedder::new(2).unwrap()), 5);
    let response = app.oneshot(post_ask("anything")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json["retrieved_results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_ask_orders_rows_by_similarity() {
    let app = app_with(Box::new(MockEmbeddingFunction { values: vec![0.9, 0.1] }), 2);
    let response = app.oneshot(post_ask("resort bookings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    let results = json["retrieved_results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["hotel"], "Resort Hotel");
    assert_eq!(results[0]["lead_time"], 342);
    assert_eq!(results[1]["arrival_date_month"], "August");
}

#[tokio::test]
async fn test_ask_dimension_mismatch_is_server_error() {
    let app = app_with(Box::new(MockEmbeddingFunction { values: vec![1.0, 2.0, 3.0] }), 5);
    let response = app.oneshot(post_ask("anything")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = read_json(response).await;
    assert_eq!(json["error"], "Internal Server Error");
    assert_eq!(json["details"], "Vector dimension mismatch: expected 2, got 3");
}

#[tokio::test]
async fn test_ask_on_empty_index() {
    let dataset = DatasetStore::from_reader(
        "hotel,is_canceled,arrival_date_year,arrival_date_month,adr\n".as_bytes(),
    )
    .unwrap();
    let index = VectorIndexWrapper::Flat(FlatIndex::new(2, SimilarityMetric::Euclidean, Vec::new()));
    let assistant =
        BookingAssistant::new(dataset, index, Box::new(RandomEmbedder::new(2).unwrap()), 5).unwrap();
    let app = create_app(Arc::new(assistant));

    let response = app.oneshot(post_ask("anything")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = read_json(response).await;
    assert_eq!(json, json!({ "error": "No matching results found." }));
}

#[tokio::test]
async fn test_ask_rejects_malformed_body() {
    let request = Request::builder()
        .uri("/ask")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"question": "wrong field"}"#))
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_start_server_rejects_bad_address() {
    let dataset = DatasetStore::from_reader(DATASET.as_bytes()).unwrap();
    let assistant =
        BookingAssistant::new(dataset, index(), Box::new(RandomEmbedder::new(2).unwrap()), 5).unwrap();

    let result = start_server(assistant, "not-a-socket-address").await;
    assert!(result.is_err());
}
