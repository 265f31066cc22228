mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use common::{FailingAnalyzer, MeanBlueAnalyzer, app_with, body_json, json_request, solid_png_b64};

fn header_value(resp: &axum::http::Response<Body>) -> String {
    resp.headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[tokio::test]
async fn request_id_is_generated_when_missing() {
    let app = app_with(Arc::new(MeanBlueAnalyzer));
    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .expect("request /");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        !header_value(&resp).is_empty(),
        "x-request-id should be generated"
    );
}

#[tokio::test]
async fn request_id_uses_client_value_when_valid() {
    let app = app_with(Arc::new(MeanBlueAnalyzer));
    let body = serde_json::json!({ "image": solid_png_b64(1, 1, [0, 0, 0]) }).to_string();
    let mut req = json_request("POST", "/predict", body);
    req.headers_mut()
        .insert("x-request-id", "client.req-001".parse().unwrap());

    let resp = app.oneshot(req).await.expect("request /predict");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_value(&resp), "client.req-001");
}

#[tokio::test]
async fn invalid_client_value_is_replaced() {
    let app = app_with(Arc::new(MeanBlueAnalyzer));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("x-request-id", "bad id with spaces")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /");

    let id = header_value(&resp);
    assert!(!id.is_empty());
    assert_ne!(id, "bad id with spaces");
}

#[tokio::test]
async fn error_responses_keep_header_but_not_body_field() {
    let app = app_with(Arc::new(FailingAnalyzer("boom")));
    let body = serde_json::json!({ "image": solid_png_b64(1, 1, [0, 0, 0]) }).to_string();
    let mut req = json_request("POST", "/predict", body);
    req.headers_mut()
        .insert("x-request-id", "err.req-001".parse().unwrap());

    let resp = app.oneshot(req).await.expect("request /predict");

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header_value(&resp), "err.req-001");
    let json = body_json(resp).await;
    let keys: Vec<&String> = json.as_object().expect("object").keys().collect();
    assert_eq!(keys, vec!["error"]);
}
