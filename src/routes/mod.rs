//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/tracks", get(http::http_list_tracks))
        .route("/api/v1/tracks/:id", get(http::http_get_track))
        .route("/api/v1/tracks/:id/progress", get(http::http_get_progress))
        .route("/api/v1/submit", post(http::http_post_submit))
        .route("/api/v1/preview", post(http::http_post_preview))
        .route("/api/v1/ai/hint", post(http::http_post_hint))
        .route("/api/v1/ai/feedback", post(http::http_post_feedback))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        build_router(Arc::new(AppState::for_tests()))
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = res.into_body().collect().await.expect("body").to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let res = test_app()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn tracks_listing_includes_builtins() {
        let res = test_app()
            .oneshot(Request::get("/api/v1/tracks").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        let ids: Vec<&str> = body["tracks"]
            .as_array()
            .expect("array")
            .iter()
            .map(|t| t["id"].as_str().expect("id"))
            .collect();
        assert!(ids.contains(&"html-beginner"));
        assert!(ids.contains(&"css-beginner"));
        assert!(ids.contains(&"js-beginner"));
    }

    #[tokio::test]
    async fn track_detail_hides_choice_answers_and_gates_access() {
        let res = test_app()
            .oneshot(Request::get("/api/v1/tracks/html-beginner").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        let exercises = body["exercises"].as_array().expect("array");
        assert_eq!(exercises.len(), 4);
        // no correct answer on the wire
        assert!(exercises[0].get("correctAnswer").is_none());
        // only the first exercise accessible on a fresh track
        assert_eq!(exercises[0]["accessible"], json!(true));
        assert_eq!(exercises[1]["accessible"], json!(false));
    }

    #[tokio::test]
    async fn unknown_track_is_404() {
        let res = test_app()
            .oneshot(Request::get("/api/v1/tracks/rust-beginner").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submit_flow_unlocks_the_next_exercise() {
        let app = test_app();

        // locked at first
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/submit",
                json!({ "trackId": "css-beginner", "exerciseIndex": 1, "code": "x" }),
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::CONFLICT);

        // pass exercise 0
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/submit",
                json!({
                    "trackId": "css-beginner",
                    "exerciseIndex": 0,
                    "code": "<style>h1 { color: red; } p { color: blue; }</style>"
                }),
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["passed"], json!(true));
        assert_eq!(body["advanceTo"], json!(1));
        assert_eq!(body["advanceDelayMs"], json!(2000));
        assert_eq!(body["status"]["0"], json!(true));

        // exercise 1 is now gradable (and fails with rule feedback)
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/submit",
                json!({ "trackId": "css-beginner", "exerciseIndex": 1, "code": "h1 {}" }),
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["passed"], json!(false));
        assert!(!body["failedRules"].as_array().expect("array").is_empty());
    }

    #[tokio::test]
    async fn preview_returns_document_and_grants() {
        let res = test_app()
            .oneshot(post_json("/api/v1/preview", json!({ "code": "<h1>Hi</h1>" })))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["document"], json!("<body style='color:#111;'><h1>Hi</h1></body>"));
        assert_eq!(body["sandbox"], json!(["allow-scripts", "allow-same-origin"]));
    }

    #[tokio::test]
    async fn preview_as_html_carries_the_csp_sandbox() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/preview")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/html")
            .body(Body::from(json!({ "code": "<p>x</p>" }).to_string()))
            .expect("request");
        let res = test_app().oneshot(req).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::CONTENT_SECURITY_POLICY)
                .and_then(|v| v.to_str().ok()),
            Some("sandbox allow-scripts allow-same-origin")
        );
    }

    #[tokio::test]
    async fn hint_endpoint_serves_the_local_fallback() {
        let res = test_app()
            .oneshot(post_json(
                "/api/v1/ai/hint",
                json!({ "trackId": "css-beginner", "exerciseIndex": 0, "code": "" }),
            ))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert!(!body["hint"].as_str().expect("hint").is_empty());
    }
}
