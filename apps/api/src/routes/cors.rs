//! Cross-origin headers for every response, plus a catch-all preflight answer.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

const ALLOWED_HEADERS: &str = "Content-Type, Accept, Authorization";
const DEFAULT_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

fn allowed_methods(path: &str) -> &'static str {
    match path.trim_end_matches('/') {
        "/api/analyze-review" => "POST, OPTIONS",
        "/api/reviews" => "GET, OPTIONS",
        _ => DEFAULT_METHODS,
    }
}

fn apply_cors_headers(headers: &mut HeaderMap, methods: &'static str) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(methods),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}

/// OPTIONS on any path is answered here with `200 {}` and never reaches a
/// handler. Everything else passes through and gets the headers on the way out,
/// error responses included.
pub async fn cors(request: Request, next: Next) -> Response {
    let methods = allowed_methods(request.uri().path());

    let mut response = if request.method() == Method::OPTIONS {
        Json(json!({})).into_response()
    } else {
        next.run(request).await
    };

    apply_cors_headers(response.headers_mut(), methods);
    response
}
