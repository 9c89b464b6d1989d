use axum::{body::Body, response::Response};

/// Read a handler's response body as JSON.
///
/// Panics if the body cannot be read or is not valid JSON.
pub(crate) async fn parse_json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}
