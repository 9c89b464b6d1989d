//! JSON response bodies shared by the route handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The body used for most non-data responses, e.g. `{"message": "Member not found"}`.
#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub message: &'a str,
}

/// A validation error that names the offending request field.
#[derive(Debug, Serialize)]
pub struct FieldError<'a> {
    pub field: &'a str,
    pub message: &'a str,
}

/// The body for member self-service outcomes, e.g. `{"success": true, "message": "..."}`.
#[derive(Debug, Serialize)]
pub struct Outcome<'a> {
    pub success: bool,
    pub message: &'a str,
}

/// Render `message` as `{"message": ...}` with the given status code.
pub fn render_message(status: StatusCode, message: &str) -> Response {
    (status, Json(Message { message })).into_response()
}

/// Render a 400 response that points the client at `field`.
pub fn render_field_error(field: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(FieldError { field, message }),
    )
        .into_response()
}

/// Render `{"success": ..., "message": ...}` with the given status code.
pub fn render_outcome(status: StatusCode, success: bool, message: &str) -> Response {
    (status, Json(Outcome { success, message })).into_response()
}

/// Log `error` and render a 500 response with a message that is safe to show the client.
pub fn internal_error(error: impl std::fmt::Display, message: &str) -> Response {
    tracing::error!("{message}: {error}");
    render_message(StatusCode::INTERNAL_SERVER_ERROR, message)
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode};
    use serde_json::{Value, json};

    use super::{internal_error, render_field_error};

    #[tokio::test]
    async fn field_error_names_the_field() {
        let response = render_field_error("phoneNumber", "Phone number already exists");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({"field": "phoneNumber", "message": "Phone number already exists"})
        );
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_details() {
        let response = internal_error("disk I/O error", "Failed to fetch members");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"message": "Failed to fetch members"}));
    }
}
