use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AdminId, AppState, Error,
    notice::core::{NoticeContent, create_notice, delete_notice, list_notices, update_notice},
    response::{internal_error, render_message, render_outcome},
};

#[derive(Debug, Clone)]
pub struct NoticeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NoticeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "type")]
    pub notice_type: Option<String>,
}

impl NoticeRequest {
    /// `None` unless every field is present and non-empty.
    fn into_content(self) -> Option<NoticeContent> {
        let non_empty = |value: Option<String>| value.filter(|value| !value.trim().is_empty());

        Some(NoticeContent {
            title: non_empty(self.title)?,
            content: non_empty(self.content)?,
            notice_type: non_empty(self.notice_type)?,
        })
    }
}

const FIELDS_REQUIRED: &str = "All fields are required.";

pub async fn create_notice_endpoint(
    State(state): State<NoticeState>,
    Extension(admin_id): Extension<AdminId>,
    Json(request): Json<NoticeRequest>,
) -> Response {
    let Some(content) = request.into_content() else {
        return render_message(StatusCode::BAD_REQUEST, FIELDS_REQUIRED);
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to post notice/event"),
    };

    match create_notice(&content, admin_id, OffsetDateTime::now_utc(), &connection) {
        Ok(notice) => {
            tracing::info!("Admin {admin_id} posted notice {}", notice.id);
            render_outcome(StatusCode::OK, true, "Notice/Event posted")
        }
        Err(error) => internal_error(error, "Failed to post notice/event"),
    }
}

/// A route handler for every notice. Does not require a log in.
pub async fn list_notices_endpoint(State(state): State<NoticeState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to fetch notices/events"),
    };

    match list_notices(&connection) {
        Ok(notices) => Json(notices).into_response(),
        Err(error) => internal_error(error, "Failed to fetch notices/events"),
    }
}

pub async fn update_notice_endpoint(
    State(state): State<NoticeState>,
    Path(id): Path<i64>,
    Json(request): Json<NoticeRequest>,
) -> Response {
    let Some(content) = request.into_content() else {
        return render_message(StatusCode::BAD_REQUEST, FIELDS_REQUIRED);
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to update notice"),
    };

    match update_notice(id, &content, &connection) {
        Ok(()) => render_outcome(StatusCode::OK, true, "Notice updated successfully."),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "Notice not found."),
        Err(error) => internal_error(error, "Failed to update notice"),
    }
}

pub async fn delete_notice_endpoint(
    State(state): State<NoticeState>,
    Path(id): Path<i64>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to delete notice"),
    };

    match delete_notice(id, &connection) {
        Ok(()) => render_outcome(StatusCode::OK, true, "Notice deleted successfully."),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "Notice not found."),
        Err(error) => internal_error(error, "Failed to delete notice"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        http::StatusCode,
        routing::{get, put},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{AdminId, test_utils::get_test_app_state};

    use super::{
        create_notice_endpoint, delete_notice_endpoint, list_notices_endpoint,
        update_notice_endpoint,
    };

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route(
                "/admin/notices",
                get(list_notices_endpoint).post(create_notice_endpoint),
            )
            .route(
                "/admin/notices/{id}",
                put(update_notice_endpoint).delete(delete_notice_endpoint),
            )
            .layer(Extension(AdminId::new(1)))
            .with_state(get_test_app_state());

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn post_list_edit_delete() {
        let server = get_test_server();

        server
            .post("/admin/notices")
            .json(&json!({"title": "AGM", "content": "Saturday at noon", "type": "event"}))
            .await
            .assert_json(&json!({"success": true, "message": "Notice/Event posted"}));

        let notices = server.get("/admin/notices").await.json::<serde_json::Value>();
        assert_eq!(notices[0]["title"], "AGM");
        assert_eq!(notices[0]["type"], "event");
        let id = notices[0]["id"].as_i64().unwrap();

        server
            .put(&format!("/admin/notices/{id}"))
            .json(&json!({"title": "AGM", "content": "Sunday at noon", "type": "event"}))
            .await
            .assert_json(&json!({"success": true, "message": "Notice updated successfully."}));
        server
            .delete(&format!("/admin/notices/{id}"))
            .await
            .assert_json(&json!({"success": true, "message": "Notice deleted successfully."}));
        server
            .delete(&format!("/admin/notices/{id}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn every_field_is_required() {
        let server = get_test_server();

        let response = server
            .post("/admin/notices")
            .json(&json!({"title": "AGM", "content": ""}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"message": "All fields are required."}));
    }
}
