use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, lenient,
    monthly_summary::core::{generate_monthly_summary, list_monthly_summaries},
    response::{internal_error, render_message},
    timezone::local_today,
};

#[derive(Debug, Clone)]
pub struct MonthlySummaryState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// Decides which month is the current one.
    pub local_timezone: String,
}

impl FromRef<AppState> for MonthlySummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateSummaryRequest {
    #[serde(deserialize_with = "lenient::number")]
    pub year: i32,
    #[serde(deserialize_with = "lenient::number")]
    pub month: u8,
}

pub async fn generate_summary_endpoint(
    State(state): State<MonthlySummaryState>,
    Json(request): Json<GenerateSummaryRequest>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return internal_error(error, "Failed to generate summary"),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to generate summary"),
    };

    match generate_monthly_summary(request.year, request.month, today, &connection) {
        Ok(summary) => (
            StatusCode::CREATED,
            Json(json!({"message": "Monthly summary saved", "summary": summary})),
        )
            .into_response(),
        Err(Error::InvalidPeriod(_, _)) => {
            render_message(StatusCode::BAD_REQUEST, "Invalid year or month.")
        }
        Err(Error::OpenPeriod(_)) => render_message(
            StatusCode::BAD_REQUEST,
            "You can only generate summary for the previous or earlier months.",
        ),
        Err(Error::DuplicateSummary(period)) => render_message(
            StatusCode::CONFLICT,
            &format!("Summary for {period} already exists."),
        ),
        Err(error) => internal_error(error, "Failed to generate summary"),
    }
}

/// A route handler for every monthly summary, newest first.
pub async fn list_summaries_endpoint(State(state): State<MonthlySummaryState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to fetch monthly summary"),
    };

    match list_monthly_summaries(&connection) {
        Ok(summaries) => Json(summaries).into_response(),
        Err(error) => internal_error(error, "Failed to fetch monthly summary"),
    }
}
