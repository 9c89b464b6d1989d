//! Admin endpoints for recording and reporting ledger entries.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState,
    date_window::{DateWindow, iso_date},
    ledger::core::{
        NewLedgerEntry, create_ledger_entry, get_ledger_entries, get_ledger_entries_for_member,
    },
    lenient,
    member::member_exists,
    response::{internal_error, render_message},
    timezone::local_today,
};

/// The state needed for the ledger endpoints.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Lagos".
    pub local_timezone: String,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LedgerEntryRequest {
    #[serde(rename = "transdate", with = "iso_date")]
    pub transaction_date: Date,
    #[serde(deserialize_with = "lenient::number")]
    pub amount: f64,
    #[serde(default)]
    pub remark: String,
}

/// A route handler for recording a payment by the member with the phone number in the path.
///
/// The payment date is today in the server's local timezone.
pub async fn create_ledger_entry_endpoint(
    State(state): State<LedgerState>,
    Path(phone_number): Path<String>,
    Json(request): Json<LedgerEntryRequest>,
) -> Response {
    let payment_date = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return internal_error(error, "Failed to record ledger entry"),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to record ledger entry"),
    };

    match member_exists(&phone_number, &connection) {
        Ok(true) => {}
        Ok(false) => return render_message(StatusCode::NOT_FOUND, "Member not found"),
        Err(error) => return internal_error(error, "Failed to record ledger entry"),
    }

    let new_entry = NewLedgerEntry {
        phone_number,
        transaction_date: request.transaction_date,
        amount: request.amount,
        remark: request.remark,
        payment_date,
    };

    match create_ledger_entry(&new_entry, &connection) {
        Ok(entry) => {
            tracing::info!(
                "Recorded {} for {} on {}",
                entry.amount,
                entry.phone_number,
                entry.transaction_date
            );
            render_message(StatusCode::OK, "Ledger entry recorded successfully")
        }
        Err(error) => internal_error(error, "Failed to record ledger entry"),
    }
}

pub async fn get_member_ledger_endpoint(
    State(state): State<LedgerState>,
    Path(phone_number): Path<String>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Could not fetch ledger entries"),
    };

    match get_ledger_entries_for_member(&phone_number, &connection) {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => internal_error(error, "Could not fetch ledger entries"),
    }
}

/// A route handler that lists every ledger entry, newest first.
pub async fn get_all_ledger_entries_endpoint(State(state): State<LedgerState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to fetch member ledger"),
    };

    match get_ledger_entries(&DateWindow::default(), &connection) {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => internal_error(error, "Failed to fetch member ledger"),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerRecordsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// A route handler that lists ledger entries with a transaction date between `from` and `to`.
pub async fn get_ledger_records_endpoint(
    State(state): State<LedgerState>,
    Query(query): Query<LedgerRecordsQuery>,
) -> Response {
    let window = match DateWindow::parse(query.from.as_deref(), query.to.as_deref()) {
        Ok(window) => window,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    match get_ledger_entries(&window, &connection) {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => internal_error(error, "Server error"),
    }
}
