//! Ledger views for logged-in members.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    date_window::DateWindow,
    ledger::{
        admin_endpoints::LedgerState,
        core::{
            MemberGroup, get_ledger_entries_for_group, get_ledger_entries_for_member,
            sum_ledger_entries_for_member,
        },
    },
    member::{MemberId, get_member_by_id},
    response::{internal_error, render_message},
};

/// A route handler that lists the logged-in member's ledger entries, newest first.
pub async fn get_own_ledger_endpoint(
    State(state): State<LedgerState>,
    Extension(member_id): Extension<MemberId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to fetch ledger entries"),
    };

    let member = match get_member_by_id(member_id, &connection) {
        Ok(member) => member,
        Err(Error::NotFound) => return render_message(StatusCode::NOT_FOUND, "User not found"),
        Err(error) => return internal_error(error, "Failed to fetch ledger entries"),
    };

    match get_ledger_entries_for_member(&member.phone_number, &connection) {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => internal_error(error, "Failed to fetch ledger entries"),
    }
}

#[derive(Debug, Deserialize)]
pub struct MonthlyTotalQuery {
    /// A "YYYY-MM" month.
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
struct MonthlyTotal {
    total: f64,
}

/// A route handler for the sum of the logged-in member's payments in one month.
pub async fn monthly_total_endpoint(
    State(state): State<LedgerState>,
    Extension(member_id): Extension<MemberId>,
    Query(query): Query<MonthlyTotalQuery>,
) -> Response {
    let window = match query.month.as_deref().map(DateWindow::parse_month) {
        Some(Ok(window)) => window,
        Some(Err(_)) => return render_message(StatusCode::BAD_REQUEST, "Invalid month"),
        None => return render_message(StatusCode::BAD_REQUEST, "Missing month"),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error calculating monthly total"),
    };

    let member = match get_member_by_id(member_id, &connection) {
        Ok(member) => member,
        Err(Error::NotFound) => return render_message(StatusCode::NOT_FOUND, "User not found"),
        Err(error) => return internal_error(error, "Server error calculating monthly total"),
    };

    match sum_ledger_entries_for_member(&member.phone_number, &window, &connection) {
        Ok(total) => Json(MonthlyTotal { total }).into_response(),
        Err(error) => internal_error(error, "Server error calculating monthly total"),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GroupEnquiryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// A route handler that lists the ledger entries of every member in a ward or quarter.
///
/// The first path segment must be `ward` or `quarters`.
pub async fn group_enquiry_endpoint(
    State(state): State<LedgerState>,
    Path((group, value)): Path<(String, String)>,
    Query(query): Query<GroupEnquiryQuery>,
) -> Response {
    let group = match group.as_str() {
        "ward" => MemberGroup::Ward,
        "quarters" => MemberGroup::Quarters,
        _ => return render_message(StatusCode::BAD_REQUEST, "Invalid filter type"),
    };

    let window = match DateWindow::parse(query.from.as_deref(), query.to.as_deref()) {
        Ok(window) => window,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error during enquiry"),
    };

    match get_ledger_entries_for_group(group, &value, &window, &connection) {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => internal_error(error, "Server error during enquiry"),
    }
}
