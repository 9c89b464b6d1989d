//! Income analysis. Ledger entries are classified by their remark.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    analysis::{AnalysisQuery, AnalysisState},
    date_window::{DateWindow, iso_date},
    enquiry::Mode,
    query_filter::Filter,
    response::internal_error,
};

/// The income received under one remark. `code` and `description` are both the remark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeSummaryRow {
    pub code: String,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeDetailRow {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub remark: String,
    pub amount: f64,
}

/// `code` matches any remark that contains it.
fn income_filter(window: &DateWindow, code: Option<&str>) -> Filter {
    let mut filter = Filter::new();
    filter.push_window("transaction_date", window);
    if let Some(code) = code {
        filter.push("remark LIKE ?", format!("%{code}%"));
    }
    filter
}

pub fn summarize_income(
    window: &DateWindow,
    code: Option<&str>,
    connection: &Connection,
) -> Result<Vec<IncomeSummaryRow>, Error> {
    let filter = income_filter(window, code);

    connection
        .prepare(&format!(
            "SELECT remark, SUM(amount) FROM ledger_entry{} GROUP BY remark ORDER BY remark",
            filter.where_clause()
        ))?
        .query_map(params_from_iter(filter.values()), |row| {
            let remark: String = row.get(0)?;
            Ok(IncomeSummaryRow {
                code: remark.clone(),
                description: remark,
                amount: row.get(1)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

pub fn list_income_details(
    window: &DateWindow,
    code: Option<&str>,
    connection: &Connection,
) -> Result<Vec<IncomeDetailRow>, Error> {
    let filter = income_filter(window, code);

    connection
        .prepare(&format!(
            "SELECT transaction_date, remark, amount FROM ledger_entry{} \
            ORDER BY transaction_date, id",
            filter.where_clause()
        ))?
        .query_map(params_from_iter(filter.values()), |row| {
            Ok(IncomeDetailRow {
                date: row.get(0)?,
                remark: row.get(1)?,
                amount: row.get(2)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

pub async fn income_analysis_endpoint(
    State(state): State<AnalysisState>,
    Query(query): Query<AnalysisQuery>,
) -> Response {
    let window = match query.window() {
        Ok(window) => window,
        Err(error) => return internal_error(error, "Server error"),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    let result = match query.mode() {
        Mode::Summary => summarize_income(&window, query.code(), &connection)
            .map(|rows| Json(rows).into_response()),
        Mode::Detail => list_income_details(&window, query.code(), &connection)
            .map(|rows| Json(rows).into_response()),
    };

    result.unwrap_or_else(|error| internal_error(error, "Server error"))
}
