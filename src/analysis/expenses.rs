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

/// The total spent on one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseSummaryRow {
    pub code: String,
    /// `None` when the project is not a standard expense code.
    pub description: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseDetailRow {
    pub code: String,
    pub description: Option<String>,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub remark: String,
    pub amount: f64,
}

fn expense_filter(window: &DateWindow, code: Option<&str>) -> Filter {
    let mut filter = Filter::new();
    filter.push_window("e.document_date", window);
    if let Some(code) = code {
        filter.push("e.project = ?", code.to_owned());
    }
    filter
}

pub fn summarize_expenses(
    window: &DateWindow,
    code: Option<&str>,
    connection: &Connection,
) -> Result<Vec<ExpenseSummaryRow>, Error> {
    let filter = expense_filter(window, code);

    connection
        .prepare(&format!(
            "SELECT e.project, s.description, SUM(e.amount) \
            FROM expense e LEFT JOIN std_expense s ON e.project = s.code{} \
            GROUP BY e.project, s.description ORDER BY e.project",
            filter.where_clause()
        ))?
        .query_map(params_from_iter(filter.values()), |row| {
            Ok(ExpenseSummaryRow {
                code: row.get(0)?,
                description: row.get(1)?,
                amount: row.get(2)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

pub fn list_expense_details(
    window: &DateWindow,
    code: Option<&str>,
    connection: &Connection,
) -> Result<Vec<ExpenseDetailRow>, Error> {
    let filter = expense_filter(window, code);

    connection
        .prepare(&format!(
            "SELECT e.project, s.description, e.document_date, e.remarks, e.amount \
            FROM expense e LEFT JOIN std_expense s ON e.project = s.code{} \
            ORDER BY e.project, e.document_date, e.id",
            filter.where_clause()
        ))?
        .query_map(params_from_iter(filter.values()), |row| {
            Ok(ExpenseDetailRow {
                code: row.get(0)?,
                description: row.get(1)?,
                date: row.get(2)?,
                remark: row.get(3)?,
                amount: row.get(4)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// A route handler for `GET /admin/ocda-expenses-analysis?start=&end=&code=&mode=`.
pub async fn expenses_analysis_endpoint(
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
        Mode::Summary => summarize_expenses(&window, query.code(), &connection)
            .map(|rows| Json(rows).into_response()),
        Mode::Detail => list_expense_details(&window, query.code(), &connection)
            .map(|rows| Json(rows).into_response()),
    };

    result.unwrap_or_else(|error| internal_error(error, "Server error"))
}
