//! The admin dashboard: a snapshot of the main tables.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    expense::{Expense, get_first_expenses},
    ledger::{LedgerEntry, get_first_ledger_entries},
    lookup::{LookupRow, STD_EXPENSES, list_lookup_rows},
    monthly_summary::{MonthlySummary, get_first_monthly_summaries},
    response::internal_error,
};

/// The most rows returned from any one table.
const DASHBOARD_ROW_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub ledger: Vec<LedgerEntry>,
    pub summary: Vec<MonthlySummary>,
    pub expenses: Vec<Expense>,
    pub std: Vec<LookupRow>,
}

pub fn get_dashboard(connection: &Connection) -> Result<Dashboard, Error> {
    let mut std = list_lookup_rows(&STD_EXPENSES, connection)?;
    std.truncate(DASHBOARD_ROW_LIMIT as usize);

    Ok(Dashboard {
        ledger: get_first_ledger_entries(DASHBOARD_ROW_LIMIT, connection)?,
        summary: get_first_monthly_summaries(DASHBOARD_ROW_LIMIT, connection)?,
        expenses: get_first_expenses(DASHBOARD_ROW_LIMIT, connection)?,
        std,
    })
}

pub async fn dashboard_endpoint(State(state): State<DashboardState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    match get_dashboard(&connection) {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(error) => internal_error(error, "Server error"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use time::macros::date;

    use crate::test_utils::{
        get_test_connection, insert_expense, insert_ledger_entry, parse_json_body,
    };

    use super::{DashboardState, dashboard_endpoint};

    #[tokio::test]
    async fn returns_every_section() {
        let connection = get_test_connection();
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 10), 100.0);
        insert_expense(&connection, date!(2024 - 01 - 12), "PRJ1", 40.0);
        connection
            .execute(
                "INSERT INTO std_expense (code, description) VALUES ('PRJ1', 'Water')",
                (),
            )
            .unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let body = parse_json_body(dashboard_endpoint(State(state)).await).await;

        assert_eq!(body["ledger"][0]["phoneno"], "0801");
        assert_eq!(body["ledger"][0]["amount"], 100.0);
        assert_eq!(body["summary"], serde_json::json!([]));
        assert_eq!(body["expenses"][0]["project"], "PRJ1");
        assert_eq!(
            body["std"],
            serde_json::json!([{"expscode": "PRJ1", "expsdesc": "Water"}])
        );
    }
}
