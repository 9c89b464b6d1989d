use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState,
    date_window::iso_date,
    expense::core::{NewExpense, create_expense, get_recent_expenses},
    lenient,
    response::{internal_error, render_message, render_outcome},
};

/// The number of expenses returned by the expense listing.
const EXPENSE_LIST_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
pub struct ExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    #[serde(with = "iso_date")]
    pub docdate: Date,
    pub project: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(deserialize_with = "lenient::number")]
    pub amount: f64,
}

pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Json(request): Json<ExpenseRequest>,
) -> Response {
    if request.project.trim().is_empty() {
        return render_message(StatusCode::BAD_REQUEST, "Project is required");
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to save OCDA expense"),
    };

    let new_expense = NewExpense {
        document_date: request.docdate,
        project: request.project,
        remarks: request.remarks,
        amount: request.amount,
    };

    match create_expense(&new_expense, &connection) {
        Ok(_) => render_outcome(StatusCode::OK, true, "OCDA expense saved"),
        Err(error) => internal_error(error, "Failed to save OCDA expense"),
    }
}

/// A route handler for the most recent expenses, newest first.
pub async fn list_expenses_endpoint(State(state): State<ExpenseState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to fetch OCDA expenses"),
    };

    match get_recent_expenses(EXPENSE_LIST_LIMIT, &connection) {
        Ok(expenses) => Json(expenses).into_response(),
        Err(error) => internal_error(error, "Failed to fetch OCDA expenses"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use serde_json::json;

    use crate::test_utils::{get_test_connection, parse_json_body};

    use super::{ExpenseRequest, ExpenseState, create_expense_endpoint, list_expenses_endpoint};

    fn get_state() -> ExpenseState {
        ExpenseState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let state = get_state();
        let request: ExpenseRequest = serde_json::from_value(json!({
            "docdate": "2024-03-01",
            "project": "PRJ1",
            "remarks": "Sand",
            "amount": "450.75"
        }))
        .unwrap();

        let response = create_expense_endpoint(State(state.clone()), Json(request)).await;

        assert_eq!(
            parse_json_body(response).await,
            json!({"success": true, "message": "OCDA expense saved"})
        );
        let body = parse_json_body(list_expenses_endpoint(State(state)).await).await;
        assert_eq!(body[0]["docdate"], "2024-03-01");
        assert_eq!(body[0]["project"], "PRJ1");
        assert_eq!(body[0]["amount"], 450.75);
    }

    #[tokio::test]
    async fn project_is_required() {
        let request: ExpenseRequest = serde_json::from_value(json!({
            "docdate": "2024-03-01",
            "project": " ",
            "amount": 1
        }))
        .unwrap();

        let response = create_expense_endpoint(State(get_state()), Json(request)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
