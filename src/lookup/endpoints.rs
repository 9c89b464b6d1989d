//! Route handlers for the lookup tables.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error,
    lookup::core::{
        LookupRegistry, LookupRow, LookupTable, STD_EXPENSES, delete_lookup_rows,
        insert_lookup_row, list_lookup_rows, update_lookup_rows,
    },
    response::{internal_error, render_message},
};

/// The state needed for the lookup table endpoints.
#[derive(Debug, Clone)]
pub struct LookupState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub registry: Arc<LookupRegistry>,
}

impl FromRef<AppState> for LookupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            registry: state.lookup_registry.clone(),
        }
    }
}

type Selector = HashMap<String, String>;

fn success() -> Response {
    Json(json!({"success": true})).into_response()
}

fn render_lookup_error(error: Error, table: &LookupTable, action: &str) -> Response {
    match error {
        Error::MissingValue(key) => {
            render_message(StatusCode::BAD_REQUEST, &format!("Missing value for {key}"))
        }
        Error::DuplicateLookupValue(value) => {
            render_message(StatusCode::CONFLICT, &format!("{value} already exists"))
        }
        Error::NotFound => render_message(StatusCode::NOT_FOUND, "No matching row"),
        error => internal_error(error, &format!("Failed to {action} {}", table.name)),
    }
}

async fn list_rows(state: LookupState, table: &LookupTable) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, &format!("Failed to fetch {}", table.name)),
    };

    match list_lookup_rows(table, &connection) {
        Ok(rows) => Json(rows).into_response(),
        Err(error) => render_lookup_error(error, table, "fetch"),
    }
}

async fn insert_row(state: LookupState, table: &LookupTable, row: LookupRow) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Insert failed"),
    };

    match insert_lookup_row(table, &row, &connection) {
        Ok(()) => success(),
        Err(error) => render_lookup_error(error, table, "insert into"),
    }
}

async fn update_rows(
    state: LookupState,
    table: &LookupTable,
    selector: Selector,
    row: LookupRow,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Update failed"),
    };

    match update_lookup_rows(table, &selector, &row, &connection) {
        Ok(_) => success(),
        Err(error) => render_lookup_error(error, table, "update"),
    }
}

async fn delete_rows(state: LookupState, table: &LookupTable, selector: Selector) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Delete failed"),
    };

    match delete_lookup_rows(table, &selector, &connection) {
        Ok(_) => success(),
        Err(error) => render_lookup_error(error, table, "delete from"),
    }
}

fn invalid_type() -> Response {
    render_message(StatusCode::BAD_REQUEST, "Invalid type")
}

/// A route handler that lists the rows of the static table named in the path.
pub async fn list_static_endpoint(
    State(state): State<LookupState>,
    Path(name): Path<String>,
) -> Response {
    match state.registry.get(&name).copied() {
        Some(table) => list_rows(state, &table).await,
        None => invalid_type(),
    }
}

pub async fn insert_static_endpoint(
    State(state): State<LookupState>,
    Path(name): Path<String>,
    Json(row): Json<LookupRow>,
) -> Response {
    match state.registry.get_writable(&name).copied() {
        Some(table) => insert_row(state, &table, row).await,
        None => invalid_type(),
    }
}

/// A route handler that edits the rows selected by the query string, e.g.
/// `PUT /admin/static/wards?ward=A&Quarter=Q1`.
pub async fn update_static_endpoint(
    State(state): State<LookupState>,
    Path(name): Path<String>,
    Query(selector): Query<Selector>,
    Json(row): Json<LookupRow>,
) -> Response {
    match state.registry.get_writable(&name).copied() {
        Some(table) => update_rows(state, &table, selector, row).await,
        None => invalid_type(),
    }
}

pub async fn delete_static_endpoint(
    State(state): State<LookupState>,
    Path(name): Path<String>,
    Query(selector): Query<Selector>,
) -> Response {
    match state.registry.get_writable(&name).copied() {
        Some(table) => delete_rows(state, &table, selector).await,
        None => invalid_type(),
    }
}

/// The GET, POST, PUT and DELETE handlers for a code table such as the standard expenses.
///
/// PUT and DELETE select rows by the code given in the query string, e.g. `?expscode=PRJ1`.
pub fn code_table_routes(table: &'static LookupTable) -> MethodRouter<AppState> {
    get(move |State(state): State<LookupState>| list_rows(state, table))
        .post(
            move |State(state): State<LookupState>, Json(row): Json<LookupRow>| {
                insert_row(state, table, row)
            },
        )
        .put(
            move |State(state): State<LookupState>,
                  Query(selector): Query<Selector>,
                  Json(row): Json<LookupRow>| update_rows(state, table, selector, row),
        )
        .delete(
            move |State(state): State<LookupState>, Query(selector): Query<Selector>| {
                delete_rows(state, table, selector)
            },
        )
}

/// Standard expense codes ordered by description, for project drop-downs.
const PROJECT_LIST: LookupTable = LookupTable {
    order_by: "description, code",
    ..STD_EXPENSES
};

pub async fn project_list_endpoint(State(state): State<LookupState>) -> Response {
    list_rows(state, &PROJECT_LIST).await
}
