use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState,
    enquiry::{
        params::{EnquiryQuery, normalize},
        registry::EnquiryRegistry,
        rows::EnquiryResult,
    },
    response::internal_error,
};

/// The state needed to run enquiries.
#[derive(Debug, Clone)]
pub struct EnquiryState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub registry: Arc<EnquiryRegistry>,
}

impl FromRef<AppState> for EnquiryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            registry: state.enquiry_registry.clone(),
        }
    }
}

const ENQUIRY_FAILED: &str = "Failed to process enquiry";

/// A route handler for `GET /admin/enquiry?type=&param=&mode=&start=&end=`.
///
/// An unknown `type` gives an empty result. Any other failure, including a
/// malformed date, aborts the whole enquiry.
pub async fn enquiry_endpoint(
    State(state): State<EnquiryState>,
    Query(query): Query<EnquiryQuery>,
) -> Response {
    let params = match normalize(&query) {
        Ok(Some(params)) => params,
        Ok(None) => return Json(EnquiryResult::default()).into_response(),
        Err(error) => return internal_error(error, ENQUIRY_FAILED),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, ENQUIRY_FAILED),
    };

    tracing::debug!("running enquiry {params:?}");

    match state.registry.resolve(&params, &connection) {
        Ok(result) => Json(result).into_response(),
        Err(error) => internal_error(error, ENQUIRY_FAILED),
    }
}
