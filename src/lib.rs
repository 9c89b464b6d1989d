//! OCDA membership and ledger backend.
//!
//! This library provides a JSON REST API for managing the members of a
//! community organisation, the dues recorded against them in the ledger,
//! the organisation's expenses, and the financial enquiries that admins run
//! over all of it.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod admin;
mod analysis;
mod app_state;
mod auth;
mod dashboard;
mod date_window;
mod db;
mod endpoints;
mod enquiry;
mod expense;
mod ledger;
mod lenient;
mod logging;
mod lookup;
mod member;
mod monthly_summary;
mod notice;
mod password;
mod query_filter;
mod response;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;

pub use admin::{AdminId, NewAdmin, create_admin, get_admin_by_email, set_admin_password};
pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use expense::{NewExpense, create_expense};
pub use ledger::{NewLedgerEntry, create_ledger_entry};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use member::{MemberProfile, NewMember, create_member};
pub use password::PasswordHash;
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::response::render_message;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email/identifier and password combination did not match a known account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An empty string was given where a password is required.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A JSON web token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The member session cookie is missing, cannot be read, or has expired.
    #[error("no valid member session")]
    NoSession,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., phone number or ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The phone number is already used by another member.
    #[error("the phone number is already in use")]
    DuplicatePhoneNumber,

    /// An admin with the same email address already exists.
    #[error("an admin with this email already exists")]
    DuplicateAdminEmail,

    /// A monthly summary already exists for the period.
    #[error("a summary for {0} already exists")]
    DuplicateSummary(String),

    /// A monthly summary was requested for the current or a future month.
    #[error("the period {0} has not finished yet")]
    OpenPeriod(String),

    /// The year and month do not describe a valid calendar month.
    #[error("invalid period: year {0}, month {1}")]
    InvalidPeriod(String, String),

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date \"{0}\"")]
    InvalidDate(String),

    /// The lookup table name is not in the registry, or the table cannot be written to.
    #[error("invalid lookup table \"{0}\"")]
    InvalidLookupTable(String),

    /// A lookup code already exists in its table.
    #[error("the code \"{0}\" already exists")]
    DuplicateLookupValue(String),

    /// A required query parameter or request field was missing.
    #[error("missing value for \"{0}\"")]
    MissingValue(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("member.phone_number") =>
            {
                Error::DuplicatePhoneNumber
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("admin.email") =>
            {
                Error::DuplicateAdminEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => render_message(StatusCode::NOT_FOUND, "Not found"),
            Error::NoSession => render_message(StatusCode::UNAUTHORIZED, "Not logged in"),
            Error::InvalidDate(date) => {
                render_message(StatusCode::BAD_REQUEST, &format!("Invalid date \"{date}\""))
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_message(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}
