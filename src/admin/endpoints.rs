//! Route handlers for admin accounts: bootstrap creation, log-in and account management.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    admin::core::{
        AdminId, AdminUpdate, DEFAULT_ROLE, NewAdmin, count_admins, create_admin, delete_admin,
        get_admin_by_email, list_admins, set_admin_active, set_admin_password, update_admin,
    },
    auth::{JwtKeys, TokenRejection, authenticate_admin, encode_token},
    password::PasswordHash,
    response::{internal_error, render_message},
};

/// The state needed for the admin account endpoints.
#[derive(Debug, Clone)]
pub struct AdminState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub jwt_keys: JwtKeys,
    pub password_cost: u32,
}

impl FromRef<AppState> for AdminState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            jwt_keys: state.jwt_keys.clone(),
            password_cost: state.password_cost,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A route handler for creating admins.
///
/// The very first admin can be created without a token. Once an admin exists,
/// the request must carry a valid bearer token.
pub async fn create_admin_endpoint(
    State(state): State<AdminState>,
    headers: HeaderMap,
    Json(request): Json<CreateAdminRequest>,
) -> Response {
    let admin_count = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => return internal_error(error, "Server error"),
        };

        match count_admins(&connection) {
            Ok(count) => count,
            Err(error) => return internal_error(error, "Server error"),
        }
    };

    if admin_count > 0 {
        match authenticate_admin(&headers, &state.jwt_keys) {
            Ok(_) => {}
            Err(TokenRejection::Missing) => {
                return render_message(StatusCode::FORBIDDEN, "No token provided");
            }
            Err(TokenRejection::Invalid) => {
                return render_message(StatusCode::UNAUTHORIZED, "Invalid token");
            }
        }
    }

    let password_hash = match PasswordHash::new(&request.password, state.password_cost) {
        Ok(password_hash) => password_hash,
        Err(Error::EmptyPassword) => {
            return render_message(StatusCode::BAD_REQUEST, "Password is required");
        }
        Err(error) => return internal_error(error, "Server error"),
    };

    let new_admin = NewAdmin {
        fullname: request.fullname,
        email: request.email,
        password_hash,
        role: request
            .role
            .filter(|role| !role.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_owned()),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    match create_admin(&new_admin, &connection) {
        Ok(admin) => {
            tracing::info!("Created admin {} with role {}", admin.email, admin.role);
            render_message(StatusCode::CREATED, "Admin created successfully")
        }
        Err(Error::DuplicateAdminEmail) => {
            render_message(StatusCode::CONFLICT, "Admin already exists")
        }
        Err(error) => internal_error(error, "Server error"),
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminLogInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AdminSummary<'a> {
    id: AdminId,
    fullname: &'a str,
    role: &'a str,
}

#[derive(Debug, Serialize)]
struct AdminLogInResponse<'a> {
    message: &'a str,
    token: String,
    admin: AdminSummary<'a>,
}

/// A route handler that exchanges an admin's email and password for a bearer token.
pub async fn admin_log_in_endpoint(
    State(state): State<AdminState>,
    Json(request): Json<AdminLogInRequest>,
) -> Response {
    let admin = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => return internal_error(error, "Server error"),
        };

        match get_admin_by_email(&request.email, &connection) {
            Ok(admin) => admin,
            Err(Error::NotFound) => {
                return render_message(StatusCode::UNAUTHORIZED, "Invalid credentials");
            }
            Err(error) => return internal_error(error, "Server error"),
        }
    };

    match admin.password_hash.verify(&request.password) {
        Ok(true) => {}
        Ok(false) => return render_message(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(error) => return internal_error(error, "Server error"),
    }

    if !admin.active {
        return render_message(
            StatusCode::FORBIDDEN,
            "Account is deactivated. Please contact a superadmin.",
        );
    }

    let token = match encode_token(admin.id, &state.jwt_keys) {
        Ok(token) => token,
        Err(error) => return internal_error(error, "Server error"),
    };

    Json(AdminLogInResponse {
        message: "Login successful",
        token,
        admin: AdminSummary {
            id: admin.id,
            fullname: &admin.fullname,
            role: &admin.role,
        },
    })
    .into_response()
}

/// Browsers that navigate to the log-in URL get a hint instead of a blank 405.
pub async fn admin_log_in_get_endpoint() -> Response {
    render_message(StatusCode::METHOD_NOT_ALLOWED, "Use POST to log in.")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetAdminPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn reset_admin_password_endpoint(
    State(state): State<AdminState>,
    Json(request): Json<ResetAdminPasswordRequest>,
) -> Response {
    if request.email.is_empty() || request.new_password.is_empty() {
        return render_message(
            StatusCode::BAD_REQUEST,
            "Email and new password are required",
        );
    }

    let password_hash = match PasswordHash::new(&request.new_password, state.password_cost) {
        Ok(password_hash) => password_hash,
        Err(error) => return internal_error(error, "Internal server error"),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Internal server error"),
    };

    match set_admin_password(&request.email, &password_hash, &connection) {
        Ok(()) => render_message(StatusCode::OK, "Password updated successfully"),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "User not found"),
        Err(error) => internal_error(error, "Internal server error"),
    }
}

pub async fn list_admins_endpoint(State(state): State<AdminState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to fetch admins"),
    };

    match list_admins(&connection) {
        Ok(admins) => Json(admins).into_response(),
        Err(error) => internal_error(error, "Failed to fetch admins"),
    }
}

pub async fn update_admin_endpoint(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
    Json(update): Json<AdminUpdate>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to update admin"),
    };

    match update_admin(AdminId::new(id), &update, &connection) {
        Ok(()) => render_message(StatusCode::OK, "Admin updated successfully"),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "Admin not found"),
        Err(Error::DuplicateAdminEmail) => {
            render_message(StatusCode::CONFLICT, "Admin already exists")
        }
        Err(error) => internal_error(error, "Failed to update admin"),
    }
}

async fn set_active(state: AdminState, id: i64, active: bool) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    match set_admin_active(AdminId::new(id), active, &connection) {
        Ok(()) if active => render_message(StatusCode::OK, "Admin activated"),
        Ok(()) => render_message(StatusCode::OK, "Admin deactivated"),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "Admin not found"),
        Err(error) => internal_error(error, "Server error"),
    }
}

pub async fn activate_admin_endpoint(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Response {
    set_active(state, id, true).await
}

pub async fn deactivate_admin_endpoint(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Response {
    set_active(state, id, false).await
}

pub async fn delete_admin_endpoint(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    match delete_admin(AdminId::new(id), &connection) {
        Ok(()) => render_message(StatusCode::OK, "Admin deleted"),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "Admin not found"),
        Err(error) => internal_error(error, "Server error"),
    }
}
