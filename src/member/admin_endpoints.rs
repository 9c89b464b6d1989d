//! Admin endpoints for creating, reading, updating and deleting members.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    admin::AdminId,
    member::core::{
        MemberPatch, MemberProfile, NewMember, change_phone_number, create_member,
        delete_member, get_member_by_phone, list_members, update_member,
    },
    password::PasswordHash,
    response::{internal_error, render_message},
    timezone::local_today,
};

/// The state needed to manage members.
#[derive(Debug, Clone)]
pub struct MemberAdminState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when an admin sets a member's password.
    pub password_cost: u32,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Lagos".
    pub local_timezone: String,
}

impl FromRef<AppState> for MemberAdminState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: state.password_cost,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for creating a member.
#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    #[serde(flatten)]
    pub profile: MemberProfile,
    #[serde(rename = "Password", default)]
    pub password: Option<String>,
}

fn hash_optional_password(
    password: Option<&str>,
    cost: u32,
) -> Result<Option<PasswordHash>, Error> {
    match password {
        None | Some("") => Ok(None),
        Some(password) => PasswordHash::new(password, cost).map(Some),
    }
}

/// A route handler for creating a member on behalf of the authenticated admin.
pub async fn create_member_endpoint(
    State(state): State<MemberAdminState>,
    Extension(admin_id): Extension<AdminId>,
    Json(request): Json<CreateMemberRequest>,
) -> Response {
    if request.phone_number.trim().is_empty() {
        return render_message(StatusCode::BAD_REQUEST, "PhoneNumber is required");
    }

    let password = request.password.as_deref();
    let password_hash = match hash_optional_password(password, state.password_cost) {
        Ok(password_hash) => password_hash,
        Err(error) => return internal_error(error, "Server error"),
    };

    let created_at = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return internal_error(error, "Server error"),
    };

    let new_member = NewMember {
        phone_number: request.phone_number.trim().to_owned(),
        profile: request.profile,
        password_hash,
        created_at,
        created_by: Some(admin_id),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    match create_member(&new_member, &connection) {
        Ok(member) => {
            tracing::info!("Admin {admin_id} created member {}", member.phone_number);
            render_message(StatusCode::CREATED, "Member created successfully")
        }
        Err(Error::DuplicatePhoneNumber) => render_message(
            StatusCode::CONFLICT,
            "Phone number already in use by another member",
        ),
        Err(error) => internal_error(error, "Server error"),
    }
}

pub async fn list_members_endpoint(State(state): State<MemberAdminState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to fetch members"),
    };

    match list_members(&connection) {
        Ok(members) => Json(members).into_response(),
        Err(error) => internal_error(error, "Failed to fetch members"),
    }
}

pub async fn get_member_endpoint(
    State(state): State<MemberAdminState>,
    Path(phone_number): Path<String>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Error fetching member"),
    };

    match get_member_by_phone(&phone_number, &connection) {
        Ok(member) => Json(member).into_response(),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "Member not found"),
        Err(error) => internal_error(error, "Error fetching member"),
    }
}

/// A route handler that merges the request body into an existing member.
pub async fn update_member_endpoint(
    State(state): State<MemberAdminState>,
    Path(phone_number): Path<String>,
    Json(patch): Json<MemberPatch>,
) -> Response {
    let password_hash = match hash_optional_password(patch.password.as_deref(), state.password_cost)
    {
        Ok(password_hash) => password_hash,
        Err(error) => return internal_error(error, "Failed to update member"),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to update member"),
    };

    match update_member(&phone_number, &patch, password_hash, &connection) {
        Ok(_) => render_message(StatusCode::OK, "Member updated successfully"),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "Member not found"),
        Err(Error::DuplicatePhoneNumber) => render_message(
            StatusCode::CONFLICT,
            "Phone number already in use by another member",
        ),
        Err(error) => internal_error(error, "Failed to update member"),
    }
}

pub async fn delete_member_endpoint(
    State(state): State<MemberAdminState>,
    Path(phone_number): Path<String>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    match delete_member(&phone_number, &connection) {
        Ok(()) => render_message(StatusCode::OK, "Member deleted successfully"),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "Member not found"),
        Err(error) => internal_error(error, "Server error"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePhoneRequest {
    #[serde(default)]
    pub old_phone: String,
    #[serde(default)]
    pub new_phone: String,
}

/// A route handler that moves a member and their ledger entries to a new phone number.
pub async fn change_phone_endpoint(
    State(state): State<MemberAdminState>,
    Json(request): Json<ChangePhoneRequest>,
) -> Response {
    if request.old_phone.is_empty() || request.new_phone.is_empty() {
        return render_message(
            StatusCode::BAD_REQUEST,
            "Both old and new phone numbers are required.",
        );
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error."),
    };

    match change_phone_number(&request.old_phone, &request.new_phone, &connection) {
        Ok(()) => render_message(
            StatusCode::OK,
            "Phone number updated successfully in all records.",
        ),
        Err(Error::NotFound) => {
            render_message(StatusCode::NOT_FOUND, "Old phone number not found.")
        }
        Err(Error::DuplicatePhoneNumber) => {
            render_message(StatusCode::CONFLICT, "New phone number already exists.")
        }
        Err(error) => internal_error(error, "Failed to update phone numbers."),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use serde_json::json;
    use time::macros::date;

    use crate::{
        admin::AdminId,
        ledger::get_ledger_entries_for_member,
        member::core::{MemberPatch, get_member_by_phone},
        test_utils::{get_test_connection, insert_ledger_entry, insert_member, parse_json_body},
    };

    use super::{
        ChangePhoneRequest, CreateMemberRequest, MemberAdminState, change_phone_endpoint,
        create_member_endpoint, delete_member_endpoint, get_member_endpoint,
        update_member_endpoint,
    };

    fn get_state() -> MemberAdminState {
        MemberAdminState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            password_cost: 4,
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn create_request(phone_number: &str) -> CreateMemberRequest {
        serde_json::from_value(json!({
            "PhoneNumber": phone_number,
            "Surname": "Okafor",
            "othernames": "Chidi",
            "Ward": "A",
            "Quarters": "Q1",
            "DOB": "1980-05-17",
            "exitdate": "",
            "Password": "hunter2"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_member_records_admin() {
        let state = get_state();

        let response = create_member_endpoint(
            State(state.clone()),
            Extension(AdminId::new(3)),
            Json(create_request("0801")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let connection = state.db_connection.lock().unwrap();
        let member = get_member_by_phone("0801", &connection).unwrap();
        assert_eq!(member.created_by, Some(AdminId::new(3)));
        assert_eq!(member.profile.date_of_birth, Some(date!(1980 - 05 - 17)));
        assert_eq!(member.profile.exit_date, None);
        assert!(member.password_hash.unwrap().verify("hunter2").unwrap());
    }

    #[tokio::test]
    async fn create_duplicate_member_conflicts() {
        let state = get_state();
        insert_member(&state.db_connection.lock().unwrap(), "0801", "Bello", "B", "Q2");

        let response = create_member_endpoint(
            State(state),
            Extension(AdminId::new(3)),
            Json(create_request("0801")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn get_unknown_member_is_404() {
        let response = get_member_endpoint(State(get_state()), Path("0000".to_owned())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            parse_json_body(response).await,
            json!({"message": "Member not found"})
        );
    }

    #[tokio::test]
    async fn get_member_uses_frontend_keys() {
        let state = get_state();
        insert_member(&state.db_connection.lock().unwrap(), "0801", "Okafor", "A", "Q1");

        let response = get_member_endpoint(State(state), Path("0801".to_owned())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body["PhoneNumber"], "0801");
        assert_eq!(body["Surname"], "Okafor");
        assert_eq!(body["Ward"], "A");
        assert_eq!(body["Quarters"], "Q1");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn update_with_taken_phone_conflicts() {
        let state = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            insert_member(&connection, "0801", "Okafor", "A", "Q1");
            insert_member(&connection, "0802", "Bello", "B", "Q1");
        }
        let patch: MemberPatch = serde_json::from_value(json!({"PhoneNumber": "0802"})).unwrap();

        let response =
            update_member_endpoint(State(state), Path("0801".to_owned()), Json(patch)).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn delete_missing_member_is_404() {
        let response = delete_member_endpoint(State(get_state()), Path("0801".to_owned())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn change_phone_requires_both_numbers() {
        let request = ChangePhoneRequest {
            old_phone: "0801".to_owned(),
            new_phone: String::new(),
        };

        let response = change_phone_endpoint(State(get_state()), Json(request)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn change_phone_moves_ledger() {
        let state = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            insert_member(&connection, "0801", "Okafor", "A", "Q1");
            insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 10), 100.0);
        }
        let request = ChangePhoneRequest {
            old_phone: "0801".to_owned(),
            new_phone: "0900".to_owned(),
        };

        let response = change_phone_endpoint(State(state.clone()), Json(request)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_ledger_entries_for_member("0900", &connection).unwrap().len(), 1);
    }
}
