//! Member sign-up, log-in, log-out and password reset.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    AppState, Error,
    auth::{invalidate_session_cookie, set_session_cookie},
    date_window::iso_date_option,
    member::core::{
        Member, MemberId, MemberProfile, NewMember, create_member, get_member_by_id,
        get_member_by_phone, set_member_password,
    },
    password::PasswordHash,
    response::{internal_error, render_field_error, render_message},
    timezone::local_today,
};

/// The state needed for members to sign up and log in.
#[derive(Clone)]
pub struct MemberSessionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a member stays logged in.
    pub session_duration: Duration,
    pub password_cost: u32,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Lagos".
    pub local_timezone: String,
}

impl FromRef<AppState> for MemberSessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            password_cost: state.password_cost,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<MemberSessionState> for Key {
    fn from_ref(state: &MemberSessionState) -> Self {
        state.cookie_key.clone()
    }
}

/// The sign-up form as sent by the member portal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub phone_number: String,
    pub password: String,
    pub surname: String,
    pub other_names: String,
    #[serde(default)]
    pub phone_no2: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default, with = "iso_date_option")]
    pub dob: Option<Date>,
    #[serde(default)]
    pub quarters: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub hon_title: Option<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default, with = "iso_date_option")]
    pub exit_date: Option<Date>,
}

impl SignUpRequest {
    fn profile(&self) -> MemberProfile {
        MemberProfile {
            phone_number2: self.phone_no2.clone(),
            surname: self.surname.clone(),
            other_names: self.other_names.clone(),
            title: self.title.clone(),
            hon_title: self.hon_title.clone(),
            sex: self.sex.clone(),
            quarters: self.quarters.clone(),
            ward: self.ward.clone(),
            state: self.state.clone(),
            town: self.town.clone(),
            date_of_birth: self.dob,
            qualifications: self.qualifications.clone(),
            profession: self.profession.clone(),
            exit_date: self.exit_date,
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse<'a> {
    message: &'a str,
    id: MemberId,
    phone_number: &'a str,
}

/// A route handler that registers a member and logs them in.
pub async fn sign_up_endpoint(
    State(state): State<MemberSessionState>,
    jar: PrivateCookieJar,
    Json(request): Json<SignUpRequest>,
) -> Response {
    if request.phone_number.trim().is_empty() {
        return render_field_error("phoneNumber", "Phone number is required");
    }

    let password_hash = match PasswordHash::new(&request.password, state.password_cost) {
        Ok(password_hash) => password_hash,
        Err(Error::EmptyPassword) => {
            return render_field_error("password", "Password is required");
        }
        Err(error) => return internal_error(error, "Signup failed. Try again later."),
    };

    let created_at = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return internal_error(error, "Signup failed. Try again later."),
    };

    let new_member = NewMember {
        phone_number: request.phone_number.trim().to_owned(),
        profile: request.profile(),
        password_hash: Some(password_hash),
        created_at,
        created_by: None,
    };

    let member = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => return internal_error(error, "Signup failed. Try again later."),
        };

        match create_member(&new_member, &connection) {
            Ok(member) => member,
            Err(Error::DuplicatePhoneNumber) => {
                return render_field_error("phoneNumber", "Phone number already exists");
            }
            Err(error) => return internal_error(error, "Signup failed. Try again later."),
        }
    };

    start_session(jar, &member, state.session_duration, StatusCode::CREATED, "Signup successful!")
}

fn start_session(
    jar: PrivateCookieJar,
    member: &Member,
    duration: Duration,
    status: StatusCode,
    message: &str,
) -> Response {
    match set_session_cookie(jar, member.id, duration) {
        Ok(jar) => (
            status,
            jar,
            Json(SessionResponse {
                message,
                id: member.id,
                phone_number: &member.phone_number,
            }),
        )
            .into_response(),
        Err(error) => internal_error(error, "Could not start session"),
    }
}

#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    /// Either the member's numeric ID or their phone number.
    pub identifier: String,
    pub password: String,
}

/// How a log-in identifier refers to a member.
#[derive(Debug, PartialEq)]
enum Identifier<'a> {
    Id(MemberId),
    PhoneNumber(&'a str),
}

impl<'a> Identifier<'a> {
    /// Digit-only identifiers that fit in a 32-bit signed integer are IDs, everything else is a
    /// phone number.
    fn parse(identifier: &'a str) -> Self {
        let is_digits = !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit());

        match identifier.parse::<i32>() {
            Ok(id) if is_digits => Identifier::Id(MemberId::new(id.into())),
            _ => Identifier::PhoneNumber(identifier),
        }
    }

    fn field_name(&self) -> &'static str {
        match self {
            Identifier::Id(_) => "Id",
            Identifier::PhoneNumber(_) => "PhoneNumber",
        }
    }
}

/// A route handler for logging in members by ID or phone number.
pub async fn log_in_endpoint(
    State(state): State<MemberSessionState>,
    jar: PrivateCookieJar,
    Json(request): Json<LogInRequest>,
) -> Response {
    let identifier = Identifier::parse(request.identifier.trim());

    let member = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => return internal_error(error, "Login failed, server error"),
        };

        let result = match identifier {
            Identifier::Id(id) => get_member_by_id(id, &connection),
            Identifier::PhoneNumber(phone_number) => get_member_by_phone(phone_number, &connection),
        };

        match result {
            Ok(member) => member,
            Err(Error::NotFound) => {
                return render_field_error(
                    "identifier",
                    &format!("{} not found", identifier.field_name()),
                );
            }
            Err(error) => return internal_error(error, "Login failed, server error"),
        }
    };

    let is_password_correct = match &member.password_hash {
        Some(password_hash) => match password_hash.verify(&request.password) {
            Ok(is_correct) => is_correct,
            Err(error) => return internal_error(error, "Login failed, server error"),
        },
        None => false,
    };

    if !is_password_correct {
        return render_field_error("password", "Incorrect password");
    }

    start_session(jar, &member, state.session_duration, StatusCode::OK, "Login successful")
}

/// A route handler that ends the member's session.
pub async fn log_out_endpoint(jar: PrivateCookieJar) -> Response {
    (
        invalidate_session_cookie(jar),
        Json(crate::response::Message {
            message: "Logged out successfully",
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub new_password: String,
}

/// A route handler that sets a new password for the member with the given phone number.
pub async fn reset_password_endpoint(
    State(state): State<MemberSessionState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Response {
    if request.phone_number.is_empty() || request.new_password.is_empty() {
        return render_message(
            StatusCode::BAD_REQUEST,
            "Phone number and new password are required",
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

    match set_member_password(&request.phone_number, &password_hash, &connection) {
        Ok(()) => render_message(StatusCode::OK, "Password updated successfully"),
        Err(Error::NotFound) => render_message(StatusCode::NOT_FOUND, "User not found"),
        Err(error) => internal_error(error, "Internal server error"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        http::StatusCode,
        routing::post,
    };
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use serde_json::json;
    use sha2::{Digest, Sha512};

    use crate::{
        auth::{COOKIE_SESSION, DEFAULT_SESSION_DURATION},
        member::core::{MemberId, get_member_by_phone},
        test_utils::get_test_connection,
    };

    use super::{
        Identifier, MemberSessionState, log_in_endpoint, log_out_endpoint,
        reset_password_endpoint, sign_up_endpoint,
    };

    fn get_state() -> MemberSessionState {
        MemberSessionState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            cookie_key: Key::from(&Sha512::digest("nafstenoas")),
            session_duration: DEFAULT_SESSION_DURATION,
            password_cost: 4,
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn get_test_server(state: MemberSessionState) -> TestServer {
        let app = Router::new()
            .route("/signup", post(sign_up_endpoint))
            .route("/login", post(log_in_endpoint))
            .route("/logout", post(log_out_endpoint))
            .route("/api/reset-password", post(reset_password_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn sign_up_body(phone_number: &str) -> serde_json::Value {
        json!({
            "phoneNumber": phone_number,
            "password": "hunter2",
            "surname": "Okafor",
            "otherNames": "Chidi",
            "ward": "A",
            "quarters": "Q1",
            "dob": "1990-02-03",
            "exitDate": ""
        })
    }

    #[test]
    fn short_digit_identifiers_are_ids() {
        assert_eq!(Identifier::parse("42"), Identifier::Id(MemberId::new(42)));
        assert_eq!(
            Identifier::parse("2147483647"),
            Identifier::Id(MemberId::new(2147483647))
        );
    }

    #[test]
    fn long_or_non_digit_identifiers_are_phone_numbers() {
        assert_eq!(
            Identifier::parse("08031234567"),
            Identifier::PhoneNumber("08031234567")
        );
        assert_eq!(
            Identifier::parse("+2348031234567"),
            Identifier::PhoneNumber("+2348031234567")
        );
    }

    #[test]
    fn short_digit_only_phone_numbers_are_read_as_ids() {
        assert_eq!(Identifier::parse("0801"), Identifier::Id(MemberId::new(801)));
    }

    #[tokio::test]
    async fn sign_up_creates_member_and_session() {
        let state = get_state();
        let server = get_test_server(state.clone());

        let response = server.post("/signup").json(&sign_up_body("08031234567")).await;

        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Signup successful!");
        assert_eq!(body["phoneNumber"], "08031234567");
        assert_eq!(response.cookie(COOKIE_SESSION).name(), COOKIE_SESSION);
        let connection = state.db_connection.lock().unwrap();
        let member = get_member_by_phone("08031234567", &connection).unwrap();
        assert_eq!(member.created_by, None);
    }

    #[tokio::test]
    async fn sign_up_with_taken_phone_points_at_field() {
        let server = get_test_server(get_state());
        server.post("/signup").json(&sign_up_body("0801")).await;

        let response = server.post("/signup").json(&sign_up_body("0801")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "field": "phoneNumber",
            "message": "Phone number already exists"
        }));
    }

    #[tokio::test]
    async fn log_in_with_phone_number() {
        let server = get_test_server(get_state());
        server.post("/signup").json(&sign_up_body("08031234567")).await;

        let response = server
            .post("/login")
            .json(&json!({"identifier": "08031234567", "password": "hunter2"}))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["message"], "Login successful");
    }

    #[tokio::test]
    async fn log_in_with_member_id() {
        let server = get_test_server(get_state());
        let sign_up = server.post("/signup").json(&sign_up_body("08031234567")).await;
        let id = sign_up.json::<serde_json::Value>()["id"].to_string();

        let response = server
            .post("/login")
            .json(&json!({"identifier": id, "password": "hunter2"}))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn log_in_with_wrong_password() {
        let server = get_test_server(get_state());
        server.post("/signup").json(&sign_up_body("08031234567")).await;

        let response = server
            .post("/login")
            .json(&json!({"identifier": "08031234567", "password": "wrong"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"field": "password", "message": "Incorrect password"}));
    }

    #[tokio::test]
    async fn log_in_with_unknown_phone() {
        let server = get_test_server(get_state());

        let response = server
            .post("/login")
            .json(&json!({"identifier": "0801x", "password": "hunter2"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "field": "identifier",
            "message": "PhoneNumber not found"
        }));
    }

    #[tokio::test]
    async fn log_out_clears_cookie() {
        let server = get_test_server(get_state());

        let response = server.post("/logout").await;

        response.assert_status_ok();
        assert_eq!(
            response.cookie(COOKIE_SESSION).max_age(),
            Some(time::Duration::ZERO)
        );
    }

    #[tokio::test]
    async fn reset_password_then_log_in() {
        let server = get_test_server(get_state());
        server.post("/signup").json(&sign_up_body("08031234567")).await;

        server
            .post("/api/reset-password")
            .json(&json!({"phoneNumber": "08031234567", "newPassword": "n3w"}))
            .await
            .assert_status_ok();

        server
            .post("/login")
            .json(&json!({"identifier": "08031234567", "password": "n3w"}))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn reset_password_for_unknown_member() {
        let server = get_test_server(get_state());

        let response = server
            .post("/api/reset-password")
            .json(&json!({"phoneNumber": "0801", "newPassword": "n3w"}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_password_requires_both_fields() {
        let server = get_test_server(get_state());

        let response = server
            .post("/api/reset-password")
            .json(&json!({"phoneNumber": "0801"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
