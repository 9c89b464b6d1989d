//! The logged-in member's view and edit of their own profile.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    date_window::{iso_date_option, parse_date},
    member::core::{MemberId, MemberPatch, age_in_years, get_member_by_id, update_member},
    response::{internal_error, render_message, render_outcome},
    timezone::local_today,
};

/// The state needed for the profile endpoints.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Lagos".
    pub local_timezone: String,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    othernames: String,
    surname: String,
    phone_number: String,
    phone_no2: Option<String>,
    email: Option<String>,
    town: Option<String>,
    state: Option<String>,
    ward: Option<String>,
    quarters: Option<String>,
    age: Option<i32>,
    title: Option<String>,
    hon_title: Option<String>,
    #[serde(with = "iso_date_option")]
    exit_date: Option<Date>,
    qualifications: Option<String>,
}

/// A route handler for the logged-in member's profile.
pub async fn get_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(member_id): Extension<MemberId>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return internal_error(error, "Server error while loading profile"),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error while loading profile"),
    };

    let member = match get_member_by_id(member_id, &connection) {
        Ok(member) => member,
        Err(Error::NotFound) => return render_message(StatusCode::NOT_FOUND, "User not found"),
        Err(error) => return internal_error(error, "Server error while loading profile"),
    };

    let profile = member.profile;
    Json(Profile {
        othernames: profile.other_names,
        surname: profile.surname,
        phone_number: member.phone_number,
        phone_no2: profile.phone_number2,
        email: profile.email,
        town: profile.town,
        state: profile.state,
        ward: profile.ward,
        quarters: profile.quarters,
        age: profile
            .date_of_birth
            .map(|date_of_birth| age_in_years(date_of_birth, today)),
        title: profile.title,
        hon_title: profile.hon_title,
        exit_date: profile.exit_date,
        qualifications: profile.qualifications,
    })
    .into_response()
}

/// The fields a member may change about themselves. Empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "phoneNo2", default)]
    pub phone_no2: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "honTitle", default)]
    pub hon_title: Option<String>,
    #[serde(rename = "Quarters", default)]
    pub quarters: Option<String>,
    #[serde(rename = "Ward", default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(rename = "exitDate", default)]
    pub exit_date: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl ProfileUpdateRequest {
    fn into_patch(self) -> Result<MemberPatch, Error> {
        let exit_date = match non_empty(self.exit_date) {
            Some(text) => Some(Some(parse_date(&text)?)),
            None => None,
        };

        Ok(MemberPatch {
            phone_number: non_empty(self.phone),
            phone_number2: non_empty(self.phone_no2),
            email: non_empty(self.email),
            state: non_empty(self.state),
            sex: non_empty(self.sex),
            title: non_empty(self.title),
            hon_title: non_empty(self.hon_title),
            quarters: non_empty(self.quarters),
            ward: non_empty(self.ward),
            town: non_empty(self.town),
            qualifications: non_empty(self.qualifications),
            profession: non_empty(self.profession),
            exit_date,
            ..Default::default()
        })
    }
}

/// A route handler that applies the non-empty fields of the request to the logged-in member.
///
/// A new phone number moves the member's ledger entries along with it.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(member_id): Extension<MemberId>,
    Json(request): Json<ProfileUpdateRequest>,
) -> Response {
    let patch = match request.into_patch() {
        Ok(patch) => patch,
        Err(error) => return error.into_response(),
    };

    if patch.is_empty() {
        return render_message(StatusCode::BAD_REQUEST, "No fields to update");
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to update profile"),
    };

    let phone_number = match get_member_by_id(member_id, &connection) {
        Ok(member) => member.phone_number,
        Err(Error::NotFound) => return render_message(StatusCode::NOT_FOUND, "User not found"),
        Err(error) => return internal_error(error, "Failed to update profile"),
    };

    match update_member(&phone_number, &patch, None, &connection) {
        Ok(_) => render_outcome(StatusCode::OK, true, "Profile updated successfully"),
        Err(Error::DuplicatePhoneNumber) => render_outcome(
            StatusCode::CONFLICT,
            false,
            "Phone number already exists",
        ),
        Err(error) => {
            tracing::error!("Failed to update profile of member {member_id}: {error}");
            render_outcome(
                StatusCode::INTERNAL_SERVER_ERROR,
                false,
                "Failed to update profile",
            )
        }
    }
}
