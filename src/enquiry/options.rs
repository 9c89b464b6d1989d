//! The values offered in the enquiry form's drop-downs.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{Error, enquiry::endpoint::EnquiryState, response::internal_error};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberOption {
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    pub fullname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnquiryOptions {
    pub members: Vec<MemberOption>,
    pub wards: Vec<String>,
    pub quarters: Vec<String>,
}

fn distinct_values(column: &str, connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare(&format!(
            "SELECT DISTINCT {column} FROM member
            WHERE {column} IS NOT NULL AND {column} <> '' ORDER BY {column}"
        ))?
        .query_map([], |row| row.get(0))?
        .map(|maybe_value| maybe_value.map_err(Error::from))
        .collect()
}

pub fn get_enquiry_options(connection: &Connection) -> Result<EnquiryOptions, Error> {
    let members = connection
        .prepare(
            "SELECT phone_number, surname || ' ' || other_names AS fullname FROM member
            ORDER BY fullname",
        )?
        .query_map([], |row| {
            Ok(MemberOption {
                phone_number: row.get(0)?,
                fullname: row.get(1)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    Ok(EnquiryOptions {
        members,
        wards: distinct_values("ward", connection)?,
        quarters: distinct_values("quarters", connection)?,
    })
}

pub async fn enquiry_options_endpoint(State(state): State<EnquiryState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Failed to load options"),
    };

    match get_enquiry_options(&connection) {
        Ok(options) => Json(options).into_response(),
        Err(error) => internal_error(error, "Failed to load options"),
    }
}
