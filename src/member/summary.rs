//! Member head counts broken down by ward and quarter.

use std::collections::{BTreeMap, BTreeSet};

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{Error, member::admin_endpoints::MemberAdminState, response::internal_error};

/// A ward × quarter table of member counts.
///
/// Every ward has a count for every quarter, zero where no member lives in both.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCounts {
    pub wards: Vec<String>,
    pub quarters: Vec<String>,
    pub data: BTreeMap<String, BTreeMap<String, i64>>,
    pub ward_totals: BTreeMap<String, i64>,
    pub quarter_totals: BTreeMap<String, i64>,
    pub grand_total: i64,
}

/// Count the members that have both a ward and a quarter.
pub fn count_members_by_ward_and_quarter(connection: &Connection) -> Result<MemberCounts, Error> {
    let cells: Vec<(String, String, i64)> = connection
        .prepare(
            "SELECT ward, quarters, COUNT(*) FROM member
            WHERE ward IS NOT NULL AND ward <> '' AND quarters IS NOT NULL AND quarters <> ''
            GROUP BY ward, quarters",
        )?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<_, _>>()?;

    let wards: BTreeSet<&str> = cells.iter().map(|(ward, _, _)| ward.as_str()).collect();
    let quarters: BTreeSet<&str> = cells.iter().map(|(_, quarter, _)| quarter.as_str()).collect();

    let mut counts = MemberCounts {
        wards: wards.iter().map(|ward| ward.to_string()).collect(),
        quarters: quarters.iter().map(|quarter| quarter.to_string()).collect(),
        ..Default::default()
    };

    for ward in &wards {
        let row = quarters
            .iter()
            .map(|quarter| (quarter.to_string(), 0))
            .collect();
        counts.data.insert(ward.to_string(), row);
        counts.ward_totals.insert(ward.to_string(), 0);
    }
    for quarter in &quarters {
        counts.quarter_totals.insert(quarter.to_string(), 0);
    }

    for (ward, quarter, count) in &cells {
        if let Some(cell) = counts
            .data
            .get_mut(ward)
            .and_then(|row| row.get_mut(quarter))
        {
            *cell += count;
        }
        *counts.ward_totals.entry(ward.clone()).or_default() += count;
        *counts.quarter_totals.entry(quarter.clone()).or_default() += count;
        counts.grand_total += count;
    }

    Ok(counts)
}

pub async fn members_summary_endpoint(State(state): State<MemberAdminState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => return internal_error(error, "Server error"),
    };

    match count_members_by_ward_and_quarter(&connection) {
        Ok(counts) => Json(counts).into_response(),
        Err(error) => internal_error(error, "Server error"),
    }
}
