//! Enquiries by quarter, broken down by the wards found among each quarter's members.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
    Error,
    enquiry::{
        ledger_rows::{
            GroupColumn, GroupedDetailRow, query_detail_rows, sum_ledger, totals_by_group,
            window_filter,
        },
        params::{EnquiryParams, Selector},
        rows::{DetailNode, DetailRow, EnquiryResult, QuarterDetail, SummaryRow, WardDetail},
    },
};

pub(super) fn resolve_quarter(
    params: &EnquiryParams,
    connection: &Connection,
) -> Result<EnquiryResult, Error> {
    match &params.selector {
        Selector::All => all_quarters(params, connection),
        Selector::One(quarter) => single_quarter(quarter, params, connection),
    }
}

/// Detail rows keyed by quarter and ward.
type RowsByQuarterAndWard = HashMap<(String, Option<String>), Vec<DetailRow>>;

fn group_rows(rows: impl IntoIterator<Item = GroupedDetailRow>) -> RowsByQuarterAndWard {
    let mut groups = RowsByQuarterAndWard::new();

    for grouped in rows {
        let Some(quarter) = grouped.quarter else {
            continue;
        };
        groups
            .entry((quarter, grouped.ward))
            .or_default()
            .push(grouped.row);
    }

    groups
}

fn ward_details(
    quarter: &str,
    wards: Vec<Option<String>>,
    groups: &mut RowsByQuarterAndWard,
) -> Vec<WardDetail> {
    wards
        .into_iter()
        .map(|ward| {
            let members = groups
                .remove(&(quarter.to_owned(), ward.clone()))
                .unwrap_or_default();
            WardDetail { ward, members }
        })
        .collect()
}

/// The distinct wards of every non-empty quarter, ordered by quarter then ward.
fn wards_by_quarter(connection: &Connection) -> Result<Vec<(String, Option<String>)>, Error> {
    connection
        .prepare(
            "SELECT DISTINCT quarters, ward FROM member
            WHERE quarters IS NOT NULL AND quarters <> ''
            ORDER BY 1, 2",
        )?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .map(|maybe_pair| maybe_pair.map_err(Error::from))
        .collect()
}

fn wards_in_quarter(quarter: &str, connection: &Connection) -> Result<Vec<Option<String>>, Error> {
    connection
        .prepare("SELECT DISTINCT ward FROM member WHERE quarters = ?1 ORDER BY 1")?
        .query_map([quarter], |row| row.get(0))?
        .map(|maybe_ward| maybe_ward.map_err(Error::from))
        .collect()
}

fn all_quarters(params: &EnquiryParams, connection: &Connection) -> Result<EnquiryResult, Error> {
    let totals = totals_by_group(GroupColumn::Quarters, &params.window, connection)?;
    let grand_total = totals.iter().fold(0.0, |sum, (_, total)| sum + total);
    let quarters: Vec<String> = totals.iter().map(|(quarter, _)| quarter.clone()).collect();

    let mut summary: Vec<SummaryRow> = totals
        .into_iter()
        .map(|(quarter, total)| SummaryRow::Quarters { quarter, total })
        .collect();
    summary.push(SummaryRow::Quarters {
        quarter: SummaryRow::ALL.to_owned(),
        total: grand_total,
    });

    if !params.wants_detail() {
        return Ok(EnquiryResult {
            summary,
            detail: Vec::new(),
        });
    }

    let mut wards_of: HashMap<String, Vec<Option<String>>> = HashMap::new();
    for (quarter, ward) in wards_by_quarter(connection)? {
        wards_of.entry(quarter).or_default().push(ward);
    }

    // Members without a ward are listed under a null ward with no entries.
    let rows = query_detail_rows(&window_filter(&params.window), connection)?;
    let mut groups = group_rows(rows.into_iter().filter(|row| row.ward.is_some()));

    // Every quarter is listed, along with every ward of its members.
    let detail = quarters
        .into_iter()
        .map(|quarter| {
            let wards = wards_of.remove(&quarter).unwrap_or_default();
            let wards = ward_details(&quarter, wards, &mut groups);
            DetailNode::Quarter(QuarterDetail { quarter, wards })
        })
        .collect();

    Ok(EnquiryResult { summary, detail })
}

fn single_quarter(
    quarter: &str,
    params: &EnquiryParams,
    connection: &Connection,
) -> Result<EnquiryResult, Error> {
    let mut filter = window_filter(&params.window);
    filter.push("m.quarters = ?", quarter.to_owned());

    let summary = vec![SummaryRow::SingleQuarter {
        quarter: quarter.to_owned(),
        total: sum_ledger(&filter, connection)?,
    }];

    if !params.wants_detail() {
        return Ok(EnquiryResult {
            summary,
            detail: Vec::new(),
        });
    }

    let wards = wards_in_quarter(quarter, connection)?;
    let mut groups = group_rows(query_detail_rows(&filter, connection)?);

    Ok(EnquiryResult {
        summary,
        detail: vec![DetailNode::Quarter(QuarterDetail {
            quarter: quarter.to_owned(),
            wards: ward_details(quarter, wards, &mut groups),
        })],
    })
}
