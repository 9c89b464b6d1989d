//! The organisation-wide account: ledger credits against expense debits.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    enquiry::{
        ledger_rows::{sum_ledger, window_filter},
        params::EnquiryParams,
        rows::{EnquiryResult, SummaryRow},
    },
    expense::sum_expenses,
};

const OPEN_BOUND: &str = "N/A";

fn describe_bound(bound: Option<Date>) -> String {
    bound.map_or_else(|| OPEN_BOUND.to_owned(), |date| date.to_string())
}

/// Credits are filtered on the transaction date and debits on the document date.
pub(super) fn resolve_account(
    params: &EnquiryParams,
    connection: &Connection,
) -> Result<EnquiryResult, Error> {
    let total_credit = sum_ledger(&window_filter(&params.window), connection)?;
    let total_debit = sum_expenses(&params.window, connection)?;

    Ok(EnquiryResult {
        summary: vec![SummaryRow::Account {
            start_date: describe_bound(params.window.start),
            end_date: describe_bound(params.window.end),
            total_credit,
            total_debit,
        }],
        detail: Vec::new(),
    })
}
