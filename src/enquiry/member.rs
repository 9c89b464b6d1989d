//! Enquiries by member.

use rusqlite::{Connection, params_from_iter};

use crate::{
    Error,
    enquiry::{
        ledger_rows::{FULL_NAME, query_detail_rows, window_filter},
        params::{EnquiryParams, Selector},
        rows::{DetailNode, EnquiryResult, SummaryRow},
    },
    member::get_full_name,
};

pub(super) fn resolve_member(
    params: &EnquiryParams,
    connection: &Connection,
) -> Result<EnquiryResult, Error> {
    match &params.selector {
        Selector::All => all_members(params, connection),
        Selector::One(phone_number) => single_member(phone_number, params, connection),
    }
}

/// Every member with their total, including members with no entries, then the grand total.
fn all_members(params: &EnquiryParams, connection: &Connection) -> Result<EnquiryResult, Error> {
    let filter = window_filter(&params.window);

    let mut summary: Vec<SummaryRow> = connection
        .prepare(&format!(
            "SELECT m.phone_number, {FULL_NAME} AS fullname, COALESCE(SUM(l.amount), 0) \
            FROM member m LEFT JOIN ledger_entry l ON m.phone_number = l.phone_number{} \
            GROUP BY m.id ORDER BY fullname, m.phone_number",
            filter.and_clause()
        ))?
        .query_map(params_from_iter(filter.values()), |row| {
            Ok(SummaryRow::Member {
                phone_number: row.get(0)?,
                fullname: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    let grand_total = summary
        .iter()
        .map(|row| match row {
            SummaryRow::Member { total, .. } => *total,
            _ => 0.0,
        })
        .fold(0.0, |sum, total| sum + total);
    summary.push(SummaryRow::Member {
        phone_number: SummaryRow::ALL.to_owned(),
        fullname: SummaryRow::ALL.to_owned(),
        total: grand_total,
    });

    let detail = if params.wants_detail() {
        query_detail_rows(&filter, connection)?
            .into_iter()
            .map(|row| DetailNode::Entry(row.row))
            .collect()
    } else {
        Vec::new()
    };

    Ok(EnquiryResult { summary, detail })
}

/// A single row for the member, even if they have no entries or are unknown.
///
/// The total is always the sum of the member's detail rows.
fn single_member(
    phone_number: &str,
    params: &EnquiryParams,
    connection: &Connection,
) -> Result<EnquiryResult, Error> {
    let mut filter = window_filter(&params.window);
    filter.push("l.phone_number = ?", phone_number.to_owned());

    let rows = query_detail_rows(&filter, connection)?;
    let total = rows.iter().fold(0.0, |sum, row| sum + row.row.amount);
    let fullname = get_full_name(phone_number, connection)?.unwrap_or_default();

    let detail = if params.wants_detail() {
        rows.into_iter().map(|row| DetailNode::Entry(row.row)).collect()
    } else {
        Vec::new()
    };

    Ok(EnquiryResult {
        summary: vec![SummaryRow::SingleMember {
            phoneno: phone_number.to_owned(),
            fullname,
            total,
        }],
        detail,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use crate::{
        date_window::DateWindow,
        enquiry::params::{Dimension, EnquiryParams, Mode, Selector},
        test_utils::{get_test_connection, insert_ledger_entry, insert_member},
    };

    use super::resolve_member;

    fn params(selector: Selector, mode: Mode) -> EnquiryParams {
        EnquiryParams {
            dimension: Dimension::Member,
            selector,
            mode,
            window: DateWindow::default(),
        }
    }

    #[test]
    fn idle_members_have_zero_totals_and_all_row_sums() {
        let connection = get_test_connection();
        insert_member(&connection, "0801", "Okafor", "A", "Q1");
        insert_member(&connection, "0802", "Bello", "B", "Q1");
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 01), 200.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 02 - 01), 300.0);

        let result = resolve_member(&params(Selector::All, Mode::Summary), &connection).unwrap();

        assert_eq!(
            serde_json::to_value(&result.summary).unwrap(),
            json!([
                {"PhoneNumber": "0802", "fullname": "Bello Test", "total": 0.0},
                {"PhoneNumber": "0801", "fullname": "Okafor Test", "total": 500.0},
                {"PhoneNumber": "ALL", "fullname": "ALL", "total": 500.0}
            ])
        );
        assert!(result.detail.is_empty());
    }

    #[test]
    fn all_members_detail_orders_by_phone_then_newest() {
        let connection = get_test_connection();
        insert_member(&connection, "0802", "Bello", "B", "Q1");
        insert_member(&connection, "0801", "Okafor", "A", "Q1");
        insert_ledger_entry(&connection, "0802", date!(2024 - 01 - 01), 1.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 01), 2.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 03 - 01), 3.0);

        let result = resolve_member(&params(Selector::All, Mode::Detail), &connection).unwrap();

        let detail = serde_json::to_value(&result.detail).unwrap();
        let amounts: Vec<_> = detail
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["amount"].as_f64().unwrap())
            .collect();
        assert_eq!(amounts, vec![3.0, 2.0, 1.0]);
        assert_eq!(detail[0]["transdate"], "2024-03-01");
    }

    #[test]
    fn single_member_total_matches_detail() {
        let connection = get_test_connection();
        insert_member(&connection, "0801", "Okafor", "A", "Q1");
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 01), 120.5);
        insert_ledger_entry(&connection, "0801", date!(2024 - 02 - 01), -20.5);
        insert_ledger_entry(&connection, "0801", date!(2025 - 02 - 01), 1000.0);

        let mut enquiry = params(Selector::One("0801".to_owned()), Mode::Detail);
        enquiry.window = DateWindow::parse(Some("2024-01-01"), Some("2024-12-31")).unwrap();
        let result = resolve_member(&enquiry, &connection).unwrap();

        assert_eq!(
            serde_json::to_value(&result.summary).unwrap(),
            json!([{"phoneno": "0801", "fullname": "Okafor Test", "total": 100.0}])
        );
        assert_eq!(result.detail.len(), 2);
    }

    #[test]
    fn member_without_entries_in_window_serializes_positive_zero() {
        let connection = get_test_connection();
        insert_member(&connection, "0801", "Okafor", "A", "Q1");
        insert_ledger_entry(&connection, "0801", date!(2023 - 06 - 01), 50.0);

        let mut enquiry = params(Selector::One("0801".to_owned()), Mode::Summary);
        enquiry.window = DateWindow::parse(Some("2024-01-01"), None).unwrap();
        let result = resolve_member(&enquiry, &connection).unwrap();

        assert_eq!(
            serde_json::to_string(&result.summary).unwrap(),
            r#"[{"phoneno":"0801","fullname":"Okafor Test","total":0.0}]"#
        );
    }

    #[test]
    fn all_row_of_empty_member_list_serializes_positive_zero() {
        let connection = get_test_connection();

        let result = resolve_member(&params(Selector::All, Mode::Summary), &connection).unwrap();

        assert_eq!(
            serde_json::to_string(&result.summary).unwrap(),
            r#"[{"PhoneNumber":"ALL","fullname":"ALL","total":0.0}]"#
        );
    }

    #[test]
    fn unknown_member_summary_is_zero() {
        let connection = get_test_connection();

        let result = resolve_member(
            &params(Selector::One("0000".to_owned()), Mode::Summary),
            &connection,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&result.summary).unwrap(),
            json!([{"phoneno": "0000", "fullname": "", "total": 0.0}])
        );
    }
}
