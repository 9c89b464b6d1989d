//! Enquiries by ward.

use std::collections::BTreeMap;

use rusqlite::Connection;

use crate::{
    Error,
    enquiry::{
        ledger_rows::{GroupColumn, query_detail_rows, sum_ledger, totals_by_group, window_filter},
        params::{EnquiryParams, Selector},
        rows::{DetailNode, DetailRow, EnquiryResult, SummaryRow, WardDetail},
    },
};

pub(super) fn resolve_ward(
    params: &EnquiryParams,
    connection: &Connection,
) -> Result<EnquiryResult, Error> {
    match &params.selector {
        Selector::All => all_wards(params, connection),
        Selector::One(ward) => single_ward(ward, params, connection),
    }
}

fn all_wards(params: &EnquiryParams, connection: &Connection) -> Result<EnquiryResult, Error> {
    let totals = totals_by_group(GroupColumn::Ward, &params.window, connection)?;
    let grand_total = totals.iter().fold(0.0, |sum, (_, total)| sum + total);

    let mut summary: Vec<SummaryRow> = totals
        .into_iter()
        .map(|(ward, total)| SummaryRow::Ward { ward, total })
        .collect();
    summary.push(SummaryRow::Ward {
        ward: SummaryRow::ALL.to_owned(),
        total: grand_total,
    });

    if !params.wants_detail() {
        return Ok(EnquiryResult {
            summary,
            detail: Vec::new(),
        });
    }

    // Only wards with at least one entry in the window are listed.
    let mut by_ward: BTreeMap<String, Vec<DetailRow>> = BTreeMap::new();
    for grouped in query_detail_rows(&window_filter(&params.window), connection)? {
        if let Some(ward) = grouped.ward.filter(|ward| !ward.is_empty()) {
            by_ward.entry(ward).or_default().push(grouped.row);
        }
    }

    let detail = by_ward
        .into_iter()
        .map(|(ward, members)| {
            DetailNode::Ward(WardDetail {
                ward: Some(ward),
                members,
            })
        })
        .collect();

    Ok(EnquiryResult { summary, detail })
}

fn single_ward(
    ward: &str,
    params: &EnquiryParams,
    connection: &Connection,
) -> Result<EnquiryResult, Error> {
    let mut filter = window_filter(&params.window);
    filter.push("m.ward = ?", ward.to_owned());

    let summary = vec![SummaryRow::Ward {
        ward: ward.to_owned(),
        total: sum_ledger(&filter, connection)?,
    }];

    let detail = if params.wants_detail() {
        let members = query_detail_rows(&filter, connection)?
            .into_iter()
            .map(|grouped| grouped.row)
            .collect();
        vec![DetailNode::Ward(WardDetail {
            ward: Some(ward.to_owned()),
            members,
        })]
    } else {
        Vec::new()
    };

    Ok(EnquiryResult { summary, detail })
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

    use super::resolve_ward;

    fn params(selector: Selector, mode: Mode) -> EnquiryParams {
        EnquiryParams {
            dimension: Dimension::Ward,
            selector,
            mode,
            window: DateWindow::default(),
        }
    }

    fn seed(connection: &rusqlite::Connection) {
        insert_member(connection, "0801", "Okafor", "A", "Q1");
        insert_member(connection, "0802", "Bello", "B", "Q1");
        insert_member(connection, "0803", "Eze", "C", "Q2");
        insert_ledger_entry(connection, "0801", date!(2024 - 01 - 01), 200.0);
        insert_ledger_entry(connection, "0801", date!(2024 - 02 - 01), 300.0);
        insert_ledger_entry(connection, "0802", date!(2024 - 01 - 15), 300.0);
    }

    #[test]
    fn all_wards_detail_omits_idle_wards() {
        let connection = get_test_connection();
        seed(&connection);

        let result = resolve_ward(&params(Selector::All, Mode::Detail), &connection).unwrap();

        assert_eq!(
            serde_json::to_value(&result.summary).unwrap(),
            json!([
                {"Ward": "A", "total": 500.0},
                {"Ward": "B", "total": 300.0},
                {"Ward": "C", "total": 0.0},
                {"Ward": "ALL", "total": 800.0}
            ])
        );
        let detail = serde_json::to_value(&result.detail).unwrap();
        let wards: Vec<_> = detail
            .as_array()
            .unwrap()
            .iter()
            .map(|node| node["ward"].as_str().unwrap())
            .collect();
        assert_eq!(wards, vec!["A", "B"]);
        assert_eq!(detail[0]["members"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn single_ward_detail_lists_members_entries() {
        let connection = get_test_connection();
        seed(&connection);

        let result = resolve_ward(
            &params(Selector::One("A".to_owned()), Mode::Detail),
            &connection,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&result.summary).unwrap(),
            json!([{"Ward": "A", "total": 500.0}])
        );
        let detail = serde_json::to_value(&result.detail).unwrap();
        assert_eq!(detail[0]["ward"], "A");
        assert_eq!(detail[0]["members"][0]["transdate"], "2024-02-01");
        assert_eq!(detail[0]["members"][1]["transdate"], "2024-01-01");
    }

    #[test]
    fn single_idle_ward_still_has_detail_entry() {
        let connection = get_test_connection();
        seed(&connection);

        let result = resolve_ward(
            &params(Selector::One("C".to_owned()), Mode::Detail),
            &connection,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "summary": [{"Ward": "C", "total": 0.0}],
                "detail": [{"ward": "C", "members": []}]
            })
        );
    }

    #[test]
    fn all_row_of_empty_ward_list_serializes_positive_zero() {
        let connection = get_test_connection();

        let result = resolve_ward(&params(Selector::All, Mode::Summary), &connection).unwrap();

        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"summary":[{"Ward":"ALL","total":0.0}],"detail":[]}"#
        );
    }
}
