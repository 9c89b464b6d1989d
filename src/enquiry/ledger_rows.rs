//! Ledger queries shared by the enquiry resolvers.

use rusqlite::{Connection, params_from_iter};

use crate::{Error, date_window::DateWindow, enquiry::rows::DetailRow, query_filter::Filter};

/// A member's full name as shown in enquiries.
pub(super) const FULL_NAME: &str = "m.surname || ' ' || m.other_names";

/// A member attribute that enquiries group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum GroupColumn {
    Ward,
    Quarters,
}

impl GroupColumn {
    pub(super) fn column(self) -> &'static str {
        match self {
            GroupColumn::Ward => "m.ward",
            GroupColumn::Quarters => "m.quarters",
        }
    }
}

/// A detail row along with the ward and quarter of its member, used for grouping.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct GroupedDetailRow {
    pub ward: Option<String>,
    pub quarter: Option<String>,
    pub row: DetailRow,
}

/// A filter on the ledger entries whose transaction date falls inside `window`.
pub(super) fn window_filter(window: &DateWindow) -> Filter {
    let mut filter = Filter::new();
    filter.push_window("l.transaction_date", window);
    filter
}

/// Ledger entries matching `filter`, ordered by phone number then newest first.
///
/// The ledger is aliased `l` and the (possibly missing) member `m`.
pub(super) fn query_detail_rows(
    filter: &Filter,
    connection: &Connection,
) -> Result<Vec<GroupedDetailRow>, Error> {
    connection
        .prepare(&format!(
            "SELECT l.phone_number, {FULL_NAME}, l.transaction_date, l.amount, l.remark, \
                m.ward, m.quarters \
            FROM ledger_entry l LEFT JOIN member m ON l.phone_number = m.phone_number{} \
            ORDER BY l.phone_number, l.transaction_date DESC, l.id DESC",
            filter.where_clause()
        ))?
        .query_map(params_from_iter(filter.values()), |row| {
            Ok(GroupedDetailRow {
                row: DetailRow {
                    phoneno: row.get(0)?,
                    fullname: row.get(1)?,
                    transdate: row.get(2)?,
                    amount: row.get(3)?,
                    remark: row.get(4)?,
                },
                ward: row.get(5)?,
                quarter: row.get(6)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// The sum of the ledger entries matching `filter`, zero if there are none.
pub(super) fn sum_ledger(filter: &Filter, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(l.amount), 0) \
                FROM ledger_entry l LEFT JOIN member m ON l.phone_number = m.phone_number{}",
                filter.where_clause()
            ),
            params_from_iter(filter.values()),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// The ledger total for every non-empty value of `group`, in lexicographic order.
///
/// Groups whose members have no entries in `window` have a total of zero.
pub(super) fn totals_by_group(
    group: GroupColumn,
    window: &DateWindow,
    connection: &Connection,
) -> Result<Vec<(String, f64)>, Error> {
    let filter = window_filter(window);
    let column = group.column();

    connection
        .prepare(&format!(
            "SELECT {column}, COALESCE(SUM(l.amount), 0) \
            FROM member m LEFT JOIN ledger_entry l ON m.phone_number = l.phone_number{} \
            WHERE {column} IS NOT NULL AND {column} <> '' \
            GROUP BY {column} ORDER BY {column}",
            filter.and_clause()
        ))?
        .query_map(params_from_iter(filter.values()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        date_window::DateWindow,
        test_utils::{get_test_connection, insert_ledger_entry, insert_member},
    };

    use super::{GroupColumn, query_detail_rows, sum_ledger, totals_by_group, window_filter};

    #[test]
    fn detail_rows_keep_entries_of_deleted_members() {
        let connection = get_test_connection();
        insert_member(&connection, "0802", "Bello", "B", "Q1");
        insert_ledger_entry(&connection, "0802", date!(2024 - 01 - 01), 10.0);
        insert_ledger_entry(&connection, "0802", date!(2024 - 03 - 01), 20.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 02 - 01), 5.0);

        let rows = query_detail_rows(&window_filter(&DateWindow::default()), &connection).unwrap();

        let summary: Vec<_> = rows
            .iter()
            .map(|row| (row.row.phoneno.as_str(), row.row.amount, row.ward.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("0801", 5.0, None),
                ("0802", 20.0, Some("B")),
                ("0802", 10.0, Some("B"))
            ]
        );
        assert_eq!(rows[0].row.fullname, None);
        assert_eq!(rows[1].row.fullname.as_deref(), Some("Bello Test"));
    }

    #[test]
    fn totals_include_idle_groups() {
        let connection = get_test_connection();
        insert_member(&connection, "0801", "Okafor", "B", "Q1");
        insert_member(&connection, "0802", "Bello", "A", "Q1");
        insert_member(&connection, "0803", "Eze", "", "Q2");
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 01), 10.0);
        insert_ledger_entry(&connection, "0801", date!(2025 - 01 - 01), 99.0);

        let window = DateWindow::parse(None, Some("2024-12-31")).unwrap();

        assert_eq!(
            totals_by_group(GroupColumn::Ward, &window, &connection).unwrap(),
            vec![("A".to_owned(), 0.0), ("B".to_owned(), 10.0)]
        );
        assert_eq!(
            totals_by_group(GroupColumn::Quarters, &window, &connection).unwrap(),
            vec![("Q1".to_owned(), 10.0), ("Q2".to_owned(), 0.0)]
        );
        assert_eq!(sum_ledger(&window_filter(&window), &connection).unwrap(), 10.0);
    }
}
