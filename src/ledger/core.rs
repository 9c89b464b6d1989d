//! Ledger entries record the dues and other payments made by members.

use rusqlite::{Connection, Row, params, params_from_iter};
use serde::Serialize;
use time::Date;

use crate::{Error, date_window::DateWindow, date_window::iso_date, query_filter::Filter};

/// A payment recorded against a member's phone number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: i64,
    #[serde(rename = "phoneno")]
    pub phone_number: String,
    #[serde(rename = "transdate", with = "iso_date")]
    pub transaction_date: Date,
    pub amount: f64,
    pub remark: String,
    #[serde(rename = "paydate", with = "iso_date")]
    pub payment_date: Date,
}

/// The data needed to record a ledger entry.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// The phone number of the member that paid.
    pub phone_number: String,
    /// The date the payment is for.
    pub transaction_date: Date,
    /// The amount paid. Negative amounts are refunds or corrections.
    pub amount: f64,
    /// Free text describing the payment, e.g. "Monthly dues".
    pub remark: String,
    /// The date the payment was recorded.
    pub payment_date: Date,
}

/// A ledger entry together with the ward of the member that made it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardLedgerEntry {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub ward: Option<String>,
}

/// The member attributes that ledger entries can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberGroup {
    Ward,
    Quarters,
}

impl MemberGroup {
    fn column(self) -> &'static str {
        match self {
            MemberGroup::Ward => "m.ward",
            MemberGroup::Quarters => "m.quarters",
        }
    }
}

pub fn create_ledger_entry_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS ledger_entry (
            id INTEGER PRIMARY KEY,
            phone_number TEXT NOT NULL,
            transaction_date TEXT NOT NULL,
            amount REAL NOT NULL,
            remark TEXT NOT NULL DEFAULT '',
            payment_date TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_ledger_entry_phone_date
            ON ledger_entry(phone_number, transaction_date)",
        (),
    )?;

    Ok(())
}

const SELECT_LEDGER_ENTRY: &str = "SELECT l.id, l.phone_number, l.transaction_date, l.amount, \
    l.remark, l.payment_date FROM ledger_entry l";

pub(crate) fn map_ledger_entry_row(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        transaction_date: row.get(2)?,
        amount: row.get(3)?,
        remark: row.get(4)?,
        payment_date: row.get(5)?,
    })
}

/// Record a ledger entry.
///
/// The phone number is not checked against the member table, callers that
/// need that guarantee should check with [crate::member::member_exists] first.
pub fn create_ledger_entry(
    entry: &NewLedgerEntry,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    connection.execute(
        "INSERT INTO ledger_entry (phone_number, transaction_date, amount, remark, payment_date)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.phone_number,
            entry.transaction_date,
            entry.amount,
            entry.remark,
            entry.payment_date,
        ],
    )?;

    Ok(LedgerEntry {
        id: connection.last_insert_rowid(),
        phone_number: entry.phone_number.clone(),
        transaction_date: entry.transaction_date,
        amount: entry.amount,
        remark: entry.remark.clone(),
        payment_date: entry.payment_date,
    })
}

/// The entries for one member, newest transaction first.
pub fn get_ledger_entries_for_member(
    phone_number: &str,
    connection: &Connection,
) -> Result<Vec<LedgerEntry>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_LEDGER_ENTRY} WHERE l.phone_number = ?1 \
            ORDER BY l.transaction_date DESC, l.id DESC"
        ))?
        .query_map([phone_number], map_ledger_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Every entry with a transaction date inside `window`, newest first.
pub fn get_ledger_entries(
    window: &DateWindow,
    connection: &Connection,
) -> Result<Vec<LedgerEntry>, Error> {
    let mut filter = Filter::new();
    filter.push_window("l.transaction_date", window);

    connection
        .prepare(&format!(
            "{SELECT_LEDGER_ENTRY}{} ORDER BY l.transaction_date DESC, l.id DESC",
            filter.where_clause()
        ))?
        .query_map(params_from_iter(filter.values()), map_ledger_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Up to `limit` entries in insertion order.
pub fn get_first_ledger_entries(
    limit: u32,
    connection: &Connection,
) -> Result<Vec<LedgerEntry>, Error> {
    connection
        .prepare(&format!("{SELECT_LEDGER_ENTRY} ORDER BY l.id LIMIT ?1"))?
        .query_map([limit], map_ledger_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

fn sum_matching(filter: &Filter, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(l.amount), 0) FROM ledger_entry l{}",
                filter.where_clause()
            ),
            params_from_iter(filter.values()),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The sum of every entry with a transaction date inside `window`.
pub fn sum_ledger_entries(window: &DateWindow, connection: &Connection) -> Result<f64, Error> {
    let mut filter = Filter::new();
    filter.push_window("l.transaction_date", window);

    sum_matching(&filter, connection)
}

/// The sum of a member's entries with a transaction date inside `window`.
pub fn sum_ledger_entries_for_member(
    phone_number: &str,
    window: &DateWindow,
    connection: &Connection,
) -> Result<f64, Error> {
    let mut filter = Filter::new();
    filter
        .push("l.phone_number = ?", phone_number.to_owned())
        .push_window("l.transaction_date", window);

    sum_matching(&filter, connection)
}

/// The entries of every member whose ward or quarter equals `value`.
pub fn get_ledger_entries_for_group(
    group: MemberGroup,
    value: &str,
    window: &DateWindow,
    connection: &Connection,
) -> Result<Vec<WardLedgerEntry>, Error> {
    let mut filter = Filter::new();
    filter
        .push(&format!("{} = ?", group.column()), value.to_owned())
        .push_window("l.transaction_date", window);

    connection
        .prepare(&format!(
            "SELECT l.id, l.phone_number, l.transaction_date, l.amount, l.remark, \
                l.payment_date, m.ward \
            FROM ledger_entry l INNER JOIN member m ON l.phone_number = m.phone_number{} \
            ORDER BY l.transaction_date DESC, l.id DESC",
            filter.where_clause()
        ))?
        .query_map(params_from_iter(filter.values()), |row| {
            Ok(WardLedgerEntry {
                entry: map_ledger_entry_row(row)?,
                ward: row.get(6)?,
            })
        })?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        date_window::DateWindow,
        test_utils::{get_test_connection, insert_ledger_entry, insert_member},
    };

    use super::{
        MemberGroup, NewLedgerEntry, create_ledger_entry, get_first_ledger_entries,
        get_ledger_entries, get_ledger_entries_for_group, get_ledger_entries_for_member,
        sum_ledger_entries_for_member,
    };

    #[test]
    fn create_entry_returns_stored_entry() {
        let connection = get_test_connection();
        let new_entry = NewLedgerEntry {
            phone_number: "0801".to_owned(),
            transaction_date: date!(2024 - 01 - 10),
            amount: 2500.0,
            remark: "Dues".to_owned(),
            payment_date: date!(2024 - 01 - 12),
        };

        let created = create_ledger_entry(&new_entry, &connection).unwrap();

        assert_eq!(
            get_ledger_entries_for_member("0801", &connection).unwrap(),
            vec![created]
        );
    }

    #[test]
    fn member_entries_are_newest_first() {
        let connection = get_test_connection();
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 10), 1.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 03 - 10), 3.0);
        insert_ledger_entry(&connection, "0802", date!(2024 - 02 - 10), 2.0);

        let amounts: Vec<f64> = get_ledger_entries_for_member("0801", &connection)
            .unwrap()
            .into_iter()
            .map(|entry| entry.amount)
            .collect();

        assert_eq!(amounts, [3.0, 1.0]);
    }

    #[test]
    fn window_filters_on_transaction_date() {
        let connection = get_test_connection();
        insert_ledger_entry(&connection, "0801", date!(2023 - 12 - 31), 1.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 01), 2.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 31), 3.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 02 - 01), 4.0);
        let window = DateWindow::month(2024, 1).unwrap();

        let entries = get_ledger_entries(&window, &connection).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            sum_ledger_entries_for_member("0801", &window, &connection).unwrap(),
            5.0
        );
    }

    #[test]
    fn sum_without_entries_is_zero() {
        let connection = get_test_connection();

        let total =
            sum_ledger_entries_for_member("0801", &DateWindow::default(), &connection).unwrap();

        assert_eq!(total, 0.0);
    }

    #[test]
    fn first_entries_are_capped() {
        let connection = get_test_connection();
        for day in 1..=5 {
            insert_ledger_entry(
                &connection,
                "0801",
                date!(2024 - 01 - 01).replace_day(day).unwrap(),
                1.0,
            );
        }

        assert_eq!(get_first_ledger_entries(3, &connection).unwrap().len(), 3);
    }

    #[test]
    fn group_entries_carry_member_ward() {
        let connection = get_test_connection();
        insert_member(&connection, "0801", "Okafor", "A", "Q1");
        insert_member(&connection, "0802", "Bello", "B", "Q1");
        insert_member(&connection, "0803", "Eze", "C", "Q2");
        insert_ledger_entry(&connection, "0801", date!(2024 - 01 - 10), 1.0);
        insert_ledger_entry(&connection, "0802", date!(2024 - 01 - 11), 2.0);
        insert_ledger_entry(&connection, "0803", date!(2024 - 01 - 12), 3.0);

        let by_ward = get_ledger_entries_for_group(
            MemberGroup::Ward,
            "B",
            &DateWindow::default(),
            &connection,
        )
        .unwrap();
        let by_quarter = get_ledger_entries_for_group(
            MemberGroup::Quarters,
            "Q1",
            &DateWindow::default(),
            &connection,
        )
        .unwrap();

        assert_eq!(by_ward.len(), 1);
        assert_eq!(by_ward[0].ward.as_deref(), Some("B"));
        let wards: Vec<_> = by_quarter.iter().map(|e| e.ward.as_deref()).collect();
        assert_eq!(wards, [Some("B"), Some("A")]);
    }
}
