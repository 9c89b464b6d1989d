//! Expenses paid out by the organisation.

use rusqlite::{Connection, Row, params, params_from_iter};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    date_window::{DateWindow, iso_date},
    query_filter::Filter,
};

/// An expense booked against a project, i.e. a standard expense code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: i64,
    #[serde(rename = "docdate", with = "iso_date")]
    pub document_date: Date,
    pub project: String,
    pub remarks: String,
    pub amount: f64,
}

/// The data needed to record an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// The date on the receipt or voucher.
    pub document_date: Date,
    /// The standard expense code the money was spent on.
    pub project: String,
    pub remarks: String,
    pub amount: f64,
}

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            document_date TEXT NOT NULL,
            project TEXT NOT NULL,
            remarks TEXT NOT NULL DEFAULT '',
            amount REAL NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_document_date ON expense(document_date)",
        (),
    )?;

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        document_date: row.get(1)?,
        project: row.get(2)?,
        remarks: row.get(3)?,
        amount: row.get(4)?,
    })
}

/// Record an expense.
pub fn create_expense(expense: &NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (document_date, project, remarks, amount) VALUES (?1, ?2, ?3, ?4)",
        params![
            expense.document_date,
            expense.project,
            expense.remarks,
            expense.amount
        ],
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        document_date: expense.document_date,
        project: expense.project.clone(),
        remarks: expense.remarks.clone(),
        amount: expense.amount,
    })
}

/// The most recent `limit` expenses by document date.
pub fn get_recent_expenses(limit: u32, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, document_date, project, remarks, amount FROM expense
            ORDER BY document_date DESC, id DESC LIMIT ?1",
        )?
        .query_map([limit], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Up to `limit` expenses in insertion order.
pub fn get_first_expenses(limit: u32, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, document_date, project, remarks, amount FROM expense ORDER BY id LIMIT ?1",
        )?
        .query_map([limit], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// The sum of the expenses with a document date inside `window`.
pub fn sum_expenses(window: &DateWindow, connection: &Connection) -> Result<f64, Error> {
    let mut filter = Filter::new();
    filter.push_window("document_date", window);

    connection
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(amount), 0) FROM expense{}",
                filter.where_clause()
            ),
            params_from_iter(filter.values()),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        date_window::DateWindow,
        test_utils::{get_test_connection, insert_expense},
    };

    use super::{NewExpense, create_expense, get_first_expenses, get_recent_expenses, sum_expenses};

    #[test]
    fn create_and_list_recent_first() {
        let connection = get_test_connection();
        let older = create_expense(
            &NewExpense {
                document_date: date!(2024 - 01 - 05),
                project: "PRJ1".to_owned(),
                remarks: "Cement".to_owned(),
                amount: 1200.0,
            },
            &connection,
        )
        .unwrap();
        let newer = insert_expense(&connection, date!(2024 - 02 - 05), "PRJ2", 300.0);

        assert_eq!(
            get_recent_expenses(10, &connection).unwrap(),
            vec![newer.clone(), older.clone()]
        );
        assert_eq!(get_first_expenses(1, &connection).unwrap(), vec![older]);
    }

    #[test]
    fn sum_respects_window() {
        let connection = get_test_connection();
        insert_expense(&connection, date!(2024 - 01 - 05), "PRJ1", 100.0);
        insert_expense(&connection, date!(2024 - 02 - 05), "PRJ1", 40.0);

        assert_eq!(sum_expenses(&DateWindow::default(), &connection).unwrap(), 140.0);
        assert_eq!(
            sum_expenses(&DateWindow::month(2024, 2).unwrap(), &connection).unwrap(),
            40.0
        );
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        let connection = get_test_connection();

        assert_eq!(sum_expenses(&DateWindow::default(), &connection).unwrap(), 0.0);
    }
}
