//! Month-end balances carried forward from one period to the next.

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use time::Date;

use crate::{Error, date_window::DateWindow, expense::sum_expenses, ledger::sum_ledger_entries};

/// The balances for one calendar month.
///
/// The columns are swapped relative to their names: `debit_balance` holds
/// the ledger credits and `credit_balance` the expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// The month as "YYYYMM".
    pub period: String,
    #[serde(rename = "openbalance")]
    pub open_balance: f64,
    #[serde(rename = "Debitbalance")]
    pub debit_balance: f64,
    #[serde(rename = "Creditbalance")]
    pub credit_balance: f64,
    #[serde(rename = "Netbalance")]
    pub net_balance: f64,
}

pub fn create_monthly_summary_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS monthly_summary (
            period TEXT PRIMARY KEY,
            open_balance REAL NOT NULL,
            debit_balance REAL NOT NULL,
            credit_balance REAL NOT NULL,
            net_balance REAL NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_summary_row(row: &Row) -> Result<MonthlySummary, rusqlite::Error> {
    Ok(MonthlySummary {
        period: row.get(0)?,
        open_balance: row.get(1)?,
        debit_balance: row.get(2)?,
        credit_balance: row.get(3)?,
        net_balance: row.get(4)?,
    })
}

const SELECT_SUMMARY: &str =
    "SELECT period, open_balance, debit_balance, credit_balance, net_balance FROM monthly_summary";

/// Format a month as a summary period, e.g. 2024, 6 -> "202406".
pub fn format_period(year: i32, month: u8) -> String {
    format!("{year:04}{month:02}")
}

/// Compute and store the summary for `month` of `year`.
///
/// The opening balance is the net balance of the latest earlier summary, or
/// zero if there is none.
///
/// # Errors
/// - [Error::InvalidPeriod] if `year` and `month` are not a calendar month.
/// - [Error::OpenPeriod] if the month has not ended by `today`.
/// - [Error::DuplicateSummary] if the month already has a summary.
pub fn generate_monthly_summary(
    year: i32,
    month: u8,
    today: Date,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    let window = DateWindow::month(year, month)?;
    let period = format_period(year, month);

    if window.end.is_none_or(|last_day| last_day >= today) {
        return Err(Error::OpenPeriod(period));
    }

    let transaction = connection.unchecked_transaction()?;

    let exists: bool = transaction.query_row(
        "SELECT EXISTS(SELECT 1 FROM monthly_summary WHERE period = ?1)",
        [&period],
        |row| row.get(0),
    )?;
    if exists {
        return Err(Error::DuplicateSummary(period));
    }

    let total_credit = sum_ledger_entries(&window, &transaction)?;
    let total_debit = sum_expenses(&window, &transaction)?;
    let open_balance: f64 = transaction
        .query_row(
            "SELECT net_balance FROM monthly_summary WHERE period < ?1
            ORDER BY period DESC LIMIT 1",
            [&period],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or_default();

    let summary = MonthlySummary {
        period,
        open_balance,
        debit_balance: total_credit,
        credit_balance: total_debit,
        net_balance: open_balance + total_credit - total_debit,
    };

    transaction.execute(
        "INSERT INTO monthly_summary (period, open_balance, debit_balance, credit_balance, net_balance)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            summary.period,
            summary.open_balance,
            summary.debit_balance,
            summary.credit_balance,
            summary.net_balance
        ],
    )?;
    transaction.commit()?;

    tracing::info!("Generated monthly summary for {}", summary.period);

    Ok(summary)
}

/// Every summary, newest period first.
pub fn list_monthly_summaries(connection: &Connection) -> Result<Vec<MonthlySummary>, Error> {
    connection
        .prepare(&format!("{SELECT_SUMMARY} ORDER BY period DESC"))?
        .query_map([], map_summary_row)?
        .map(|maybe_summary| maybe_summary.map_err(Error::from))
        .collect()
}

/// Up to `limit` summaries, oldest period first.
pub fn get_first_monthly_summaries(
    limit: u32,
    connection: &Connection,
) -> Result<Vec<MonthlySummary>, Error> {
    connection
        .prepare(&format!("{SELECT_SUMMARY} ORDER BY period LIMIT ?1"))?
        .query_map([limit], map_summary_row)?
        .map(|maybe_summary| maybe_summary.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        test_utils::{get_test_connection, insert_expense, insert_ledger_entry},
    };

    use super::{
        MonthlySummary, format_period, generate_monthly_summary, get_first_monthly_summaries,
        list_monthly_summaries,
    };

    const TODAY: time::Date = date!(2024 - 07 - 15);

    #[test]
    fn period_is_zero_padded() {
        assert_eq!(format_period(2024, 6), "202406");
    }

    #[test]
    fn balances_carry_forward() {
        let connection = get_test_connection();
        insert_ledger_entry(&connection, "0801", date!(2024 - 05 - 03), 1000.0);
        insert_expense(&connection, date!(2024 - 05 - 20), "PRJ1", 400.0);
        insert_ledger_entry(&connection, "0801", date!(2024 - 06 - 03), 500.0);
        insert_expense(&connection, date!(2024 - 06 - 30), "PRJ1", 50.0);

        let may = generate_monthly_summary(2024, 5, TODAY, &connection).unwrap();
        let june = generate_monthly_summary(2024, 6, TODAY, &connection).unwrap();

        assert_eq!(
            may,
            MonthlySummary {
                period: "202405".to_owned(),
                open_balance: 0.0,
                debit_balance: 1000.0,
                credit_balance: 400.0,
                net_balance: 600.0,
            }
        );
        assert_eq!(june.open_balance, 600.0);
        assert_eq!(june.net_balance, 1050.0);
        assert_eq!(
            list_monthly_summaries(&connection).unwrap(),
            vec![june, may.clone()]
        );
        assert_eq!(get_first_monthly_summaries(1, &connection).unwrap(), vec![may]);
    }

    #[test]
    fn current_and_future_months_are_rejected() {
        let connection = get_test_connection();

        assert_eq!(
            generate_monthly_summary(2024, 7, TODAY, &connection),
            Err(Error::OpenPeriod("202407".to_owned()))
        );
        assert_eq!(
            generate_monthly_summary(2025, 1, TODAY, &connection),
            Err(Error::OpenPeriod("202501".to_owned()))
        );
    }

    #[test]
    fn last_month_is_allowed_on_the_first() {
        let connection = get_test_connection();

        assert!(generate_monthly_summary(2024, 6, date!(2024 - 07 - 01), &connection).is_ok());
    }

    #[test]
    fn each_period_is_generated_once() {
        let connection = get_test_connection();
        generate_monthly_summary(2024, 1, TODAY, &connection).unwrap();

        assert_eq!(
            generate_monthly_summary(2024, 1, TODAY, &connection),
            Err(Error::DuplicateSummary("202401".to_owned()))
        );
    }

    #[test]
    fn invalid_month_is_rejected() {
        let connection = get_test_connection();

        assert!(matches!(
            generate_monthly_summary(2024, 13, TODAY, &connection),
            Err(Error::InvalidPeriod(_, _))
        ));
    }
}
