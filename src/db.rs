//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, admin::create_admin_table, expense::create_expense_table,
    ledger::create_ledger_entry_table, lookup::create_lookup_tables, member::create_member_table,
    monthly_summary::create_monthly_summary_table, notice::create_notice_table,
};

/// Create every table the application uses, if it does not already exist.
///
/// Also seeds the read-only lookup tables. Safe to run against an existing database.
///
/// # Errors
/// Returns an error if any table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_admin_table(&transaction)?;
    create_member_table(&transaction)?;
    create_ledger_entry_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_monthly_summary_table(&transaction)?;
    create_notice_table(&transaction)?;
    create_lookup_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    fn table_names(connection: &Connection) -> Vec<String> {
        connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect()
    }

    #[test]
    fn creates_every_table() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(
            table_names(&connection),
            vec![
                "admin",
                "expense",
                "hon_title",
                "income_class",
                "ledger_entry",
                "member",
                "monthly_summary",
                "notice",
                "qualification",
                "state",
                "std_expense",
                "title",
                "ward",
            ]
        );
    }

    #[test]
    fn can_run_twice() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        initialize(&connection).unwrap();

        let states: i64 = connection
            .query_row("SELECT COUNT(*) FROM state", [], |row| row.get(0))
            .unwrap();
        assert_eq!(states, 37);
    }
}
