#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::parse_json_body;

use rusqlite::Connection;
use time::{Date, macros::date};

use crate::{
    AppState,
    admin::NewAdmin,
    db::initialize,
    expense::{Expense, NewExpense, create_expense},
    ledger::{LedgerEntry, NewLedgerEntry, create_ledger_entry},
    member::{Member, MemberProfile, NewMember, create_member},
    password::PasswordHash,
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

/// App state over an in-memory database with a cheap password hash cost.
pub(crate) fn get_test_app_state() -> AppState {
    let mut state = AppState::new(
        Connection::open_in_memory().expect("Could not open database in memory."),
        "42",
        "foobar",
        "Etc/UTC",
    )
    .expect("Could not create app state.");
    state.password_cost = 4;

    state
}

/// An admin with the password "hunter2".
pub(crate) fn new_test_admin(email: &str) -> NewAdmin {
    NewAdmin {
        fullname: "Test Admin".to_owned(),
        email: email.to_owned(),
        password_hash: PasswordHash::new("hunter2", 4).expect("Could not hash password."),
        role: "admin".to_owned(),
    }
}

/// A member without a password whose other names are "Test".
///
/// An empty `ward` or `quarters` is stored as NULL.
pub(crate) fn new_test_member(
    phone_number: &str,
    surname: &str,
    ward: &str,
    quarters: &str,
) -> NewMember {
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_owned());

    NewMember {
        phone_number: phone_number.to_owned(),
        profile: MemberProfile {
            surname: surname.to_owned(),
            other_names: "Test".to_owned(),
            ward: non_empty(ward),
            quarters: non_empty(quarters),
            ..Default::default()
        },
        password_hash: None,
        created_at: date!(2024 - 01 - 01),
        created_by: None,
    }
}

pub(crate) fn insert_member(
    connection: &Connection,
    phone_number: &str,
    surname: &str,
    ward: &str,
    quarters: &str,
) -> Member {
    create_member(
        &new_test_member(phone_number, surname, ward, quarters),
        connection,
    )
    .expect("Could not create member.")
}

/// Record a payment with an empty remark. The member does not need to exist.
pub(crate) fn insert_ledger_entry(
    connection: &Connection,
    phone_number: &str,
    transaction_date: Date,
    amount: f64,
) -> LedgerEntry {
    create_ledger_entry(
        &NewLedgerEntry {
            phone_number: phone_number.to_owned(),
            transaction_date,
            amount,
            remark: String::new(),
            payment_date: transaction_date,
        },
        connection,
    )
    .expect("Could not create ledger entry.")
}

pub(crate) fn insert_expense(
    connection: &Connection,
    document_date: Date,
    project: &str,
    amount: f64,
) -> Expense {
    create_expense(
        &NewExpense {
            document_date,
            project: project.to_owned(),
            remarks: String::new(),
            amount,
        },
        connection,
    )
    .expect("Could not create expense.")
}
