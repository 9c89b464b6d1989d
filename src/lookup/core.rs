//! Small reference tables (titles, wards, expense codes, ...) and the generic
//! queries that read and edit them.
//!
//! Each table is described by a [LookupTable]. Rows are exchanged with
//! clients as JSON objects keyed by the names the frontend uses, which may
//! differ from the SQL column names.

use std::collections::HashMap;

use rusqlite::{
    Connection, params_from_iter,
    types::{Value as SqlValue, ValueRef},
};
use serde_json::{Map, Number, Value};

use crate::Error;

/// A JSON object describing one row of a lookup table.
pub type LookupRow = Map<String, Value>;

/// A column of a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupColumn {
    /// The key used in JSON bodies and query strings.
    pub key: &'static str,
    /// The SQL column name.
    pub column: &'static str,
}

/// Describes how a lookup table is stored and exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTable {
    /// The name clients use for the table, e.g. "wards".
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [LookupColumn],
    /// The query parameters that select rows for updates and deletes.
    pub match_columns: &'static [LookupColumn],
    pub order_by: &'static str,
    /// Read-only tables are seeded at start-up and cannot be edited through the API.
    pub read_only: bool,
    pub create_sql: &'static str,
}

const fn column(key: &'static str, column: &'static str) -> LookupColumn {
    LookupColumn { key, column }
}

pub const TITLES: LookupTable = LookupTable {
    name: "titles",
    table: "title",
    columns: &[column("title", "title")],
    match_columns: &[column("value", "title")],
    order_by: "title",
    read_only: false,
    create_sql: "CREATE TABLE IF NOT EXISTS title (title TEXT NOT NULL UNIQUE)",
};

pub const QUALIFICATIONS: LookupTable = LookupTable {
    name: "qualifications",
    table: "qualification",
    columns: &[column("qualification", "qualification")],
    match_columns: &[column("value", "qualification")],
    order_by: "qualification",
    read_only: false,
    create_sql: "CREATE TABLE IF NOT EXISTS qualification (qualification TEXT NOT NULL UNIQUE)",
};

pub const WARDS: LookupTable = LookupTable {
    name: "wards",
    table: "ward",
    columns: &[column("ward", "ward"), column("Quarter", "quarter")],
    match_columns: &[column("ward", "ward"), column("Quarter", "quarter")],
    order_by: "quarter, ward",
    read_only: false,
    create_sql: "CREATE TABLE IF NOT EXISTS ward (
        ward TEXT NOT NULL,
        quarter TEXT NOT NULL,
        UNIQUE(ward, quarter)
    )",
};

pub const HON_TITLES: LookupTable = LookupTable {
    name: "hontitles",
    table: "hon_title",
    columns: &[column("Htitle", "title"), column("titlerank", "rank")],
    match_columns: &[column("Htitle", "title"), column("titlerank", "rank")],
    order_by: "rank, title",
    read_only: false,
    create_sql: "CREATE TABLE IF NOT EXISTS hon_title (
        title TEXT NOT NULL UNIQUE,
        rank INTEGER
    )",
};

pub const STATES: LookupTable = LookupTable {
    name: "states",
    table: "state",
    columns: &[column("statename", "name"), column("statecode", "code")],
    match_columns: &[column("statecode", "code")],
    order_by: "name",
    read_only: true,
    create_sql: "CREATE TABLE IF NOT EXISTS state (
        name TEXT NOT NULL UNIQUE,
        code TEXT NOT NULL UNIQUE
    )",
};

/// Standard expense codes. Expenses are booked against one of these as their project.
pub const STD_EXPENSES: LookupTable = LookupTable {
    name: "stdxpenses",
    table: "std_expense",
    columns: &[column("expscode", "code"), column("expsdesc", "description")],
    match_columns: &[column("expscode", "code")],
    order_by: "code",
    read_only: false,
    create_sql: "CREATE TABLE IF NOT EXISTS std_expense (
        code TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT ''
    )",
};

/// Income classification codes.
pub const INCOME_CLASSES: LookupTable = LookupTable {
    name: "incomeclass",
    table: "income_class",
    columns: &[column("incomecode", "code"), column("incomedesc", "description")],
    match_columns: &[column("incomecode", "code")],
    order_by: "code",
    read_only: false,
    create_sql: "CREATE TABLE IF NOT EXISTS income_class (
        code TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT ''
    )",
};

/// The tables served under `/admin/static/{type}`.
pub const STATIC_TABLES: [LookupTable; 5] = [TITLES, QUALIFICATIONS, WARDS, HON_TITLES, STATES];

/// The 36 states of Nigeria and the Federal Capital Territory.
const NIGERIAN_STATES: [(&str, &str); 37] = [
    ("Abia", "AB"),
    ("Adamawa", "AD"),
    ("Akwa Ibom", "AK"),
    ("Anambra", "AN"),
    ("Bauchi", "BA"),
    ("Bayelsa", "BY"),
    ("Benue", "BE"),
    ("Borno", "BO"),
    ("Cross River", "CR"),
    ("Delta", "DE"),
    ("Ebonyi", "EB"),
    ("Edo", "ED"),
    ("Ekiti", "EK"),
    ("Enugu", "EN"),
    ("Federal Capital Territory", "FC"),
    ("Gombe", "GO"),
    ("Imo", "IM"),
    ("Jigawa", "JI"),
    ("Kaduna", "KD"),
    ("Kano", "KN"),
    ("Katsina", "KT"),
    ("Kebbi", "KE"),
    ("Kogi", "KO"),
    ("Kwara", "KW"),
    ("Lagos", "LA"),
    ("Nasarawa", "NA"),
    ("Niger", "NI"),
    ("Ogun", "OG"),
    ("Ondo", "ON"),
    ("Osun", "OS"),
    ("Oyo", "OY"),
    ("Plateau", "PL"),
    ("Rivers", "RI"),
    ("Sokoto", "SO"),
    ("Taraba", "TA"),
    ("Yobe", "YO"),
    ("Zamfara", "ZA"),
];

/// Create every lookup table and seed the read-only state table.
pub fn create_lookup_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for table in STATIC_TABLES.iter().chain([&STD_EXPENSES, &INCOME_CLASSES]) {
        connection.execute(table.create_sql, ())?;
    }

    let mut insert_state =
        connection.prepare("INSERT OR IGNORE INTO state (name, code) VALUES (?1, ?2)")?;
    for (name, code) in NIGERIAN_STATES {
        insert_state.execute([name, code])?;
    }

    Ok(())
}

/// The lookup tables that clients can select by name, built once at start-up.
#[derive(Debug, Clone)]
pub struct LookupRegistry {
    tables: HashMap<&'static str, LookupTable>,
}

impl Default for LookupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupRegistry {
    /// A registry of the tables in [STATIC_TABLES].
    pub fn new() -> Self {
        Self {
            tables: STATIC_TABLES
                .iter()
                .map(|table| (table.name, *table))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&LookupTable> {
        self.tables.get(name)
    }

    /// Like [LookupRegistry::get], but only returns tables that can be edited.
    pub fn get_writable(&self, name: &str) -> Option<&LookupTable> {
        self.get(name).filter(|table| !table.read_only)
    }
}

fn to_json(value: ValueRef) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) => Value::from(integer),
        ValueRef::Real(real) => Number::from_f64(real).map_or(Value::Null, Value::Number),
        ValueRef::Text(text) | ValueRef::Blob(text) => {
            Value::String(String::from_utf8_lossy(text).into_owned())
        }
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => SqlValue::Real(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Every row of `table` in its natural order.
pub fn list_lookup_rows(
    table: &LookupTable,
    connection: &Connection,
) -> Result<Vec<LookupRow>, Error> {
    let columns: Vec<&str> = table.columns.iter().map(|column| column.column).collect();
    let query = format!(
        "SELECT {} FROM {} ORDER BY {}",
        columns.join(", "),
        table.table,
        table.order_by
    );

    connection
        .prepare(&query)?
        .query_map([], |row| {
            let mut object = LookupRow::new();
            for (index, column) in table.columns.iter().enumerate() {
                object.insert(column.key.to_owned(), to_json(row.get_ref(index)?));
            }
            Ok(object)
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

fn map_unique_violation(error: rusqlite::Error, value: String) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 2067 => {
            Error::DuplicateLookupValue(value)
        }
        error => error.into(),
    }
}

fn describe_row(table: &LookupTable, row: &LookupRow) -> String {
    table
        .columns
        .iter()
        .filter_map(|column| row.get(column.key))
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Insert `row`, which must have a value for every column of `table`.
///
/// # Errors
/// - [Error::MissingValue] if `row` lacks one of the table's keys.
/// - [Error::DuplicateLookupValue] if the row clashes with a unique column.
pub fn insert_lookup_row(
    table: &LookupTable,
    row: &LookupRow,
    connection: &Connection,
) -> Result<(), Error> {
    let mut columns = Vec::with_capacity(table.columns.len());
    let mut values = Vec::with_capacity(table.columns.len());

    for column in table.columns {
        match row.get(column.key) {
            Some(value) if !value.is_null() => {
                columns.push(column.column);
                values.push(to_sql(value));
            }
            _ => return Err(Error::MissingValue(column.key.to_owned())),
        }
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    connection
        .execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({placeholders})",
                table.table,
                columns.join(", ")
            ),
            params_from_iter(values),
        )
        .map_err(|error| map_unique_violation(error, describe_row(table, row)))?;

    Ok(())
}

/// Build the `WHERE` clause that selects the rows named by `selector`.
fn match_clause(
    table: &LookupTable,
    selector: &HashMap<String, String>,
) -> Result<(String, Vec<SqlValue>), Error> {
    let mut conditions = Vec::with_capacity(table.match_columns.len());
    let mut values = Vec::with_capacity(table.match_columns.len());

    for column in table.match_columns {
        let value = selector
            .get(column.key)
            .ok_or_else(|| Error::MissingValue(column.key.to_owned()))?;
        conditions.push(format!("{} = ?", column.column));
        values.push(SqlValue::Text(value.clone()));
    }

    Ok((conditions.join(" AND "), values))
}

/// Set the columns present in `row` on the rows selected by `selector`.
///
/// Keys in `row` that are not columns of `table` are ignored.
///
/// # Errors
/// - [Error::MissingValue] if `selector` lacks a match parameter or `row` sets no column.
/// - [Error::NotFound] if no row matches `selector`.
/// - [Error::DuplicateLookupValue] if the update clashes with a unique column.
pub fn update_lookup_rows(
    table: &LookupTable,
    selector: &HashMap<String, String>,
    row: &LookupRow,
    connection: &Connection,
) -> Result<usize, Error> {
    let mut assignments = Vec::new();
    let mut values = Vec::new();

    for column in table.columns {
        if let Some(value) = row.get(column.key) {
            assignments.push(format!("{} = ?", column.column));
            values.push(to_sql(value));
        }
    }

    if assignments.is_empty() {
        return Err(Error::MissingValue(
            table
                .columns
                .iter()
                .map(|column| column.key)
                .collect::<Vec<_>>()
                .join(", "),
        ));
    }

    let (where_clause, match_values) = match_clause(table, selector)?;
    values.extend(match_values);

    let rows_affected = connection
        .execute(
            &format!(
                "UPDATE {} SET {} WHERE {where_clause}",
                table.table,
                assignments.join(", ")
            ),
            params_from_iter(values),
        )
        .map_err(|error| map_unique_violation(error, describe_row(table, row)))?;

    match rows_affected {
        0 => Err(Error::NotFound),
        count => Ok(count),
    }
}

/// Delete the rows selected by `selector`.
///
/// # Errors
/// - [Error::MissingValue] if `selector` lacks a match parameter.
/// - [Error::NotFound] if no row matches `selector`.
pub fn delete_lookup_rows(
    table: &LookupTable,
    selector: &HashMap<String, String>,
    connection: &Connection,
) -> Result<usize, Error> {
    let (where_clause, values) = match_clause(table, selector)?;

    let rows_affected = connection.execute(
        &format!("DELETE FROM {} WHERE {where_clause}", table.table),
        params_from_iter(values),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        count => Ok(count),
    }
}
