//! Admin accounts and their database queries.

use std::fmt::Display;

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{Error, password::PasswordHash};

/// The role given to admins created without one.
pub const DEFAULT_ROLE: &str = "admin";

/// A newtype wrapper for integer admin IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminId(i64);

impl AdminId {
    /// Create a new admin ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying integer ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for AdminId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An account that can use the `/admin` API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admin {
    #[serde(rename = "Id")]
    pub id: AdminId,
    pub fullname: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    #[serde(skip)]
    pub password_hash: PasswordHash,
}

/// The data needed to create an admin.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub fullname: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub role: String,
}

/// The fields of an admin that can be edited after creation.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUpdate {
    pub fullname: String,
    pub email: String,
    pub role: String,
}

pub fn create_admin_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS admin (
            id INTEGER PRIMARY KEY,
            fullname TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

fn map_admin_row(row: &Row) -> Result<Admin, rusqlite::Error> {
    let raw_hash: String = row.get(5)?;

    Ok(Admin {
        id: AdminId::new(row.get(0)?),
        fullname: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        active: row.get(4)?,
        password_hash: PasswordHash::new_unchecked(&raw_hash),
    })
}

const SELECT_ADMIN: &str = "SELECT id, fullname, email, role, active, password FROM admin";

/// Insert a new, active admin.
///
/// # Errors
/// Returns [Error::DuplicateAdminEmail] if the email is already registered.
pub fn create_admin(admin: &NewAdmin, connection: &Connection) -> Result<Admin, Error> {
    connection.execute(
        "INSERT INTO admin (fullname, email, password, role) VALUES (?1, ?2, ?3, ?4)",
        params![
            admin.fullname,
            admin.email,
            admin.password_hash.as_str(),
            admin.role
        ],
    )?;

    Ok(Admin {
        id: AdminId::new(connection.last_insert_rowid()),
        fullname: admin.fullname.clone(),
        email: admin.email.clone(),
        role: admin.role.clone(),
        active: true,
        password_hash: admin.password_hash.clone(),
    })
}

pub fn count_admins(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM admin", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// # Errors
/// Returns [Error::NotFound] if no admin has the email address.
pub fn get_admin_by_email(email: &str, connection: &Connection) -> Result<Admin, Error> {
    connection
        .query_row(
            &format!("{SELECT_ADMIN} WHERE email = ?1"),
            [email],
            map_admin_row,
        )
        .map_err(|error| error.into())
}

pub fn list_admins(connection: &Connection) -> Result<Vec<Admin>, Error> {
    connection
        .prepare(&format!("{SELECT_ADMIN} ORDER BY id"))?
        .query_map([], map_admin_row)?
        .map(|maybe_admin| maybe_admin.map_err(Error::from))
        .collect()
}

/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to an admin.
pub fn update_admin(
    id: AdminId,
    update: &AdminUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE admin SET fullname = ?1, email = ?2, role = ?3 WHERE id = ?4",
        params![update.fullname, update.email, update.role, id.as_i64()],
    )?;

    expect_one_row(rows_affected)
}

/// Activate or deactivate an admin. Deactivated admins cannot log in.
pub fn set_admin_active(id: AdminId, active: bool, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE admin SET active = ?1 WHERE id = ?2",
        params![active, id.as_i64()],
    )?;

    expect_one_row(rows_affected)
}

pub fn delete_admin(id: AdminId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM admin WHERE id = ?1", [id.as_i64()])?;

    expect_one_row(rows_affected)
}

/// Replace the password of the admin with `email`.
///
/// # Errors
/// Returns [Error::NotFound] if no admin has the email address.
pub fn set_admin_password(
    email: &str,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE admin SET password = ?1 WHERE email = ?2",
        params![password_hash.as_str(), email],
    )?;

    expect_one_row(rows_affected)
}

fn expect_one_row(rows_affected: usize) -> Result<(), Error> {
    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}
