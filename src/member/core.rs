//! Members of the organisation and their database queries.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use crate::{
    Error,
    admin::AdminId,
    date_window::{ISO_DATE, iso_date, iso_date_option},
    password::PasswordHash,
};

/// A newtype wrapper for integer member IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(i64);

impl MemberId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The descriptive fields of a member.
///
/// The JSON keys match the column names the admin frontend uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    #[serde(rename = "phoneno2", default)]
    pub phone_number2: Option<String>,
    #[serde(rename = "Surname")]
    pub surname: String,
    #[serde(rename = "othernames")]
    pub other_names: String,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "HonTitle", default)]
    pub hon_title: Option<String>,
    #[serde(rename = "Sex", default)]
    pub sex: Option<String>,
    #[serde(rename = "Quarters", default)]
    pub quarters: Option<String>,
    #[serde(rename = "Ward", default)]
    pub ward: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
    #[serde(rename = "Town", default)]
    pub town: Option<String>,
    #[serde(rename = "DOB", default, with = "iso_date_option")]
    pub date_of_birth: Option<Date>,
    #[serde(rename = "Qualifications", default)]
    pub qualifications: Option<String>,
    #[serde(rename = "Profession", default)]
    pub profession: Option<String>,
    #[serde(rename = "exitdate", default, with = "iso_date_option")]
    pub exit_date: Option<Date>,
    #[serde(default)]
    pub email: Option<String>,
}

impl MemberProfile {
    /// The member's name as shown in reports, e.g. "Okafor Chidi Emeka".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.surname, self.other_names)
    }
}

/// A member stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    #[serde(rename = "Id")]
    pub id: MemberId,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    #[serde(flatten)]
    pub profile: MemberProfile,
    #[serde(rename = "CreatedAt", with = "iso_date")]
    pub created_at: Date,
    #[serde(rename = "createdby")]
    pub created_by: Option<AdminId>,
    #[serde(skip)]
    pub password_hash: Option<PasswordHash>,
}

/// The data needed to create a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub phone_number: String,
    pub profile: MemberProfile,
    pub password_hash: Option<PasswordHash>,
    pub created_at: Date,
    pub created_by: Option<AdminId>,
}

/// A partial update to a member.
///
/// Missing fields keep their current value. For the date fields, an empty
/// string or `null` clears the date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberPatch {
    #[serde(rename = "PhoneNumber")]
    pub phone_number: Option<String>,
    #[serde(rename = "phoneno2")]
    pub phone_number2: Option<String>,
    #[serde(rename = "Surname")]
    pub surname: Option<String>,
    #[serde(rename = "othernames")]
    pub other_names: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "HonTitle")]
    pub hon_title: Option<String>,
    #[serde(rename = "Sex")]
    pub sex: Option<String>,
    #[serde(rename = "Quarters")]
    pub quarters: Option<String>,
    #[serde(rename = "Ward")]
    pub ward: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Town")]
    pub town: Option<String>,
    #[serde(rename = "DOB", default, deserialize_with = "deserialize_date_patch")]
    pub date_of_birth: Option<Option<Date>>,
    #[serde(rename = "Qualifications")]
    pub qualifications: Option<String>,
    #[serde(rename = "Profession")]
    pub profession: Option<String>,
    #[serde(rename = "exitdate", default, deserialize_with = "deserialize_date_patch")]
    pub exit_date: Option<Option<Date>>,
    pub email: Option<String>,
    #[serde(rename = "Password")]
    pub password: Option<String>,
}

/// Present date fields become `Some`, with an empty string or `null` becoming `Some(None)`.
fn deserialize_date_patch<'de, D>(deserializer: D) -> Result<Option<Option<Date>>, D::Error>
where
    D: Deserializer<'de>,
{
    iso_date_option::deserialize(deserializer).map(Some)
}

impl MemberPatch {
    /// Whether the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.phone_number.is_none()
            && self.phone_number2.is_none()
            && self.surname.is_none()
            && self.other_names.is_none()
            && self.title.is_none()
            && self.hon_title.is_none()
            && self.sex.is_none()
            && self.quarters.is_none()
            && self.ward.is_none()
            && self.state.is_none()
            && self.town.is_none()
            && self.date_of_birth.is_none()
            && self.qualifications.is_none()
            && self.profession.is_none()
            && self.exit_date.is_none()
            && self.email.is_none()
            && self.password.is_none()
    }

    fn apply(&self, profile: &mut MemberProfile) {
        fn merge(target: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }

        if let Some(surname) = &self.surname {
            profile.surname = surname.clone();
        }
        if let Some(other_names) = &self.other_names {
            profile.other_names = other_names.clone();
        }
        merge(&mut profile.phone_number2, &self.phone_number2);
        merge(&mut profile.title, &self.title);
        merge(&mut profile.hon_title, &self.hon_title);
        merge(&mut profile.sex, &self.sex);
        merge(&mut profile.quarters, &self.quarters);
        merge(&mut profile.ward, &self.ward);
        merge(&mut profile.state, &self.state);
        merge(&mut profile.town, &self.town);
        merge(&mut profile.qualifications, &self.qualifications);
        merge(&mut profile.profession, &self.profession);
        merge(&mut profile.email, &self.email);
        if let Some(date_of_birth) = self.date_of_birth {
            profile.date_of_birth = date_of_birth;
        }
        if let Some(exit_date) = self.exit_date {
            profile.exit_date = exit_date;
        }
    }
}

pub fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS member (
            id INTEGER PRIMARY KEY,
            phone_number TEXT NOT NULL UNIQUE,
            phone_number2 TEXT,
            surname TEXT NOT NULL,
            other_names TEXT NOT NULL,
            title TEXT,
            hon_title TEXT,
            sex TEXT,
            quarters TEXT,
            ward TEXT,
            state TEXT,
            town TEXT,
            date_of_birth TEXT,
            qualifications TEXT,
            profession TEXT,
            exit_date TEXT,
            email TEXT,
            password TEXT,
            created_at TEXT NOT NULL,
            created_by INTEGER
        )",
        (),
    )?;

    // Enquiries group members by ward and quarter.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_member_ward_quarters ON member(ward, quarters)",
        (),
    )?;

    Ok(())
}

const SELECT_MEMBER: &str = "SELECT id, phone_number, phone_number2, surname, other_names, title, \
    hon_title, sex, quarters, ward, state, town, date_of_birth, qualifications, profession, \
    exit_date, email, created_at, created_by, password FROM member";

fn map_member_row(row: &Row) -> Result<Member, rusqlite::Error> {
    let created_by: Option<i64> = row.get(18)?;
    let password: Option<String> = row.get(19)?;

    Ok(Member {
        id: MemberId::new(row.get(0)?),
        phone_number: row.get(1)?,
        profile: MemberProfile {
            phone_number2: row.get(2)?,
            surname: row.get(3)?,
            other_names: row.get(4)?,
            title: row.get(5)?,
            hon_title: row.get(6)?,
            sex: row.get(7)?,
            quarters: row.get(8)?,
            ward: row.get(9)?,
            state: row.get(10)?,
            town: row.get(11)?,
            date_of_birth: row.get(12)?,
            qualifications: row.get(13)?,
            profession: row.get(14)?,
            exit_date: row.get(15)?,
            email: row.get(16)?,
        },
        created_at: row.get(17)?,
        created_by: created_by.map(AdminId::new),
        password_hash: password.map(|hash| PasswordHash::new_unchecked(&hash)),
    })
}

/// Insert a new member.
///
/// # Errors
/// Returns [Error::DuplicatePhoneNumber] if another member has the phone number.
pub fn create_member(member: &NewMember, connection: &Connection) -> Result<Member, Error> {
    let profile = &member.profile;

    connection.execute(
        "INSERT INTO member (phone_number, phone_number2, surname, other_names, title, hon_title, \
            sex, quarters, ward, state, town, date_of_birth, qualifications, profession, \
            exit_date, email, password, created_at, created_by) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            member.phone_number,
            profile.phone_number2,
            profile.surname,
            profile.other_names,
            profile.title,
            profile.hon_title,
            profile.sex,
            profile.quarters,
            profile.ward,
            profile.state,
            profile.town,
            profile.date_of_birth,
            profile.qualifications,
            profile.profession,
            profile.exit_date,
            profile.email,
            member.password_hash.as_ref().map(PasswordHash::as_str),
            member.created_at,
            member.created_by.map(|id| id.as_i64()),
        ],
    )?;

    Ok(Member {
        id: MemberId::new(connection.last_insert_rowid()),
        phone_number: member.phone_number.clone(),
        profile: member.profile.clone(),
        created_at: member.created_at,
        created_by: member.created_by,
        password_hash: member.password_hash.clone(),
    })
}

/// # Errors
/// Returns [Error::NotFound] if no member has the phone number.
pub fn get_member_by_phone(phone_number: &str, connection: &Connection) -> Result<Member, Error> {
    connection
        .query_row(
            &format!("{SELECT_MEMBER} WHERE phone_number = ?1"),
            [phone_number],
            map_member_row,
        )
        .map_err(|error| error.into())
}

/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a member.
pub fn get_member_by_id(id: MemberId, connection: &Connection) -> Result<Member, Error> {
    connection
        .query_row(
            &format!("{SELECT_MEMBER} WHERE id = ?1"),
            [id.as_i64()],
            map_member_row,
        )
        .map_err(|error| error.into())
}

/// All members ordered by surname.
pub fn list_members(connection: &Connection) -> Result<Vec<Member>, Error> {
    connection
        .prepare(&format!("{SELECT_MEMBER} ORDER BY surname, other_names, id"))?
        .query_map([], map_member_row)?
        .map(|maybe_member| maybe_member.map_err(Error::from))
        .collect()
}

/// The full name of the member with `phone_number`, if there is one.
pub fn get_full_name(phone_number: &str, connection: &Connection) -> Result<Option<String>, Error> {
    connection
        .query_row(
            "SELECT surname || ' ' || other_names FROM member WHERE phone_number = ?1",
            [phone_number],
            |row| row.get(0),
        )
        .optional()
        .map_err(|error| error.into())
}

pub fn member_exists(phone_number: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM member WHERE phone_number = ?1)",
            [phone_number],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Merge `patch` into the member with `phone_number`.
///
/// If the patch changes the phone number, the member's ledger entries are moved
/// to the new number in the same database transaction.
///
/// # Errors
/// - [Error::NotFound] if no member has `phone_number`.
/// - [Error::DuplicatePhoneNumber] if the new phone number belongs to another member.
pub fn update_member(
    phone_number: &str,
    patch: &MemberPatch,
    password_hash: Option<PasswordHash>,
    connection: &Connection,
) -> Result<Member, Error> {
    let transaction = connection.unchecked_transaction()?;

    let mut member = get_member_by_phone(phone_number, &transaction)?;
    patch.apply(&mut member.profile);
    if let Some(password_hash) = password_hash {
        member.password_hash = Some(password_hash);
    }

    let new_phone_number = patch
        .phone_number
        .as_deref()
        .filter(|new_phone_number| *new_phone_number != phone_number);
    if let Some(new_phone_number) = new_phone_number {
        if member_exists(new_phone_number, &transaction)? {
            return Err(Error::DuplicatePhoneNumber);
        }
        member.phone_number = new_phone_number.to_owned();
    }

    let profile = &member.profile;
    transaction.execute(
        "UPDATE member SET phone_number = ?1, phone_number2 = ?2, surname = ?3, \
            other_names = ?4, title = ?5, hon_title = ?6, sex = ?7, quarters = ?8, ward = ?9, \
            state = ?10, town = ?11, date_of_birth = ?12, qualifications = ?13, \
            profession = ?14, exit_date = ?15, email = ?16, password = ?17 \
        WHERE id = ?18",
        params![
            member.phone_number,
            profile.phone_number2,
            profile.surname,
            profile.other_names,
            profile.title,
            profile.hon_title,
            profile.sex,
            profile.quarters,
            profile.ward,
            profile.state,
            profile.town,
            profile.date_of_birth,
            profile.qualifications,
            profile.profession,
            profile.exit_date,
            profile.email,
            member.password_hash.as_ref().map(PasswordHash::as_str),
            member.id.as_i64(),
        ],
    )?;

    if new_phone_number.is_some() {
        move_ledger_entries(phone_number, &member.phone_number, &transaction)?;
    }

    transaction.commit()?;

    Ok(member)
}

/// Change a member's phone number and move their ledger entries to the new number.
///
/// Either both the member and their ledger entries are updated, or nothing is.
///
/// # Errors
/// - [Error::NotFound] if no member has `old_phone_number`.
/// - [Error::DuplicatePhoneNumber] if a member already has `new_phone_number`.
pub fn change_phone_number(
    old_phone_number: &str,
    new_phone_number: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    if !member_exists(old_phone_number, &transaction)? {
        return Err(Error::NotFound);
    }

    if member_exists(new_phone_number, &transaction)? {
        return Err(Error::DuplicatePhoneNumber);
    }

    transaction.execute(
        "UPDATE member SET phone_number = ?1 WHERE phone_number = ?2",
        params![new_phone_number, old_phone_number],
    )?;
    move_ledger_entries(old_phone_number, new_phone_number, &transaction)?;

    transaction.commit()?;

    Ok(())
}

fn move_ledger_entries(
    old_phone_number: &str,
    new_phone_number: &str,
    connection: &Connection,
) -> Result<usize, Error> {
    let rows_moved = connection.execute(
        "UPDATE ledger_entry SET phone_number = ?1 WHERE phone_number = ?2",
        params![new_phone_number, old_phone_number],
    )?;
    tracing::debug!(
        "Moved {rows_moved} ledger entries from {old_phone_number} to {new_phone_number}"
    );

    Ok(rows_moved)
}

/// Physically delete a member. Their ledger entries are kept.
///
/// # Errors
/// Returns [Error::NotFound] if no member has the phone number.
pub fn delete_member(phone_number: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM member WHERE phone_number = ?1", [phone_number])?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Replace the password of the member with `phone_number`.
///
/// # Errors
/// Returns [Error::NotFound] if no member has the phone number.
pub fn set_member_password(
    phone_number: &str,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE member SET password = ?1 WHERE phone_number = ?2",
        params![password_hash.as_str(), phone_number],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Age in whole years as the difference between the current year and the birth year.
pub fn age_in_years(date_of_birth: Date, today: Date) -> i32 {
    today.year() - date_of_birth.year()
}

/// Format a date for JSON bodies that are built by hand.
pub fn format_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}
