//! Notices and events posted by admins for members to read.

use rusqlite::{Connection, Row, params};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{AdminId, Error};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Free text such as "notice" or "event".
    #[serde(rename = "type")]
    pub notice_type: String,
    #[serde(serialize_with = "rfc3339")]
    pub created_at: OffsetDateTime,
}

fn rfc3339<S>(timestamp: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let formatted = timestamp
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// The editable fields of a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeContent {
    pub title: String,
    pub content: String,
    pub notice_type: String,
}

pub fn create_notice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS notice (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            notice_type TEXT NOT NULL,
            created_by INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_notice_row(row: &Row) -> Result<Notice, rusqlite::Error> {
    Ok(Notice {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        notice_type: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn create_notice(
    notice: &NoticeContent,
    created_by: AdminId,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Notice, Error> {
    connection.execute(
        "INSERT INTO notice (title, content, notice_type, created_by, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            notice.title,
            notice.content,
            notice.notice_type,
            created_by.as_i64(),
            created_at
        ],
    )?;

    Ok(Notice {
        id: connection.last_insert_rowid(),
        title: notice.title.clone(),
        content: notice.content.clone(),
        notice_type: notice.notice_type.clone(),
        created_at,
    })
}

/// Every notice, most recently posted first.
pub fn list_notices(connection: &Connection) -> Result<Vec<Notice>, Error> {
    connection
        .prepare(
            "SELECT id, title, content, notice_type, created_at FROM notice
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map([], map_notice_row)?
        .map(|maybe_notice| maybe_notice.map_err(Error::from))
        .collect()
}

/// # Errors
/// Returns [Error::NotFound] if there is no notice with `id`.
pub fn update_notice(
    id: i64,
    notice: &NoticeContent,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE notice SET title = ?1, content = ?2, notice_type = ?3 WHERE id = ?4",
        params![notice.title, notice.content, notice.notice_type, id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// # Errors
/// Returns [Error::NotFound] if there is no notice with `id`.
pub fn delete_notice(id: i64, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM notice WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
