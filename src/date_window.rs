//! Optional, inclusive date bounds used to filter ledger entries and expenses.

use time::{Date, Month, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

/// Dates are exchanged with clients and stored in the database as "YYYY-MM-DD".
pub(crate) const ISO_DATE: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// An inclusive date range where either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    /// The earliest date to include.
    pub start: Option<Date>,
    /// The latest date to include.
    pub end: Option<Date>,
}

impl DateWindow {
    /// Build a window from the raw `start` and `end` query values.
    ///
    /// Missing and empty (or whitespace only) values leave that end of the window open.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if a non-empty value is not a "YYYY-MM-DD" date.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, Error> {
        Ok(Self {
            start: parse_optional_date(start)?,
            end: parse_optional_date(end)?,
        })
    }

    /// The window covering every day of the calendar month.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if `month` is not in 1..=12 or the year is out of range.
    pub fn month(year: i32, month: u8) -> Result<Self, Error> {
        let invalid = || Error::InvalidPeriod(year.to_string(), month.to_string());
        let calendar_month = Month::try_from(month).map_err(|_| invalid())?;
        let first = Date::from_calendar_date(year, calendar_month, 1).map_err(|_| invalid())?;
        let next_year = if calendar_month == Month::December { year + 1 } else { year };
        let last = Date::from_calendar_date(next_year, calendar_month.next(), 1)
            .ok()
            .and_then(|next_first| next_first.previous_day())
            .ok_or_else(invalid)?;

        Ok(Self {
            start: Some(first),
            end: Some(last),
        })
    }

    /// Parse a "YYYY-MM" month into the window covering it.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if `text` is not a "YYYY-MM" month.
    pub fn parse_month(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidPeriod(text.to_owned(), String::new());
        let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;

        Self::month(year, month)
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Parse a "YYYY-MM-DD" date.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), ISO_DATE).map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Parse a date where `None` and empty strings both mean "no date".
pub fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_date(text).map(Some),
    }
}

/// Serialize dates as "YYYY-MM-DD" instead of the default (year, ordinal) tuple.
pub(crate) mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::ISO_DATE;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Date::parse(text.trim(), ISO_DATE).map_err(serde::de::Error::custom)
    }
}

/// Like [iso_date], but `null` and empty strings map to `None`.
pub(crate) mod iso_date_option {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::ISO_DATE;

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                let formatted = date.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => Date::parse(text.trim(), ISO_DATE)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
