//! Validation and defaulting of the enquiry query string.

use serde::Deserialize;

use crate::{Error, date_window::DateWindow};

/// The raw query string of `GET /admin/enquiry`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EnquiryQuery {
    #[serde(rename = "type")]
    pub dimension: Option<String>,
    pub param: Option<String>,
    pub mode: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// The axis an enquiry aggregates the ledger along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Member,
    Ward,
    Quarter,
    Account,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Member,
        Dimension::Ward,
        Dimension::Quarter,
        Dimension::Account,
    ];

    /// Parse the `type` query value. Names are case sensitive.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "member" => Some(Dimension::Member),
            "ward" => Some(Dimension::Ward),
            "quarter" => Some(Dimension::Quarter),
            "account" => Some(Dimension::Account),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Summary,
    Detail,
}

impl Mode {
    /// Anything other than "detail" asks for a summary.
    pub fn parse(text: Option<&str>) -> Self {
        match text {
            Some("detail") => Mode::Detail,
            _ => Mode::Summary,
        }
    }
}

/// Which members, wards or quarters an enquiry covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    All,
    One(String),
}

impl Selector {
    /// A missing or empty `param`, or the literal "ALL", selects everything.
    pub fn parse(text: Option<&str>) -> Self {
        match text {
            None | Some("") | Some("ALL") => Selector::All,
            Some(value) => Selector::One(value.to_owned()),
        }
    }
}

/// A validated enquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnquiryParams {
    pub dimension: Dimension,
    pub selector: Selector,
    pub mode: Mode,
    pub window: DateWindow,
}

impl EnquiryParams {
    pub fn wants_detail(&self) -> bool {
        self.mode == Mode::Detail
    }
}

/// Validate `query` and fill in its defaults.
///
/// Returns `Ok(None)` when `type` is missing or unknown.
///
/// # Errors
/// Returns [Error::InvalidDate] if `start` or `end` is not a "YYYY-MM-DD" date.
pub fn normalize(query: &EnquiryQuery) -> Result<Option<EnquiryParams>, Error> {
    let Some(dimension) = query.dimension.as_deref().and_then(Dimension::parse) else {
        return Ok(None);
    };

    Ok(Some(EnquiryParams {
        dimension,
        selector: Selector::parse(query.param.as_deref()),
        mode: Mode::parse(query.mode.as_deref()),
        window: DateWindow::parse(query.start.as_deref(), query.end.as_deref())?,
    }))
}
