//! The shapes returned by the enquiry endpoint.
//!
//! The JSON keys are what the admin frontend reads, hence the mix of casing.

use serde::Serialize;
use time::Date;

use crate::date_window::iso_date;

/// One ledger entry in an enquiry's detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub phoneno: String,
    /// `None` when the entry's member has been deleted.
    pub fullname: Option<String>,
    #[serde(with = "iso_date")]
    pub transdate: Date,
    pub amount: f64,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardDetail {
    /// `None` for the members of a quarter who have no ward.
    pub ward: Option<String>,
    pub members: Vec<DetailRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterDetail {
    pub quarter: String,
    pub wards: Vec<WardDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailNode {
    Entry(DetailRow),
    Ward(WardDetail),
    Quarter(QuarterDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryRow {
    /// A member in the all-members listing, or the trailing "ALL" row.
    Member {
        #[serde(rename = "PhoneNumber")]
        phone_number: String,
        fullname: String,
        total: f64,
    },
    SingleMember {
        phoneno: String,
        fullname: String,
        total: f64,
    },
    Ward {
        #[serde(rename = "Ward")]
        ward: String,
        total: f64,
    },
    /// A quarter in the all-quarters listing, or the trailing "ALL" row.
    Quarters {
        #[serde(rename = "Quarters")]
        quarter: String,
        total: f64,
    },
    SingleQuarter {
        #[serde(rename = "Quarter")]
        quarter: String,
        total: f64,
    },
    Account {
        #[serde(rename = "StartDate")]
        start_date: String,
        #[serde(rename = "EndDate")]
        end_date: String,
        #[serde(rename = "TotalCredit")]
        total_credit: f64,
        #[serde(rename = "TotalDebit")]
        total_debit: f64,
    },
}

impl SummaryRow {
    /// The label used for the synthetic grand-total row.
    pub const ALL: &'static str = "ALL";
}

/// The response body of an enquiry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnquiryResult {
    pub summary: Vec<SummaryRow>,
    pub detail: Vec<DetailNode>,
}
