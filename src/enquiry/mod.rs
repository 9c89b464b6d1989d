//! Hierarchical financial enquiries over the ledger.
//!
//! An enquiry aggregates ledger entries along one [params::Dimension] (member, ward,
//! quarter or the whole account) and returns a flat `summary` plus an
//! optional nested `detail`. Quarters contain wards only in the sense that
//! members of a quarter live in those wards; the hierarchy is rebuilt from
//! the member table on every enquiry.

mod account;
mod endpoint;
mod ledger_rows;
mod member;
mod options;
mod params;
mod quarter;
mod registry;
mod rows;
mod ward;

pub use endpoint::{EnquiryState, enquiry_endpoint};
pub use options::enquiry_options_endpoint;
pub use params::Mode;
pub use registry::EnquiryRegistry;
