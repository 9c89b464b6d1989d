mod core;
mod endpoints;

pub use core::{
    MonthlySummary, create_monthly_summary_table, generate_monthly_summary,
    get_first_monthly_summaries,
};
pub use endpoints::{MonthlySummaryState, generate_summary_endpoint, list_summaries_endpoint};
