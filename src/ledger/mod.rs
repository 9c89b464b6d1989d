mod admin_endpoints;
mod core;
mod member_endpoints;

pub use admin_endpoints::{
    LedgerState, create_ledger_entry_endpoint, get_all_ledger_entries_endpoint,
    get_ledger_records_endpoint, get_member_ledger_endpoint,
};
pub use core::{
    LedgerEntry, NewLedgerEntry, create_ledger_entry, create_ledger_entry_table,
    get_first_ledger_entries, get_ledger_entries_for_member, sum_ledger_entries,
};
pub use member_endpoints::{
    get_own_ledger_endpoint, group_enquiry_endpoint, monthly_total_endpoint,
};
