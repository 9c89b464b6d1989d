//! Code tables and static lookup lists such as wards, titles and standard expenses.

mod core;
mod endpoints;

pub use core::{
    INCOME_CLASSES, LookupRegistry, LookupRow, STD_EXPENSES, create_lookup_tables,
    list_lookup_rows,
};
pub use endpoints::{
    LookupState, code_table_routes, delete_static_endpoint, insert_static_endpoint,
    list_static_endpoint, project_list_endpoint, update_static_endpoint,
};
