mod core;
mod endpoints;

pub use core::{
    Admin, AdminId, AdminUpdate, DEFAULT_ROLE, NewAdmin, count_admins, create_admin,
    create_admin_table, get_admin_by_email, set_admin_password,
};
pub use endpoints::{
    activate_admin_endpoint, admin_log_in_endpoint, admin_log_in_get_endpoint,
    create_admin_endpoint, deactivate_admin_endpoint, delete_admin_endpoint, list_admins_endpoint,
    reset_admin_password_endpoint, update_admin_endpoint,
};
