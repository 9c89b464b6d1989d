mod admin_endpoints;
mod core;
mod profile;
mod session_endpoints;
mod summary;

pub use admin_endpoints::{
    MemberAdminState, change_phone_endpoint, create_member_endpoint, delete_member_endpoint,
    get_member_endpoint, list_members_endpoint, update_member_endpoint,
};
pub use core::{
    Member, MemberId, MemberPatch, MemberProfile, NewMember, create_member, create_member_table,
    get_full_name, get_member_by_id, get_member_by_phone, member_exists,
};
pub use profile::{get_profile_endpoint, update_profile_endpoint};
pub use session_endpoints::{
    log_in_endpoint, log_out_endpoint, reset_password_endpoint, sign_up_endpoint,
};
pub use summary::members_summary_endpoint;
