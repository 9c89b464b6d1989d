mod core;
mod endpoints;

pub use core::create_notice_table;
pub use endpoints::{
    NoticeState, create_notice_endpoint, delete_notice_endpoint, list_notices_endpoint,
    update_notice_endpoint,
};
