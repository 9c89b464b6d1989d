//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/admin/member/{phone}', use [format_endpoint].

/// The route for creating an admin. Open while no admin exists.
pub const ADMIN_CREATE: &str = "/admin/create";
/// The route for admins to log in and receive a bearer token.
pub const ADMIN_LOG_IN: &str = "/admin/login";
/// The route for resetting an admin's password by email.
pub const ADMIN_RESET_PASSWORD: &str = "/admin/reset-adminpassword";
/// The route for listing admins.
pub const ADMIN_LIST: &str = "/admin/list";
/// The route for editing an admin.
pub const ADMIN_UPDATE: &str = "/admin/update/{id}";
/// The route for activating an admin.
pub const ADMIN_ACTIVATE: &str = "/admin/activate/{id}";
/// The route for deactivating an admin.
pub const ADMIN_DEACTIVATE: &str = "/admin/deactivate/{id}";
/// The route for deleting an admin.
pub const ADMIN_DELETE: &str = "/admin/delete/{id}";

/// The route for admins to register a member.
pub const CREATE_MEMBER: &str = "/admin/createmember";
/// The route for listing members.
pub const MEMBERS: &str = "/admin/members";
/// The route for getting, editing or deleting one member.
pub const MEMBER: &str = "/admin/member/{phone}";
/// The route for moving a member and their ledger to a new phone number.
pub const CHANGE_PHONE: &str = "/admin/change-phone";
/// The route for member counts by ward and quarter.
pub const MEMBERS_SUMMARY: &str = "/admin/members-summary";

/// The route for recording a payment against a member.
pub const LEDGER_ENTRY: &str = "/admin/ledger-entry/{phoneno}";
/// The route for one member's ledger.
pub const MEMBER_LEDGER: &str = "/admin/api/ledger-entry/{phoneno}";
/// The route for every ledger entry with the member's ward.
pub const ALL_LEDGER_ENTRIES: &str = "/admin/memberledger";
/// The route for ledger entries in a date range.
pub const LEDGER_RECORDS: &str = "/admin/member-recordledger";

/// The route for recording and listing expenses.
pub const EXPENSES: &str = "/admin/ocdaexpenses";
/// The route for the expense project codes.
pub const PROJECT_LIST: &str = "/admin/project-list";
/// The route for the expenses analysis.
pub const EXPENSES_ANALYSIS: &str = "/admin/ocda-expenses-analysis";
/// The route for the income analysis.
pub const INCOME_ANALYSIS: &str = "/admin/ocda-income-analysis";
/// The route for the standard expense codes.
pub const STD_EXPENSES: &str = "/admin/stdxpenses";
/// The route for the income classes.
pub const INCOME_CLASSES: &str = "/admin/incomeclass";
/// The route for the static lookup tables, e.g. titles and wards.
pub const STATIC_LOOKUP: &str = "/admin/static/{type}";

/// The route for financial enquiries.
pub const ENQUIRY: &str = "/admin/enquiry";
/// The route for the members, wards and quarters an enquiry can select.
pub const ENQUIRY_OPTIONS: &str = "/admin/enquiry/options";
/// The route for generating a monthly summary.
pub const GENERATE_SUMMARY: &str = "/admin/generate-summary";
/// The route for listing monthly summaries.
pub const MONTHLY_SUMMARIES: &str = "/admin/monthlysummary";
/// The route for posting and listing notices.
pub const NOTICES: &str = "/admin/notices";
/// The route for editing or deleting a notice.
pub const NOTICE: &str = "/admin/notices/{id}";
/// The route for the admin dashboard.
pub const DASHBOARD: &str = "/admin/dashboard";

/// The route for members to register themselves.
pub const SIGN_UP: &str = "/signup";
/// The route for members to log in.
pub const LOG_IN: &str = "/login";
/// The route for members to log out.
pub const LOG_OUT: &str = "/logout";
/// The route for members to reset their password.
pub const RESET_PASSWORD: &str = "/api/reset-password";
/// The route for the logged-in member's profile.
pub const PROFILE: &str = "/api/profile";
/// The route for the logged-in member to edit their profile.
pub const UPDATE_PROFILE: &str = "/api/update-profile";
/// The route for the logged-in member's ledger.
pub const OWN_LEDGER: &str = "/api/ledger-entry";
/// The route for the logged-in member's total for one month.
pub const MONTHLY_TOTAL: &str = "/api/member/ledger-entry/monthly-total";
/// The route for ledger entries of a ward or quarter.
pub const GROUP_ENQUIRY: &str = "/api/enquiry/{group}/{value}";

/// Replace the first parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace and ends with a right brace.
/// For example, in the endpoint path '/admin/member/{phone}', '{phone}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ADMIN_CREATE,
            endpoints::ADMIN_LOG_IN,
            endpoints::ADMIN_RESET_PASSWORD,
            endpoints::ADMIN_LIST,
            endpoints::ADMIN_UPDATE,
            endpoints::ADMIN_ACTIVATE,
            endpoints::ADMIN_DEACTIVATE,
            endpoints::ADMIN_DELETE,
            endpoints::CREATE_MEMBER,
            endpoints::MEMBERS,
            endpoints::MEMBER,
            endpoints::CHANGE_PHONE,
            endpoints::MEMBERS_SUMMARY,
            endpoints::LEDGER_ENTRY,
            endpoints::MEMBER_LEDGER,
            endpoints::ALL_LEDGER_ENTRIES,
            endpoints::LEDGER_RECORDS,
            endpoints::EXPENSES,
            endpoints::PROJECT_LIST,
            endpoints::EXPENSES_ANALYSIS,
            endpoints::INCOME_ANALYSIS,
            endpoints::STD_EXPENSES,
            endpoints::INCOME_CLASSES,
            endpoints::STATIC_LOOKUP,
            endpoints::ENQUIRY,
            endpoints::ENQUIRY_OPTIONS,
            endpoints::GENERATE_SUMMARY,
            endpoints::MONTHLY_SUMMARIES,
            endpoints::NOTICES,
            endpoints::NOTICE,
            endpoints::DASHBOARD,
            endpoints::SIGN_UP,
            endpoints::LOG_IN,
            endpoints::LOG_OUT,
            endpoints::RESET_PASSWORD,
            endpoints::PROFILE,
            endpoints::UPDATE_PROFILE,
            endpoints::OWN_LEDGER,
            endpoints::MONTHLY_TOTAL,
            endpoints::GROUP_ENQUIRY,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/admin/member/{phone}", "08031234567");

        assert_eq!(formatted_path, "/admin/member/08031234567");
        assert!(formatted_path.parse::<Uri>().is_ok());

        let formatted_path = format_endpoint("/admin/notices/{id}", 1);

        assert_eq!(formatted_path, "/admin/notices/1");
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/admin/members", 1);

        assert_eq!(formatted_path, "/admin/members");
    }

    #[test]
    fn replaces_first_of_two_parameters() {
        let formatted_path = format_endpoint("/api/enquiry/{group}/{value}", "ward");

        assert_eq!(formatted_path, "/api/enquiry/ward/{value}");
    }
}
