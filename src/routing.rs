//! Application router configuration with protected and unprotected route definitions.

use std::path::Path;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    admin::{
        activate_admin_endpoint, admin_log_in_endpoint, admin_log_in_get_endpoint,
        create_admin_endpoint, deactivate_admin_endpoint, delete_admin_endpoint,
        list_admins_endpoint, reset_admin_password_endpoint, update_admin_endpoint,
    },
    analysis::{expenses_analysis_endpoint, income_analysis_endpoint},
    auth::{admin_guard, member_guard},
    dashboard::dashboard_endpoint,
    endpoints,
    enquiry::{enquiry_endpoint, enquiry_options_endpoint},
    expense::{create_expense_endpoint, list_expenses_endpoint},
    ledger::{
        create_ledger_entry_endpoint, get_all_ledger_entries_endpoint, get_ledger_records_endpoint,
        get_member_ledger_endpoint, get_own_ledger_endpoint, group_enquiry_endpoint,
        monthly_total_endpoint,
    },
    lookup::{
        INCOME_CLASSES, STD_EXPENSES, code_table_routes, delete_static_endpoint,
        insert_static_endpoint, list_static_endpoint, project_list_endpoint,
        update_static_endpoint,
    },
    member::{
        change_phone_endpoint, create_member_endpoint, delete_member_endpoint,
        get_member_endpoint, get_profile_endpoint, list_members_endpoint, log_in_endpoint,
        log_out_endpoint, members_summary_endpoint, reset_password_endpoint, sign_up_endpoint,
        update_member_endpoint, update_profile_endpoint,
    },
    monthly_summary::{generate_summary_endpoint, list_summaries_endpoint},
    notice::{
        create_notice_endpoint, delete_notice_endpoint, list_notices_endpoint,
        update_notice_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Paths that match no route are served from `static_dir`.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ADMIN_CREATE, post(create_admin_endpoint))
        .route(
            endpoints::ADMIN_LOG_IN,
            post(admin_log_in_endpoint).get(admin_log_in_get_endpoint),
        )
        .route(
            endpoints::ADMIN_RESET_PASSWORD,
            post(reset_admin_password_endpoint),
        )
        .route(endpoints::NOTICES, get(list_notices_endpoint))
        .route(endpoints::SIGN_UP, post(sign_up_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::LOG_OUT, post(log_out_endpoint))
        .route(endpoints::RESET_PASSWORD, post(reset_password_endpoint));

    let admin_routes = Router::new()
        .route(endpoints::ADMIN_LIST, get(list_admins_endpoint))
        .route(endpoints::ADMIN_UPDATE, put(update_admin_endpoint))
        .route(endpoints::ADMIN_ACTIVATE, patch(activate_admin_endpoint))
        .route(endpoints::ADMIN_DEACTIVATE, patch(deactivate_admin_endpoint))
        .route(
            endpoints::ADMIN_DELETE,
            axum::routing::delete(delete_admin_endpoint),
        )
        .route(endpoints::CREATE_MEMBER, post(create_member_endpoint))
        .route(endpoints::MEMBERS, get(list_members_endpoint))
        .route(
            endpoints::MEMBER,
            get(get_member_endpoint)
                .put(update_member_endpoint)
                .delete(delete_member_endpoint),
        )
        .route(endpoints::CHANGE_PHONE, put(change_phone_endpoint))
        .route(endpoints::MEMBERS_SUMMARY, get(members_summary_endpoint))
        .route(endpoints::LEDGER_ENTRY, post(create_ledger_entry_endpoint))
        .route(endpoints::MEMBER_LEDGER, get(get_member_ledger_endpoint))
        .route(
            endpoints::ALL_LEDGER_ENTRIES,
            get(get_all_ledger_entries_endpoint),
        )
        .route(endpoints::LEDGER_RECORDS, get(get_ledger_records_endpoint))
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::PROJECT_LIST, get(project_list_endpoint))
        .route(
            endpoints::EXPENSES_ANALYSIS,
            get(expenses_analysis_endpoint),
        )
        .route(endpoints::INCOME_ANALYSIS, get(income_analysis_endpoint))
        .route(endpoints::STD_EXPENSES, code_table_routes(&STD_EXPENSES))
        .route(endpoints::INCOME_CLASSES, code_table_routes(&INCOME_CLASSES))
        .route(
            endpoints::STATIC_LOOKUP,
            get(list_static_endpoint)
                .post(insert_static_endpoint)
                .put(update_static_endpoint)
                .delete(delete_static_endpoint),
        )
        .route(endpoints::ENQUIRY, get(enquiry_endpoint))
        .route(endpoints::ENQUIRY_OPTIONS, get(enquiry_options_endpoint))
        .route(endpoints::GENERATE_SUMMARY, post(generate_summary_endpoint))
        .route(endpoints::MONTHLY_SUMMARIES, get(list_summaries_endpoint))
        .route(endpoints::NOTICES, post(create_notice_endpoint))
        .route(
            endpoints::NOTICE,
            put(update_notice_endpoint).delete(delete_notice_endpoint),
        )
        .route(endpoints::DASHBOARD, get(dashboard_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    let member_routes = Router::new()
        .route(endpoints::PROFILE, get(get_profile_endpoint))
        .route(endpoints::UPDATE_PROFILE, post(update_profile_endpoint))
        .route(endpoints::OWN_LEDGER, get(get_own_ledger_endpoint))
        .route(endpoints::MONTHLY_TOTAL, get(monthly_total_endpoint))
        .route(endpoints::GROUP_ENQUIRY, get(group_enquiry_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), member_guard));

    admin_routes
        .merge(member_routes)
        .merge(unprotected_routes)
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        auth::COOKIE_SESSION,
        endpoints::{self, format_endpoint},
        test_utils::get_test_app_state,
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let app = build_router(get_test_app_state(), Path::new("static"));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    async fn log_in_as_new_admin(server: &TestServer) -> String {
        server
            .post(endpoints::ADMIN_CREATE)
            .json(&json!({"fullname": "Ada Obi", "email": "ada@example.com", "password": "hunter2"}))
            .await
            .assert_status(StatusCode::CREATED);

        let body: serde_json::Value = server
            .post(endpoints::ADMIN_LOG_IN)
            .json(&json!({"email": "ada@example.com", "password": "hunter2"}))
            .await
            .json();

        body["token"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn admin_routes_need_a_token() {
        let server = get_test_server();

        for path in [
            endpoints::ENQUIRY,
            endpoints::MEMBERS,
            endpoints::DASHBOARD,
            endpoints::STD_EXPENSES,
        ] {
            let response = server.get(path).await;

            response.assert_status(StatusCode::FORBIDDEN);
            response.assert_json(&json!({"message": "No token provided"}));
        }

        server
            .get(endpoints::ENQUIRY)
            .authorization_bearer("garbage")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn notices_can_be_read_without_a_token() {
        let server = get_test_server();

        let response = server.get(endpoints::NOTICES).await;

        response.assert_status_ok();
        response.assert_json(&json!([]));
        server
            .post(endpoints::NOTICES)
            .json(&json!({"title": "AGM", "content": "Saturday", "type": "event"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_records_payment_and_runs_enquiry() {
        let server = get_test_server();
        let token = log_in_as_new_admin(&server).await;

        server
            .post(endpoints::CREATE_MEMBER)
            .authorization_bearer(&token)
            .json(&json!({
                "PhoneNumber": "08031234567",
                "Surname": "Okafor",
                "othernames": "Chidi",
                "Ward": "A",
                "Quarters": "Q1"
            }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post(&format_endpoint(endpoints::LEDGER_ENTRY, "08031234567"))
            .authorization_bearer(&token)
            .json(&json!({"transdate": "2024-01-10", "amount": "100", "remark": "dues"}))
            .await
            .assert_status_success();

        let response = server
            .get(endpoints::ENQUIRY)
            .authorization_bearer(&token)
            .add_query_params(json!({"type": "member", "param": "ALL"}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "summary": [
                {"PhoneNumber": "08031234567", "fullname": "Okafor Chidi", "total": 100.0},
                {"PhoneNumber": "ALL", "fullname": "ALL", "total": 100.0}
            ],
            "detail": []
        }));
    }

    #[tokio::test]
    async fn member_routes_need_a_session() {
        let server = get_test_server();

        let response = server.get(endpoints::PROFILE).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"message": "Not logged in"}));

        let response = server
            .post(endpoints::SIGN_UP)
            .json(&json!({
                "phoneNumber": "08031234567",
                "password": "hunter2",
                "surname": "Okafor",
                "otherNames": "Chidi",
                "ward": "A",
                "quarters": "Q1"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let session_cookie = response.cookie(COOKIE_SESSION);

        let response = server
            .get(endpoints::PROFILE)
            .add_cookie(session_cookie)
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["phoneNumber"], "08031234567");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let server = get_test_server();

        server
            .get("/no/such/page")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
