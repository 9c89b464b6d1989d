//! Middleware that guards the admin API with bearer tokens and the member API with session cookies.

use axum::{
    extract::{FromRef, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState,
    auth::{
        cookie::get_session_from_cookies,
        jwt::{JwtKeys, TokenRejection, authenticate_admin},
    },
    response::render_message,
};

/// The state needed for the admin auth middleware.
#[derive(Debug, Clone)]
pub struct AdminAuthState {
    pub jwt_keys: JwtKeys,
}

impl FromRef<AppState> for AdminAuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
        }
    }
}

/// Middleware function that checks for a valid admin bearer token.
///
/// Responds with 403 if there is no `Authorization` header and 401 if the token is invalid.
///
/// **Note**: Route handlers can use the function argument `Extension(admin_id): Extension<AdminId>`
/// to receive the ID of the authenticated admin.
pub async fn admin_guard(
    State(state): State<AdminAuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate_admin(request.headers(), &state.jwt_keys) {
        Ok(admin_id) => {
            request.extensions_mut().insert(admin_id);
            next.run(request).await
        }
        Err(TokenRejection::Missing) => render_message(StatusCode::FORBIDDEN, "No token provided"),
        Err(TokenRejection::Invalid) => {
            render_message(StatusCode::UNAUTHORIZED, "Failed to authenticate token")
        }
    }
}

/// The state needed for the member session middleware.
#[derive(Clone)]
pub struct MemberAuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for MemberAuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

/// Middleware function that checks for a valid member session cookie.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(member_id): Extension<MemberId>` to receive the ID of the logged-in member.
pub async fn member_guard(
    State(state): State<MemberAuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = PrivateCookieJar::from_headers(request.headers(), state.cookie_key.clone());

    match get_session_from_cookies(&jar) {
        Ok(token) => {
            request.extensions_mut().insert(token.member_id);
            next.run(request).await
        }
        Err(_) => render_message(StatusCode::UNAUTHORIZED, "Not logged in"),
    }
}
