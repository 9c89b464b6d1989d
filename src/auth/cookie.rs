//! Defines functions for keeping members logged in with an encrypted session cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::token::SessionToken, member::MemberId};

pub(crate) const COOKIE_SESSION: &str = "session";
/// The default duration for which member sessions are valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(1);

/// Add a session cookie for `member_id` to the cookie jar that expires `duration` from now.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the session token cannot be serialized.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    member_id: MemberId,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = SessionToken {
        member_id,
        expires_at,
    };
    let token_string =
        serde_json::to_string(&token).map_err(|error| Error::TokenCreation(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, token_string))
            .path("/")
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete
/// the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the session token from `jar`.
///
/// # Errors
///
/// Returns [Error::NoSession] if the cookie is missing, cannot be parsed, or has expired.
pub(crate) fn get_session_from_cookies(jar: &PrivateCookieJar) -> Result<SessionToken, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::NoSession)?;
    let token: SessionToken =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::NoSession)?;

    if token.is_expired() {
        return Err(Error::NoSession);
    }

    Ok(token)
}
