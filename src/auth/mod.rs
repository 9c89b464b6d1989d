mod cookie;
mod jwt;
mod middleware;
mod token;

pub use cookie::DEFAULT_SESSION_DURATION;
pub(crate) use cookie::{invalidate_session_cookie, set_session_cookie};
pub use jwt::{JwtKeys, TokenRejection, authenticate_admin, encode_token};
pub use middleware::{AdminAuthState, MemberAuthState, admin_guard, member_guard};

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
#[cfg(test)]
pub(crate) use jwt::decode_token;
