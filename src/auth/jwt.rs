//! JSON web tokens that authenticate admins.

use std::fmt::Debug;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, admin::AdminId};

/// How long an admin token is valid for after it is issued.
pub const TOKEN_LIFETIME: Duration = Duration::days(1);

/// The keys used to sign and verify admin tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create HMAC keys from `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtKeys { .. }")
    }
}

/// The contents of an admin token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// The admin the token was issued to.
    pub id: AdminId,
    /// The time the token was issued, as a unix timestamp.
    pub iat: i64,
    /// The expiry time of the token, as a unix timestamp.
    pub exp: i64,
}

/// Why a request could not be authenticated as an admin.
#[derive(Debug, PartialEq)]
pub enum TokenRejection {
    /// There is no `Authorization` header.
    Missing,
    /// The header is malformed, or the token is forged or expired.
    Invalid,
}

/// Issue a token for `admin_id` that expires after [TOKEN_LIFETIME].
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token cannot be signed.
pub fn encode_token(admin_id: AdminId, keys: &JwtKeys) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        id: admin_id,
        iat: now.unix_timestamp(),
        exp: (now + TOKEN_LIFETIME).unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(token, &keys.decoding, &Validation::default()).map(|data| data.claims)
}

/// Authenticate the admin named by the bearer token in `headers`.
pub fn authenticate_admin(headers: &HeaderMap, keys: &JwtKeys) -> Result<AdminId, TokenRejection> {
    if !headers.contains_key(AUTHORIZATION) {
        return Err(TokenRejection::Missing);
    }

    let Authorization(bearer) = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(TokenRejection::Invalid)?;

    decode_token(bearer.token(), keys)
        .map(|claims| claims.id)
        .map_err(|error| {
            tracing::debug!("Rejected admin token: {error}");
            TokenRejection::Invalid
        })
}
