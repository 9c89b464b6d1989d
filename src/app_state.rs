//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_SESSION_DURATION, JwtKeys},
    db::initialize,
    enquiry::EnquiryRegistry,
    lookup::LookupRegistry,
    password::PasswordHash,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys used to sign and verify admin bearer tokens.
    pub jwt_keys: JwtKeys,

    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which member session cookies are valid.
    pub session_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Africa/Lagos".
    pub local_timezone: String,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,

    /// The enquiry resolvers, one per dimension.
    pub enquiry_registry: Arc<EnquiryRegistry>,

    /// The lookup tables that can be selected by name.
    pub lookup_registry: Arc<LookupRegistry>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Africa/Lagos".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            jwt_keys: JwtKeys::new(jwt_secret),
            cookie_key: create_cookie_key(cookie_secret),
            session_duration: DEFAULT_SESSION_DURATION,
            local_timezone: local_timezone.to_owned(),
            password_cost: PasswordHash::DEFAULT_COST,
            enquiry_registry: Arc::new(EnquiryRegistry::new()),
            lookup_registry: Arc::new(LookupRegistry::new()),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::AppState;

    #[test]
    fn new_state_initializes_database() {
        let state =
            AppState::new(Connection::open_in_memory().unwrap(), "jwt", "cookie", "Etc/UTC")
                .unwrap();

        let connection = state.db_connection.lock().unwrap();
        let admins: i64 = connection
            .query_row("SELECT COUNT(*) FROM admin", [], |row| row.get(0))
            .unwrap();
        assert_eq!(admins, 0);
    }
}
