use thiserror::Error;

use crate::db_types::{UserCredentials, UserId};

/// The `UserAuth` trait defines behaviour for storing and retrieving participant credentials.
///
/// Hashing and verification live in [`crate::AuthApi`]; backends only store and fetch the records.
#[allow(async_fn_in_trait)]
pub trait UserAuth {
    /// Stores a new user with the given (already hashed) credential. Fails with `UserAlreadyExists` if the username
    /// is taken.
    async fn create_user(&self, username: &UserId, password_digest: &str, salt: &str) -> Result<(), AuthApiError>;

    /// Fetches the stored credential record for the username, or `None` if no such user is registered.
    async fn fetch_credentials(&self, username: &UserId) -> Result<Option<UserCredentials>, AuthApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A user with the name {0} already exists")]
    UserAlreadyExists(UserId),
    #[error("The username or password is incorrect")]
    InvalidCredentials,
    #[error("{0} is not a valid username")]
    InvalidUsername(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}
