//! Participant registration and credential verification.
//!
//! Passwords are stored as Blake2b-512 digests over `salt ‖ password` with a random per-user salt. Token issuance
//! (the bearer credential the rest of the system consumes) lives in the server; the engine only answers "are these
//! credentials valid for this username".

use std::fmt::Debug;

use blake2::{Blake2b512, Digest};
use log::*;
use rand::RngCore;

use crate::{
    db_types::UserId,
    traits::{AuthApiError, UserAuth},
};

pub struct AuthApi<B> {
    db: B,
}

impl<B> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi")
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: UserAuth
{
    /// Registers a new participant. The username must be non-empty and not already taken.
    pub async fn register_user(&self, username: &UserId, password: &str) -> Result<(), AuthApiError> {
        let name = username.as_str().trim();
        if name.is_empty() || name.len() > 64 {
            return Err(AuthApiError::InvalidUsername(username.to_string()));
        }
        let salt = random_salt();
        let digest = hash_password(&salt, password);
        self.db.create_user(username, &digest, &salt).await?;
        info!("🔑️ New user registered: {username}");
        Ok(())
    }

    /// Verifies a username/password pair, returning the verified identity on success.
    ///
    /// An unknown username and a wrong password both report `InvalidCredentials`; callers cannot probe for
    /// registered usernames through this API.
    pub async fn verify_credentials(&self, username: &UserId, password: &str) -> Result<UserId, AuthApiError> {
        let record = self.db.fetch_credentials(username).await?.ok_or(AuthApiError::InvalidCredentials)?;
        let digest = hash_password(&record.salt, password);
        if digest != record.password_digest {
            debug!("🔑️ Failed login attempt for {username}");
            return Err(AuthApiError::InvalidCredentials);
        }
        Ok(record.username)
    }
}

/// Generates a fresh random per-user salt, hex encoded.
pub fn random_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

/// Computes the stored digest for a password and salt. Public so that seed tooling can mint credential records
/// without going through the registration flow.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Blake2b512::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{b:02x}");
        s
    })
}
