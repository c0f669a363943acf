use sqlx::SqliteConnection;

use crate::{
    db_types::{UserCredentials, UserId},
    traits::AuthApiError,
};

pub async fn insert_user(
    username: &UserId,
    password_digest: &str,
    salt: &str,
    conn: &mut SqliteConnection,
) -> Result<(), AuthApiError> {
    sqlx::query("INSERT INTO users (username, password_digest, salt) VALUES ($1, $2, $3)")
        .bind(username)
        .bind(password_digest)
        .bind(salt)
        .execute(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AuthApiError::UserAlreadyExists(username.clone())
            },
            e => e.into(),
        })?;
    Ok(())
}

pub async fn fetch_user_by_name(
    username: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}
