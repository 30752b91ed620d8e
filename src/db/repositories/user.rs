use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};
use tokio::task;

use crate::entities::user;

/// User data returned from the repository (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(found.map(User::from))
    }

    /// Get user by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        let found = user::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(found.map(User::from))
    }

    /// Insert a new user row with an already-hashed password.
    ///
    /// Returns `None` when the username is already taken: the unique
    /// constraint on `username` fires for registrations that race past the
    /// caller's pre-check.
    pub async fn insert(&self, username: &str, password_hash: &str) -> Result<Option<User>> {
        let active = user::ActiveModel {
            username: Set(username.to_string()),
            password: Set(password_hash.to_string()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(User::from(model))),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(err) => Err(err).context("Failed to insert user"),
        }
    }

    /// Verify a plaintext password for a user.
    /// Note: This uses `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(found) = found else {
            return Ok(false);
        };

        let password_hash = found.password;
        let password = password.to_string();

        let is_valid =
            task::spawn_blocking(move || verify_password_hash(&password_hash, &password))
                .await
                .context("Password verification task panicked")?;

        Ok(is_valid)
    }

    pub async fn count(&self) -> Result<u64> {
        let total = user::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")?;

        Ok(total)
    }
}

/// Hash a password using Argon2id with a per-hash random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a plaintext password against a stored hash. Malformed hashes
/// verify as false rather than erroring.
#[must_use]
pub fn verify_password_hash(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
